//! Common test utilities for E2E tests

#![allow(dead_code)]

use gatorshare::{AppState, config};
use reqwest::{Method, RequestBuilder, Response};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Password used for every registered test member
pub const TEST_PASSWORD: &str = "chomp-chomp";

/// Tokens captured from a register/login response
#[derive(Debug, Clone)]
pub struct TestSession {
    pub username: String,
    pub session_token: String,
    pub csrf_token: String,
}

impl TestSession {
    /// Read `session_token` and `csrf_token` from the Set-Cookie headers
    pub fn from_response(username: &str, response: &Response) -> Self {
        let mut session_token = None;
        let mut csrf_token = None;

        for header in response.headers().get_all("set-cookie") {
            let raw = header.to_str().unwrap();
            let pair = raw.split(';').next().unwrap_or_default();
            match pair.split_once('=') {
                Some(("session_token", value)) => session_token = Some(value.to_string()),
                Some(("csrf_token", value)) => csrf_token = Some(value.to_string()),
                _ => {}
            }
        }

        Self {
            username: username.to_string(),
            session_token: session_token.expect("session_token cookie"),
            csrf_token: csrf_token.expect("csrf_token cookie"),
        }
    }

    pub fn cookie_header(&self) -> String {
        format!(
            "session_token={}; csrf_token={}",
            self.session_token, self.csrf_token
        )
    }
}

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
            },
            database: config::DatabaseConfig {
                path: db_path,
                max_connections: 5,
                busy_timeout_ms: 5_000,
                write_retries: 3,
            },
            auth: config::AuthConfig {
                session_max_age: 3600,
                cookie_domain: None,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        gatorshare::metrics::init_metrics();

        // Initialize app state
        let state = AppState::new(config).await.unwrap();

        // Cookies are attached by hand so tests control exactly what is sent
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = gatorshare::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// URL under `/api/v1`
    pub fn api(&self, path: &str) -> String {
        self.url(&format!("/api/v1{}", path))
    }

    /// Request carrying the session cookie and the CSRF header
    pub fn authed(&self, method: Method, path: &str, session: &TestSession) -> RequestBuilder {
        self.client
            .request(method, self.api(path))
            .header("Cookie", session.cookie_header())
            .header("X-CSRF-Token", &session.csrf_token)
    }

    /// Register `username` and return the issued session
    pub async fn register(&self, username: &str) -> TestSession {
        let response = self
            .client
            .post(self.api("/register"))
            .json(&json!({
                "username": username,
                "email": format!("{username}@ufl.edu"),
                "password": TEST_PASSWORD,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201, "register {username}");

        TestSession::from_response(username, &response)
    }

    pub async fn login(&self, username: &str, password: &str) -> Response {
        self.client
            .post(self.api("/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap()
    }

    /// Create a post and return its id
    pub async fn create_post(&self, session: &TestSession, title: &str) -> String {
        let response = self
            .authed(Method::POST, "/post", session)
            .json(&json!({ "title": title, "content": "body" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: Value = response.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Create a comment on `post_id` and return its id
    pub async fn create_comment(&self, session: &TestSession, post_id: &str, content: &str) -> String {
        let response = self
            .authed(Method::POST, &format!("/comment/{post_id}"), session)
            .json(&json!({ "content": content }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: Value = response.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    pub async fn react_to_post(&self, session: &TestSession, post_id: &str, action: &str) -> Response {
        self.authed(
            Method::PUT,
            &format!("/post/{post_id}/like-dislike"),
            session,
        )
        .json(&json!({ "action": action }))
        .send()
        .await
        .unwrap()
    }

    /// `{count, data}` of the member's notification inbox
    pub async fn notifications(&self, session: &TestSession) -> Value {
        let response = self
            .authed(Method::GET, "/notification", session)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }
}
