//! E2E tests for post and comment like/dislike toggling

mod common;

use common::TestServer;
use reqwest::Method;
use serde_json::{Value, json};

async fn counts(response: reqwest::Response) -> (i64, i64) {
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Action applied successfully");
    (
        body["likes"].as_i64().unwrap(),
        body["dislikes"].as_i64().unwrap(),
    )
}

#[tokio::test]
async fn test_like_switch_and_toggle_off_scenario() {
    let server = TestServer::new().await;
    let alice = server.register("alice").await;
    let bob = server.register("bob").await;
    let post_id = server.create_post(&alice, "Hello").await;

    // NEUTRAL -> LIKED
    assert_eq!(counts(server.react_to_post(&bob, &post_id, "like").await).await, (1, 0));
    // LIKED -> NEUTRAL
    assert_eq!(counts(server.react_to_post(&bob, &post_id, "like").await).await, (0, 0));
    // NEUTRAL -> DISLIKED
    assert_eq!(counts(server.react_to_post(&bob, &post_id, "dislike").await).await, (0, 1));
    // DISLIKED -> LIKED
    assert_eq!(counts(server.react_to_post(&bob, &post_id, "like").await).await, (1, 0));

    // Three edge additions notified alice; the toggle-off did not
    let inbox = server.notifications(&alice).await;
    assert_eq!(inbox["count"], 3);
    let titles: Vec<&str> = inbox["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles.iter().filter(|t| **t == "Your post was liked!").count(),
        2
    );
    assert_eq!(
        titles
            .iter()
            .filter(|t| **t == "Your post was disliked!")
            .count(),
        1
    );
    assert_eq!(inbox["data"][0]["content"], "bob liked your post: Hello");

    let post: Value = server
        .client
        .get(server.api(&format!("/post/{post_id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(post["data"]["likes"], 1);
    assert_eq!(post["data"]["dislikes"], 0);

    let liked: Value = server
        .client
        .get(server.api("/member/bob/liked-posts"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(liked["data"], json!([post_id]));
}

#[tokio::test]
async fn test_invalid_action_is_rejected_before_lookup() {
    let server = TestServer::new().await;
    let alice = server.register("alice").await;
    let post_id = server.create_post(&alice, "Hello").await;

    for target in [post_id.as_str(), "missing-post"] {
        let response = server.react_to_post(&alice, target, "love").await;
        assert_eq!(response.status(), 400, "{target}");
    }

    // Bodies without a usable string action are the same client error
    for body in [json!({}), json!({ "action": 1 }), json!({ "action": null })] {
        let response = server
            .authed(Method::PUT, &format!("/post/{post_id}/like-dislike"), &alice)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400, "{body}");
        let error: Value = response.json().await.unwrap();
        assert!(error["error"].is_string(), "{body}");
    }

    let post: Value = server
        .client
        .get(server.api(&format!("/post/{post_id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(post["data"]["likes"], 0);
}

#[tokio::test]
async fn test_reaction_on_missing_post_is_not_found() {
    let server = TestServer::new().await;
    let alice = server.register("alice").await;

    let response = server.react_to_post(&alice, "missing-post", "like").await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_reaction_requires_authorization() {
    let server = TestServer::new().await;
    let alice = server.register("alice").await;
    let post_id = server.create_post(&alice, "Hello").await;

    let response = server
        .client
        .put(server.api(&format!("/post/{post_id}/like-dislike")))
        .json(&json!({ "action": "like" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // Session cookie without the CSRF header
    let response = server
        .client
        .put(server.api(&format!("/post/{post_id}/like-dislike")))
        .header("Cookie", alice.cookie_header())
        .json(&json!({ "action": "like" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_own_reactions_do_not_notify() {
    let server = TestServer::new().await;
    let alice = server.register("alice").await;
    let post_id = server.create_post(&alice, "Hello").await;

    assert_eq!(counts(server.react_to_post(&alice, &post_id, "like").await).await, (1, 0));
    assert_eq!(server.notifications(&alice).await["count"], 0);
}

#[tokio::test]
async fn test_comment_reactions_are_scoped_to_their_post() {
    let server = TestServer::new().await;
    let alice = server.register("alice").await;
    let bob = server.register("bob").await;
    let post_id = server.create_post(&alice, "Hello").await;
    let other_post = server.create_post(&alice, "Other").await;
    let comment_id = server.create_comment(&alice, &post_id, "First!").await;

    let response = server
        .authed(
            Method::PUT,
            &format!("/comment/{post_id}/{comment_id}/like-dislike"),
            &bob,
        )
        .json(&json!({ "action": "dislike" }))
        .send()
        .await
        .unwrap();
    assert_eq!(counts(response).await, (0, 1));

    let response = server
        .authed(
            Method::PUT,
            &format!("/comment/{other_post}/{comment_id}/like-dislike"),
            &bob,
        )
        .json(&json!({ "action": "like" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let inbox = server.notifications(&alice).await;
    assert_eq!(inbox["count"], 1);
    assert_eq!(inbox["data"][0]["title"], "Your comment was disliked!");
    assert_eq!(inbox["data"][0]["content"], "bob disliked your comment: First!");

    let disliked: Value = server
        .client
        .get(server.api("/member/bob/disliked-comments"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(disliked["data"], json!([comment_id]));
}

#[tokio::test]
async fn test_two_concurrent_likes_serialize_to_neutral() {
    let server = TestServer::new().await;
    let alice = server.register("alice").await;
    let bob = server.register("bob").await;
    let post_id = server.create_post(&alice, "Hello").await;

    // Like then unlike, in whichever order the write lock grants them
    let (a, b) = tokio::join!(
        server.react_to_post(&bob, &post_id, "like"),
        server.react_to_post(&bob, &post_id, "like"),
    );
    let mut observed = Vec::new();
    for response in [a, b] {
        observed.push(counts(response).await);
    }
    observed.sort();
    assert_eq!(observed, vec![(0, 0), (1, 0)]);

    let post: Value = server
        .client
        .get(server.api(&format!("/post/{post_id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let liked: Value = server
        .client
        .get(server.api("/member/bob/liked-posts"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(post["data"]["likes"], 0);
    assert_eq!(post["data"]["dislikes"], 0);
    assert_eq!(
        post["data"]["likes"].as_u64().unwrap(),
        liked["data"].as_array().unwrap().len() as u64
    );
}

#[tokio::test]
async fn test_concurrent_identical_likes_never_double_count() {
    let server = TestServer::new().await;
    let alice = server.register("alice").await;
    let bob = server.register("bob").await;
    let post_id = server.create_post(&alice, "Hello").await;

    // Three simultaneous likes serialize into like, unlike, like
    let (a, b, c) = tokio::join!(
        server.react_to_post(&bob, &post_id, "like"),
        server.react_to_post(&bob, &post_id, "like"),
        server.react_to_post(&bob, &post_id, "like"),
    );
    for response in [a, b, c] {
        assert_eq!(response.status(), 200);
    }

    let post: Value = server
        .client
        .get(server.api(&format!("/post/{post_id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(post["data"]["likes"], 1);
    assert_eq!(post["data"]["dislikes"], 0);

    let liked: Value = server
        .client
        .get(server.api("/member/bob/liked-posts"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(liked["data"].as_array().unwrap().len(), 1);
}
