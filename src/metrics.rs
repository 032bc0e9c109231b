//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Session Metrics
    pub static ref SESSIONS_ISSUED_TOTAL: IntCounter = IntCounter::new(
        "gatorshare_sessions_issued_total",
        "Total number of session/CSRF token pairs issued"
    ).expect("metric can be created");
    pub static ref AUTH_FAILURES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("gatorshare_auth_failures_total", "Total number of rejected authorizations"),
        &["reason"]
    ).expect("metric can be created");

    // Relationship Metrics
    pub static ref REACTIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("gatorshare_reactions_total", "Total number of applied reaction transitions"),
        &["target", "transition"]
    ).expect("metric can be created");
    pub static ref FOLLOWS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("gatorshare_follows_total", "Total number of follow edge mutations"),
        &["action"]
    ).expect("metric can be created");

    // Notification Metrics
    pub static ref NOTIFICATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("gatorshare_notifications_total", "Total number of notification deliveries"),
        &["status"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("gatorshare_errors_total", "Total number of error responses"),
        &["error_type"]
    ).expect("metric can be created");
}

static INIT: Once = Once::new();

/// Initialize metrics registry.
///
/// Safe to call more than once; only the first call registers.
pub fn init_metrics() {
    INIT.call_once(|| {
        REGISTRY
            .register(Box::new(SESSIONS_ISSUED_TOTAL.clone()))
            .expect("SESSIONS_ISSUED_TOTAL can be registered");
        REGISTRY
            .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
            .expect("AUTH_FAILURES_TOTAL can be registered");
        REGISTRY
            .register(Box::new(REACTIONS_TOTAL.clone()))
            .expect("REACTIONS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(FOLLOWS_TOTAL.clone()))
            .expect("FOLLOWS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(NOTIFICATIONS_TOTAL.clone()))
            .expect("NOTIFICATIONS_TOTAL can be registered");
        REGISTRY
            .register(Box::new(ERRORS_TOTAL.clone()))
            .expect("ERRORS_TOTAL can be registered");

        tracing::info!("Metrics registry initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_metrics_is_idempotent() {
        init_metrics();
        init_metrics();

        SESSIONS_ISSUED_TOTAL.inc();
        let families = REGISTRY.gather();
        assert!(
            families
                .iter()
                .any(|family| family.get_name() == "gatorshare_sessions_issued_total")
        );
    }
}
