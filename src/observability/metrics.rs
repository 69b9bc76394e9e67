//! # Metrics Collection
//!
//! Prometheus metrics for login, logout and bearer authentication. The helpers
//! are cheap no-ops until [`init_metrics`] installs a recorder.

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};
use ::tracing::info;
use metrics::{counter, describe_counter, describe_gauge, gauge, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter when metrics are enabled
pub fn init_metrics(config: &ObservabilityConfig) -> Result<()> {
    let Some(address) = config.metrics_bind_address() else {
        return Ok(());
    };

    let addr: SocketAddr = address
        .parse()
        .map_err(|e| Error::config(format!("Invalid metrics address '{}': {}", address, e)))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| Error::config_with_source("Failed to install Prometheus exporter", Box::new(e)))?;

    register_auth_metrics();
    info!(address = %addr, "Prometheus metrics exporter listening");
    Ok(())
}

/// Register baseline auth metrics so Prometheus exports appear before events occur.
pub fn register_auth_metrics() {
    describe_counter!("auth_logins_total", Unit::Count, "Login attempts grouped by outcome");
    describe_counter!(
        "auth_authentications_total",
        Unit::Count,
        "Bearer authentication attempts grouped by outcome"
    );
    describe_counter!("auth_tokens_issued_total", Unit::Count, "Access tokens issued");
    describe_counter!("auth_tokens_revoked_total", Unit::Count, "Access tokens revoked");
    describe_counter!("auth_tokens_purged_total", Unit::Count, "Dead token records deleted");
    describe_gauge!("auth_tokens_active", Unit::Count, "Access tokens currently active");

    for outcome in ["success", "user_not_found", "password_mismatch", "invalid_request"] {
        counter!("auth_logins_total", "outcome" => outcome).absolute(0);
    }

    for status in
        ["success", "missing_bearer", "malformed", "not_found", "inactive", "expired", "error"]
    {
        counter!("auth_authentications_total", "status" => status).absolute(0);
    }

    counter!("auth_tokens_issued_total").absolute(0);
    counter!("auth_tokens_revoked_total").absolute(0);
    counter!("auth_tokens_purged_total").absolute(0);
}

/// Record login attempt outcome
pub fn record_login(outcome: &'static str) {
    counter!("auth_logins_total", "outcome" => outcome).increment(1);
}

/// Record bearer authentication outcome
pub fn record_authentication(status: &'static str) {
    counter!("auth_authentications_total", "status" => status).increment(1);
}

pub fn record_token_issued() {
    counter!("auth_tokens_issued_total").increment(1);
}

pub fn record_token_revoked() {
    counter!("auth_tokens_revoked_total").increment(1);
}

pub fn record_tokens_purged(count: u64) {
    counter!("auth_tokens_purged_total").increment(count);
}

pub fn set_active_tokens(count: i64) {
    gauge!("auth_tokens_active").set(count as f64);
}
