//! DTOs for health check endpoint.

use serde::Serialize;

/// Health check response with component status.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` when every check passed, otherwise `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub checks: HealthChecks,
}

impl HealthResponse {
    pub fn new(checks: HealthChecks) -> Self {
        let status = if checks.database.is_ok() {
            "healthy"
        } else {
            "degraded"
        };
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: CheckStatus,
}

/// Outcome of a single dependency check.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckStatus {
    pub status: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    pub latency_ms: u64,
}

impl CheckStatus {
    pub fn ok(latency_ms: u64) -> Self {
        Self {
            status: "ok",
            message: None,
            latency_ms,
        }
    }

    pub fn error(message: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            status: "error",
            message: Some(message.into()),
            latency_ms,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
