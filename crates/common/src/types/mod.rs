use serde::Serialize;

/// Liveness payload returned by `GET /health`.
#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

impl Health {
    pub fn ok() -> Self {
        Self { status: "ok", database: "up", version: env!("CARGO_PKG_VERSION") }
    }

    /// Process is serving but the store did not answer a ping.
    pub fn degraded() -> Self {
        Self { status: "degraded", database: "down", version: env!("CARGO_PKG_VERSION") }
    }
}
