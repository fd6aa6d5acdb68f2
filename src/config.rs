//! Environment-variable configuration.
//!
//! Two knobs, both read on demand rather than cached: the bind port and
//! the deployment environment that gates 500-response detail.

/// Deployment environment from `APP_ENV`; defaults to "development".
pub fn environment() -> String {
    std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string())
}

/// Whether the server runs in production mode. Internal error detail is
/// suppressed when this is true.
pub fn is_production() -> bool {
    environment() == "production"
}

/// TCP port from `PORT`; defaults to 3000.
pub fn port() -> String {
    std::env::var("PORT").unwrap_or_else(|_| "3000".to_string())
}
