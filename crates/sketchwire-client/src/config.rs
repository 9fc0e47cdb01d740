//! Client configuration.

/// Environment variable naming the relay hub endpoint.
pub const ENDPOINT_ENV: &str = "SKETCHWIRE_SERVER";

/// Fallback endpoint for local development.
pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:3001/ws";

/// The relay endpoint to dial: `SKETCHWIRE_SERVER` if set and non-empty,
/// the local default otherwise.
pub fn relay_endpoint() -> String {
    match std::env::var(ENDPOINT_ENV) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => DEFAULT_ENDPOINT.to_string(),
    }
}
