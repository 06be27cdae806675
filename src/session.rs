use crate::models::Session;

const DEFAULT_PASSWORD: &str = "123456";

pub fn configured_password() -> String {
    std::env::var("APP_PASSWORD").unwrap_or_else(|_| DEFAULT_PASSWORD.to_string())
}

/// Plain equality check against the shared password. No lockout, no rate
/// limit; the session never expires on its own.
pub fn login(entered: &str, configured: &str) -> Session {
    Session {
        authenticated: entered == configured,
    }
}
