/// HTTP middleware
///
/// - `security`: hardening response headers
/// - `auth`: bearer-token and session-cookie authentication

pub mod auth;
pub mod security;
