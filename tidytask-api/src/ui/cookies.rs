/// Cookie helpers for the HTML front end
///
/// Two cookies are used, both `HttpOnly; SameSite=Lax; Path=/` and `Secure`
/// in production:
///
/// - `tidytask_session`: the access token of the logged-in user
/// - `tidytask_flash`: a one-shot status message shown after a redirect

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration;

pub const SESSION_COOKIE: &str = "tidytask_session";
pub const FLASH_COOKIE: &str = "tidytask_flash";

/// Returns the value of cookie `name` from the request's `Cookie` headers
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(name)
        .map(|cookie| cookie.value().to_string())
}

/// Cookie storing `value` for `max_age_seconds` (browser session when `None`)
pub fn set_cookie(
    name: &'static str,
    value: impl Into<String>,
    max_age_seconds: Option<i64>,
    secure: bool,
) -> Cookie<'static> {
    let mut builder = Cookie::build((name, value.into()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure);
    if let Some(seconds) = max_age_seconds {
        builder = builder.max_age(Duration::seconds(seconds));
    }
    builder.build()
}

/// Cookie that deletes cookie `name`
pub fn clear_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    set_cookie(name, "", Some(0), secure)
}
