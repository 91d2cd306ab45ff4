/// Server-rendered HTML front end
///
/// The pages call the same service operations as the JSON API; only the
/// response differs. Reads render a Tera template, form submissions answer
/// `303 See Other` with a flash message.
///
/// - `cookies`: session and flash cookie plumbing
/// - `flash`: one-shot status messages and the redirect response
/// - `templates`: embedded Tera templates
/// - `views`: display models handed to templates
/// - `pages`: dashboard, task and category forms
/// - `account`: login, registration and logout

pub mod account;
pub mod cookies;
pub mod flash;
pub mod pages;
pub mod templates;
pub mod views;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tera::Context;

use crate::{app::AppState, error::ApiError};
use flash::{consume_flash, Flash};

/// Renders template `name` for `username`, showing and clearing any pending flash
pub fn render_page(
    state: &AppState,
    headers: &HeaderMap,
    username: &str,
    name: &str,
    mut context: Context,
) -> Response {
    let flash = Flash::from_headers(headers);
    context.insert("username", username);
    context.insert("flash", &flash);

    match templates::render(&state.templates, name, &context) {
        Ok(html) => {
            if flash.is_some() {
                return (consume_flash(state.secure_cookies()), Html(html)).into_response();
            }
            Html(html).into_response()
        }
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred").into_response(),
    }
}

/// Renders the error page for a failed read
pub fn error_page(state: &AppState, headers: &HeaderMap, username: &str, err: ApiError) -> Response {
    if let ApiError::InternalError(ref msg) = err {
        tracing::error!(error = %msg, "Internal error");
    }

    let status = err.status();
    let mut context = Context::new();
    context.insert("status", &status.as_u16());
    context.insert("message", &err.public_message());

    let mut response = render_page(state, headers, username, "error.html", context);
    *response.status_mut() = status;
    response
}

/// Flash message for a failed form submission
pub fn failure_flash(err: impl Into<ApiError>) -> Flash {
    let err = err.into();
    if let ApiError::InternalError(ref msg) = err {
        tracing::error!(error = %msg, "Internal error");
    }
    Flash::danger(err.public_message())
}
