/// Authentication middleware
///
/// Both layers resolve a credential to an [`AuthContext`] through
/// [`AccountService::resolve_session`](tidytask_shared::service::AccountService::resolve_session)
/// and insert it into the request extensions; handlers take it with
/// `Extension<AuthContext>`. A request without a valid credential never
/// reaches the handler.
///
/// - [`bearer_auth`]: `Authorization: Bearer <token>` for `/api`, 401 JSON on failure
/// - [`session_auth`]: session cookie for the HTML pages, redirect to the login page on failure

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tidytask_shared::{auth::AuthContext, service::AccountError};

use crate::{
    app::AppState,
    error::ApiError,
    ui::{
        cookies::{clear_cookie, get_cookie, SESSION_COOKIE},
        error_page,
        flash::{Flash, Redirect},
    },
};

pub const LOGIN_PATH: &str = "/auth/login";

/// Bearer token authentication for the JSON API
pub async fn bearer_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Expected Bearer token".to_string()))?;

    let ctx = state.accounts.resolve_session(token.trim()).await?;
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}

/// Session cookie authentication for the HTML pages
///
/// A store failure renders the error page and keeps the cookie; only a
/// missing or rejected session goes back to the login page.
pub async fn session_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let secure = state.config.api.production;

    let ctx = session_context(&state, req.headers()).await;
    match ctx {
        Ok(Some(ctx)) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Ok(None) => Redirect::to(LOGIN_PATH, secure)
            .with_flash(Flash::info("Please log in to access this page."))
            .with_cookie(clear_cookie(SESSION_COOKIE, secure))
            .into_response(),
        Err(e) => error_page(&state, req.headers(), "", e),
    }
}

/// Resolves the session cookie in `headers`
///
/// `Ok(None)` when there is no cookie or the session was rejected.
///
/// # Errors
///
/// Fails when the session cannot be checked against the store.
pub async fn session_context(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<AuthContext>, ApiError> {
    let Some(token) = get_cookie(headers, SESSION_COOKIE).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    match state.accounts.resolve_session(&token).await {
        Ok(ctx) => Ok(Some(ctx)),
        Err(e @ (AccountError::Token(_) | AccountError::StaleSession | AccountError::Inactive)) => {
            tracing::debug!(error = %e, "Rejected session cookie");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}
