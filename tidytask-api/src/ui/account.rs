/// Login, registration and logout pages
///
/// A successful login stores the access token in the session cookie for the
/// token's lifetime. Registration goes through the same validation as
/// `POST /api/auth/register`.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tera::Context;
use validator::Validate;

use super::{
    cookies::{clear_cookie, set_cookie, SESSION_COOKIE},
    error_page, failure_flash,
    flash::{Flash, Redirect},
    render_page,
};
use crate::{
    app::AppState,
    error::ApiError,
    middleware::auth::{session_context, LOGIN_PATH},
    routes::auth::RegisterRequest,
};

const REGISTER_PATH: &str = "/auth/register";
const HOME_PATH: &str = "/tasks/";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// `GET /auth/login`
pub async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match session_context(&state, &headers).await {
        Ok(Some(_)) => Redirect::to(HOME_PATH, state.secure_cookies()).into_response(),
        Ok(None) => render_page(&state, &headers, "", "login.html", Context::new()),
        Err(e) => error_page(&state, &headers, "", e),
    }
}

/// `POST /auth/login`
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Redirect {
    let secure = state.secure_cookies();
    let username = form.username.trim();

    let signed_in = async {
        let user = state.accounts.authenticate(username, &form.password).await?;
        let tokens = state.accounts.issue_tokens(&user)?;
        Ok::<_, ApiError>((user, tokens))
    }
    .await;

    match signed_in {
        Ok((user, tokens)) => Redirect::to(HOME_PATH, secure)
            .with_flash(Flash::success(format!("Welcome back, {}!", user.display_name())))
            .with_cookie(set_cookie(
                SESSION_COOKIE,
                tokens.access_token,
                Some(tokens.expires_in),
                secure,
            )),
        Err(e) => Redirect::to(LOGIN_PATH, secure).with_flash(failure_flash(e)),
    }
}

/// `GET /auth/register`
pub async fn register_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    render_page(&state, &headers, "", "register.html", Context::new())
}

/// `POST /auth/register`
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterRequest>) -> Redirect {
    let secure = state.secure_cookies();

    let registered = async {
        form.validate()?;
        Ok::<_, ApiError>(state.accounts.register(form.into_registration()).await?)
    }
    .await;

    match registered {
        Ok(_) => Redirect::to(LOGIN_PATH, secure)
            .with_flash(Flash::success("Registration successful! Please log in.")),
        Err(e) => Redirect::to(REGISTER_PATH, secure).with_flash(failure_flash(e)),
    }
}

/// `POST /auth/logout`
pub async fn logout(State(state): State<AppState>) -> Redirect {
    let secure = state.secure_cookies();
    Redirect::to(LOGIN_PATH, secure)
        .with_flash(Flash::info("You have been logged out."))
        .with_cookie(clear_cookie(SESSION_COOKIE, secure))
}
