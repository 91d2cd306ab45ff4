/// One-shot status messages
///
/// A form action answers `303 See Other` and leaves a flash cookie behind;
/// the next page render shows the message and deletes the cookie. The
/// cookie value is `<level>.<hex(message)>` so any text survives the
/// cookie syntax.

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Serialize;

use super::cookies::{clear_cookie, get_cookie, set_cookie, FLASH_COOKIE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Danger,
    Info,
}

impl FlashLevel {
    fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Danger => "danger",
            FlashLevel::Info => "info",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "success" => Some(FlashLevel::Success),
            "danger" => Some(FlashLevel::Danger),
            "info" => Some(FlashLevel::Info),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Danger,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    pub fn encode(&self) -> String {
        format!("{}.{}", self.level.as_str(), hex::encode(self.message.as_bytes()))
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let (level, message) = raw.split_once('.')?;
        let bytes = hex::decode(message).ok()?;

        Some(Self {
            level: FlashLevel::parse(level)?,
            message: String::from_utf8(bytes).ok()?,
        })
    }

    /// Reads the pending flash from the request, if any
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        get_cookie(headers, FLASH_COOKIE)
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| Self::decode(&raw))
    }
}

/// `303 See Other` to `location`, optionally leaving a flash message
pub struct Redirect {
    location: String,
    flash: Option<Flash>,
    secure: bool,
    extra_cookies: Vec<Cookie<'static>>,
}

impl Redirect {
    pub fn to(location: impl Into<String>, secure: bool) -> Self {
        Self {
            location: location.into(),
            flash: None,
            secure,
            extra_cookies: Vec::new(),
        }
    }

    pub fn with_flash(mut self, flash: Flash) -> Self {
        self.flash = Some(flash);
        self
    }

    /// Sets another cookie along with the redirect
    pub fn with_cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.extra_cookies.push(cookie);
        self
    }
}

impl IntoResponse for Redirect {
    fn into_response(self) -> Response {
        let flash = self
            .flash
            .map(|flash| set_cookie(FLASH_COOKIE, flash.encode(), None, self.secure));
        let jar = flash
            .into_iter()
            .chain(self.extra_cookies)
            .fold(CookieJar::new(), |jar, cookie| jar.add(cookie));

        (
            StatusCode::SEE_OTHER,
            jar,
            [(header::LOCATION, self.location)],
        )
            .into_response()
    }
}

/// Deletes the flash cookie once its message was shown
pub fn consume_flash(secure: bool) -> CookieJar {
    CookieJar::new().add(clear_cookie(FLASH_COOKIE, secure))
}
