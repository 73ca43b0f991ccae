//! Cookie helper for the platform admin session.
//!
//! The session token travels only in an httpOnly cookie so browser scripts
//! never see it.

use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};
use domain::services::IssuedSession;

/// Name of the platform admin session cookie.
pub const ADMIN_SESSION_COOKIE: &str = "admin_session";

/// Builds and reads the admin session cookie.
#[derive(Debug, Clone, Copy)]
pub struct SessionCookies {
    secure: bool,
}

impl SessionCookies {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Set-Cookie value carrying a freshly issued session.
    pub fn session_cookie(&self, session: &IssuedSession) -> String {
        self.build(&session.token, session.max_age_secs)
    }

    /// Set-Cookie value that makes the browser drop the session.
    pub fn clearing_cookie(&self) -> String {
        self.build("", 0)
    }

    /// Appends a Set-Cookie header, skipping values that are not valid header text.
    pub fn append(headers: &mut HeaderMap, cookie: &str) {
        if let Ok(value) = HeaderValue::from_str(cookie) {
            headers.append(SET_COOKIE, value);
        }
    }

    /// Extracts the session token from request headers.
    pub fn extract_session(headers: &HeaderMap) -> Option<&str> {
        extract_cookie(headers, ADMIN_SESSION_COOKIE)
    }

    fn build(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
            ADMIN_SESSION_COOKIE, value, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Extract a cookie value from request headers by name.
pub fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookie_header| cookie_header.split(';'))
        .map(str::trim)
        .find_map(|cookie| {
            let (cookie_name, cookie_value) = cookie.split_once('=')?;
            (cookie_name == name).then_some(cookie_value)
        })
}
