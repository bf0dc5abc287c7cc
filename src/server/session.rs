//! Session and flash-message cookies.

use axum::http::{HeaderMap, header};

/// Cookie holding the session token.
pub const SESSION_COOKIE: &str = "session";
/// Cookie holding one-shot messages for the next page.
pub const FLASH_COOKIE: &str = "flash";

/// Read a cookie value from request headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Extract the session token, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, SESSION_COOKIE)
}

/// `Set-Cookie` value for a session token.
pub fn session_cookie(token: &str, max_age_seconds: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}")
}

/// `Set-Cookie` value that drops a cookie.
pub fn expired_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Where a flash message belongs on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    /// Login form errors.
    Login,
    /// Registration form errors.
    Registration,
    /// Review form errors.
    Review,
    /// Logout confirmation.
    Logout,
}

impl FlashKind {
    fn as_str(self) -> &'static str {
        match self {
            FlashKind::Login => "login",
            FlashKind::Registration => "registration",
            FlashKind::Review => "review",
            FlashKind::Logout => "logout",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "login" => Some(FlashKind::Login),
            "registration" => Some(FlashKind::Registration),
            "review" => Some(FlashKind::Review),
            "logout" => Some(FlashKind::Logout),
            _ => None,
        }
    }
}

/// Messages carried across a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    /// Message category.
    pub kind: FlashKind,
    /// Messages, in order.
    pub messages: Vec<String>,
}

impl Flash {
    /// Create a flash.
    pub fn new(kind: FlashKind, messages: Vec<String>) -> Self {
        Self { kind, messages }
    }

    /// Cookie value: `kind|msg|msg`, each message percent-encoded.
    pub fn encode(&self) -> String {
        let mut value = self.kind.as_str().to_string();
        for message in &self.messages {
            value.push('|');
            value.push_str(&urlencoding::encode(message));
        }
        value
    }

    /// Parse a cookie value produced by [`Flash::encode`].
    pub fn decode(value: &str) -> Option<Self> {
        let mut parts = value.split('|');
        let kind = FlashKind::parse(parts.next()?)?;
        let messages = parts
            .filter_map(|part| urlencoding::decode(part).ok())
            .map(|message| message.into_owned())
            .collect();
        Some(Self { kind, messages })
    }

    /// `Set-Cookie` value carrying this flash.
    pub fn cookie(&self) -> String {
        format!("{FLASH_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax", self.encode())
    }

    /// Read the flash sent with a request.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        cookie_value(headers, FLASH_COOKIE).and_then(|value| Self::decode(&value))
    }

    /// Messages of one kind, or nothing.
    pub fn messages_for(flash: &Option<Self>, kind: FlashKind) -> Vec<String> {
        match flash {
            Some(flash) if flash.kind == kind => flash.messages.clone(),
            _ => Vec::new(),
        }
    }
}
