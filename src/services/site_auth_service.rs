//! services/site_auth_service.rs
//! Basic Auth para todo el sitio + cookie de sesión.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::config::app_config::BasicAuthCredentials;

pub const AUTH_COOKIE_NAME: &str = "site_auth";
pub const AUTH_CHALLENGE: &str = "Basic realm=\"Protected\", charset=\"UTF-8\"";
const AUTH_COOKIE_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    /// No hay usuario/clave configurados: el sitio queda abierto.
    Disabled,
    Granted,
    Denied,
}

#[derive(Debug, Clone)]
pub struct SiteAuthService {
    credentials: Option<BasicAuthCredentials>,
}

impl SiteAuthService {
    pub fn new(credentials: Option<BasicAuthCredentials>) -> Self {
        Self { credentials }
    }

    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    /// Revisa el header `Authorization`.
    pub fn check_header(&self, header: Option<&str>) -> AuthDecision {
        let Some(expected) = &self.credentials else {
            return AuthDecision::Disabled;
        };

        match header.and_then(decode_basic) {
            Some((user, pass)) if user == expected.user && pass == expected.pass => {
                AuthDecision::Granted
            }
            _ => AuthDecision::Denied,
        }
    }

    /// `site_auth=1; Path=/; HttpOnly; SameSite=Lax; Max-Age=2592000; Secure`
    pub fn session_cookie(&self) -> Cookie<'static> {
        Cookie::build(AUTH_COOKIE_NAME, "1")
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(Duration::days(AUTH_COOKIE_DAYS))
            .secure(true)
            .finish()
    }

    pub fn has_session(cookie_value: Option<&str>) -> bool {
        cookie_value == Some("1")
    }
}

/// "Basic dXNlcjpwYXNz" -> ("user", "pass")
fn decode_basic(header: &str) -> Option<(String, String)> {
    let mut parts = header.splitn(2, ' ');
    let scheme = parts.next()?;
    let encoded = parts.next()?.trim();
    if scheme != "Basic" || encoded.is_empty() {
        return None;
    }

    let decoded = STANDARD.decode(encoded).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let (user, pass) = credentials.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Sólo rutas del mismo origen; cualquier otra cosa vuelve a "/".
pub fn sanitize_redirect(param: Option<&str>) -> String {
    match param {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => "/".to_string(),
    }
}
