//! config/app_config.rs
//! Configuración global del servicio, leída una sola vez del entorno (.env incluido).

#[cfg(test)]
use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_SITE_NAME: &str = "A Place Called Home";
pub const DEFAULT_GMAIL_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_GMAIL_SEND_URL: &str =
    "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";
pub const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com/emails";
pub const DEFAULT_HCAPTCHA_VERIFY_URL: &str = "https://hcaptcha.com/siteverify";

/// Credenciales OAuth para la API de Gmail.
#[derive(Debug, Clone)]
pub struct GmailCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// Todo lo que necesita el fan-out de notificaciones.
/// Un canal sólo existe si su juego completo de credenciales está presente.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub site_name: String,
    pub email_from: Option<String>,
    pub notify_emails: Vec<String>,
    pub always_bcc: Vec<String>,
    pub gmail: Option<GmailCredentials>,
    pub gmail_token_url: String,
    pub gmail_send_url: String,
    pub resend_api_key: Option<String>,
    pub resend_api_url: String,
    pub slack_webhook_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CaptchaConfig {
    pub secret: Option<String>,
    pub verify_url: String,
    /// Origins (match exacto) que no necesitan captcha, p.ej. http://localhost:5173
    pub bypass_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct BasicAuthCredentials {
    pub user: String,
    pub pass: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub database_url: String,
    pub allowed_origins: Vec<String>,
    pub contact_strict_fields: bool,
    pub captcha: CaptchaConfig,
    pub notify: NotifyConfig,
    pub basic_auth: Option<BasicAuthCredentials>,
    pub site_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Lee la config desde las variables de entorno del proceso.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Igual que `from_env`, pero con un mapa.
    #[cfg(test)]
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Valores vacíos cuentan como "no configurado"
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT inválido: {raw}"))?,
            None => 5022,
        };

        let allowed_origins = get("ALLOWED_ORIGINS")
            .or_else(|| get("ALLOWED_ORIGIN"))
            .map(|raw| split_list(&raw))
            .unwrap_or_default();

        let gmail = match (
            get("GMAIL_CLIENT_ID"),
            get("GMAIL_CLIENT_SECRET"),
            get("GMAIL_REFRESH_TOKEN"),
        ) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => Some(GmailCredentials {
                client_id,
                client_secret,
                refresh_token,
            }),
            _ => None,
        };

        let basic_auth = match (get("BASIC_AUTH_USER"), get("BASIC_AUTH_PASS")) {
            (Some(user), Some(pass)) => Some(BasicAuthCredentials { user, pass }),
            _ => None,
        };

        Ok(AppConfig {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url: get("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:./data/forms.db".to_string()),
            allowed_origins,
            contact_strict_fields: get("CONTACT_STRICT_FIELDS")
                .map(|v| is_truthy_flag(&v))
                .unwrap_or(false),
            captcha: CaptchaConfig {
                secret: get("HCAPTCHA_SECRET"),
                verify_url: get("HCAPTCHA_VERIFY_URL")
                    .unwrap_or_else(|| DEFAULT_HCAPTCHA_VERIFY_URL.to_string()),
                bypass_origins: get("CAPTCHA_BYPASS_ORIGINS")
                    .map(|raw| split_list(&raw))
                    .unwrap_or_default(),
            },
            notify: NotifyConfig {
                site_name: get("SITE_NAME").unwrap_or_else(|| DEFAULT_SITE_NAME.to_string()),
                email_from: get("EMAIL_FROM"),
                notify_emails: get("NOTIFY_EMAILS")
                    .map(|raw| split_list(&raw))
                    .unwrap_or_default(),
                always_bcc: get("ALWAYS_BCC_EMAILS")
                    .map(|raw| split_list(&raw))
                    .unwrap_or_default(),
                gmail,
                gmail_token_url: get("GMAIL_TOKEN_URL")
                    .unwrap_or_else(|| DEFAULT_GMAIL_TOKEN_URL.to_string()),
                gmail_send_url: get("GMAIL_SEND_URL")
                    .unwrap_or_else(|| DEFAULT_GMAIL_SEND_URL.to_string()),
                resend_api_key: get("RESEND_API_KEY"),
                resend_api_url: get("RESEND_API_URL")
                    .unwrap_or_else(|| DEFAULT_RESEND_API_URL.to_string()),
                slack_webhook_url: get("SLACK_WEBHOOK_URL"),
            },
            basic_auth,
            site_dir: get("SITE_DIR").map(PathBuf::from),
        })
    }
}

/// "a@x.com, b@x.com,," -> ["a@x.com", "b@x.com"]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn is_truthy_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
