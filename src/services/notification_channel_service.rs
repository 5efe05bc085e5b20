//! services/notification_channel_service.rs
//! Canales de notificación: Gmail (OAuth), Resend (API key) y Slack (webhook).
//!
//! Cada canal sólo se construye si su configuración está completa; si falta
//! algo, `from_config` devuelve `None` y el canal simplemente no existe.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    config::app_config::{GmailCredentials, NotifyConfig},
    models::notification_model::OutboundMessage,
    services::email_service::{build_rfc822, encode_raw},
};

pub const GMAIL: &str = "gmail";
pub const RESEND: &str = "resend";
pub const SLACK: &str = "slack";

#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Nombre con el que aparece en el resultado (`gmail`, `resend`, ...).
    fn name(&self) -> &'static str;

    /// Los canales de correo necesitan destinatarios; los de chat no.
    fn is_mail(&self) -> bool;

    /// Un solo intento, sin reintentos.
    async fn deliver(&self, msg: &OutboundMessage) -> Result<()>;
}

// ============================================================================
// Gmail API
// ============================================================================

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Serialize)]
struct GmailSendPayload {
    raw: String,
}

pub struct GmailChannel {
    http_client: Client,
    credentials: GmailCredentials,
    email_from: String,
    site_name: String,
    token_url: String,
    send_url: String,
}

impl GmailChannel {
    pub fn from_config(cfg: &NotifyConfig, http_client: Client) -> Option<Self> {
        let credentials = cfg.gmail.clone()?;
        let email_from = cfg.email_from.clone()?;
        Some(Self {
            http_client,
            credentials,
            email_from,
            site_name: cfg.site_name.clone(),
            token_url: cfg.gmail_token_url.clone(),
            send_url: cfg.gmail_send_url.clone(),
        })
    }

    /// Intercambia el refresh token por un access token. Se llama antes de
    /// cada envío; el token no se guarda.
    async fn fetch_access_token(&self) -> Result<String> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", self.credentials.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let resp = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .context("(gmail) Fallo al pedir access token")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Token exchange failed {}: {}", status, body));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .context("(gmail) Respuesta de token inválida")?;

        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow!("Token response without access_token"))
    }
}

#[async_trait]
impl NotificationChannel for GmailChannel {
    fn name(&self) -> &'static str {
        GMAIL
    }

    fn is_mail(&self) -> bool {
        true
    }

    async fn deliver(&self, msg: &OutboundMessage) -> Result<()> {
        let access_token = self.fetch_access_token().await?;

        let rfc822 = build_rfc822(&self.site_name, &self.email_from, msg)?;
        let payload = GmailSendPayload {
            raw: encode_raw(&rfc822),
        };

        let resp = self
            .http_client
            .post(&self.send_url)
            .bearer_auth(access_token)
            .json(&payload)
            .send()
            .await
            .context("(gmail) Fallo al enviar mensaje")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Gmail API error {}: {}", status, body));
        }

        log::info!("(gmail) Mensaje '{}' enviado a {:?}", msg.subject, msg.to);
        Ok(())
    }
}

// ============================================================================
// Resend
// ============================================================================

#[derive(Serialize)]
struct ResendPayload<'a> {
    from: &'a str,
    to: &'a [String],
    #[serde(skip_serializing_if = "is_empty_list")]
    bcc: &'a [String],
    subject: &'a str,
    text: &'a str,
}

fn is_empty_list(list: &&[String]) -> bool {
    list.is_empty()
}

pub struct ResendChannel {
    http_client: Client,
    api_key: String,
    email_from: String,
    api_url: String,
}

impl ResendChannel {
    pub fn from_config(cfg: &NotifyConfig, http_client: Client) -> Option<Self> {
        let api_key = cfg.resend_api_key.clone()?;
        let email_from = cfg.email_from.clone()?;
        Some(Self {
            http_client,
            api_key,
            email_from,
            api_url: cfg.resend_api_url.clone(),
        })
    }
}

#[async_trait]
impl NotificationChannel for ResendChannel {
    fn name(&self) -> &'static str {
        RESEND
    }

    fn is_mail(&self) -> bool {
        true
    }

    async fn deliver(&self, msg: &OutboundMessage) -> Result<()> {
        let payload = ResendPayload {
            from: &self.email_from,
            to: &msg.to,
            bcc: &msg.bcc,
            subject: &msg.subject,
            text: &msg.text,
        };

        let resp = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("(resend) Fallo al hacer POST")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Resend API error {}: {}", status, body));
        }

        log::info!("(resend) Mensaje '{}' enviado a {:?}", msg.subject, msg.to);
        Ok(())
    }
}

// ============================================================================
// Slack
// ============================================================================

pub struct SlackChannel {
    http_client: Client,
    webhook_url: String,
}

impl SlackChannel {
    pub fn from_config(cfg: &NotifyConfig, http_client: Client) -> Option<Self> {
        let webhook_url = cfg.slack_webhook_url.clone()?;
        Some(Self {
            http_client,
            webhook_url,
        })
    }
}

#[async_trait]
impl NotificationChannel for SlackChannel {
    fn name(&self) -> &'static str {
        SLACK
    }

    fn is_mail(&self) -> bool {
        false
    }

    async fn deliver(&self, msg: &OutboundMessage) -> Result<()> {
        let payload = serde_json::json!({
            "text": format!("🟢 {}\n{}", msg.subject, msg.text)
        });

        let resp = self
            .http_client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .context("(slack) Fallo al hacer POST al webhook")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Slack webhook error {}: {}", status, body));
        }
        Ok(())
    }
}
