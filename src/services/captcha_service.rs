//! services/captcha_service.rs
//! Verificación de tokens hCaptcha.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// `Ok(true)` si el servicio externo acepta el token.
    async fn verify(&self, token: &str) -> Result<bool>;
}

#[derive(Deserialize)]
struct SiteVerifyResponse {
    #[serde(default)]
    success: bool,
}

pub struct HcaptchaVerifier {
    http_client: Client,
    secret: String,
    verify_url: String,
}

impl HcaptchaVerifier {
    pub fn new(http_client: Client, secret: String, verify_url: String) -> Self {
        Self {
            http_client,
            secret,
            verify_url,
        }
    }
}

#[async_trait]
impl CaptchaVerifier for HcaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<bool> {
        let params = [("secret", self.secret.as_str()), ("response", token)];

        let resp = self
            .http_client
            .post(&self.verify_url)
            .form(&params)
            .send()
            .await
            .context("(captcha) Fallo al llamar siteverify")?;

        if !resp.status().is_success() {
            return Err(anyhow!("siteverify respondió {}", resp.status()));
        }

        let body: SiteVerifyResponse = resp
            .json()
            .await
            .context("(captcha) Respuesta de siteverify inválida")?;
        Ok(body.success)
    }
}
