use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::config::app_config::AppConfig;

fn presence(configured: bool) -> &'static str {
    if configured {
        "configured"
    } else {
        "not set"
    }
}

/// GET /api/health
pub async fn health_endpoint(config: web::Data<AppConfig>) -> HttpResponse {
    let notify = &config.notify;
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": {
            "HCAPTCHA_SECRET": presence(config.captcha.secret.is_some()),
            "EMAIL_FROM": presence(notify.email_from.is_some()),
            "NOTIFY_EMAILS": presence(!notify.notify_emails.is_empty()),
            "GMAIL": presence(notify.gmail.is_some()),
            "RESEND_API_KEY": presence(notify.resend_api_key.is_some()),
            "SLACK_WEBHOOK_URL": presence(notify.slack_webhook_url.is_some()),
            "BASIC_AUTH": presence(config.basic_auth.is_some()),
            "SITE_DIR": presence(config.site_dir.is_some()),
        },
        "message": format!("{} API is running successfully", notify.site_name),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
