use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::config::app_config::AppConfig;
use crate::logger::init_logger;
use crate::services::captcha_service::{CaptchaVerifier, HcaptchaVerifier};
use crate::services::notification_service::NotificationService;
use crate::services::site_auth_service::SiteAuthService;
use crate::services::submission_record_service::SubmissionRecordService;
use crate::services::submission_service::SubmissionService;

mod app;
mod config;
mod error;
mod handlers;
mod logger;
mod models;
mod services;
#[cfg(test)]
mod tests;

async fn setup_database(database_url: &str) -> Result<Pool<Sqlite>> {
    // Crear la carpeta del archivo .db si hace falta
    if let Some(file) = database_url.strip_prefix("sqlite:") {
        let file = file.trim_start_matches("//");
        if !file.starts_with(":memory:") {
            if let Some(parent) = Path::new(file).parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("No se pudo crear directorio {:?}", parent))?;
            }
        }
    }

    log::info!("Conectando a SQLite en {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)
        .context("DATABASE_URL inválida")?
        .create_if_missing(true);

    let db_pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .context("No se pudo conectar a la base de datos SQLite.")?;

    Ok(db_pool)
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = AppConfig::from_env().context("Configuración inválida")?;

    // Conectarnos a la DB
    let db_pool = setup_database(&config.database_url).await?;

    let record_service = SubmissionRecordService::new(db_pool.clone());
    record_service
        .run_migrations()
        .await
        .context("Fallo en migraciones de 'submissions'")?;

    let http_client = reqwest::Client::new();

    let notification_service = NotificationService::from_config(&config.notify, http_client.clone());
    log::info!("Canales listos: {:?}", notification_service.readiness());

    let captcha: Option<Arc<dyn CaptchaVerifier>> = match &config.captcha.secret {
        Some(secret) => Some(Arc::new(HcaptchaVerifier::new(
            http_client.clone(),
            secret.clone(),
            config.captcha.verify_url.clone(),
        ))),
        None => {
            log::warn!("HCAPTCHA_SECRET no configurado; no se verificará captcha.");
            None
        }
    };

    let submission_service = SubmissionService::new(
        &config,
        record_service,
        notification_service,
        captcha,
    );
    let site_auth_service = SiteAuthService::new(config.basic_auth.clone());

    let bind = (config.bind_addr.clone(), config.port);
    let config = web::Data::new(config);
    let submission_service = web::Data::new(submission_service);
    let site_auth_service = web::Data::new(site_auth_service);

    // Levantar servidor
    log::info!("Levantando servidor en {}:{}", bind.0, bind.1);
    HttpServer::new(move || {
        App::new()
            .app_data(config.clone())
            .app_data(submission_service.clone())
            .app_data(site_auth_service.clone())
            .configure(app::init_app)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
