//! tests/support.rs
//! Utilidades compartidas por las pruebas: DB en memoria, canales falsos y
//! un servidor HTTP local que hace de Gmail/Resend/Slack/hCaptcha.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::{dev::ServerHandle, web, App, HttpRequest, HttpResponse, HttpServer};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use tokio::sync::Semaphore;

use crate::{
    config::app_config::AppConfig,
    models::notification_model::OutboundMessage,
    services::{
        captcha_service::CaptchaVerifier,
        notification_channel_service::NotificationChannel,
        notification_service::NotificationService,
        submission_record_service::SubmissionRecordService,
        submission_service::SubmissionService,
    },
};

// ============================================================================
// Config y DB
// ============================================================================

pub fn config_with(vars: &[(&str, &str)]) -> AppConfig {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_map(&map).expect("config de prueba inválida")
}

/// Una sola conexión que nunca se recicla; si no, cada conexión tendría su
/// propia base en memoria.
pub async fn memory_pool() -> Pool<Sqlite> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("No se pudo abrir SQLite en memoria")
}

pub async fn migrated_records(pool: Pool<Sqlite>) -> SubmissionRecordService {
    let records = SubmissionRecordService::new(pool);
    records
        .run_migrations()
        .await
        .expect("Fallo en migraciones de prueba");
    records
}

pub struct TestHarness {
    pub pool: Pool<Sqlite>,
    pub records: SubmissionRecordService,
    pub service: SubmissionService,
}

pub async fn harness(
    config: &AppConfig,
    channels: Vec<Arc<dyn NotificationChannel>>,
    captcha: Option<Arc<dyn CaptchaVerifier>>,
) -> TestHarness {
    let pool = memory_pool().await;
    let records = migrated_records(pool.clone()).await;
    let notifications = NotificationService::with_channels(
        channels,
        config.notify.notify_emails.clone(),
        config.notify.always_bcc.clone(),
    );
    let service = SubmissionService::new(config, records.clone(), notifications, captcha);
    TestHarness {
        pool,
        records,
        service,
    }
}

// ============================================================================
// Canales falsos
// ============================================================================

/// Guarda lo que "envía"; si `fail` está activo, simula un error de red.
pub struct FakeChannel {
    name: &'static str,
    mail: bool,
    fail: bool,
    sent: Mutex<Vec<OutboundMessage>>,
}

impl FakeChannel {
    pub fn ok(name: &'static str, mail: bool) -> Arc<Self> {
        Arc::new(Self {
            name,
            mail,
            fail: false,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(name: &'static str, mail: bool) -> Arc<Self> {
        Arc::new(Self {
            name,
            mail,
            fail: true,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationChannel for FakeChannel {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_mail(&self) -> bool {
        self.mail
    }

    async fn deliver(&self, msg: &OutboundMessage) -> Result<()> {
        self.sent.lock().unwrap().push(msg.clone());
        if self.fail {
            return Err(anyhow!("simulated network error"));
        }
        Ok(())
    }
}

pub struct PanickingChannel;

#[async_trait]
impl NotificationChannel for PanickingChannel {
    fn name(&self) -> &'static str {
        "panicky"
    }

    fn is_mail(&self) -> bool {
        false
    }

    async fn deliver(&self, _msg: &OutboundMessage) -> Result<()> {
        panic!("channel blew up");
    }
}

/// No entrega nada hasta que se abre la compuerta.
pub struct GatedChannel {
    gate: Semaphore,
    delivered: AtomicUsize,
}

impl GatedChannel {
    pub fn closed() -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
            delivered: AtomicUsize::new(0),
        })
    }

    pub fn open(&self) {
        self.gate.add_permits(100);
    }

    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationChannel for GatedChannel {
    fn name(&self) -> &'static str {
        "slack"
    }

    fn is_mail(&self) -> bool {
        false
    }

    async fn deliver(&self, _msg: &OutboundMessage) -> Result<()> {
        let _permit = self.gate.acquire().await?;
        self.delivered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeCaptcha {
    accept: bool,
    calls: AtomicUsize,
}

impl FakeCaptcha {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self {
            accept: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn rejecting() -> Arc<Self> {
        Arc::new(Self {
            accept: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptchaVerifier for FakeCaptcha {
    async fn verify(&self, _token: &str) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.accept)
    }
}

// ============================================================================
// Servidor upstream falso
// ============================================================================

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Default)]
pub struct UpstreamLog {
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Rutas:
/// - `/token`        -> access token válido
/// - `/token-empty`  -> 200 sin access_token
/// - `/siteverify`   -> success sólo si el token es `good-token`
/// - `/fail`         -> 500
/// - cualquier otra  -> 200 `{"id": "msg-1"}`
pub struct FakeUpstream {
    pub base_url: String,
    log: Arc<UpstreamLog>,
    handle: ServerHandle,
}

async fn upstream_handler(
    req: HttpRequest,
    body: web::Bytes,
    log: web::Data<UpstreamLog>,
) -> HttpResponse {
    let body = String::from_utf8_lossy(&body).to_string();
    log.requests.lock().unwrap().push(RecordedRequest {
        path: req.path().to_string(),
        authorization: req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string()),
        body: body.clone(),
    });

    match req.path() {
        "/token" => HttpResponse::Ok().json(json!({
            "access_token": "ya29.test-token",
            "expires_in": 3599,
            "token_type": "Bearer"
        })),
        "/token-empty" => HttpResponse::Ok().json(json!({ "error": "invalid_grant" })),
        "/siteverify" => HttpResponse::Ok().json(json!({
            "success": body.contains("response=good-token")
        })),
        "/fail" => HttpResponse::InternalServerError().body("boom"),
        _ => HttpResponse::Ok().json(json!({ "id": "msg-1" })),
    }
}

impl FakeUpstream {
    pub async fn start() -> Self {
        let log = web::Data::new(UpstreamLog::default());
        let data = log.clone();

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("local_addr").port();

        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .default_service(web::to(upstream_handler))
        })
        .workers(1)
        .listen(listener)
        .expect("listen")
        .run();

        let handle = server.handle();
        actix_rt::spawn(server);

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            log: log.into_inner(),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.log
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

/// Puerto cerrado: la conexión falla de inmediato.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9/hook";
