//! handlers/submission_handler.rs
//! POST/OPTIONS de submit-contact y submit-tour.

use actix_web::{web, HttpRequest, HttpResponse};

use crate::{
    config::app_config::AppConfig,
    handlers::cors::{apply_cors, request_origin},
    models::submission_model::{debug_requested, ErrorResponse, SubmissionKind},
    services::submission_service::SubmissionService,
};

/// POST /functions/v1/submit-contact
pub async fn submit_contact_endpoint(
    req: HttpRequest,
    body: web::Bytes,
    service: web::Data<SubmissionService>,
    config: web::Data<AppConfig>,
) -> HttpResponse {
    handle_submission(SubmissionKind::Contact, req, body, service, config).await
}

/// POST /functions/v1/submit-tour
pub async fn submit_tour_endpoint(
    req: HttpRequest,
    body: web::Bytes,
    service: web::Data<SubmissionService>,
    config: web::Data<AppConfig>,
) -> HttpResponse {
    handle_submission(SubmissionKind::Tour, req, body, service, config).await
}

/// OPTIONS (preflight): 200 vacío con los mismos headers.
pub async fn preflight_endpoint(req: HttpRequest, config: web::Data<AppConfig>) -> HttpResponse {
    let mut builder = HttpResponse::Ok();
    apply_cors(&mut builder, &req, &config.allowed_origins);
    builder.finish()
}

async fn handle_submission(
    kind: SubmissionKind,
    req: HttpRequest,
    body: web::Bytes,
    service: web::Data<SubmissionService>,
    config: web::Data<AppConfig>,
) -> HttpResponse {
    let origin = request_origin(&req);
    // claves repetidas: vale la primera
    let debug = debug_requested(req.query_string());

    match service.submit(kind, &body, origin, debug).await {
        Ok(resp) => {
            let mut builder = HttpResponse::Ok();
            apply_cors(&mut builder, &req, &config.allowed_origins);
            builder.json(resp)
        }
        Err(e) => {
            log::info!("(submit_{}) Rechazado: {}", kind.as_str(), e);
            let mut builder = HttpResponse::build(e.status_code());
            apply_cors(&mut builder, &req, &config.allowed_origins);
            builder.json(ErrorResponse {
                error: e.to_string(),
            })
        }
    }
}
