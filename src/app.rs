//! app.rs
use crate::handlers::{auth_handler, health_handler, submission_handler};
use actix_web::{http::Method, web};

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/functions/v1")
            .service(
                web::resource("/submit-contact")
                    .route(web::post().to(submission_handler::submit_contact_endpoint))
                    .route(web::method(Method::OPTIONS).to(submission_handler::preflight_endpoint)),
            )
            .service(
                web::resource("/submit-tour")
                    .route(web::post().to(submission_handler::submit_tour_endpoint))
                    .route(web::method(Method::OPTIONS).to(submission_handler::preflight_endpoint)),
            ),
    )
    .service(
        web::scope("/api")
            .route("/auth", web::get().to(auth_handler::auth_endpoint))
            .route("/health", web::get().to(health_handler::health_endpoint)),
    )
    // Sitio estático (si SITE_DIR está configurado) detrás de Basic Auth
    .default_service(web::to(auth_handler::serve_site_endpoint));
}
