//! handlers/auth_handler.rs
//! Basic Auth del sitio y archivos estáticos detrás de esa puerta.

use std::path::{Path, PathBuf};

use actix_files::NamedFile;
use actix_web::{
    http::{
        header::{AUTHORIZATION, LOCATION, WWW_AUTHENTICATE},
        Method,
    },
    web, HttpRequest, HttpResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    config::app_config::AppConfig,
    services::site_auth_service::{
        sanitize_redirect, AuthDecision, SiteAuthService, AUTH_CHALLENGE, AUTH_COOKIE_NAME,
    },
};

#[derive(Deserialize)]
pub struct AuthQuery {
    redirect: Option<String>,
}

fn authorization_header(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header((WWW_AUTHENTICATE, AUTH_CHALLENGE))
        .body("Authentication required")
}

/// GET /api/auth?redirect=/ruta
pub async fn auth_endpoint(
    req: HttpRequest,
    query: web::Query<AuthQuery>,
    auth: web::Data<SiteAuthService>,
) -> HttpResponse {
    match auth.check_header(authorization_header(&req)) {
        AuthDecision::Disabled => HttpResponse::Ok().json(json!({
            "status": "disabled",
            "message": "Basic authentication not configured. Set BASIC_AUTH_USER and BASIC_AUTH_PASS to enable it."
        })),
        AuthDecision::Denied => unauthorized(),
        AuthDecision::Granted => {
            let target = sanitize_redirect(query.redirect.as_deref());
            log::info!("(auth) Acceso concedido, redirigiendo a {}", target);
            HttpResponse::Found()
                .cookie(auth.session_cookie())
                .insert_header((LOCATION, target))
                .finish()
        }
    }
}

/// Todo lo demás: archivos del sitio (SITE_DIR), con la puerta de Basic Auth.
pub async fn serve_site_endpoint(
    req: HttpRequest,
    auth: web::Data<SiteAuthService>,
    config: web::Data<AppConfig>,
) -> HttpResponse {
    let Some(site_dir) = &config.site_dir else {
        return HttpResponse::NotFound().finish();
    };

    if *req.method() != Method::GET && *req.method() != Method::HEAD {
        return HttpResponse::MethodNotAllowed().finish();
    }

    if auth.is_enabled() {
        let has_cookie = req
            .cookie(AUTH_COOKIE_NAME)
            .map(|c| SiteAuthService::has_session(Some(c.value())))
            .unwrap_or(false);
        let header_ok = auth.check_header(authorization_header(&req)) == AuthDecision::Granted;

        if !has_cookie && !header_ok {
            let target = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            return HttpResponse::Found()
                .insert_header((
                    LOCATION,
                    format!("/api/auth?redirect={}", urlencoding::encode(target)),
                ))
                .finish();
        }
    }

    let Some(path) = resolve_site_path(site_dir, req.path()) else {
        return HttpResponse::NotFound().finish();
    };

    match NamedFile::open_async(&path).await {
        Ok(file) => file.into_response(&req),
        // SPA: rutas desconocidas caen en index.html
        Err(_) => match NamedFile::open_async(site_dir.join("index.html")).await {
            Ok(file) => file.into_response(&req),
            Err(_) => HttpResponse::NotFound().finish(),
        },
    }
}

/// Ruta dentro de `site_dir`; `None` si intenta salir con "..".
fn resolve_site_path(site_dir: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    if relative.split('/').any(|seg| seg == "..") {
        return None;
    }

    let path = site_dir.join(relative);
    if relative.is_empty() || path.is_dir() {
        return Some(path.join("index.html"));
    }
    Some(path)
}
