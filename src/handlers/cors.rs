//! handlers/cors.rs
//! Headers CORS de los endpoints de formularios.

use actix_web::{
    http::header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
        ORIGIN, VARY,
    },
    HttpRequest, HttpResponseBuilder,
};

const ALLOW_METHODS: &str = "POST,OPTIONS";
const ALLOW_HEADERS: &str = "content-type, authorization, x-client-info, apikey";

/// Origin exacto de la lista, si no el primero configurado, si no "*".
pub fn resolve_allow_origin(request_origin: Option<&str>, allowed: &[String]) -> String {
    if let Some(origin) = request_origin {
        if allowed.iter().any(|a| a == origin) {
            return origin.to_string();
        }
    }
    allowed.first().cloned().unwrap_or_else(|| "*".to_string())
}

pub fn request_origin(req: &HttpRequest) -> Option<&str> {
    req.headers().get(ORIGIN).and_then(|v| v.to_str().ok())
}

pub fn apply_cors(builder: &mut HttpResponseBuilder, req: &HttpRequest, allowed: &[String]) {
    builder
        .insert_header((
            ACCESS_CONTROL_ALLOW_ORIGIN,
            resolve_allow_origin(request_origin(req), allowed),
        ))
        .insert_header((ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS))
        .insert_header((ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS))
        .insert_header((VARY, "Origin"));
}
