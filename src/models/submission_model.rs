//! models/submission_model.rs
//! Payloads de los formularios (contacto y visita) y respuestas del endpoint.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::notification_model::{ChannelReadiness, NotificationOutcome};

/// Campo oculto del formulario; los humanos nunca lo llenan.
pub const HONEYPOT_FIELD: &str = "website";
pub const CAPTCHA_TOKEN_FIELD: &str = "captchaToken";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    Contact,
    Tour,
}

impl SubmissionKind {
    /// Campos obligatorios, en el orden en que se validan.
    pub fn required_fields(&self, strict_contact: bool) -> Vec<&'static str> {
        match self {
            SubmissionKind::Contact if strict_contact => vec![
                "name",
                "email",
                "phone",
                "preferredContact",
                "preferredTime",
            ],
            SubmissionKind::Contact => vec!["name", "email", "phone"],
            SubmissionKind::Tour => vec!["firstName", "lastName", "email", "phone"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionKind::Contact => "contact",
            SubmissionKind::Tour => "tour",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
    pub preferred_contact: Option<String>,
    pub preferred_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TourSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub tour_type: Option<String>,
    pub location: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub relationship: Option<String>,
    pub current_situation: Option<String>,
    pub timeline: Option<String>,
    pub special_needs: Option<String>,
    pub hear_about_us: Option<String>,
    pub marketing_consent: bool,
}

/// Submission ya validada.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Contact(ContactSubmission),
    Tour(TourSubmission),
}

impl Submission {
    /// Construye la submission desde el body. Se asume que los campos
    /// obligatorios ya fueron validados.
    pub fn from_body(kind: SubmissionKind, body: &Map<String, Value>) -> Self {
        let text = |key: &str| field_text(body, key);
        let required = |key: &str| field_text(body, key).unwrap_or_default();

        match kind {
            SubmissionKind::Contact => Submission::Contact(ContactSubmission {
                name: required("name"),
                email: required("email"),
                phone: required("phone"),
                message: text("message"),
                preferred_contact: text("preferredContact"),
                preferred_time: text("preferredTime"),
            }),
            SubmissionKind::Tour => Submission::Tour(TourSubmission {
                first_name: required("firstName"),
                last_name: required("lastName"),
                email: required("email"),
                phone: required("phone"),
                tour_type: text("tourType"),
                location: text("location"),
                preferred_date: text("preferredDate"),
                preferred_time: text("preferredTime"),
                relationship: text("relationship"),
                current_situation: text("currentSituation"),
                timeline: text("timeline"),
                special_needs: text("specialNeeds"),
                hear_about_us: text("hearAboutUs"),
                marketing_consent: is_truthy(body.get("marketingConsent")),
            }),
        }
    }

    pub fn submitter_email(&self) -> &str {
        match self {
            Submission::Contact(c) => &c.email,
            Submission::Tour(t) => &t.email,
        }
    }
}

/// Texto de un campo: strings recortados y no vacíos; números, `true`,
/// arrays y objetos se convierten a texto. Ausente, null, false y strings en
/// blanco cuentan como faltantes.
pub fn field_text(body: &Map<String, Value>, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        value @ (Value::Array(_) | Value::Object(_)) => Some(value.to_string()),
        Value::Null | Value::Bool(false) => None,
    }
}

/// Verdad "al estilo formulario": cualquier valor no vacío cuenta.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// `?debug=1` activa el modo debug. Si la clave se repite, vale la primera;
/// una query mal formada nunca es un error.
pub fn debug_requested(query_string: &str) -> bool {
    query_string
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| *key == "debug")
        .map(|(_, value)| urlencoding::decode(value).map(|v| v == "1").unwrap_or(false))
        .unwrap_or(false)
}

/// `{ ok: true }`, con `notify`, `confirm` y `env` sólo en modo debug.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify: Option<NotificationOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm: Option<NotificationOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<ChannelReadiness>,
}

impl SubmitResponse {
    pub fn accepted() -> Self {
        SubmitResponse {
            ok: true,
            notify: None,
            confirm: None,
            env: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn debug_takes_first_value() {
        assert!(debug_requested("debug=1"));
        assert!(debug_requested("debug=1&debug=1"));
        assert!(debug_requested("x=2&debug=1&debug=0"));
        assert!(!debug_requested("debug=0&debug=1"));
        assert!(!debug_requested("debug"));
        assert!(!debug_requested(""));
        assert!(!debug_requested("debugging=1"));
    }

    #[test]
    fn arrays_and_objects_count_as_present() {
        let body = json!({
            "name": ["Jane"],
            "email": {"primary": "jane@example.com"},
            "phone": false,
            "message": "   ",
        });
        let body = body.as_object().unwrap();
        assert_eq!(field_text(body, "name").as_deref(), Some(r#"["Jane"]"#));
        assert!(field_text(body, "email").is_some());
        assert!(field_text(body, "phone").is_none());
        assert!(field_text(body, "message").is_none());
        assert!(field_text(body, "missing").is_none());
    }
}
