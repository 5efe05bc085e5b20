//! error.rs
//! Errores visibles para el cliente de los endpoints de formularios.

use actix_web::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Missing {0}")]
    MissingField(&'static str),

    #[error("Spam detected")]
    SpamDetected,

    #[error("Missing captcha token")]
    CaptchaTokenMissing,

    #[error("Captcha verification failed")]
    CaptchaVerificationFailed,

    #[error("{0}")]
    Persistence(String),

    #[error("{0}")]
    MalformedRequest(String),
}

impl SubmissionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SubmissionError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_what_the_site_expects() {
        assert_eq!(
            SubmissionError::MissingField("lastName").to_string(),
            "Missing lastName"
        );
        assert_eq!(SubmissionError::SpamDetected.to_string(), "Spam detected");
        assert_eq!(
            SubmissionError::CaptchaTokenMissing.to_string(),
            "Missing captcha token"
        );
        assert_eq!(
            SubmissionError::CaptchaVerificationFailed.to_string(),
            "Captcha verification failed"
        );
    }

    #[test]
    fn only_persistence_is_a_server_error() {
        assert_eq!(
            SubmissionError::Persistence("disk I/O error".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            SubmissionError::MalformedRequest("Invalid request".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SubmissionError::MissingField("email").status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
