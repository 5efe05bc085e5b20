//! services/submission_service.rs
//! Flujo de un formulario: parsear, honeypot, captcha, campos obligatorios,
//! guardar, y recién después notificar.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{
    config::app_config::AppConfig,
    error::SubmissionError,
    models::submission_model::{
        field_text, is_truthy, ContactSubmission, Submission, SubmissionKind, SubmitResponse,
        TourSubmission, CAPTCHA_TOKEN_FIELD, HONEYPOT_FIELD,
    },
    services::{
        captcha_service::CaptchaVerifier,
        notification_service::{Confirmation, NotificationDispatch, NotificationService},
        submission_record_service::SubmissionRecordService,
    },
};

#[derive(Clone)]
pub struct SubmissionService {
    records: SubmissionRecordService,
    notifications: NotificationService,
    captcha: Option<Arc<dyn CaptchaVerifier>>,
    captcha_bypass_origins: Vec<String>,
    contact_strict_fields: bool,
    site_name: String,
}

impl SubmissionService {
    /// `captcha` es `None` cuando no hay secreto configurado.
    pub fn new(
        config: &AppConfig,
        records: SubmissionRecordService,
        notifications: NotificationService,
        captcha: Option<Arc<dyn CaptchaVerifier>>,
    ) -> Self {
        Self {
            records,
            notifications,
            captcha,
            captcha_bypass_origins: config.captcha.bypass_origins.clone(),
            contact_strict_fields: config.contact_strict_fields,
            site_name: config.notify.site_name.clone(),
        }
    }

    /// Procesa un formulario. Con `debug` espera las notificaciones y las
    /// reporta; si no, las deja corriendo en segundo plano.
    pub async fn submit(
        &self,
        kind: SubmissionKind,
        raw_body: &[u8],
        origin: Option<&str>,
        debug: bool,
    ) -> Result<SubmitResponse, SubmissionError> {
        let raw = std::str::from_utf8(raw_body)
            .map_err(|_| SubmissionError::MalformedRequest("Invalid request".to_string()))?;
        let parsed: Value = serde_json::from_str(raw)
            .map_err(|e| SubmissionError::MalformedRequest(e.to_string()))?;
        let body = parsed
            .as_object()
            .ok_or_else(|| SubmissionError::MalformedRequest("Invalid request".to_string()))?;

        if is_truthy(body.get(HONEYPOT_FIELD)) {
            log::warn!("(submit) Honeypot lleno en {} desde {:?}", kind.as_str(), origin);
            return Err(SubmissionError::SpamDetected);
        }

        self.verify_captcha(body, origin).await?;

        for field in kind.required_fields(self.contact_strict_fields) {
            if field_text(body, field).is_none() {
                return Err(SubmissionError::MissingField(field));
            }
        }

        let submission = Submission::from_body(kind, body);
        let id = self.records.insert(&submission, raw).await.map_err(|e| {
            log::error!("(submit) Error guardando {}: {:?}", kind.as_str(), e);
            SubmissionError::Persistence(format!("{:#}", e))
        })?;
        log::info!("(submit) {} guardado con id={}", kind.as_str(), id);

        let dispatch = self.build_dispatch(&submission);

        if debug {
            let (notify, confirm) = self.notifications.dispatch(&dispatch).await;
            return Ok(SubmitResponse {
                ok: true,
                notify: Some(notify),
                confirm,
                env: Some(self.notifications.readiness()),
            });
        }

        self.notifications.dispatch_detached(dispatch);
        Ok(SubmitResponse::accepted())
    }

    async fn verify_captcha(
        &self,
        body: &Map<String, Value>,
        origin: Option<&str>,
    ) -> Result<(), SubmissionError> {
        let Some(verifier) = &self.captcha else {
            return Ok(());
        };

        if let Some(origin) = origin {
            if self.captcha_bypass_origins.iter().any(|o| o == origin) {
                log::info!("(captcha) Origin {} en lista local, se omite captcha", origin);
                return Ok(());
            }
        }

        let token =
            field_text(body, CAPTCHA_TOKEN_FIELD).ok_or(SubmissionError::CaptchaTokenMissing)?;

        match verifier.verify(&token).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(SubmissionError::CaptchaVerificationFailed),
            Err(e) => {
                log::warn!("(captcha) Error verificando token: {:?}", e);
                Err(SubmissionError::CaptchaVerificationFailed)
            }
        }
    }

    fn build_dispatch(&self, submission: &Submission) -> NotificationDispatch {
        match submission {
            Submission::Contact(c) => NotificationDispatch {
                admin_subject: "New Contact Submission".to_string(),
                admin_text: contact_admin_text(c),
                confirmation: Some(Confirmation {
                    to: submission.submitter_email().to_string(),
                    subject: format!("We received your message - {}", self.site_name),
                    text: contact_confirmation_text(c, &self.site_name),
                }),
            },
            Submission::Tour(t) => NotificationDispatch {
                admin_subject: "New Tour Request".to_string(),
                admin_text: tour_admin_text(t),
                confirmation: Some(Confirmation {
                    to: submission.submitter_email().to_string(),
                    subject: format!("Your tour request - {}", self.site_name),
                    text: tour_confirmation_text(t, &self.site_name),
                }),
            },
        }
    }
}

fn or_placeholder<'a>(value: &'a Option<String>, placeholder: &'a str) -> &'a str {
    value.as_deref().unwrap_or(placeholder)
}

pub fn contact_admin_text(c: &ContactSubmission) -> String {
    let mut text = format!(
        "New contact submission\n\nName: {}\nEmail: {}\nPhone: {}",
        c.name, c.email, c.phone
    );
    if let Some(pref) = &c.preferred_contact {
        text.push_str(&format!("\nPreferred contact: {pref}"));
    }
    if let Some(time) = &c.preferred_time {
        text.push_str(&format!("\nPreferred time: {time}"));
    }
    text.push_str(&format!("\nMessage: {}", or_placeholder(&c.message, "(none)")));
    text
}

pub fn tour_admin_text(t: &TourSubmission) -> String {
    let mut text = format!(
        "New tour request\n\nName: {} {}\nEmail: {}\nPhone: {}\nType: {}\nLocation: {}\nDate: {} {}",
        t.first_name,
        t.last_name,
        t.email,
        t.phone,
        or_placeholder(&t.tour_type, "(n/a)"),
        or_placeholder(&t.location, "(n/a)"),
        or_placeholder(&t.preferred_date, "(n/a)"),
        or_placeholder(&t.preferred_time, ""),
    );
    if let Some(rel) = &t.relationship {
        text.push_str(&format!("\nRelationship: {rel}"));
    }
    if let Some(timeline) = &t.timeline {
        text.push_str(&format!("\nTimeline: {timeline}"));
    }
    text
}

fn contact_confirmation_text(c: &ContactSubmission, site_name: &str) -> String {
    format!(
        "Hi {},\n\nThank you for reaching out to {}. We received your message and \
         a member of our team will contact you shortly.\n\n{}",
        c.name, site_name, site_name
    )
}

fn tour_confirmation_text(t: &TourSubmission, site_name: &str) -> String {
    let mut text = format!(
        "Hi {},\n\nThank you for requesting a tour of {}.",
        t.first_name, site_name
    );
    match (&t.preferred_date, &t.preferred_time) {
        (Some(date), Some(time)) => text.push_str(&format!(" You asked for {date} at {time}.")),
        (Some(date), None) => text.push_str(&format!(" You asked for {date}.")),
        _ => {}
    }
    text.push_str(&format!(
        " We will call you to confirm the details.\n\n{}",
        site_name
    ));
    text
}
