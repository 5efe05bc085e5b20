//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod captcha_service;
pub mod email_service;
pub mod notification_channel_service;
pub mod notification_service;
pub mod site_auth_service;
pub mod submission_record_service;
pub mod submission_service;
