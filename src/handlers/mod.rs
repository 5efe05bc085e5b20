//! handlers/mod.rs
//! Módulo que agrupa los handlers HTTP (formularios, auth del sitio, health).

pub mod auth_handler;
pub mod cors;
pub mod health_handler;
pub mod submission_handler;
