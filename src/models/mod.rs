//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod notification_model;
#[cfg(test)]
pub mod record_model;
pub mod submission_model;
