//! services/mod.rs
//! Módulo que agrupa los servicios (capa de negocio) del servidor de
//! mantenimiento.

pub mod checklist_service;
pub mod completion_service;
pub mod equipment_service;
pub mod errors;
pub mod maintenance_service;
pub mod signature_service;
