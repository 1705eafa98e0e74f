//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas entre servidor y cliente.

pub mod checklist_model;
pub mod equipment_model;
pub mod maintenance_model;
pub mod signature_model;
