//! client/mod.rs
//! Acceso remoto a los endpoints de mantenimiento.

pub mod api;
pub mod http_api;

pub use api::{ApiError, MaintenanceApi};
pub use http_api::HttpMaintenanceApi;
