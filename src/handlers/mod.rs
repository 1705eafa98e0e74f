//! handlers/mod.rs
//! Handlers HTTP de mantenimiento: órdenes, checklist, firmas y equipos.

pub mod checklist_handler;
pub mod equipment_handler;
pub mod maintenance_handler;
pub mod signature_handler;

use actix_web::HttpResponse;

use crate::services::errors::ServiceError;

/// Traduce un error de servicio al cuerpo `{success: false, error}` con su
/// código HTTP.
pub(crate) fn error_response(err: &ServiceError) -> HttpResponse {
    let body = serde_json::json!({
        "success": false,
        "error": err.to_string(),
    });
    match err {
        ServiceError::Validation(_) => HttpResponse::BadRequest().json(body),
        ServiceError::NotFound(_) => HttpResponse::NotFound().json(body),
        ServiceError::Conflict(_) => HttpResponse::Conflict().json(body),
        ServiceError::Rule(_) => HttpResponse::UnprocessableEntity().json(body),
        ServiceError::Database(e) => {
            log::error!("Error de base de datos: {:?}", e);
            HttpResponse::InternalServerError().json(body)
        }
        ServiceError::Internal(e) => {
            log::error!("Error interno: {:?}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}
