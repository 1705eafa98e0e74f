//! handlers/equipment_handler.rs
use actix_web::{web, HttpResponse};

use crate::handlers::error_response;
use crate::services::equipment_service::EquipmentService;

/// GET /api/equipment/{id}/history
pub async fn equipment_history_endpoint(
    equipment_service: web::Data<EquipmentService>,
    path: web::Path<String>,
) -> HttpResponse {
    let equipment_id = path.into_inner();

    match equipment_service.history(&equipment_id).await {
        Ok(history) => HttpResponse::Ok().json(history),
        Err(e) => error_response(&e),
    }
}
