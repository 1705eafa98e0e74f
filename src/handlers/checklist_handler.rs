//! handlers/checklist_handler.rs
use actix_web::{web, HttpResponse};

use crate::handlers::error_response;
use crate::models::checklist_model::ChecklistItemRequest;
use crate::models::maintenance_model::MutationResponse;
use crate::services::checklist_service::ChecklistService;

/// POST /api/maintenance/checklist-item
pub async fn save_checklist_item_endpoint(
    checklist_service: web::Data<ChecklistService>,
    body: web::Json<ChecklistItemRequest>,
) -> HttpResponse {
    match checklist_service.save_item(body.into_inner()).await {
        Ok(record) => HttpResponse::Ok().json(MutationResponse {
            success: true,
            record,
        }),
        Err(e) => error_response(&e),
    }
}
