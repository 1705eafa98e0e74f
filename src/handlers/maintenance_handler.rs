//! handlers/maintenance_handler.rs
use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::handlers::error_response;
use crate::models::equipment_model::{ConflictQuery, ConflictResponse};
use crate::models::maintenance_model::{
    AdminNotesRequest, CancelRequest, CompleteRequest, CreateMaintenanceRequest, MutationResponse,
};
use crate::services::completion_service::CompletionService;
use crate::services::equipment_service::EquipmentService;
use crate::services::maintenance_service::MaintenanceService;

/// POST /api/maintenance
pub async fn create_maintenance_endpoint(
    maintenance_service: web::Data<MaintenanceService>,
    body: web::Json<CreateMaintenanceRequest>,
) -> HttpResponse {
    let today = Utc::now().date_naive();
    match maintenance_service
        .create_record(body.into_inner(), today)
        .await
    {
        Ok(resp) => HttpResponse::Created().json(resp),
        Err(e) => error_response(&e),
    }
}

/// GET /api/maintenance/{id}
pub async fn get_maintenance_endpoint(
    completion_service: web::Data<CompletionService>,
    path: web::Path<String>,
) -> HttpResponse {
    let record_id = path.into_inner();

    match completion_service.get_detail(&record_id).await {
        Ok(detail) => HttpResponse::Ok().json(detail),
        Err(e) => error_response(&e),
    }
}

/// GET /api/maintenance/conflict?equipmentId=...&date=YYYY-MM-DD
pub async fn conflict_endpoint(
    equipment_service: web::Data<EquipmentService>,
    query: web::Query<ConflictQuery>,
) -> HttpResponse {
    let today = Utc::now().date_naive();
    let query = query.into_inner();

    match equipment_service
        .check_conflict(&query.equipment_id, query.date, today)
        .await
    {
        Ok(conflict) => HttpResponse::Ok().json(ConflictResponse { conflict }),
        Err(e) => error_response(&e),
    }
}

/// POST /api/maintenance/complete
pub async fn complete_endpoint(
    completion_service: web::Data<CompletionService>,
    body: web::Json<CompleteRequest>,
) -> HttpResponse {
    match completion_service.complete(body.into_inner()).await {
        Ok(record) => HttpResponse::Ok().json(MutationResponse {
            success: true,
            record,
        }),
        Err(e) => error_response(&e),
    }
}

/// POST /api/maintenance/admin-notes
pub async fn admin_notes_endpoint(
    maintenance_service: web::Data<MaintenanceService>,
    body: web::Json<AdminNotesRequest>,
) -> HttpResponse {
    match maintenance_service.update_admin_notes(body.into_inner()).await {
        Ok(record) => HttpResponse::Ok().json(MutationResponse {
            success: true,
            record,
        }),
        Err(e) => error_response(&e),
    }
}

/// POST /api/maintenance/cancel
pub async fn cancel_endpoint(
    maintenance_service: web::Data<MaintenanceService>,
    body: web::Json<CancelRequest>,
) -> HttpResponse {
    match maintenance_service.cancel(body.into_inner()).await {
        Ok(record) => HttpResponse::Ok().json(MutationResponse {
            success: true,
            record,
        }),
        Err(e) => error_response(&e),
    }
}
