//! handlers/signature_handler.rs
use actix_web::{web, HttpResponse};

use crate::handlers::error_response;
use crate::models::maintenance_model::MutationResponse;
use crate::models::signature_model::{DeleteSignatureQuery, SignatureRequest};
use crate::services::signature_service::SignatureService;

/// POST /api/maintenance/signature
pub async fn create_signature_endpoint(
    signature_service: web::Data<SignatureService>,
    body: web::Json<SignatureRequest>,
) -> HttpResponse {
    match signature_service.create(body.into_inner()).await {
        Ok(resp) => HttpResponse::Created().json(resp),
        Err(e) => error_response(&e),
    }
}

/// PUT /api/maintenance/signature
pub async fn update_signature_endpoint(
    signature_service: web::Data<SignatureService>,
    body: web::Json<SignatureRequest>,
) -> HttpResponse {
    match signature_service.update(body.into_inner()).await {
        Ok(resp) => HttpResponse::Ok().json(resp),
        Err(e) => error_response(&e),
    }
}

/// DELETE /api/maintenance/signature?signatureId=...
pub async fn delete_signature_endpoint(
    signature_service: web::Data<SignatureService>,
    query: web::Query<DeleteSignatureQuery>,
) -> HttpResponse {
    match signature_service.delete(&query.signature_id).await {
        Ok(record) => HttpResponse::Ok().json(MutationResponse {
            success: true,
            record,
        }),
        Err(e) => error_response(&e),
    }
}
