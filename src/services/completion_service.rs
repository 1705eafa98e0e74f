//! services/completion_service.rs
//! Detalle completo de la orden y finalización con la compuerta del servidor.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::maintenance_model::{
    CompleteRequest, MaintenanceDetail, MaintenanceRecord, MaintenanceStatus,
};
use crate::services::checklist_service::ChecklistService;
use crate::services::errors::{ServiceError, ServiceResult};
use crate::services::maintenance_service::MaintenanceService;
use crate::services::signature_service::SignatureService;
use crate::workflow::completion_gate::CompletionCheck;

#[derive(Clone, Debug)]
pub struct CompletionService {
    db_pool: Pool<Sqlite>,
}

impl CompletionService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        CompletionService { db_pool }
    }

    /// GET /api/maintenance/{id}: orden, firmas y checklist
    pub async fn get_detail(&self, record_id: &str) -> ServiceResult<MaintenanceDetail> {
        let mut conn = self.db_pool.acquire().await?;
        let record = MaintenanceService::load(&mut conn, record_id).await?;
        let signatures = SignatureService::list_for_record(&mut conn, &record.id).await?;
        let checklist = ChecklistService::list_entries(&mut conn, &record).await?;
        Ok(MaintenanceDetail {
            record,
            signatures,
            checklist,
        })
    }

    /// Completa la orden. Las respuestas enviadas se combinan con las ya
    /// guardadas antes de evaluar la compuerta; si falla, no se escribe nada.
    pub async fn complete(&self, req: CompleteRequest) -> ServiceResult<MaintenanceRecord> {
        let mut tx = self.db_pool.begin().await?;
        let record = MaintenanceService::load(&mut tx, &req.record_id).await?;
        MaintenanceService::check_version(&record, req.expected_version)?;

        let entries = ChecklistService::list_entries(&mut tx, &record).await?;
        let mut merged: HashMap<&str, bool> = entries
            .iter()
            .map(|e| {
                (
                    e.item.id.as_str(),
                    e.response.as_ref().map(|r| r.is_completed).unwrap_or(false),
                )
            })
            .collect();
        for input in &req.checklist_responses {
            match merged.get_mut(input.item_id.as_str()) {
                Some(value) => *value = input.is_completed,
                None => {
                    return Err(ServiceError::Validation(format!(
                        "El ítem {} no pertenece a la pauta de la orden {}",
                        input.item_id, record.id
                    )));
                }
            }
        }
        let completed_count = merged.values().filter(|done| **done).count();

        let signed_roles: Vec<_> = SignatureService::list_for_record(&mut tx, &record.id)
            .await?
            .into_iter()
            .map(|s| s.role)
            .collect();

        let check = CompletionCheck {
            status: record.status,
            signed_roles: &signed_roles,
            completed_count,
        };
        if let Err(failures) = check.ensure() {
            let reasons = failures
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            log::warn!(
                "(complete) Orden {} no se puede completar: {}",
                record.id,
                reasons
            );
            return Err(ServiceError::Rule(format!(
                "No se puede completar la orden: {}",
                reasons
            )));
        }

        for input in &req.checklist_responses {
            ChecklistService::upsert_response(
                &mut tx,
                &record.id,
                &input.item_id,
                input.is_completed,
                input.comment.as_deref(),
            )
            .await?;
        }

        MaintenanceService::touch(&mut tx, &record, MaintenanceStatus::Completada).await?;
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            UPDATE maintenance_records
            SET notes = COALESCE(?2, notes),
                completed_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(&record.id)
        .bind(&req.notes)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let updated = MaintenanceService::load(&mut tx, &record.id).await?;
        tx.commit().await?;

        log::info!(
            "(complete) Orden {} completada con {} ítem(s) verificados",
            record.id,
            completed_count
        );
        Ok(updated)
    }
}
