//! services/checklist_service.rs
//! Respuestas del checklist: lectura por orden y guardado ítem a ítem,
//! incluida la vía administrativa sobre órdenes completadas.

use chrono::Utc;
use sqlx::{FromRow, Pool, Sqlite, SqliteConnection};
use uuid::Uuid;

use crate::models::checklist_model::{
    ChecklistEntry, ChecklistItemDefinition, ChecklistItemRequest, ChecklistResponse,
};
use crate::models::maintenance_model::{MaintenanceRecord, MaintenanceStatus};
use crate::services::errors::{ServiceError, ServiceResult};
use crate::services::maintenance_service::MaintenanceService;

#[derive(Debug, FromRow)]
struct EntryRow {
    item_id: String,
    template_id: String,
    description: String,
    display_order: i64,
    is_required: i64,
    response_id: Option<String>,
    is_completed: Option<i64>,
    comment: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ChecklistService {
    db_pool: Pool<Sqlite>,
}

impl ChecklistService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        ChecklistService { db_pool }
    }

    /// Ítems de la pauta de la orden con su respuesta, en orden de despliegue.
    pub(crate) async fn list_entries(
        conn: &mut SqliteConnection,
        record: &MaintenanceRecord,
    ) -> ServiceResult<Vec<ChecklistEntry>> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT
                i.id AS item_id, i.template_id, i.description, i.display_order, i.is_required,
                r.id AS response_id, r.is_completed, r.comment
            FROM checklist_items i
            LEFT JOIN checklist_responses r
                ON r.item_id = i.id AND r.record_id = ?2
            WHERE i.template_id = ?1
            ORDER BY i.display_order ASC
            "#,
        )
        .bind(&record.template_id)
        .bind(&record.id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ChecklistEntry {
                response: r.response_id.map(|response_id| ChecklistResponse {
                    id: response_id,
                    record_id: record.id.clone(),
                    item_id: r.item_id.clone(),
                    is_completed: r.is_completed.unwrap_or(0) != 0,
                    comment: r.comment,
                }),
                item: ChecklistItemDefinition {
                    id: r.item_id,
                    template_id: r.template_id,
                    description: r.description,
                    display_order: r.display_order,
                    is_required: r.is_required != 0,
                },
            })
            .collect())
    }

    /// Verifica que el ítem pertenezca a la pauta de la orden.
    pub(crate) async fn ensure_item_in_template(
        conn: &mut SqliteConnection,
        record: &MaintenanceRecord,
        item_id: &str,
    ) -> ServiceResult<()> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM checklist_items WHERE id = ?1 AND template_id = ?2",
        )
        .bind(item_id)
        .bind(&record.template_id)
        .fetch_one(&mut *conn)
        .await?;
        if found == 0 {
            return Err(ServiceError::NotFound(format!(
                "El ítem {} no pertenece a la pauta de la orden {}",
                item_id, record.id
            )));
        }
        Ok(())
    }

    /// Inserta o actualiza la respuesta de un par (orden, ítem).
    /// Un comentario ausente no borra el existente.
    pub(crate) async fn upsert_response(
        conn: &mut SqliteConnection,
        record_id: &str,
        item_id: &str,
        is_completed: bool,
        comment: Option<&str>,
    ) -> ServiceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO checklist_responses (id, record_id, item_id, is_completed, comment, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT (record_id, item_id) DO UPDATE SET
                is_completed = excluded.is_completed,
                comment = COALESCE(excluded.comment, checklist_responses.comment),
                updated_at = excluded.updated_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(record_id)
        .bind(item_id)
        .bind(is_completed as i64)
        .bind(comment)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// POST checklist-item. En una orden completada solo se acepta como
    /// edición administrativa, que siempre sella la auditoría.
    pub async fn save_item(&self, req: ChecklistItemRequest) -> ServiceResult<MaintenanceRecord> {
        let is_admin_edit = req.is_admin_edit.unwrap_or(false);
        let admin_name = req
            .admin_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        let mut tx = self.db_pool.begin().await?;
        let record = MaintenanceService::load(&mut tx, &req.record_id).await?;

        match record.status {
            MaintenanceStatus::Cancelada => {
                return Err(ServiceError::Rule(
                    "La orden está cancelada; el checklist no admite cambios".to_string(),
                ));
            }
            MaintenanceStatus::Completada if !is_admin_edit => {
                return Err(ServiceError::Rule(
                    "La orden está completada; solo un administrador puede modificar el checklist"
                        .to_string(),
                ));
            }
            MaintenanceStatus::Completada if admin_name.is_none() => {
                return Err(ServiceError::Validation(
                    "La edición administrativa requiere el nombre del administrador".to_string(),
                ));
            }
            _ => {}
        }

        Self::ensure_item_in_template(&mut tx, &record, &req.item_id).await?;
        Self::upsert_response(
            &mut tx,
            &record.id,
            &req.item_id,
            req.is_completed,
            req.comment.as_deref(),
        )
        .await?;

        if record.status == MaintenanceStatus::Completada {
            if let Some(admin) = admin_name {
                MaintenanceService::stamp_admin_edit(&mut tx, &record.id, admin).await?;
                log::info!(
                    "(save_item) Edición administrativa de {} en orden completada {} (ítem {})",
                    admin,
                    record.id,
                    req.item_id
                );
            }
        }
        MaintenanceService::touch(&mut tx, &record, record.status).await?;
        let updated = MaintenanceService::load(&mut tx, &record.id).await?;
        tx.commit().await?;

        Ok(updated)
    }
}
