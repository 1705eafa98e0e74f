//! services/signature_service.rs
//! Alta, edición y borrado de firmas. Una sola firma por rol y orden; la
//! primera firma lleva la orden a EN_PROCESO y borrar la última la devuelve a
//! PENDIENTE.

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Sqlite, SqliteConnection};
use uuid::Uuid;

use crate::models::maintenance_model::MaintenanceRecord;
use crate::models::signature_model::{Signature, SignatureRequest, SignatureResponse};
use crate::services::errors::{ServiceError, ServiceResult};
use crate::services::maintenance_service::MaintenanceService;
use crate::workflow::signature_capture::has_image_payload;
use crate::workflow::status;

#[derive(Debug, FromRow)]
struct SignatureRow {
    id: String,
    record_id: String,
    role: String,
    signer_name: String,
    id_number: Option<String>,
    title: Option<String>,
    image: String,
    signed_at: String,
}

impl TryFrom<SignatureRow> for Signature {
    type Error = anyhow::Error;

    fn try_from(row: SignatureRow) -> Result<Self, Self::Error> {
        Ok(Signature {
            role: row.role.parse().map_err(|e: String| anyhow!(e))?,
            signed_at: row
                .signed_at
                .parse::<DateTime<Utc>>()
                .with_context(|| format!("Fecha de firma inválida en {}", row.id))?,
            id: row.id,
            record_id: row.record_id,
            signer_name: row.signer_name,
            id_number: row.id_number,
            title: row.title,
            image: row.image,
        })
    }
}

fn validate(req: &SignatureRequest) -> ServiceResult<()> {
    if req.signer_name.trim().is_empty() {
        return Err(ServiceError::Validation(
            "El nombre del firmante es obligatorio".to_string(),
        ));
    }
    if !has_image_payload(&req.image) {
        return Err(ServiceError::Validation(
            "La firma no puede estar vacía".to_string(),
        ));
    }
    Ok(())
}

fn ensure_open(record: &MaintenanceRecord) -> ServiceResult<()> {
    if status::is_open(record.status) {
        Ok(())
    } else {
        Err(ServiceError::Rule(format!(
            "La orden está en estado {}; no admite cambios de firmas",
            record.status
        )))
    }
}

#[derive(Clone, Debug)]
pub struct SignatureService {
    db_pool: Pool<Sqlite>,
}

impl SignatureService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        SignatureService { db_pool }
    }

    pub(crate) async fn list_for_record(
        conn: &mut SqliteConnection,
        record_id: &str,
    ) -> ServiceResult<Vec<Signature>> {
        let rows = sqlx::query_as::<_, SignatureRow>(
            r#"
            SELECT id, record_id, role, signer_name, id_number, title, image, signed_at
            FROM signatures
            WHERE record_id = ?1
            ORDER BY signed_at ASC
            "#,
        )
        .bind(record_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows
            .into_iter()
            .map(Signature::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn load(conn: &mut SqliteConnection, signature_id: &str) -> ServiceResult<Signature> {
        let row = sqlx::query_as::<_, SignatureRow>(
            r#"
            SELECT id, record_id, role, signer_name, id_number, title, image, signed_at
            FROM signatures
            WHERE id = ?1
            "#,
        )
        .bind(signature_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Firma {} no encontrada", signature_id)))?;
        Ok(Signature::try_from(row)?)
    }

    /// POST signature
    pub async fn create(&self, req: SignatureRequest) -> ServiceResult<SignatureResponse> {
        validate(&req)?;

        let mut tx = self.db_pool.begin().await?;
        let record = MaintenanceService::load(&mut tx, &req.record_id).await?;
        ensure_open(&record)?;

        let already_signed = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM signatures WHERE record_id = ?1 AND role = ?2",
        )
        .bind(&record.id)
        .bind(req.role.as_str())
        .fetch_one(&mut *tx)
        .await?;
        if already_signed > 0 {
            return Err(ServiceError::Conflict(format!(
                "El rol {} ya firmó la orden {}",
                req.role, record.id
            )));
        }

        let signature_id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO signatures (id, record_id, role, signer_name, id_number, title, image, signed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&signature_id)
        .bind(&record.id)
        .bind(req.role.as_str())
        .bind(req.signer_name.trim())
        .bind(&req.id_number)
        .bind(&req.title)
        .bind(&req.image)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            // otra petición firmó el mismo rol entre la consulta y el insert
            ServiceError::on_unique_violation(e, || {
                format!("El rol {} ya firmó la orden {}", req.role, record.id)
            })
        })?;

        MaintenanceService::touch(&mut tx, &record, status::after_signature_added(record.status))
            .await?;
        let signature = Self::load(&mut tx, &signature_id).await?;
        let updated = MaintenanceService::load(&mut tx, &record.id).await?;
        tx.commit().await?;

        log::info!(
            "(create) Firma {} registrada en orden {} ({} -> {})",
            signature.role,
            record.id,
            record.status,
            updated.status
        );
        Ok(SignatureResponse {
            success: true,
            signature,
            record: updated,
        })
    }

    /// PUT signature. El rol de una firma existente no cambia.
    pub async fn update(&self, req: SignatureRequest) -> ServiceResult<SignatureResponse> {
        validate(&req)?;
        let signature_id = req.signature_id.as_deref().ok_or_else(|| {
            ServiceError::Validation("signatureId es obligatorio para editar una firma".to_string())
        })?;

        let mut tx = self.db_pool.begin().await?;
        let existing = Self::load(&mut tx, signature_id).await?;
        if existing.record_id != req.record_id {
            return Err(ServiceError::Validation(format!(
                "La firma {} no pertenece a la orden {}",
                signature_id, req.record_id
            )));
        }
        if existing.role != req.role {
            return Err(ServiceError::Validation(format!(
                "No se puede cambiar el rol de la firma ({} -> {})",
                existing.role, req.role
            )));
        }
        let record = MaintenanceService::load(&mut tx, &existing.record_id).await?;
        ensure_open(&record)?;

        sqlx::query(
            r#"
            UPDATE signatures
            SET signer_name = ?2, id_number = ?3, title = ?4, image = ?5, signed_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(signature_id)
        .bind(req.signer_name.trim())
        .bind(&req.id_number)
        .bind(&req.title)
        .bind(&req.image)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        MaintenanceService::touch(&mut tx, &record, status::after_signature_added(record.status))
            .await?;
        let signature = Self::load(&mut tx, signature_id).await?;
        let updated = MaintenanceService::load(&mut tx, &record.id).await?;
        tx.commit().await?;

        log::info!("(update) Firma {} de la orden {} editada", signature.role, record.id);
        Ok(SignatureResponse {
            success: true,
            signature,
            record: updated,
        })
    }

    /// DELETE signature. Si era la única, la orden vuelve a PENDIENTE.
    pub async fn delete(&self, signature_id: &str) -> ServiceResult<MaintenanceRecord> {
        let mut tx = self.db_pool.begin().await?;
        let existing = Self::load(&mut tx, signature_id).await?;
        let record = MaintenanceService::load(&mut tx, &existing.record_id).await?;
        ensure_open(&record)?;

        sqlx::query("DELETE FROM signatures WHERE id = ?1")
            .bind(signature_id)
            .execute(&mut *tx)
            .await?;
        let remaining =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM signatures WHERE record_id = ?1")
                .bind(&record.id)
                .fetch_one(&mut *tx)
                .await?;

        let next = status::after_signature_removed(record.status, remaining as usize);
        MaintenanceService::touch(&mut tx, &record, next).await?;
        let updated = MaintenanceService::load(&mut tx, &record.id).await?;
        tx.commit().await?;

        log::info!(
            "(delete) Firma {} eliminada de la orden {}; quedan {} ({} -> {})",
            existing.role,
            record.id,
            remaining,
            record.status,
            updated.status
        );
        Ok(updated)
    }
}
