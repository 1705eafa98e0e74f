//! services/maintenance_service.rs
//! Persistencia de las órdenes de mantenimiento y transiciones a nivel de
//! orden (creación, cancelación, notas administrativas, versión).

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, Pool, Sqlite, SqliteConnection};
use uuid::Uuid;

use crate::models::maintenance_model::{
    AdminNotesRequest, CancelRequest, CreateMaintenanceRequest, CreateMaintenanceResponse,
    MaintenanceRecord, MaintenanceStatus,
};
use crate::services::equipment_service::EquipmentService;
use crate::services::errors::{ServiceError, ServiceResult};
use crate::workflow::status;

const RECORD_COLUMNS: &str = "id, equipment_id, template_id, scheduled_date, kind, status, notes, \
     version, completed_at, edited_after_completion_at, edited_after_completion_by";

#[derive(Debug, FromRow)]
struct MaintenanceRow {
    id: String,
    equipment_id: String,
    template_id: String,
    scheduled_date: String,
    kind: String,
    status: String,
    notes: Option<String>,
    version: i64,
    completed_at: Option<String>,
    edited_after_completion_at: Option<String>,
    edited_after_completion_by: Option<String>,
}

fn parse_timestamp(value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    value
        .map(|v| {
            v.parse::<DateTime<Utc>>()
                .with_context(|| format!("Timestamp inválido: {}", v))
        })
        .transpose()
}

impl TryFrom<MaintenanceRow> for MaintenanceRecord {
    type Error = anyhow::Error;

    fn try_from(row: MaintenanceRow) -> Result<Self> {
        Ok(MaintenanceRecord {
            scheduled_date: row
                .scheduled_date
                .parse::<NaiveDate>()
                .with_context(|| format!("Fecha inválida en orden {}", row.id))?,
            kind: row.kind.parse().map_err(|e: String| anyhow!(e))?,
            status: row.status.parse().map_err(|e: String| anyhow!(e))?,
            notes: row.notes,
            version: row.version,
            completed_at: parse_timestamp(row.completed_at)?,
            edited_after_completion_at: parse_timestamp(row.edited_after_completion_at)?,
            edited_after_completion_by: row.edited_after_completion_by,
            id: row.id,
            equipment_id: row.equipment_id,
            template_id: row.template_id,
        })
    }
}

#[derive(Clone, Debug)]
pub struct MaintenanceService {
    db_pool: Pool<Sqlite>,
    equipment_service: EquipmentService,
}

impl MaintenanceService {
    pub fn new(db_pool: Pool<Sqlite>, equipment_service: EquipmentService) -> Self {
        MaintenanceService {
            db_pool,
            equipment_service,
        }
    }

    /// Corre migraciones con sqlx
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db_pool)
            .await
            .context("Fallo al correr migraciones de mantenimiento")?;
        Ok(())
    }

    /// Crea la orden. El conflicto se calcula antes de insertar y se devuelve
    /// como advertencia: nunca impide la creación.
    pub async fn create_record(
        &self,
        req: CreateMaintenanceRequest,
        today: NaiveDate,
    ) -> ServiceResult<CreateMaintenanceResponse> {
        let template_exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM templates WHERE id = ?1")
                .bind(&req.template_id)
                .fetch_one(&self.db_pool)
                .await?;
        if template_exists == 0 {
            return Err(ServiceError::NotFound(format!(
                "Pauta {} no encontrada",
                req.template_id
            )));
        }

        let conflict = self
            .equipment_service
            .check_conflict(&req.equipment_id, req.scheduled_date, today)
            .await?;

        let initial_status = if req.scheduled_date > today {
            MaintenanceStatus::Programada
        } else {
            MaintenanceStatus::Pendiente
        };

        let record_id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO maintenance_records (
                id, equipment_id, template_id, scheduled_date, kind, status,
                notes, version, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8)
            "#,
        )
        .bind(&record_id)
        .bind(&req.equipment_id)
        .bind(&req.template_id)
        .bind(req.scheduled_date.format("%Y-%m-%d").to_string())
        .bind(req.kind.as_str())
        .bind(initial_status.as_str())
        .bind(&req.notes)
        .bind(&now)
        .execute(&self.db_pool)
        .await?;

        log::info!(
            "(create_record) Orden {} creada para equipo {} en estado {} (conflicto: {})",
            record_id,
            req.equipment_id,
            initial_status,
            conflict.is_some()
        );

        let record = self.get_record(&record_id).await?;
        Ok(CreateMaintenanceResponse { record, conflict })
    }

    pub async fn get_record(&self, record_id: &str) -> ServiceResult<MaintenanceRecord> {
        let mut conn = self.db_pool.acquire().await?;
        Self::load(&mut conn, record_id).await
    }

    /// Lee la orden dentro de una conexión o transacción ya abierta.
    pub(crate) async fn load(
        conn: &mut SqliteConnection,
        record_id: &str,
    ) -> ServiceResult<MaintenanceRecord> {
        let sql = format!(
            "SELECT {} FROM maintenance_records WHERE id = ?1",
            RECORD_COLUMNS
        );
        let row = sqlx::query_as::<_, MaintenanceRow>(&sql)
            .bind(record_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Orden {} no encontrada", record_id)))?;
        Ok(MaintenanceRecord::try_from(row)?)
    }

    /// Verifica la versión esperada (si vino) antes de mutar.
    pub(crate) fn check_version(
        record: &MaintenanceRecord,
        expected: Option<i64>,
    ) -> ServiceResult<()> {
        match expected {
            Some(v) if v != record.version => Err(ServiceError::Conflict(format!(
                "La orden {} fue modificada por otro usuario (versión {}, esperada {})",
                record.id, record.version, v
            ))),
            _ => Ok(()),
        }
    }

    /// Cambia estado (si corresponde) e incrementa la versión.
    pub(crate) async fn touch(
        conn: &mut SqliteConnection,
        record: &MaintenanceRecord,
        new_status: MaintenanceStatus,
    ) -> ServiceResult<()> {
        if new_status != record.status && !status::can_transition(record.status, new_status) {
            return Err(ServiceError::Rule(format!(
                "Transición no permitida: {} -> {}",
                record.status, new_status
            )));
        }
        sqlx::query(
            r#"
            UPDATE maintenance_records
            SET status = ?2,
                version = version + 1,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(&record.id)
        .bind(new_status.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Sella los campos de auditoría de una edición posterior a la finalización.
    pub(crate) async fn stamp_admin_edit(
        conn: &mut SqliteConnection,
        record_id: &str,
        admin_name: &str,
    ) -> ServiceResult<()> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            UPDATE maintenance_records
            SET edited_after_completion_at = ?2,
                edited_after_completion_by = ?3,
                updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(record_id)
        .bind(&now)
        .bind(admin_name)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Cancela una orden abierta. CANCELADA es terminal.
    pub async fn cancel(&self, req: CancelRequest) -> ServiceResult<MaintenanceRecord> {
        let mut tx = self.db_pool.begin().await?;
        let record = Self::load(&mut tx, &req.record_id).await?;
        Self::check_version(&record, req.expected_version)?;
        if !status::is_open(record.status) {
            return Err(ServiceError::Rule(format!(
                "No se puede cancelar una orden en estado {}",
                record.status
            )));
        }
        Self::touch(&mut tx, &record, MaintenanceStatus::Cancelada).await?;
        let updated = Self::load(&mut tx, &record.id).await?;
        tx.commit().await?;

        log::info!("(cancel) Orden {} cancelada", record.id);
        Ok(updated)
    }

    /// Edición administrativa de notas sobre una orden completada.
    pub async fn update_admin_notes(
        &self,
        req: AdminNotesRequest,
    ) -> ServiceResult<MaintenanceRecord> {
        let admin_name = req.admin_name.trim();
        if admin_name.is_empty() {
            return Err(ServiceError::Validation(
                "El nombre del administrador es obligatorio".to_string(),
            ));
        }

        let mut tx = self.db_pool.begin().await?;
        let record = Self::load(&mut tx, &req.record_id).await?;
        if record.status != MaintenanceStatus::Completada {
            return Err(ServiceError::Rule(
                "Las notas administrativas solo aplican a órdenes completadas".to_string(),
            ));
        }

        sqlx::query("UPDATE maintenance_records SET notes = ?2 WHERE id = ?1")
            .bind(&record.id)
            .bind(&req.notes)
            .execute(&mut *tx)
            .await?;
        Self::stamp_admin_edit(&mut tx, &record.id, admin_name).await?;
        Self::touch(&mut tx, &record, record.status).await?;
        let updated = Self::load(&mut tx, &record.id).await?;
        tx.commit().await?;

        log::info!(
            "(update_admin_notes) Notas de la orden {} editadas por {}",
            record.id,
            admin_name
        );
        Ok(updated)
    }
}
