//! services/equipment_service.rs
//! Lectura del historial de mantenimientos de un equipo (colaborador externo)
//! y consulta del detector de conflictos.

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use sqlx::{FromRow, Pool, Sqlite};

use crate::models::equipment_model::{Conflict, EquipmentHistoryResponse, HistoryEntry};
use crate::services::errors::{ServiceError, ServiceResult};
use crate::workflow::conflict_detector::detect_conflict;

#[derive(Debug, FromRow)]
struct HistoryRow {
    id: String,
    scheduled_date: String,
    status: String,
    kind: String,
}

impl TryFrom<HistoryRow> for HistoryEntry {
    type Error = anyhow::Error;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        Ok(HistoryEntry {
            date: row
                .scheduled_date
                .parse()
                .with_context(|| format!("Fecha inválida en orden {}", row.id))?,
            status: row.status.parse().map_err(|e: String| anyhow!(e))?,
            kind: row.kind.parse().map_err(|e: String| anyhow!(e))?,
            record_id: row.id,
        })
    }
}

#[derive(Clone, Debug)]
pub struct EquipmentService {
    db_pool: Pool<Sqlite>,
    conflict_window_days: i64,
}

impl EquipmentService {
    pub fn new(db_pool: Pool<Sqlite>, conflict_window_days: i64) -> Self {
        EquipmentService {
            db_pool,
            conflict_window_days,
        }
    }

    /// Estado operativo del equipo; NotFound si no existe.
    pub async fn operating_status(&self, equipment_id: &str) -> ServiceResult<String> {
        sqlx::query_scalar::<_, String>("SELECT operating_status FROM equipment WHERE id = ?1")
            .bind(equipment_id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Equipo {} no encontrado", equipment_id)))
    }

    /// Historial ordenado del más reciente al más antiguo.
    pub async fn history(&self, equipment_id: &str) -> ServiceResult<EquipmentHistoryResponse> {
        let operating_status = self.operating_status(equipment_id).await?;

        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT id, scheduled_date, status, kind
            FROM maintenance_records
            WHERE equipment_id = ?1
            ORDER BY scheduled_date DESC, created_at DESC
            "#,
        )
        .bind(equipment_id)
        .fetch_all(&self.db_pool)
        .await?;

        let history = rows
            .into_iter()
            .map(HistoryEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EquipmentHistoryResponse {
            equipment_id: equipment_id.to_string(),
            operating_status,
            history,
        })
    }

    /// Conflicto (si lo hay) de programar el equipo en `proposed`.
    pub async fn check_conflict(
        &self,
        equipment_id: &str,
        proposed: NaiveDate,
        today: NaiveDate,
    ) -> ServiceResult<Option<Conflict>> {
        let history = self.history(equipment_id).await?;
        let conflict = detect_conflict(
            proposed,
            &history.history,
            today,
            self.conflict_window_days,
        );
        if let Some(c) = &conflict {
            log::info!(
                "(check_conflict) equipo={} fecha={} -> {:?}: {}",
                equipment_id,
                proposed,
                c.severity,
                c.message
            );
        }
        Ok(conflict)
    }
}
