//! models/maintenance_model.rs
//! Orden de mantenimiento: entidad, estados y requests/responses de la API.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::checklist_model::{ChecklistEntry, ChecklistResponseInput};
use crate::models::equipment_model::Conflict;
use crate::models::signature_model::Signature;

/// Estado de una orden. Se serializa en mayúsculas tal cual se guarda en DB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceStatus {
    Pendiente,
    Programada,
    EnProceso,
    Completada,
    Cancelada,
}

impl MaintenanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceStatus::Pendiente => "PENDIENTE",
            MaintenanceStatus::Programada => "PROGRAMADA",
            MaintenanceStatus::EnProceso => "EN_PROCESO",
            MaintenanceStatus::Completada => "COMPLETADA",
            MaintenanceStatus::Cancelada => "CANCELADA",
        }
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaintenanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDIENTE" => Ok(MaintenanceStatus::Pendiente),
            "PROGRAMADA" => Ok(MaintenanceStatus::Programada),
            "EN_PROCESO" => Ok(MaintenanceStatus::EnProceso),
            "COMPLETADA" => Ok(MaintenanceStatus::Completada),
            "CANCELADA" => Ok(MaintenanceStatus::Cancelada),
            other => Err(format!("Estado de mantenimiento desconocido: {}", other)),
        }
    }
}

/// Tipo de mantenimiento (preventivo o correctivo)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceKind {
    Preventivo,
    Correctivo,
}

impl MaintenanceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceKind::Preventivo => "PREVENTIVO",
            MaintenanceKind::Correctivo => "CORRECTIVO",
        }
    }
}

impl fmt::Display for MaintenanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaintenanceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PREVENTIVO" => Ok(MaintenanceKind::Preventivo),
            "CORRECTIVO" => Ok(MaintenanceKind::Correctivo),
            other => Err(format!("Tipo de mantenimiento desconocido: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRecord {
    pub id: String,
    pub equipment_id: String,
    /// Pauta contra la que se ejecuta el checklist
    pub template_id: String,
    pub scheduled_date: NaiveDate,
    pub kind: MaintenanceKind,
    pub status: MaintenanceStatus,
    pub notes: Option<String>,
    /// Se incrementa con cada mutación persistida.
    pub version: i64,
    pub completed_at: Option<DateTime<Utc>>,
    pub edited_after_completion_at: Option<DateTime<Utc>>,
    pub edited_after_completion_by: Option<String>,
}

/// POST /api/maintenance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaintenanceRequest {
    pub equipment_id: String,
    pub template_id: String,
    pub scheduled_date: NaiveDate,
    pub kind: MaintenanceKind,
    pub notes: Option<String>,
}

/// La creación nunca se bloquea: el conflicto viaja como advertencia.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaintenanceResponse {
    pub record: MaintenanceRecord,
    pub conflict: Option<Conflict>,
}

/// GET /api/maintenance/{id}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceDetail {
    pub record: MaintenanceRecord,
    pub signatures: Vec<Signature>,
    pub checklist: Vec<ChecklistEntry>,
}

/// POST /api/maintenance/complete
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    pub record_id: String,
    pub notes: Option<String>,
    pub checklist_responses: Vec<ChecklistResponseInput>,
    /// Si viene, debe coincidir con la versión guardada.
    pub expected_version: Option<i64>,
}

/// POST /api/maintenance/admin-notes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminNotesRequest {
    pub record_id: String,
    pub notes: Option<String>,
    pub admin_name: String,
}

/// POST /api/maintenance/cancel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub record_id: String,
    pub expected_version: Option<i64>,
}

/// Respuesta genérica de las mutaciones
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub success: bool,
    pub record: MaintenanceRecord,
}
