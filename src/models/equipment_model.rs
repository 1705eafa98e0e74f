//! models/equipment_model.rs
//! Lo que el flujo consume del catálogo de equipos: su historial y el
//! resultado del detector de conflictos.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::maintenance_model::{MaintenanceKind, MaintenanceStatus};

/// Entrada del historial de mantenimientos de un equipo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub record_id: String,
    pub date: NaiveDate,
    pub status: MaintenanceStatus,
    pub kind: MaintenanceKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentHistoryResponse {
    pub equipment_id: String,
    pub operating_status: String,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    /// Ya existe una orden pendiente para el equipo
    Blocking,
    Warning,
}

/// Posición temporal del registro citado respecto a hoy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictTiming {
    Pending,
    Upcoming,
    RecentlyServiced,
}

/// Advertencia para quien programa. Nunca impide crear la orden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub severity: ConflictSeverity,
    pub timing: ConflictTiming,
    pub record_id: String,
    pub date: NaiveDate,
    pub status: MaintenanceStatus,
    pub kind: MaintenanceKind,
    pub message: String,
}

/// GET /api/maintenance/conflict
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictQuery {
    pub equipment_id: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictResponse {
    pub conflict: Option<Conflict>,
}
