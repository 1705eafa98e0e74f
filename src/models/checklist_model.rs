//! models/checklist_model.rs
//! Ítems de la pauta y respuestas del checklist por orden.

use serde::{Deserialize, Serialize};

/// Definición de un ítem (la define la pauta, no cambia durante la ejecución)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItemDefinition {
    pub id: String,
    pub template_id: String,
    pub description: String,
    pub display_order: i64,
    pub is_required: bool,
}

/// Una respuesta por par (orden, ítem)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistResponse {
    pub id: String,
    pub record_id: String,
    pub item_id: String,
    pub is_completed: bool,
    pub comment: Option<String>,
}

/// Ítem de la pauta junto con su respuesta (si ya existe)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistEntry {
    pub item: ChecklistItemDefinition,
    pub response: Option<ChecklistResponse>,
}

/// POST /api/maintenance/checklist-item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItemRequest {
    pub record_id: String,
    pub item_id: String,
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin_edit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_name: Option<String>,
}

/// Valor final de un ítem enviado junto con la finalización
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistResponseInput {
    pub item_id: String,
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}
