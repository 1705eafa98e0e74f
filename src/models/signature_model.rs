//! models/signature_model.rs
//! Firmas de la orden: una por rol (técnico y responsable).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::maintenance_model::MaintenanceRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureRole {
    Tecnico,
    Responsable,
}

impl SignatureRole {
    /// Los dos firmantes obligatorios
    pub const ALL: [SignatureRole; 2] = [SignatureRole::Tecnico, SignatureRole::Responsable];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureRole::Tecnico => "TECNICO",
            SignatureRole::Responsable => "RESPONSABLE",
        }
    }
}

impl fmt::Display for SignatureRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TECNICO" => Ok(SignatureRole::Tecnico),
            "RESPONSABLE" => Ok(SignatureRole::Responsable),
            other => Err(format!("Rol de firma desconocido: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub id: String,
    pub record_id: String,
    pub role: SignatureRole,
    pub signer_name: String,
    pub id_number: Option<String>,
    pub title: Option<String>,
    /// Imagen opaca (data URI)
    pub image: String,
    pub signed_at: DateTime<Utc>,
}

/// POST / PUT /api/maintenance/signature
/// `signature_id` solo se usa en el PUT (edición).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRequest {
    pub record_id: String,
    pub role: SignatureRole,
    pub signer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureResponse {
    pub success: bool,
    pub signature: Signature,
    /// Orden tras el cambio (estado y versión actualizados)
    pub record: MaintenanceRecord,
}

/// DELETE /api/maintenance/signature?signatureId=...
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSignatureQuery {
    pub signature_id: String,
}
