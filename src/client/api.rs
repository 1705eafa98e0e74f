//! client/api.rs
//! Interfaz remota que consume el flujo optimista del cliente.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::checklist_model::ChecklistItemRequest;
use crate::models::equipment_model::Conflict;
use crate::models::maintenance_model::{CompleteRequest, MaintenanceDetail, MaintenanceRecord};
use crate::models::signature_model::{SignatureRequest, SignatureResponse};
use crate::workflow::errors::GENERIC_FAILURE_MESSAGE;

/// Fallo de una llamada remota. `message` es el texto que devolvió el
/// servidor (si lo hubo); `detail` queda solo para los logs.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", self.user_message())]
pub struct ApiError {
    pub status: Option<u16>,
    pub message: Option<String>,
    pub detail: Option<String>,
}

impl ApiError {
    pub fn server(status: u16, message: Option<String>) -> Self {
        Self {
            status: Some(status),
            message,
            detail: None,
        }
    }

    /// Error de transporte: no hubo respuesta del servidor.
    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            status: None,
            message: None,
            detail: Some(detail.into()),
        }
    }

    /// Mensaje del servidor tal cual o el genérico.
    pub fn user_message(&self) -> String {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(GENERIC_FAILURE_MESSAGE)
            .to_string()
    }
}

#[async_trait]
pub trait MaintenanceApi: Send + Sync {
    async fn fetch_record(&self, record_id: &str) -> Result<MaintenanceDetail, ApiError>;

    /// Devuelve la orden con su nueva versión.
    async fn save_checklist_item(
        &self,
        req: &ChecklistItemRequest,
    ) -> Result<MaintenanceRecord, ApiError>;

    async fn create_signature(&self, req: &SignatureRequest)
        -> Result<SignatureResponse, ApiError>;

    async fn update_signature(&self, req: &SignatureRequest)
        -> Result<SignatureResponse, ApiError>;

    async fn delete_signature(&self, signature_id: &str) -> Result<MaintenanceRecord, ApiError>;

    async fn complete(&self, req: &CompleteRequest) -> Result<MaintenanceRecord, ApiError>;

    async fn check_conflict(
        &self,
        equipment_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Conflict>, ApiError>;
}
