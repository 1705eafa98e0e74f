//! workflow/errors.rs
//! Errores del motor de flujo del lado cliente. Ninguno es fatal: todos
//! quedan acotados a la orden que se está editando.

use thiserror::Error;

use crate::client::api::ApiError;
use crate::models::maintenance_model::MaintenanceStatus;
use crate::workflow::completion_gate::GateFailure;

/// Mensaje cuando el servidor no envía uno propio
pub const GENERIC_FAILURE_MESSAGE: &str = "No se pudo completar la operación";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    /// Validación local: bloquea la llamada de red.
    #[error("Validación: {0}")]
    Validation(String),
    /// La orden no admite cambios en su estado actual.
    #[error("La orden no es editable en estado {0}")]
    NotEditable(MaintenanceStatus),
    /// No se cumplen las precondiciones para completar.
    #[error("No se puede completar: {}", describe_failures(.0))]
    Gate(Vec<GateFailure>),
    /// Fallo de red o servidor; el estado local ya fue restaurado.
    #[error("{message}")]
    Sync {
        message: String,
        status: Option<u16>,
    },
    /// Guardado por lotes interrumpido; lo ya persistido queda persistido.
    #[error("Guardado parcial: falló el ítem {failed_item} ({message}); {} ítems ya guardados", .persisted.len())]
    PartialFailure {
        persisted: Vec<String>,
        failed_item: String,
        message: String,
    },
    #[error("Ítem de checklist desconocido: {0}")]
    UnknownItem(String),
    #[error("Firma no encontrada: {0}")]
    SignatureNotFound(String),
}

impl From<ApiError> for WorkflowError {
    fn from(err: ApiError) -> Self {
        WorkflowError::Sync {
            message: err.user_message(),
            status: err.status,
        }
    }
}

fn describe_failures(failures: &[GateFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
