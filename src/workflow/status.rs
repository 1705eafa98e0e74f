//! workflow/status.rs
//! Máquina de estados de la orden de mantenimiento.
//!
//! PENDIENTE/PROGRAMADA -> EN_PROCESO -> COMPLETADA, con retorno a PENDIENTE
//! cuando se borra la última firma. CANCELADA es terminal y solo se alcanza
//! por cancelación explícita de una orden abierta.

use crate::models::maintenance_model::MaintenanceStatus;

/// Checklist y firmas editables por usuarios normales
pub fn is_open(status: MaintenanceStatus) -> bool {
    !is_terminal(status)
}

pub fn is_terminal(status: MaintenanceStatus) -> bool {
    matches!(
        status,
        MaintenanceStatus::Completada | MaintenanceStatus::Cancelada
    )
}

/// Estado tras registrar una firma nueva.
pub fn after_signature_added(status: MaintenanceStatus) -> MaintenanceStatus {
    match status {
        MaintenanceStatus::Pendiente | MaintenanceStatus::Programada => {
            MaintenanceStatus::EnProceso
        }
        other => other,
    }
}

/// Estado tras borrar una firma, dado cuántas quedan.
pub fn after_signature_removed(status: MaintenanceStatus, remaining: usize) -> MaintenanceStatus {
    match status {
        MaintenanceStatus::EnProceso if remaining == 0 => MaintenanceStatus::Pendiente,
        other => other,
    }
}

pub fn can_transition(from: MaintenanceStatus, to: MaintenanceStatus) -> bool {
    use MaintenanceStatus::*;
    matches!(
        (from, to),
        (Pendiente, EnProceso)
            | (Programada, EnProceso)
            | (EnProceso, Pendiente)
            | (EnProceso, Completada)
            | (Pendiente, Cancelada)
            | (Programada, Cancelada)
            | (EnProceso, Cancelada)
            // edición administrativa: solo sella auditoría
            | (Completada, Completada)
    )
}
