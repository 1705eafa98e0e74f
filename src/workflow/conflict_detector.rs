//! workflow/conflict_detector.rs
//! Análisis de solo lectura sobre el historial de un equipo antes de crear
//! una orden nueva. El resultado es una advertencia, nunca un bloqueo real.

use chrono::NaiveDate;

use crate::models::equipment_model::{Conflict, ConflictSeverity, ConflictTiming, HistoryEntry};
use crate::models::maintenance_model::MaintenanceStatus;

/// Ventana por defecto para considerar dos mantenimientos demasiado cercanos
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Evalúa el historial en orden de prioridad:
/// 1. cualquier orden abierta sin iniciar (PENDIENTE o PROGRAMADA) -> conflicto bloqueante,
/// 2. la primera orden a menos de `window_days` de la fecha propuesta -> advertencia,
/// 3. nada.
pub fn detect_conflict(
    proposed: NaiveDate,
    history: &[HistoryEntry],
    today: NaiveDate,
    window_days: i64,
) -> Option<Conflict> {
    if let Some(pending) = history.iter().find(|h| {
        matches!(
            h.status,
            MaintenanceStatus::Pendiente | MaintenanceStatus::Programada
        )
    }) {
        return Some(Conflict {
            severity: ConflictSeverity::Blocking,
            timing: ConflictTiming::Pending,
            record_id: pending.record_id.clone(),
            date: pending.date,
            status: pending.status,
            kind: pending.kind,
            message: format!(
                "El equipo ya tiene un mantenimiento {} pendiente para el {}",
                pending.kind.as_str().to_lowercase(),
                pending.date
            ),
        });
    }

    let close = history.iter().find(|h| {
        h.status != MaintenanceStatus::Cancelada
            && (h.date - proposed).num_days().abs() < window_days
    })?;

    let (timing, message) = if close.date > today {
        (
            ConflictTiming::Upcoming,
            format!(
                "Hay un mantenimiento {} próximo el {} (estado {})",
                close.kind.as_str().to_lowercase(),
                close.date,
                close.status
            ),
        )
    } else {
        (
            ConflictTiming::RecentlyServiced,
            format!(
                "El equipo recibió mantenimiento {} recientemente, el {} (estado {})",
                close.kind.as_str().to_lowercase(),
                close.date,
                close.status
            ),
        )
    };

    Some(Conflict {
        severity: ConflictSeverity::Warning,
        timing,
        record_id: close.record_id.clone(),
        date: close.date,
        status: close.status,
        kind: close.kind,
        message,
    })
}
