//! workflow/completion_gate.rs
//! Precondiciones para marcar una orden como COMPLETADA.
//!
//! Se exige al menos un ítem completado (no todos los obligatorios): una
//! visita correctiva o parcial es válida, pero debe quedar evidencia de una
//! acción verificada. La misma evaluación corre en el cliente y en el
//! servidor; la del servidor es la que manda.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::maintenance_model::{CompleteRequest, MaintenanceRecord, MaintenanceStatus};
use crate::models::signature_model::SignatureRole;
use crate::workflow::errors::{Result, WorkflowError};
use crate::workflow::optimistic::SyncContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "role", rename_all = "camelCase")]
pub enum GateFailure {
    MissingSignature(SignatureRole),
    NoCompletedItems,
    AlreadyCompleted,
    Cancelled,
}

impl fmt::Display for GateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateFailure::MissingSignature(role) => write!(f, "falta la firma {}", role),
            GateFailure::NoCompletedItems => {
                f.write_str("no hay ningún ítem del checklist completado")
            }
            GateFailure::AlreadyCompleted => f.write_str("la orden ya está completada"),
            GateFailure::Cancelled => f.write_str("la orden está cancelada"),
        }
    }
}

/// Entradas del predicado
#[derive(Debug, Clone, Copy)]
pub struct CompletionCheck<'a> {
    pub status: MaintenanceStatus,
    pub signed_roles: &'a [SignatureRole],
    pub completed_count: usize,
}

impl<'a> CompletionCheck<'a> {
    /// Todas las precondiciones incumplidas (vacío si se puede completar).
    pub fn failures(&self) -> Vec<GateFailure> {
        let mut failures = Vec::new();
        match self.status {
            MaintenanceStatus::Completada => failures.push(GateFailure::AlreadyCompleted),
            MaintenanceStatus::Cancelada => failures.push(GateFailure::Cancelled),
            _ => {}
        }
        for role in SignatureRole::ALL {
            if !self.signed_roles.contains(&role) {
                failures.push(GateFailure::MissingSignature(role));
            }
        }
        if self.completed_count < 1 {
            failures.push(GateFailure::NoCompletedItems);
        }
        failures
    }

    pub fn can_complete(&self) -> bool {
        self.failures().is_empty()
    }

    pub fn ensure(&self) -> std::result::Result<(), Vec<GateFailure>> {
        let failures = self.failures();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }
}

/// Paso local del completado. Sin notas nuevas se conservan las existentes,
/// igual que en el servidor.
pub(crate) fn mark_completed(record: &mut MaintenanceRecord, notes: Option<String>) {
    record.status = MaintenanceStatus::Completada;
    if notes.is_some() {
        record.notes = notes;
    }
}

/// Re-valida el predicado y completa la orden de forma optimista. Si el
/// servidor rechaza, la orden y sus firmas vuelven a la copia previa.
pub async fn complete(ctx: &SyncContext, notes: Option<String>) -> Result<MaintenanceRecord> {
    let request = ctx.record.read(|s| {
        let failures = s.completion_failures();
        if !failures.is_empty() {
            return Err(WorkflowError::Gate(failures));
        }
        Ok(CompleteRequest {
            record_id: s.record.id.clone(),
            notes: notes.clone(),
            checklist_responses: s.checklist.responses(),
            expected_version: Some(s.record.version),
        })
    })?;

    let api = &ctx.api;
    let saved = ctx
        .apply(
            |s| mark_completed(&mut s.record, notes),
            || api.complete(&request),
        )
        .await?;

    ctx.record.update(|s| {
        s.record = saved.clone();
        s.checklist.mark_all_persisted();
    });
    log::info!("(complete) Orden {} completada", saved.id);
    Ok(saved)
}
