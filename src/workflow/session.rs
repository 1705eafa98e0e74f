//! workflow/session.rs
//! Estado único de una orden en edición. La tabla del checklist y el panel de
//! firmas reciben el mismo `SharedRecord`; no existen copias sincronizadas.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::client::api::MaintenanceApi;
use crate::models::maintenance_model::{MaintenanceDetail, MaintenanceRecord};
use crate::models::signature_model::{Signature, SignatureRole};
use crate::workflow::checklist_sync::ChecklistController;
use crate::workflow::checklist_tracker::ChecklistTracker;
use crate::workflow::completion_gate::{self, CompletionCheck, GateFailure};
use crate::workflow::errors::{Result, WorkflowError};
use crate::workflow::optimistic::SyncContext;
use crate::workflow::signature_workflow::SignatureWorkflow;
use crate::workflow::status;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordState {
    pub record: MaintenanceRecord,
    pub checklist: ChecklistTracker,
    pub signatures: Vec<Signature>,
}

impl RecordState {
    pub fn from_detail(detail: MaintenanceDetail) -> Self {
        Self {
            checklist: ChecklistTracker::from_entries(&detail.checklist),
            record: detail.record,
            signatures: detail.signatures,
        }
    }

    pub fn signature_for(&self, role: SignatureRole) -> Option<&Signature> {
        self.signatures.iter().find(|s| s.role == role)
    }

    pub fn signed_roles(&self) -> Vec<SignatureRole> {
        self.signatures.iter().map(|s| s.role).collect()
    }

    pub fn completion_failures(&self) -> Vec<GateFailure> {
        let roles = self.signed_roles();
        CompletionCheck {
            status: self.record.status,
            signed_roles: &roles,
            completed_count: self.checklist.completed_count(),
        }
        .failures()
    }

    pub fn can_complete(&self) -> bool {
        self.completion_failures().is_empty()
    }

    /// Checklist editable: orden abierta o modo edición administrativa.
    pub fn checklist_editable(&self) -> bool {
        status::is_open(self.record.status) || self.checklist.is_admin_editing()
    }

    pub fn ensure_open(&self) -> Result<()> {
        if status::is_open(self.record.status) {
            Ok(())
        } else {
            Err(WorkflowError::NotEditable(self.record.status))
        }
    }

    /// Deshace un cambio optimista rechazado. Solo vuelven la orden y las
    /// firmas; el checklist y la versión confirmada se conservan, así un toggle
    /// hecho mientras la llamada estaba en curso no se pierde.
    pub fn rollback_to(&mut self, snapshot: RecordState) {
        let version = self.record.version.max(snapshot.record.version);
        self.record = snapshot.record;
        self.record.version = version;
        self.signatures = snapshot.signatures;
    }

    /// Aplica lo que devolvió el servidor. El checklist solo se reemplaza si
    /// no hay cambios locales pendientes.
    pub fn reconcile(&mut self, detail: MaintenanceDetail) {
        if !self.checklist.has_unsaved_changes() && !self.checklist.is_admin_editing() {
            self.checklist
                .reset_from(ChecklistTracker::from_entries(&detail.checklist));
        }
        self.record = detail.record;
        self.signatures = detail.signatures;
    }
}

/// Handle clonable al estado de la orden.
#[derive(Debug, Clone)]
pub struct SharedRecord {
    inner: Arc<Mutex<RecordState>>,
}

impl SharedRecord {
    pub fn new(state: RecordState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&RecordState) -> R) -> R {
        f(&self.lock())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut RecordState) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn snapshot(&self) -> RecordState {
        self.lock().clone()
    }

    pub fn rollback(&self, snapshot: RecordState) {
        self.lock().rollback_to(snapshot);
    }

    pub fn record(&self) -> MaintenanceRecord {
        self.read(|s| s.record.clone())
    }

    fn lock(&self) -> MutexGuard<'_, RecordState> {
        // las mutaciones no dejan el estado a medias si hubo panic
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Punto de entrada: una orden, su API remota y sus dos consumidores.
#[derive(Clone)]
pub struct MaintenanceSession {
    ctx: SyncContext,
}

impl MaintenanceSession {
    pub fn new(api: Arc<dyn MaintenanceApi>, detail: MaintenanceDetail) -> Self {
        let record = SharedRecord::new(RecordState::from_detail(detail));
        Self {
            ctx: SyncContext::new(record, api),
        }
    }

    /// Carga la orden desde el servidor.
    pub async fn open(api: Arc<dyn MaintenanceApi>, record_id: &str) -> Result<Self> {
        let detail = api.fetch_record(record_id).await?;
        log::info!(
            "(open) Orden {} cargada en estado {}",
            detail.record.id,
            detail.record.status
        );
        Ok(Self::new(api, detail))
    }

    /// Activa o desactiva la reconciliación en segundo plano tras cada éxito.
    pub fn with_background_refresh(mut self, enabled: bool) -> Self {
        self.ctx.background_refresh = enabled;
        self
    }

    pub fn shared(&self) -> SharedRecord {
        self.ctx.record.clone()
    }

    pub fn checklist(&self) -> ChecklistController {
        ChecklistController::new(self.ctx.clone())
    }

    pub fn signatures(&self) -> SignatureWorkflow {
        SignatureWorkflow::new(self.ctx.clone())
    }

    pub fn can_complete(&self) -> bool {
        self.ctx.record.read(RecordState::can_complete)
    }

    pub async fn complete(&self, notes: Option<String>) -> Result<MaintenanceRecord> {
        completion_gate::complete(&self.ctx, notes).await
    }

    /// Recarga sincrónica desde el servidor.
    pub async fn refresh(&self) -> Result<()> {
        self.ctx.refresh().await
    }
}
