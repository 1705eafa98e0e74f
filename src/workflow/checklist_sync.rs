//! workflow/checklist_sync.rs
//! Operaciones del checklist sobre el estado compartido: toggles y arrastre
//! en memoria, guardado por ítem y modo edición administrativa.

use chrono::Utc;

use crate::models::checklist_model::ChecklistItemRequest;
use crate::models::maintenance_model::MaintenanceStatus;
use crate::workflow::errors::{Result, WorkflowError};
use crate::workflow::optimistic::SyncContext;
use crate::workflow::session::RecordState;

#[derive(Clone)]
pub struct ChecklistController {
    ctx: SyncContext,
}

impl ChecklistController {
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    pub fn completed_count(&self) -> usize {
        self.ctx.record.read(|s| s.checklist.completed_count())
    }

    pub fn is_completed(&self, item_id: &str) -> Option<bool> {
        self.ctx.record.read(|s| s.checklist.is_completed(item_id))
    }

    pub fn toggle(&self, item_id: &str) -> Result<bool> {
        self.edit(|s| s.checklist.toggle(item_id))
    }

    pub fn set_comment(&self, item_id: &str, comment: Option<String>) -> Result<()> {
        self.edit(|s| s.checklist.set_comment(item_id, comment))
    }

    /// Presión del puntero sobre un ítem.
    pub fn pointer_down(&self, item_id: &str) -> Result<bool> {
        self.edit(|s| s.checklist.begin_drag(item_id))
    }

    /// Entrada del puntero en un ítem; sin gesto activo no hace nada.
    pub fn pointer_enter(&self, item_id: &str) -> Result<Option<bool>> {
        self.ctx.record.update(|s| {
            if !s.checklist.gesture().is_selecting() {
                return Ok(None);
            }
            if !s.checklist_editable() {
                s.checklist.end_drag();
                return Err(WorkflowError::NotEditable(s.record.status));
            }
            s.checklist.drag_enter(item_id)
        })
    }

    /// Liberación global del puntero: siempre termina el gesto.
    pub fn pointer_up(&self) {
        self.ctx.record.update(|s| s.checklist.end_drag());
    }

    /// Guarda los ítems que difieren de lo persistido, uno por petición.
    pub async fn save(&self) -> Result<Vec<String>> {
        let (record_id, changes) = self.ctx.record.read(|s| {
            s.ensure_open()?;
            Ok::<_, WorkflowError>((s.record.id.clone(), s.checklist.unsaved_changes()))
        })?;
        let persisted = self.persist_batch(&record_id, changes, None).await?;
        if !persisted.is_empty() {
            self.ctx.reconcile_in_background();
        }
        Ok(persisted)
    }

    // ------------------------------------------------------------
    // Edición administrativa (orden ya completada)
    // ------------------------------------------------------------

    pub fn enter_admin_edit(&self) -> Result<()> {
        self.ctx.record.update(|s| {
            if s.record.status != MaintenanceStatus::Completada {
                return Err(WorkflowError::Validation(
                    "La edición administrativa solo aplica a órdenes completadas".to_string(),
                ));
            }
            s.checklist.enter_admin_edit();
            Ok(())
        })
    }

    pub fn is_admin_editing(&self) -> bool {
        self.ctx.record.read(|s| s.checklist.is_admin_editing())
    }

    /// Revierte cada ítem cambiado y sale del modo sin persistir.
    pub fn cancel_admin_edit(&self) -> Result<()> {
        self.ctx.record.update(|s| s.checklist.cancel_admin_edit())
    }

    /// Persiste solo los ítems cambiados, en orden. Ante el primer fallo se
    /// detiene; lo ya guardado queda guardado y el modo sigue activo.
    pub async fn save_admin_edit(&self, admin_name: &str) -> Result<Vec<String>> {
        let admin_name = admin_name.trim();
        if admin_name.is_empty() {
            return Err(WorkflowError::Validation(
                "El nombre del administrador es obligatorio".to_string(),
            ));
        }
        let (record_id, changes) = self.ctx.record.read(|s| {
            if !s.checklist.is_admin_editing() {
                return Err(WorkflowError::Validation(
                    "No hay una edición administrativa activa".to_string(),
                ));
            }
            Ok((s.record.id.clone(), s.checklist.admin_changes()))
        })?;

        let persisted = self
            .persist_batch(&record_id, changes, Some(admin_name))
            .await?;

        self.ctx.record.update(|s| {
            s.checklist.finish_admin_edit();
            if !persisted.is_empty() {
                s.record.edited_after_completion_at = Some(Utc::now());
                s.record.edited_after_completion_by = Some(admin_name.to_string());
            }
        });
        if !persisted.is_empty() {
            self.ctx.reconcile_in_background();
        }
        Ok(persisted)
    }

    async fn persist_batch(
        &self,
        record_id: &str,
        changes: Vec<(String, bool)>,
        admin_name: Option<&str>,
    ) -> Result<Vec<String>> {
        let mut persisted = Vec::with_capacity(changes.len());
        for (item_id, value) in changes {
            let comment = self
                .ctx
                .record
                .read(|s| s.checklist.comment_for_save(&item_id));
            let req = ChecklistItemRequest {
                record_id: record_id.to_string(),
                item_id: item_id.clone(),
                is_completed: value,
                comment: comment.clone(),
                is_admin_edit: admin_name.map(|_| true),
                admin_name: admin_name.map(str::to_string),
            };

            match self.ctx.api.save_checklist_item(&req).await {
                Ok(server_record) => {
                    self.ctx.record.update(|s| {
                        s.checklist
                            .mark_persisted(&item_id, value, comment.as_deref());
                        s.record.version = server_record.version;
                    });
                    persisted.push(item_id);
                }
                Err(e) => {
                    log::error!(
                        "(persist_batch) Falló el ítem {} de la orden {} tras {} guardados: {}",
                        item_id,
                        record_id,
                        persisted.len(),
                        e
                    );
                    return Err(WorkflowError::PartialFailure {
                        persisted,
                        failed_item: item_id,
                        message: e.user_message(),
                    });
                }
            }
        }
        log::info!(
            "(persist_batch) {} ítems guardados para la orden {}",
            persisted.len(),
            record_id
        );
        Ok(persisted)
    }

    fn edit<R>(&self, f: impl FnOnce(&mut RecordState) -> Result<R>) -> Result<R> {
        self.ctx.record.update(|s| {
            if !s.checklist_editable() {
                return Err(WorkflowError::NotEditable(s.record.status));
            }
            f(s)
        })
    }
}
