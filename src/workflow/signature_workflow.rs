//! workflow/signature_workflow.rs
//! Alta, edición y borrado de firmas: exactamente una por rol.

use crate::models::signature_model::{Signature, SignatureRole};
use crate::workflow::errors::{Result, WorkflowError};
use crate::workflow::optimistic::SyncContext;
use crate::workflow::signature_capture::CaptureSession;
use crate::workflow::status;

#[derive(Clone)]
pub struct SignatureWorkflow {
    ctx: SyncContext,
}

impl SignatureWorkflow {
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    pub fn signatures(&self) -> Vec<Signature> {
        self.ctx.record.read(|s| s.signatures.clone())
    }

    pub fn has_signature(&self, role: SignatureRole) -> bool {
        self.ctx.record.read(|s| s.signature_for(role).is_some())
    }

    /// Abre la captura para un rol. Si el rol ya firmó, se pre-carga para editar.
    pub fn begin_sign(&self, role: SignatureRole) -> Result<CaptureSession> {
        self.ctx.record.read(|s| {
            s.ensure_open()?;
            Ok(match s.signature_for(role) {
                Some(existing) => CaptureSession::from_existing(existing),
                None => CaptureSession::new(role),
            })
        })
    }

    /// Abre la captura pre-cargada con una firma existente.
    pub fn edit_signature(&self, signature_id: &str) -> Result<CaptureSession> {
        self.ctx.record.read(|s| {
            s.ensure_open()?;
            s.signatures
                .iter()
                .find(|sig| sig.id == signature_id)
                .map(CaptureSession::from_existing)
                .ok_or_else(|| WorkflowError::SignatureNotFound(signature_id.to_string()))
        })
    }

    /// Valida localmente, persiste (POST o PUT) y luego aplica al estado local.
    pub async fn submit(&self, session: CaptureSession) -> Result<Signature> {
        let mut draft = session.finish()?;

        let (record_id, existing_id) = self.ctx.record.read(|s| {
            s.ensure_open()?;
            Ok::<_, WorkflowError>((
                s.record.id.clone(),
                s.signature_for(draft.role).map(|sig| sig.id.clone()),
            ))
        })?;

        // un rol ya firmado siempre se edita, nunca se duplica
        if draft.signature_id.is_none() {
            draft.signature_id = existing_id;
        }
        let is_edit = draft.signature_id.is_some();
        let req = draft.into_request(&record_id);

        let resp = if is_edit {
            self.ctx.api.update_signature(&req).await?
        } else {
            self.ctx.api.create_signature(&req).await?
        };
        let saved = resp.signature;

        self.ctx.record.update(|s| {
            s.signatures.retain(|sig| sig.role != saved.role && sig.id != saved.id);
            s.signatures.push(saved.clone());
            s.record.status = status::after_signature_added(s.record.status);
            s.record.version = resp.record.version;
        });
        log::info!(
            "(submit) Firma {} ({}) registrada en la orden {}",
            saved.role,
            if is_edit { "edición" } else { "nueva" },
            record_id
        );
        self.ctx.reconcile_in_background();
        Ok(saved)
    }

    /// Borrado optimista: se quita de inmediato y se revierte si el servidor falla.
    pub async fn delete_signature(&self, signature_id: &str) -> Result<()> {
        self.ctx.record.read(|s| {
            s.ensure_open()?;
            if s.signatures.iter().any(|sig| sig.id == signature_id) {
                Ok(())
            } else {
                Err(WorkflowError::SignatureNotFound(signature_id.to_string()))
            }
        })?;

        let api = &self.ctx.api;
        let server_record = self
            .ctx
            .apply(
                |s| {
                    s.signatures.retain(|sig| sig.id != signature_id);
                    s.record.status =
                        status::after_signature_removed(s.record.status, s.signatures.len());
                },
                || api.delete_signature(signature_id),
            )
            .await?;
        self.ctx.record.update(|s| s.record.version = server_record.version);
        Ok(())
    }
}
