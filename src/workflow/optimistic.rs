//! workflow/optimistic.rs
//! Actualización optimista con rollback:
//! (a) copia del estado, (b) cambio local inmediato, (c) llamada remota,
//! (d) éxito -> reconciliación opcional en segundo plano; fallo -> la orden
//! y sus firmas vuelven a la copia y se informa el mensaje del servidor.

use std::future::Future;
use std::sync::Arc;

use crate::client::api::{ApiError, MaintenanceApi};
use crate::workflow::errors::{Result, WorkflowError};
use crate::workflow::session::{RecordState, SharedRecord};

/// Patrón genérico: aplica `mutate`, espera `commit` y ejecuta `rollback`
/// si la llamada falla.
pub async fn apply_optimistic<T, M, C, Fut, R>(mutate: M, commit: C, rollback: R) -> Result<T>
where
    M: FnOnce(),
    C: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, ApiError>>,
    R: FnOnce(),
{
    mutate();
    match commit().await {
        Ok(value) => Ok(value),
        Err(err) => {
            log::warn!(
                "(apply_optimistic) Llamada rechazada (status={:?}, detalle={:?}); revirtiendo estado local",
                err.status,
                err.detail
            );
            rollback();
            Err(WorkflowError::from(err))
        }
    }
}

/// Lo que necesita cada operación mutante: el estado compartido y la API.
#[derive(Clone)]
pub struct SyncContext {
    pub record: SharedRecord,
    pub api: Arc<dyn MaintenanceApi>,
    /// Recargar desde el servidor después de cada éxito
    pub background_refresh: bool,
}

impl SyncContext {
    pub fn new(record: SharedRecord, api: Arc<dyn MaintenanceApi>) -> Self {
        Self {
            record,
            api,
            background_refresh: true,
        }
    }

    /// `apply_optimistic` sobre el estado compartido. El rollback repone la
    /// orden y las firmas de la copia; el checklist queda como esté.
    pub async fn apply<T, M, C, Fut>(&self, mutate: M, commit: C) -> Result<T>
    where
        M: FnOnce(&mut RecordState),
        C: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, ApiError>>,
    {
        let snapshot = self.record.snapshot();
        let result = apply_optimistic(
            || self.record.update(mutate),
            commit,
            || self.record.rollback(snapshot),
        )
        .await;
        if result.is_ok() {
            self.reconcile_in_background();
        }
        result
    }

    /// Recarga y reconcilia sin bloquear al llamador. Si llega después de otra
    /// mutación local, gana la última escritura en el servidor.
    pub fn reconcile_in_background(&self) {
        if !self.background_refresh {
            return;
        }
        let record = self.record.clone();
        let api = Arc::clone(&self.api);
        let record_id = record.read(|s| s.record.id.clone());
        tokio::spawn(async move {
            match api.fetch_record(&record_id).await {
                Ok(detail) => record.update(|s| s.reconcile(detail)),
                Err(e) => log::warn!(
                    "(reconcile_in_background) No se pudo recargar la orden {}: {}",
                    record_id,
                    e
                ),
            }
        });
    }

    pub async fn refresh(&self) -> Result<()> {
        let record_id = self.record.read(|s| s.record.id.clone());
        let detail = self.api.fetch_record(&record_id).await?;
        self.record.update(|s| s.reconcile(detail));
        Ok(())
    }
}
