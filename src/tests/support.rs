//! tests/support.rs
//! Fixtures compartidos: órdenes de ejemplo, una API remota en memoria y una
//! base SQLite en memoria con datos semilla.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Executor, Pool, Sqlite};

use crate::client::api::{ApiError, MaintenanceApi};
use crate::models::checklist_model::{
    ChecklistEntry, ChecklistItemDefinition, ChecklistItemRequest, ChecklistResponse,
};
use crate::models::equipment_model::Conflict;
use crate::models::maintenance_model::{
    CompleteRequest, MaintenanceDetail, MaintenanceKind, MaintenanceRecord, MaintenanceStatus,
};
use crate::models::signature_model::{
    Signature, SignatureRequest, SignatureResponse, SignatureRole,
};
use crate::services::checklist_service::ChecklistService;
use crate::services::completion_service::CompletionService;
use crate::services::equipment_service::EquipmentService;
use crate::services::maintenance_service::MaintenanceService;
use crate::services::signature_service::SignatureService;
use crate::workflow::session::MaintenanceSession;
use crate::workflow::status;

pub const RECORD_ID: &str = "rec-1";
pub const SIGNATURE_IMAGE: &str = "data:image/png;base64,iVBORw0KGgo=";

pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("fecha de prueba inválida")
}

pub fn record(status: MaintenanceStatus) -> MaintenanceRecord {
    MaintenanceRecord {
        id: RECORD_ID.to_string(),
        equipment_id: "eq-1".to_string(),
        template_id: "tpl-1".to_string(),
        scheduled_date: date("2025-03-10"),
        kind: MaintenanceKind::Preventivo,
        status,
        notes: None,
        version: 3,
        completed_at: None,
        edited_after_completion_at: None,
        edited_after_completion_by: None,
    }
}

/// `values[i]` es el estado persistido de `item-{i+1}`; `None` = sin respuesta.
pub fn entries(values: &[Option<bool>]) -> Vec<ChecklistEntry> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let item_id = format!("item-{}", i + 1);
            ChecklistEntry {
                response: value.map(|done| ChecklistResponse {
                    id: format!("resp-{}", i + 1),
                    record_id: RECORD_ID.to_string(),
                    item_id: item_id.clone(),
                    is_completed: done,
                    comment: None,
                }),
                item: ChecklistItemDefinition {
                    id: item_id,
                    template_id: "tpl-1".to_string(),
                    description: format!("Verificación {}", i + 1),
                    display_order: (i + 1) as i64,
                    is_required: i == 0,
                },
            }
        })
        .collect()
}

pub fn signature(role: SignatureRole) -> Signature {
    Signature {
        id: format!("sig-{}", role.as_str().to_lowercase()),
        record_id: RECORD_ID.to_string(),
        role,
        signer_name: format!("Firmante {}", role),
        id_number: None,
        title: None,
        image: SIGNATURE_IMAGE.to_string(),
        signed_at: Utc::now(),
    }
}

pub fn detail(
    status: MaintenanceStatus,
    checklist: Vec<ChecklistEntry>,
    signatures: Vec<Signature>,
) -> MaintenanceDetail {
    MaintenanceDetail {
        record: record(status),
        signatures,
        checklist,
    }
}

/// API remota en memoria. Aplica las mismas reglas de estado que el servidor
/// y permite forzar fallos.
pub struct FakeApi {
    pub detail: Mutex<MaintenanceDetail>,
    /// Si está presente, toda mutación falla con este error
    pub fail_with: Mutex<Option<ApiError>>,
    /// Ítems cuyo guardado individual falla
    pub failing_items: Mutex<HashSet<String>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new(detail: MaintenanceDetail) -> Arc<Self> {
        Arc::new(Self {
            detail: Mutex::new(detail),
            fail_with: Mutex::new(None),
            failing_items: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn fail_all(&self, err: ApiError) {
        *self.fail_with.lock().unwrap() = Some(err);
    }

    pub fn fail_item(&self, item_id: &str) {
        self.failing_items.lock().unwrap().insert(item_id.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn begin(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match self.fail_with.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Sesión sobre la API falsa, sin recargas en segundo plano.
pub fn session_with(api: &Arc<FakeApi>) -> MaintenanceSession {
    let initial = api.detail.lock().unwrap().clone();
    let remote: Arc<dyn MaintenanceApi> = api.clone();
    MaintenanceSession::new(remote, initial).with_background_refresh(false)
}

#[async_trait]
impl MaintenanceApi for FakeApi {
    async fn fetch_record(&self, _record_id: &str) -> Result<MaintenanceDetail, ApiError> {
        self.calls.lock().unwrap().push("fetch".to_string());
        Ok(self.detail.lock().unwrap().clone())
    }

    async fn save_checklist_item(
        &self,
        req: &ChecklistItemRequest,
    ) -> Result<MaintenanceRecord, ApiError> {
        self.begin(format!("checklist:{}", req.item_id))?;
        if self.failing_items.lock().unwrap().contains(&req.item_id) {
            return Err(ApiError::server(
                500,
                Some(format!("No se pudo guardar {}", req.item_id)),
            ));
        }
        let mut detail = self.detail.lock().unwrap();
        if let Some(entry) = detail
            .checklist
            .iter_mut()
            .find(|e| e.item.id == req.item_id)
        {
            // como el servidor: un comentario ausente conserva el anterior
            let previous = entry.response.as_ref().and_then(|r| r.comment.clone());
            entry.response = Some(ChecklistResponse {
                id: format!("resp-{}", req.item_id),
                record_id: req.record_id.clone(),
                item_id: req.item_id.clone(),
                is_completed: req.is_completed,
                comment: req.comment.clone().or(previous),
            });
        }
        detail.record.version += 1;
        Ok(detail.record.clone())
    }

    async fn create_signature(
        &self,
        req: &SignatureRequest,
    ) -> Result<SignatureResponse, ApiError> {
        self.begin(format!("signature:post:{}", req.role))?;
        let mut detail = self.detail.lock().unwrap();
        if detail.signatures.iter().any(|s| s.role == req.role) {
            return Err(ApiError::server(
                409,
                Some(format!("El rol {} ya firmó la orden", req.role)),
            ));
        }
        let saved = Signature {
            id: format!("sig-new-{}", req.role.as_str().to_lowercase()),
            record_id: req.record_id.clone(),
            role: req.role,
            signer_name: req.signer_name.clone(),
            id_number: req.id_number.clone(),
            title: req.title.clone(),
            image: req.image.clone(),
            signed_at: Utc::now(),
        };
        detail.signatures.push(saved.clone());
        detail.record.status = status::after_signature_added(detail.record.status);
        detail.record.version += 1;
        Ok(SignatureResponse {
            success: true,
            signature: saved,
            record: detail.record.clone(),
        })
    }

    async fn update_signature(
        &self,
        req: &SignatureRequest,
    ) -> Result<SignatureResponse, ApiError> {
        self.begin(format!("signature:put:{}", req.role))?;
        let mut detail = self.detail.lock().unwrap();
        let id = req.signature_id.clone().unwrap_or_default();
        let existing = detail
            .signatures
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ApiError::server(404, Some("Firma no encontrada".to_string())))?;
        existing.signer_name = req.signer_name.clone();
        existing.image = req.image.clone();
        existing.signed_at = Utc::now();
        let saved = existing.clone();
        detail.record.version += 1;
        Ok(SignatureResponse {
            success: true,
            signature: saved,
            record: detail.record.clone(),
        })
    }

    async fn delete_signature(&self, signature_id: &str) -> Result<MaintenanceRecord, ApiError> {
        self.begin(format!("signature:delete:{}", signature_id))?;
        let mut detail = self.detail.lock().unwrap();
        detail.signatures.retain(|s| s.id != signature_id);
        detail.record.status =
            status::after_signature_removed(detail.record.status, detail.signatures.len());
        detail.record.version += 1;
        Ok(detail.record.clone())
    }

    async fn complete(&self, req: &CompleteRequest) -> Result<MaintenanceRecord, ApiError> {
        self.begin("complete".to_string())?;
        let mut detail = self.detail.lock().unwrap();
        if let Some(expected) = req.expected_version {
            if expected != detail.record.version {
                return Err(ApiError::server(
                    409,
                    Some("La orden fue modificada por otro usuario".to_string()),
                ));
            }
        }
        detail.record.status = MaintenanceStatus::Completada;
        if req.notes.is_some() {
            detail.record.notes = req.notes.clone();
        }
        detail.record.completed_at = Some(Utc::now());
        detail.record.version += 1;
        Ok(detail.record.clone())
    }

    async fn check_conflict(
        &self,
        _equipment_id: &str,
        _date: NaiveDate,
    ) -> Result<Option<Conflict>, ApiError> {
        Ok(None)
    }
}

// ------------------------------------------------------------
// Base de datos en memoria
// ------------------------------------------------------------

const SEED_SQL: &str = r#"
INSERT INTO equipment (id, name, operating_status) VALUES
    ('eq-1', 'Monitor multiparámetro', 'OPERATIVO'),
    ('eq-2', 'Ventilador mecánico', 'EN_MANTENCION');
INSERT INTO templates (id, name) VALUES ('tpl-1', 'Pauta preventiva monitor');
INSERT INTO checklist_items (id, template_id, description, display_order, is_required) VALUES
    ('item-1', 'tpl-1', 'Inspección visual', 1, 1),
    ('item-2', 'tpl-1', 'Prueba de alarmas', 2, 1),
    ('item-3', 'tpl-1', 'Limpieza de sensores', 3, 0);
"#;

/// Una sola conexión: cada conexión a `sqlite::memory:` es una base distinta.
pub async fn memory_pool() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("No se pudo abrir SQLite en memoria");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Fallo al correr migraciones");
    pool.execute(SEED_SQL)
        .await
        .expect("Fallo al insertar datos semilla");
    pool
}

#[derive(Clone)]
pub struct Services {
    pub equipment: EquipmentService,
    pub maintenance: MaintenanceService,
    pub checklist: ChecklistService,
    pub signatures: SignatureService,
    pub completion: CompletionService,
}

pub async fn services() -> Services {
    let pool = memory_pool().await;
    let equipment = EquipmentService::new(pool.clone(), 30);
    Services {
        maintenance: MaintenanceService::new(pool.clone(), equipment.clone()),
        checklist: ChecklistService::new(pool.clone()),
        signatures: SignatureService::new(pool.clone()),
        completion: CompletionService::new(pool),
        equipment,
    }
}
