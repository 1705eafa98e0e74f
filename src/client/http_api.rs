//! client/http_api.rs
//! Implementación de `MaintenanceApi` con reqwest (JSON sobre HTTP).
//! Sin reintentos automáticos: cada mutación es de un solo intento.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::client::api::{ApiError, MaintenanceApi};
use crate::models::checklist_model::ChecklistItemRequest;
use crate::models::equipment_model::{Conflict, ConflictResponse};
use crate::models::maintenance_model::{
    CompleteRequest, MaintenanceDetail, MaintenanceRecord, MutationResponse,
};
use crate::models::signature_model::{SignatureRequest, SignatureResponse};

#[derive(Clone, Debug)]
pub struct HttpMaintenanceApi {
    http_client: Client,
    base_url: String,
}

impl HttpMaintenanceApi {
    /// `base_url` apunta a la raíz del servicio, p.e. http://localhost:5022
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http_client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/maintenance{}", self.base_url, path)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let resp = self.send(request).await?;
        resp.json::<T>().await.map_err(|e| {
            log::error!("(send_json) Respuesta no válida: {:?}", e);
            ApiError::transport(format!("Respuesta no válida: {}", e))
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let resp = request.send().await.map_err(|e| {
            log::error!("(send) Fallo de transporte: {:?}", e);
            ApiError::transport(e.to_string())
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        // El servidor responde {"success": false, "error": "..."}
        let body_txt = resp.text().await.unwrap_or_default();
        log::warn!(
            "(send) Respuesta no exitosa status={} body='{}'",
            status,
            body_txt
        );
        let message = serde_json::from_str::<serde_json::Value>(&body_txt)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string));
        Err(ApiError::server(status.as_u16(), message))
    }
}

#[async_trait]
impl MaintenanceApi for HttpMaintenanceApi {
    async fn fetch_record(&self, record_id: &str) -> Result<MaintenanceDetail, ApiError> {
        let url = self.url(&format!("/{}", urlencoding::encode(record_id)));
        self.send_json(self.http_client.get(url)).await
    }

    async fn save_checklist_item(
        &self,
        req: &ChecklistItemRequest,
    ) -> Result<MaintenanceRecord, ApiError> {
        let request = self.http_client.post(self.url("/checklist-item")).json(req);
        let resp: MutationResponse = self.send_json(request).await?;
        Ok(resp.record)
    }

    async fn create_signature(
        &self,
        req: &SignatureRequest,
    ) -> Result<SignatureResponse, ApiError> {
        let request = self.http_client.post(self.url("/signature")).json(req);
        self.send_json(request).await
    }

    async fn update_signature(
        &self,
        req: &SignatureRequest,
    ) -> Result<SignatureResponse, ApiError> {
        let request = self.http_client.put(self.url("/signature")).json(req);
        self.send_json(request).await
    }

    async fn delete_signature(&self, signature_id: &str) -> Result<MaintenanceRecord, ApiError> {
        let url = self.url(&format!(
            "/signature?signatureId={}",
            urlencoding::encode(signature_id)
        ));
        let resp: MutationResponse = self.send_json(self.http_client.delete(url)).await?;
        Ok(resp.record)
    }

    async fn complete(&self, req: &CompleteRequest) -> Result<MaintenanceRecord, ApiError> {
        let request = self.http_client.post(self.url("/complete")).json(req);
        let resp: MutationResponse = self.send_json(request).await?;
        Ok(resp.record)
    }

    async fn check_conflict(
        &self,
        equipment_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Conflict>, ApiError> {
        let url = self.url(&format!(
            "/conflict?equipmentId={}&date={}",
            urlencoding::encode(equipment_id),
            date.format("%Y-%m-%d")
        ));
        let resp: ConflictResponse = self.send_json(self.http_client.get(url)).await?;
        Ok(resp.conflict)
    }
}
