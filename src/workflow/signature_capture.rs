//! workflow/signature_capture.rs
//! Sesión de captura de una firma. Los modos (texto cursivo, trazo libre,
//! imagen subida, huella simulada) son excluyentes; todos terminan en una
//! imagen rasterizada más los datos de identidad del firmante.

use crate::models::signature_model::{Signature, SignatureRequest, SignatureRole};
use crate::workflow::errors::{Result, WorkflowError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    Typed,
    Drawn,
    Uploaded,
    Biometric,
}

/// Firma validada y lista para enviarse
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureDraft {
    pub role: SignatureRole,
    pub signer_name: String,
    pub id_number: Option<String>,
    pub title: Option<String>,
    pub image: String,
    /// Presente cuando se edita una firma existente
    pub signature_id: Option<String>,
}

impl SignatureDraft {
    pub fn into_request(self, record_id: &str) -> SignatureRequest {
        SignatureRequest {
            record_id: record_id.to_string(),
            role: self.role,
            signer_name: self.signer_name,
            id_number: self.id_number,
            title: self.title,
            image: self.image,
            signature_id: self.signature_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CaptureSession {
    role: SignatureRole,
    mode: Option<CaptureMode>,
    image: Option<String>,
    signer_name: String,
    id_number: Option<String>,
    title: Option<String>,
    signature_id: Option<String>,
}

impl CaptureSession {
    pub fn new(role: SignatureRole) -> Self {
        Self {
            role,
            mode: None,
            image: None,
            signer_name: String::new(),
            id_number: None,
            title: None,
            signature_id: None,
        }
    }

    /// Pre-carga la sesión con los datos de una firma existente.
    pub fn from_existing(signature: &Signature) -> Self {
        Self {
            role: signature.role,
            mode: None,
            image: Some(signature.image.clone()),
            signer_name: signature.signer_name.clone(),
            id_number: signature.id_number.clone(),
            title: signature.title.clone(),
            signature_id: Some(signature.id.clone()),
        }
    }

    pub fn role(&self) -> SignatureRole {
        self.role
    }

    pub fn mode(&self) -> Option<CaptureMode> {
        self.mode
    }

    /// Cambiar de modo descarta la imagen capturada hasta ahora.
    pub fn select_mode(&mut self, mode: CaptureMode) {
        if self.mode != Some(mode) {
            self.mode = Some(mode);
            self.image = None;
        }
    }

    /// Recibe los bytes rasterizados del modo activo y los guarda como data URI.
    pub fn attach_image(&mut self, mode: CaptureMode, mime: &str, bytes: &[u8]) {
        self.select_mode(mode);
        self.image = if bytes.is_empty() {
            None
        } else {
            Some(format!("data:{};base64,{}", mime, base64::encode(bytes)))
        };
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    pub fn set_identity(
        &mut self,
        signer_name: impl Into<String>,
        id_number: Option<String>,
        title: Option<String>,
    ) {
        self.signer_name = signer_name.into();
        self.id_number = id_number.filter(|v| !v.trim().is_empty());
        self.title = title.filter(|v| !v.trim().is_empty());
    }

    /// Validación local previa a cualquier llamada de red.
    pub fn finish(self) -> Result<SignatureDraft> {
        let signer_name = self.signer_name.trim().to_string();
        if signer_name.is_empty() {
            return Err(WorkflowError::Validation(
                "El nombre del firmante es obligatorio".to_string(),
            ));
        }
        let image = match self.image {
            Some(image) if has_image_payload(&image) => image,
            _ => {
                return Err(WorkflowError::Validation(
                    "La firma no puede estar vacía".to_string(),
                ))
            }
        };

        Ok(SignatureDraft {
            role: self.role,
            signer_name,
            id_number: self.id_number,
            title: self.title,
            image,
            signature_id: self.signature_id,
        })
    }
}

/// Una data URI sin contenido tras la coma cuenta como vacía.
pub fn has_image_payload(image: &str) -> bool {
    let image = image.trim();
    if image.is_empty() {
        return false;
    }
    match image.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, payload)| !payload.trim().is_empty())
            .unwrap_or(false),
        None => true,
    }
}
