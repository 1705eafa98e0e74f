//! services/errors.rs
//! Errores de la capa de negocio del servidor. Los handlers los traducen a
//! códigos HTTP.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// Datos de entrada inválidos (400)
    #[error("{0}")]
    Validation(String),
    /// Entidad inexistente (404)
    #[error("{0}")]
    NotFound(String),
    /// Rol ya firmado o versión desactualizada (409)
    #[error("{0}")]
    Conflict(String),
    /// Regla de negocio incumplida: compuerta, orden cerrada (422)
    #[error("{0}")]
    Rule(String),
    #[error("Error de base de datos: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Error interno: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    /// Una violación de unicidad pasa a `Conflict` con el mensaje dado; el
    /// resto queda como error de base de datos.
    pub fn on_unique_violation(err: sqlx::Error, message: impl FnOnce() -> String) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ServiceError::Conflict(message())
            }
            _ => ServiceError::Database(err),
        }
    }
}
