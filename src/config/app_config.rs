//! config/app_config.rs
//! Configuración del servidor de mantenimiento, con valores por defecto
//! sobreescribibles por variables de entorno (o un .env cargado con dotenv).

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::workflow::conflict_detector::DEFAULT_WINDOW_DAYS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// URL de SQLite, por ejemplo `sqlite:./data/maintenance.db`
    pub database_url: String,
    /// Ventana (en días) del detector de conflictos
    pub conflict_window_days: i64,
    pub workers: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 5022,
            database_url: "sqlite:./data/maintenance.db".to_string(),
            conflict_window_days: DEFAULT_WINDOW_DAYS,
            workers: 1,
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Valor inválido para {}: {}", name, raw)),
        _ => Ok(default),
    }
}

impl AppConfig {
    /// Lee `MAINT_*` del entorno; lo que falte queda con el valor por defecto.
    pub fn from_env() -> Result<Self> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            host: env::var("MAINT_HOST").unwrap_or(defaults.host),
            port: parse_var("MAINT_PORT", defaults.port)?,
            database_url: env::var("MAINT_DATABASE_URL").unwrap_or(defaults.database_url),
            conflict_window_days: parse_var(
                "MAINT_CONFLICT_WINDOW_DAYS",
                defaults.conflict_window_days,
            )?,
            workers: parse_var("MAINT_WORKERS", defaults.workers)?,
        };
        if config.conflict_window_days <= 0 {
            anyhow::bail!(
                "MAINT_CONFLICT_WINDOW_DAYS debe ser positivo (recibido {})",
                config.conflict_window_days
            );
        }
        Ok(config)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
