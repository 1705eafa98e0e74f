//! db.rs
//! Conexión a SQLite. El archivo (y su carpeta) se crean si no existen.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

/// Crea la carpeta contenedora del archivo de la base, si la URL apunta a uno.
fn ensure_parent_dir(database_url: &str) -> Result<()> {
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("No se pudo crear directorio {}", parent.display()))?;
        }
    }
    Ok(())
}

pub async fn setup_database(database_url: &str) -> Result<Pool<Sqlite>> {
    ensure_parent_dir(database_url)?;

    log::info!("Conectando a SQLite en {}", database_url);
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("URL de base de datos inválida: {}", database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("No se pudo conectar a la base de datos SQLite")?;

    // Verificar la conexión
    let conn = db_pool.acquire().await.context("Falló la conexión")?;
    drop(conn);

    Ok(db_pool)
}
