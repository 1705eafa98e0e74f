//! logger.rs
//! Configuración del logger usando env_logger.

/// Nivel por defecto si no viene RUST_LOG. sqlx queda en warn para no
/// registrar cada consulta.
const DEFAULT_FILTER: &str = "info,sqlx=warn";

pub fn init_logger() {
    let log_env = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());

    // try_init: en tests puede haberse inicializado antes
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_env))
        .format_timestamp_secs()
        .try_init();
}
