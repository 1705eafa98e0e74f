use std::io;

use actix_web::{web, App, HttpServer};
use dotenv::dotenv;

use maintenance_service::app;
use maintenance_service::config::app_config::AppConfig;
use maintenance_service::db::setup_database;
use maintenance_service::logger::init_logger;
use maintenance_service::services::checklist_service::ChecklistService;
use maintenance_service::services::completion_service::CompletionService;
use maintenance_service::services::equipment_service::EquipmentService;
use maintenance_service::services::maintenance_service::MaintenanceService;
use maintenance_service::services::signature_service::SignatureService;

fn startup_error(e: anyhow::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{:#}", e))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = AppConfig::from_env().map_err(startup_error)?;

    // Conectarnos a la DB
    let db_pool = setup_database(&config.database_url)
        .await
        .map_err(startup_error)?;

    let equipment_service = EquipmentService::new(db_pool.clone(), config.conflict_window_days);
    let maintenance_service = MaintenanceService::new(db_pool.clone(), equipment_service.clone());
    if let Err(e) = maintenance_service.run_migrations().await {
        log::error!("Fallo en migraciones de mantenimiento: {:?}", e);
        return Err(startup_error(e));
    }
    let checklist_service = ChecklistService::new(db_pool.clone());
    let signature_service = SignatureService::new(db_pool.clone());
    let completion_service = CompletionService::new(db_pool.clone());

    // Levantar servidor
    let (host, port) = config.bind_address();
    log::info!("Levantando servidor en {}:{}", host, port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(equipment_service.clone()))
            .app_data(web::Data::new(maintenance_service.clone()))
            .app_data(web::Data::new(checklist_service.clone()))
            .app_data(web::Data::new(signature_service.clone()))
            .app_data(web::Data::new(completion_service.clone()))
            .configure(app::init_app)
    })
    .workers(config.workers)
    .bind((host, port))?
    .run()
    .await
}
