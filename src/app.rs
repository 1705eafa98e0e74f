//! app.rs
use crate::handlers::{
    checklist_handler, equipment_handler, maintenance_handler, signature_handler,
};
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/maintenance")
                    .route(
                        "",
                        web::post().to(maintenance_handler::create_maintenance_endpoint),
                    )
                    // antes de "/{id}" para que no lo capture
                    .route(
                        "/conflict",
                        web::get().to(maintenance_handler::conflict_endpoint),
                    )
                    .route(
                        "/checklist-item",
                        web::post().to(checklist_handler::save_checklist_item_endpoint),
                    )
                    .route(
                        "/signature",
                        web::post().to(signature_handler::create_signature_endpoint),
                    )
                    .route(
                        "/signature",
                        web::put().to(signature_handler::update_signature_endpoint),
                    )
                    .route(
                        "/signature",
                        web::delete().to(signature_handler::delete_signature_endpoint),
                    )
                    .route(
                        "/complete",
                        web::post().to(maintenance_handler::complete_endpoint),
                    )
                    .route(
                        "/admin-notes",
                        web::post().to(maintenance_handler::admin_notes_endpoint),
                    )
                    .route(
                        "/cancel",
                        web::post().to(maintenance_handler::cancel_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::get().to(maintenance_handler::get_maintenance_endpoint),
                    ),
            )
            .service(web::scope("/equipment").route(
                "/{id}/history",
                web::get().to(equipment_handler::equipment_history_endpoint),
            )),
    );
}
