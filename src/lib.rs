//! lib.rs
//! Servicio de órdenes de mantenimiento de equipos médicos: servidor HTTP
//! (actix + SQLite) y motor de flujo del lado cliente (checklist, firmas,
//! finalización optimista y detección de conflictos de agenda).

pub mod app;
pub mod client;
pub mod config;
pub mod db;
pub mod handlers;
pub mod logger;
pub mod models;
pub mod services;
pub mod workflow;

#[cfg(test)]
mod tests;
