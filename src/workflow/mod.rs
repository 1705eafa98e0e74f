//! workflow/mod.rs
//! Motor de flujo de la orden de mantenimiento: reglas puras (estados,
//! compuerta de finalización, detector de conflictos) y el estado compartido
//! que usan el checklist y el panel de firmas.

pub mod checklist_sync;
pub mod checklist_tracker;
pub mod completion_gate;
pub mod conflict_detector;
pub mod drag_selection;
pub mod errors;
pub mod optimistic;
pub mod session;
pub mod signature_capture;
pub mod signature_workflow;
pub mod status;

pub use errors::WorkflowError;
pub use session::{MaintenanceSession, RecordState, SharedRecord};
