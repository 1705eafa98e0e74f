//! workflow/drag_selection.rs
//! Gesto de "presionar y arrastrar" sobre el checklist, independiente de la
//! capa de presentación: Idle -> Selecting(target) -> Idle.

/// Estado del gesto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragSelection {
    #[default]
    Idle,
    /// Todos los ítems que se crucen quedan en `target`.
    Selecting { target: bool },
}

impl DragSelection {
    /// Inicia el gesto sobre un ítem cuyo valor previo es `prior`.
    /// Devuelve el valor que debe aplicarse a ese primer ítem.
    pub fn pointer_down(&mut self, prior: bool) -> bool {
        let target = !prior;
        *self = DragSelection::Selecting { target };
        target
    }

    /// El puntero entra en otro ítem. `Some(valor)` si hay que forzarlo.
    pub fn pointer_enter(&self) -> Option<bool> {
        match self {
            DragSelection::Idle => None,
            DragSelection::Selecting { target } => Some(*target),
        }
    }

    /// Liberación global (en cualquier parte del documento).
    pub fn pointer_up(&mut self) {
        *self = DragSelection::Idle;
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self, DragSelection::Selecting { .. })
    }
}
