//! workflow/checklist_tracker.rs
//! Mapa único `itemId -> completado` compartido por la tabla del checklist y
//! el panel de firmas. Los cambios quedan en memoria hasta guardar o completar.

use std::collections::HashMap;

use crate::models::checklist_model::{ChecklistEntry, ChecklistResponseInput};
use crate::workflow::drag_selection::DragSelection;
use crate::workflow::errors::{Result, WorkflowError};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChecklistTracker {
    /// Ids en orden de despliegue
    order: Vec<String>,
    values: HashMap<String, bool>,
    comments: HashMap<String, String>,
    /// Últimos valores confirmados por el servidor
    baseline: HashMap<String, bool>,
    /// Últimos comentarios confirmados por el servidor
    comment_baseline: HashMap<String, String>,
    gesture: DragSelection,
    /// Copia tomada al entrar en modo edición administrativa
    saved_responses: Option<HashMap<String, bool>>,
}

impl ChecklistTracker {
    /// Construye el mapa a partir de pares (ítem, valor) ya ordenados.
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        let mut tracker = ChecklistTracker::default();
        for (id, value) in items {
            let id = id.into();
            if tracker.values.insert(id.clone(), value).is_none() {
                tracker.order.push(id.clone());
            }
            tracker.baseline.insert(id, value);
        }
        tracker
    }

    /// Inicializa desde las respuestas persistidas. Ítems sin respuesta = false.
    pub fn from_entries(entries: &[ChecklistEntry]) -> Self {
        let mut sorted: Vec<&ChecklistEntry> = entries.iter().collect();
        sorted.sort_by_key(|e| e.item.display_order);

        let mut tracker = Self::new(sorted.iter().map(|e| {
            (
                e.item.id.clone(),
                e.response.as_ref().map(|r| r.is_completed).unwrap_or(false),
            )
        }));
        for entry in sorted {
            if let Some(comment) = entry
                .response
                .as_ref()
                .and_then(|r| r.comment.clone())
                .filter(|c| !c.trim().is_empty())
            {
                tracker.comments.insert(entry.item.id.clone(), comment);
            }
        }
        tracker.comment_baseline = tracker.comments.clone();
        tracker
    }

    pub fn item_ids(&self) -> &[String] {
        &self.order
    }

    pub fn is_completed(&self, item_id: &str) -> Option<bool> {
        self.values.get(item_id).copied()
    }

    /// Cuenta solo los valores en `true`; es lo que habilita la finalización.
    pub fn completed_count(&self) -> usize {
        self.values.values().filter(|v| **v).count()
    }

    /// Invierte un ítem y devuelve su nuevo valor.
    pub fn toggle(&mut self, item_id: &str) -> Result<bool> {
        let value = self.value_mut(item_id)?;
        *value = !*value;
        Ok(*value)
    }

    /// Fuerza un valor. Pasa por `toggle` para que haya una sola vía de mutación.
    pub fn set(&mut self, item_id: &str, value: bool) -> Result<()> {
        if self.value_of(item_id)? != value {
            self.toggle(item_id)?;
        }
        Ok(())
    }

    pub fn comment(&self, item_id: &str) -> Option<&str> {
        self.comments.get(item_id).map(String::as_str)
    }

    pub fn set_comment(&mut self, item_id: &str, comment: Option<String>) -> Result<()> {
        self.value_of(item_id)?;
        match comment.filter(|c| !c.trim().is_empty()) {
            Some(text) => {
                self.comments.insert(item_id.to_string(), text);
            }
            None => {
                self.comments.remove(item_id);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------
    // Gesto de arrastre
    // ------------------------------------------------------------

    /// Presión sobre un ítem: lo invierte y fija ese valor como objetivo.
    pub fn begin_drag(&mut self, item_id: &str) -> Result<bool> {
        let prior = self.value_of(item_id)?;
        let target = self.gesture.pointer_down(prior);
        self.set(item_id, target)?;
        Ok(target)
    }

    /// El puntero entra en un ítem durante el gesto.
    pub fn drag_enter(&mut self, item_id: &str) -> Result<Option<bool>> {
        self.value_of(item_id)?;
        match self.gesture.pointer_enter() {
            Some(target) => {
                self.set(item_id, target)?;
                Ok(Some(target))
            }
            None => Ok(None),
        }
    }

    /// Liberación global del puntero.
    pub fn end_drag(&mut self) {
        self.gesture.pointer_up();
    }

    pub fn gesture(&self) -> DragSelection {
        self.gesture
    }

    // ------------------------------------------------------------
    // Guardado normal (diferencias contra lo persistido)
    // ------------------------------------------------------------

    /// Ítems cuyo valor o comentario difiere de lo persistido.
    pub fn unsaved_changes(&self) -> Vec<(String, bool)> {
        self.order
            .iter()
            .filter_map(|id| {
                let current = self.values.get(id).copied().unwrap_or(false);
                let previous = self.baseline.get(id).copied().unwrap_or(false);
                let comment_changed = self.comments.get(id) != self.comment_baseline.get(id);
                (current != previous || comment_changed).then(|| (id.clone(), current))
            })
            .collect()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        !self.unsaved_changes().is_empty()
    }

    /// Comentario a enviar al guardar. Un comentario borrado localmente viaja
    /// como cadena vacía: un valor ausente conserva el del servidor.
    pub fn comment_for_save(&self, item_id: &str) -> Option<String> {
        match self.comments.get(item_id) {
            Some(text) => Some(text.clone()),
            None if self.comment_baseline.contains_key(item_id) => Some(String::new()),
            None => None,
        }
    }

    /// Registra que el servidor confirmó el valor y el comentario de un ítem.
    pub fn mark_persisted(&mut self, item_id: &str, value: bool, comment: Option<&str>) {
        self.baseline.insert(item_id.to_string(), value);
        match comment.filter(|c| !c.trim().is_empty()) {
            Some(text) => {
                self.comment_baseline
                    .insert(item_id.to_string(), text.to_string());
            }
            None => {
                self.comment_baseline.remove(item_id);
            }
        }
        if let Some(saved) = self.saved_responses.as_mut() {
            saved.insert(item_id.to_string(), value);
        }
    }

    /// Todo el mapa actual pasa a ser la línea base.
    pub fn mark_all_persisted(&mut self) {
        self.baseline = self.values.clone();
        self.comment_baseline = self.comments.clone();
    }

    /// Reemplaza valores y línea base con lo que informó el servidor.
    pub fn reset_from(&mut self, fresh: ChecklistTracker) {
        let gesture = self.gesture;
        let saved = self.saved_responses.take();
        *self = fresh;
        self.gesture = gesture;
        self.saved_responses = saved;
    }

    /// Respuestas en orden de despliegue, listas para enviarse.
    pub fn responses(&self) -> Vec<ChecklistResponseInput> {
        self.order
            .iter()
            .map(|id| ChecklistResponseInput {
                item_id: id.clone(),
                is_completed: self.values.get(id).copied().unwrap_or(false),
                comment: self.comment_for_save(id),
            })
            .collect()
    }

    pub fn values(&self) -> &HashMap<String, bool> {
        &self.values
    }

    // ------------------------------------------------------------
    // Modo edición administrativa
    // ------------------------------------------------------------

    pub fn enter_admin_edit(&mut self) {
        if self.saved_responses.is_none() {
            self.saved_responses = Some(self.values.clone());
        }
    }

    pub fn is_admin_editing(&self) -> bool {
        self.saved_responses.is_some()
    }

    pub fn saved_responses(&self) -> Option<&HashMap<String, bool>> {
        self.saved_responses.as_ref()
    }

    /// Ítems cuyo valor difiere de la copia tomada al entrar en edición.
    pub fn admin_changes(&self) -> Vec<(String, bool)> {
        match &self.saved_responses {
            Some(saved) => self.diff_against(saved),
            None => Vec::new(),
        }
    }

    /// Revierte cada diferencia por la misma vía de `toggle` y sale del modo.
    pub fn cancel_admin_edit(&mut self) -> Result<()> {
        let Some(saved) = self.saved_responses.clone() else {
            return Ok(());
        };
        for (item_id, _) in self.diff_against(&saved) {
            self.toggle(&item_id)?;
        }
        self.saved_responses = None;
        Ok(())
    }

    pub fn finish_admin_edit(&mut self) {
        self.saved_responses = None;
    }

    fn diff_against(&self, reference: &HashMap<String, bool>) -> Vec<(String, bool)> {
        self.order
            .iter()
            .filter_map(|id| {
                let current = self.values.get(id).copied().unwrap_or(false);
                let previous = reference.get(id).copied().unwrap_or(false);
                (current != previous).then(|| (id.clone(), current))
            })
            .collect()
    }

    fn value_of(&self, item_id: &str) -> Result<bool> {
        self.values
            .get(item_id)
            .copied()
            .ok_or_else(|| WorkflowError::UnknownItem(item_id.to_string()))
    }

    fn value_mut(&mut self, item_id: &str) -> Result<&mut bool> {
        self.values
            .get_mut(item_id)
            .ok_or_else(|| WorkflowError::UnknownItem(item_id.to_string()))
    }
}
