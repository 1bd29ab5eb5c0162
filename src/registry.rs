//! Catalogs of appointment states and consultation types.

use crate::error::{AppointmentError, Result};
use crate::models::{AppointmentState, ConsultationType, ConsultationTypeId, StateId};

/// Names accepted for the initial state when the configured one is absent.
const SCHEDULED_FALLBACKS: &[&str] = &["Programada", "Scheduled"];

#[derive(Debug, Clone, Default)]
pub struct AppointmentStateRegistry {
    states: Vec<AppointmentState>,
}

impl AppointmentStateRegistry {
    pub fn new(states: Vec<AppointmentState>) -> Self {
        Self { states }
    }

    pub fn list(&self) -> &[AppointmentState] {
        &self.states
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, id: &StateId) -> Option<&AppointmentState> {
        self.states.iter().find(|s| s.id == *id)
    }

    /// Unknown ids are reported as not final.
    pub fn is_final(&self, id: &StateId) -> bool {
        self.get(id).is_some_and(|s| s.is_final)
    }

    /// First state whose name matches exactly.
    pub fn by_name(&self, name: &str) -> Option<&AppointmentState> {
        self.states.iter().find(|s| s.name == name)
    }

    pub fn resolve(&self, id: &StateId) -> Result<&AppointmentState> {
        self.get(id).ok_or_else(|| AppointmentError::DanglingReference {
            kind: "appointment state",
            id: id.clone(),
        })
    }

    /// The state new appointments start in: `preferred` if present, then the
    /// usual Scheduled spellings.
    pub fn scheduled(&self, preferred: &str) -> Option<&AppointmentState> {
        std::iter::once(preferred)
            .chain(SCHEDULED_FALLBACKS.iter().copied())
            .find_map(|name| self.by_name(name))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConsultationTypeRegistry {
    types: Vec<ConsultationType>,
}

impl ConsultationTypeRegistry {
    pub fn new(types: Vec<ConsultationType>) -> Self {
        Self { types }
    }

    pub fn list(&self) -> &[ConsultationType] {
        &self.types
    }

    pub fn get(&self, id: &ConsultationTypeId) -> Option<&ConsultationType> {
        self.types.iter().find(|t| t.id == *id)
    }

    pub fn resolve(&self, id: &ConsultationTypeId) -> Result<&ConsultationType> {
        self.get(id).ok_or_else(|| AppointmentError::DanglingReference {
            kind: "consultation type",
            id: id.clone(),
        })
    }
}
