//! Decides which cached appointments are visible.
//!
//! Text and status are applied locally on every change. The date scope is not:
//! a single-day scope becomes `fechaInicio` on the next fetch and the server
//! defines the day boundary.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{Appointment, FetchFilters, StateId};
use crate::patient::{Patient, PatientRoster};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateScope {
    Day(NaiveDate),
    #[default]
    All,
}

impl DateScope {
    /// Start of the selected day, UTC.
    pub fn date_from(&self) -> Option<DateTime<Utc>> {
        match self {
            DateScope::Day(date) => date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
            DateScope::All => None,
        }
    }

    pub fn is_single_day(&self) -> bool {
        matches!(self, DateScope::Day(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterContext {
    pub search_text: String,
    pub state_id: Option<StateId>,
    pub date_scope: DateScope,
}

impl FilterContext {
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn with_state(mut self, state_id: Option<StateId>) -> Self {
        self.state_id = state_id;
        self
    }

    pub fn with_scope(mut self, scope: DateScope) -> Self {
        self.date_scope = scope;
        self
    }

    /// Parameters to send with the fetch that backs this context.
    pub fn fetch_filters(&self) -> FetchFilters {
        FetchFilters {
            state_id: self.state_id.clone(),
            date_from: self.date_scope.date_from(),
            ..Default::default()
        }
    }

    /// Whether a single appointment passes the text and status clauses.
    pub fn matches(&self, appointment: &Appointment, patient: Option<&Patient>) -> bool {
        self.matches_status(appointment) && self.matches_text(appointment, patient)
    }

    fn matches_status(&self, appointment: &Appointment) -> bool {
        self.state_id
            .as_ref()
            .is_none_or(|id| appointment.state_id == *id)
    }

    fn matches_text(&self, appointment: &Appointment, patient: Option<&Patient>) -> bool {
        let needle = self.search_text.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let hit = |haystack: &str| haystack.to_lowercase().contains(&needle);

        patient.is_some_and(|p| hit(&p.display_name()) || p.email.as_deref().is_some_and(hit))
            || appointment.reason.as_deref().is_some_and(hit)
    }
}

/// Appointments that pass `ctx`. The embedded patient wins over the roster.
pub fn filter_appointments(
    appointments: &[Appointment],
    ctx: &FilterContext,
    roster: &PatientRoster,
) -> Vec<Appointment> {
    appointments
        .iter()
        .filter(|a| {
            let patient = a.patient.as_ref().or_else(|| roster.get(&a.patient_id));
            ctx.matches(a, patient)
        })
        .cloned()
        .collect()
}
