//! Client-side cache of the practitioner's appointments.
//!
//! Every remote call goes through here. The cache only changes after the server
//! has confirmed a call; failures leave it untouched, record a readable message
//! in [`AppointmentRepository::last_error`] and are returned to the caller.
//! That message stays until a later call succeeds or it is cleared explicitly.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::AppointmentGateway;
use crate::error::{AppointmentError, Result};
use crate::models::{
    Appointment, AppointmentId, AppointmentPatch, AppointmentState, ConsultationType,
    FetchFilters, FetchScope, NewAppointment, StateId,
};

#[derive(Debug, Default)]
struct CacheState {
    appointments: Vec<Appointment>,
    total: usize,
    in_flight: usize,
    error: Option<String>,
}

impl CacheState {
    fn upsert(&mut self, appointment: Appointment) {
        match self.appointments.iter_mut().find(|a| a.id == appointment.id) {
            Some(slot) => *slot = appointment,
            None => {
                self.appointments.push(appointment);
                self.total += 1;
            }
        }
    }

    fn replace(&mut self, appointment: Appointment) {
        if let Some(slot) = self.appointments.iter_mut().find(|a| a.id == appointment.id) {
            *slot = appointment;
        }
    }
}

pub struct AppointmentRepository {
    gateway: Arc<dyn AppointmentGateway>,
    state: Mutex<CacheState>,
}

/// Keeps `loading` raised for as long as a call is outstanding, including when
/// the caller drops the future before it completes.
struct InFlight<'a> {
    repo: &'a AppointmentRepository,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut st = self.repo.state();
        st.in_flight = st.in_flight.saturating_sub(1);
    }
}

impl AppointmentRepository {
    pub fn new(gateway: Arc<dyn AppointmentGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(CacheState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> InFlight<'_> {
        self.state().in_flight += 1;
        InFlight { repo: self }
    }

    /// Cache access after a confirmed call; any earlier error is resolved.
    fn succeed(&self) -> MutexGuard<'_, CacheState> {
        let mut st = self.state();
        st.error = None;
        st
    }

    fn fail(&self, op: &str, err: AppointmentError) -> AppointmentError {
        tracing::warn!(op, error = %err, "appointment request failed");
        self.state().error = Some(err.user_message());
        err
    }

    /* -------------------------
       Snapshot accessors
    --------------------------*/

    pub fn appointments(&self) -> Vec<Appointment> {
        self.state().appointments.clone()
    }

    /// Total as last reported by the server.
    pub fn total(&self) -> usize {
        self.state().total
    }

    pub fn is_loading(&self) -> bool {
        self.state().in_flight > 0
    }

    pub fn last_error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn clear_error(&self) {
        self.state().error = None;
    }

    /* -------------------------
       Catalogs
    --------------------------*/

    pub async fn load_states(&self) -> Result<Vec<AppointmentState>> {
        let _loading = self.begin();

        match self.gateway.list_states().await {
            Ok(states) => {
                tracing::debug!(count = states.len(), "appointment states loaded");
                self.clear_error();
                Ok(states)
            }
            Err(e) => Err(self.fail("load_states", e)),
        }
    }

    pub async fn load_consultation_types(&self) -> Result<Vec<ConsultationType>> {
        let _loading = self.begin();

        match self.gateway.list_consultation_types().await {
            Ok(types) => {
                tracing::debug!(count = types.len(), "consultation types loaded");
                self.clear_error();
                Ok(types)
            }
            Err(e) => Err(self.fail("load_consultation_types", e)),
        }
    }

    /* -------------------------
       Remote operations
    --------------------------*/

    /// Replace the cache with the server's answer for `scope` and `filters`.
    /// A 404 means "nothing there": the cache is emptied and no error is set.
    pub async fn fetch(
        &self,
        scope: FetchScope,
        filters: &FetchFilters,
    ) -> Result<Vec<Appointment>> {
        let _loading = self.begin();

        match self.gateway.list_appointments(scope, filters).await {
            Ok(page) => {
                let (items, total) = page.into_parts();
                tracing::debug!(count = items.len(), total, ?scope, "appointments fetched");
                let mut st = self.succeed();
                st.appointments = items.clone();
                st.total = total;
                Ok(items)
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(?scope, "no appointments found");
                let mut st = self.succeed();
                st.appointments.clear();
                st.total = 0;
                Ok(Vec::new())
            }
            Err(e) => Err(self.fail("fetch", e)),
        }
    }

    /// Fetch a single appointment. Unlike [`fetch`](Self::fetch), 404 is an error here.
    pub async fn get(&self, id: &AppointmentId) -> Result<Appointment> {
        let _loading = self.begin();

        match self.gateway.get_appointment(id).await {
            Ok(a) => {
                self.succeed().replace(a.clone());
                Ok(a)
            }
            Err(e) => Err(self.fail("get", e)),
        }
    }

    /// `data.patient_id` must come from the caller's current patient selection.
    pub async fn create(&self, data: &NewAppointment) -> Result<Appointment> {
        let _loading = self.begin();

        match self.gateway.create_appointment(data).await {
            Ok(created) => {
                tracing::info!(
                    appointment_id = %created.id,
                    patient_id = %created.patient_id,
                    "appointment created"
                );
                self.succeed().upsert(created.clone());
                Ok(created)
            }
            Err(e) => Err(self.fail("create", e)),
        }
    }

    pub async fn update(
        &self,
        id: &AppointmentId,
        patch: &AppointmentPatch,
    ) -> Result<Appointment> {
        let _loading = self.begin();

        match self.gateway.update_appointment(id, patch).await {
            Ok(updated) => {
                tracing::info!(appointment_id = %id, "appointment updated");
                self.succeed().replace(updated.clone());
                Ok(updated)
            }
            Err(e) => Err(self.fail("update", e)),
        }
    }

    pub async fn remove(&self, id: &AppointmentId) -> Result<()> {
        let _loading = self.begin();

        match self.gateway.delete_appointment(id).await {
            Ok(()) => {
                tracing::info!(appointment_id = %id, "appointment deleted");
                let mut st = self.succeed();
                let before = st.appointments.len();
                st.appointments.retain(|a| a.id != *id);
                if st.appointments.len() < before {
                    st.total = st.total.saturating_sub(1);
                }
                Ok(())
            }
            Err(e) => Err(self.fail("remove", e)),
        }
    }

    /// Pass-through: legality is decided by the server, not checked here.
    pub async fn change_state(
        &self,
        id: &AppointmentId,
        state_id: &StateId,
    ) -> Result<Appointment> {
        let _loading = self.begin();

        match self.gateway.change_state(id, state_id).await {
            Ok(updated) => {
                tracing::info!(appointment_id = %id, %state_id, "appointment state changed");
                self.succeed().replace(updated.clone());
                Ok(updated)
            }
            Err(e) => Err(self.fail("change_state", e)),
        }
    }
}
