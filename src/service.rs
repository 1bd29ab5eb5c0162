//! Session-level entry point.
//!
//! One [`AppointmentService`] is built per practitioner session and handed by
//! reference to whatever needs it. It owns the repository, the catalogs and the
//! patient roster, validates input before anything is sent, and reports
//! outcomes through the [`NotificationPort`]. A failed operation is reported
//! there once and then returned; callers should not report it again.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{Local, NaiveDate, TimeZone};

use crate::api::{AppointmentGateway, HttpGateway};
use crate::config::Config;
use crate::error::{AppointmentError, Result};
use crate::filter::{FilterContext, filter_appointments};
use crate::models::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentPatch, AppointmentState,
    ConsultationType, FetchScope, NewAppointment, StateId,
};
use crate::notify::{Notice, NotificationPort};
use crate::patient::{Patient, PatientRoster};
use crate::registry::{AppointmentStateRegistry, ConsultationTypeRegistry};
use crate::repository::AppointmentRepository;
use crate::stats::{AppointmentStats, aggregate};
use crate::transitions::transition_menu;

/// One visible appointment with its references resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentRow {
    pub appointment: Appointment,
    pub state: AppointmentState,
    pub consultation_type: ConsultationType,
    pub patient: Option<Patient>,
    /// States offered in the row's transition menu.
    pub transitions: Vec<AppointmentState>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppointmentBoard {
    pub rows: Vec<AppointmentRow>,
    pub stats: AppointmentStats,
}

pub struct AppointmentService {
    repo: AppointmentRepository,
    notifier: Arc<dyn NotificationPort>,
    states: RwLock<AppointmentStateRegistry>,
    types: RwLock<ConsultationTypeRegistry>,
    patients: RwLock<PatientRoster>,
    scope: FetchScope,
    default_state_name: String,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl AppointmentService {
    pub fn new(
        gateway: Arc<dyn AppointmentGateway>,
        notifier: Arc<dyn NotificationPort>,
        cfg: &Config,
    ) -> Self {
        Self {
            repo: AppointmentRepository::new(gateway),
            notifier,
            states: RwLock::default(),
            types: RwLock::default(),
            patients: RwLock::default(),
            scope: FetchScope::Mine,
            default_state_name: cfg.default_state_name.clone(),
        }
    }

    /// Service talking to the REST endpoint named in `cfg`.
    pub fn connect(cfg: &Config, notifier: Arc<dyn NotificationPort>) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpGateway::new(cfg)?), notifier, cfg))
    }

    /// Switch between practitioner-scoped and global listings.
    pub fn with_scope(mut self, scope: FetchScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn repository(&self) -> &AppointmentRepository {
        &self.repo
    }

    pub fn states(&self) -> AppointmentStateRegistry {
        read(&self.states).clone()
    }

    pub fn consultation_types(&self) -> ConsultationTypeRegistry {
        read(&self.types).clone()
    }

    pub fn set_patients(&self, patients: impl IntoIterator<Item = Patient>) {
        *write(&self.patients) = PatientRoster::new(patients);
    }

    fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.notifier.notify(Notice::error(e.user_message()));
        }
        result
    }

    /* -------------------------
       Catalogs
    --------------------------*/

    /// Load the state and consultation-type catalogs.
    pub async fn load_catalogs(&self) -> Result<()> {
        let (states, types) = tokio::join!(
            self.repo.load_states(),
            self.repo.load_consultation_types()
        );
        let (states, types) = self.report(states.and_then(|s| types.map(|t| (s, t))))?;

        tracing::info!(states = states.len(), types = types.len(), "catalogs loaded");
        *write(&self.states) = AppointmentStateRegistry::new(states);
        *write(&self.types) = ConsultationTypeRegistry::new(types);
        Ok(())
    }

    /* -------------------------
       Listing
    --------------------------*/

    /// Refetch for `ctx`. Only the date scope and status travel to the server.
    pub async fn refresh(&self, ctx: &FilterContext) -> Result<Vec<Appointment>> {
        let result = self.repo.fetch(self.scope, &ctx.fetch_filters()).await;
        self.report(result)
    }

    /// Visible rows and summary for `ctx`, with "today" taken from the local clock.
    pub fn board(&self, ctx: &FilterContext) -> Result<AppointmentBoard> {
        self.board_at(ctx, Local::now().date_naive(), &Local)
    }

    /// Recomputed from the cache on every call; nothing is memoized.
    pub fn board_at<Tz: TimeZone>(
        &self,
        ctx: &FilterContext,
        today: NaiveDate,
        tz: &Tz,
    ) -> Result<AppointmentBoard> {
        let board = self.build_board(ctx, today, tz);
        self.report(board)
    }

    fn build_board<Tz: TimeZone>(
        &self,
        ctx: &FilterContext,
        today: NaiveDate,
        tz: &Tz,
    ) -> Result<AppointmentBoard> {
        let states = read(&self.states);
        let types = read(&self.types);
        let patients = read(&self.patients);

        let cached = self.repo.appointments();
        let filtered = filter_appointments(&cached, ctx, &patients);

        let mut rows = Vec::with_capacity(filtered.len());
        for appointment in filtered {
            let dangling = |e: &AppointmentError| {
                tracing::warn!(appointment_id = %appointment.id, error = %e, "dangling reference");
            };
            let state = states.resolve(&appointment.state_id).inspect_err(dangling)?;
            let consultation_type = types
                .resolve(&appointment.consultation_type_id)
                .inspect_err(dangling)?;
            let patient = appointment
                .patient
                .clone()
                .or_else(|| patients.get(&appointment.patient_id).cloned());

            rows.push(AppointmentRow {
                transitions: transition_menu(state, states.list()),
                state: state.clone(),
                consultation_type: consultation_type.clone(),
                patient,
                appointment,
            });
        }

        let stats = aggregate(
            rows.iter().map(|r| (&r.appointment, &r.state)),
            self.repo.total(),
            ctx.date_scope,
            today,
            tz,
        );
        Ok(AppointmentBoard { rows, stats })
    }

    /// Transition menu for a single appointment. Returned, not reported.
    pub fn transitions_for(&self, appointment: &Appointment) -> Result<Vec<AppointmentState>> {
        let states = read(&self.states);
        let current = states.resolve(&appointment.state_id)?;
        Ok(transition_menu(current, states.list()))
    }

    /* -------------------------
       Mutations
    --------------------------*/

    fn validate_draft(&self, patient: &Patient, draft: AppointmentDraft) -> Result<NewAppointment> {
        let scheduled_at = draft.scheduled_at.ok_or_else(|| {
            AppointmentError::validation("scheduledAt", "The appointment date is required")
        })?;
        let consultation_type_id = draft.consultation_type_id.ok_or_else(|| {
            AppointmentError::validation("consultationTypeId", "The consultation type is required")
        })?;
        read(&self.types).resolve(&consultation_type_id)?;

        let states = read(&self.states);
        let state_id = match &draft.state_id {
            Some(id) => states.resolve(id)?.id.clone(),
            None => states
                .scheduled(&self.default_state_name)
                .map(|s| s.id.clone())
                .ok_or_else(|| {
                    AppointmentError::validation("stateId", "The appointment state is required")
                })?,
        };

        if let (Some(start), Some(end)) = (draft.started_at, draft.ended_at) {
            if end <= start {
                return Err(AppointmentError::validation(
                    "endedAt",
                    "The end time must be after the start time",
                ));
            }
        }

        Ok(NewAppointment {
            patient_id: patient.id.clone(),
            scheduled_at,
            consultation_type_id,
            state_id,
            started_at: draft.started_at,
            ended_at: draft.ended_at,
            reason: clean_text(draft.reason),
            observations: clean_text(draft.observations),
            diagnosis: clean_text(draft.diagnosis),
            treatment_recommendation: clean_text(draft.treatment_recommendation),
        })
    }

    fn validate_patch(&self, mut patch: AppointmentPatch) -> Result<AppointmentPatch> {
        if let Some(id) = &patch.consultation_type_id {
            read(&self.types).resolve(id)?;
        }
        if let Some(id) = &patch.state_id {
            read(&self.states).resolve(id)?;
        }
        if let (Some(start), Some(end)) = (patch.started_at, patch.ended_at) {
            if end <= start {
                return Err(AppointmentError::validation(
                    "endedAt",
                    "The end time must be after the start time",
                ));
            }
        }
        let trim = |s: Option<String>| s.map(|v| v.trim().to_string());
        patch.reason = trim(patch.reason);
        patch.observations = trim(patch.observations);
        patch.diagnosis = trim(patch.diagnosis);
        patch.treatment_recommendation = trim(patch.treatment_recommendation);
        if patch.is_empty() {
            return Err(AppointmentError::validation("patch", "Nothing to update"));
        }
        Ok(patch)
    }

    /// Create an appointment for the currently selected `patient`.
    pub async fn create_for(
        &self,
        patient: &Patient,
        draft: AppointmentDraft,
    ) -> Result<Appointment> {
        let body = self.report(self.validate_draft(patient, draft))?;
        let created = self.report(self.repo.create(&body).await)?;
        self.notifier.notify(Notice::success(format!(
            "Appointment scheduled for {}",
            created.scheduled_at.format("%Y-%m-%d %H:%M")
        )));
        Ok(created)
    }

    pub async fn edit(&self, id: &AppointmentId, patch: AppointmentPatch) -> Result<Appointment> {
        let patch = self.report(self.validate_patch(patch))?;
        let updated = self.report(self.repo.update(id, &patch).await)?;
        self.notifier.notify(Notice::success("Appointment updated"));
        Ok(updated)
    }

    /// The target must exist in the catalog; whether the move is allowed is up
    /// to the server.
    pub async fn change_state(
        &self,
        id: &AppointmentId,
        state_id: &StateId,
    ) -> Result<Appointment> {
        let target = self.report(read(&self.states).resolve(state_id).cloned())?;
        let updated = self.report(self.repo.change_state(id, state_id).await)?;
        self.notifier
            .notify(Notice::success(format!("Appointment moved to {}", target.name)));
        Ok(updated)
    }

    /// Asks for confirmation first. Returns `false` when the practitioner declined.
    pub async fn delete(&self, id: &AppointmentId) -> Result<bool> {
        if !self
            .notifier
            .confirm("Are you sure you want to delete this appointment?")
            .await
        {
            tracing::debug!(appointment_id = %id, "deletion declined");
            return Ok(false);
        }
        self.report(self.repo.remove(id).await)?;
        self.notifier.notify(Notice::success("Appointment deleted"));
        Ok(true)
    }
}
