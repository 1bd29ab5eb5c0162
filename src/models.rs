use std::collections::BTreeMap;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::id::Id;
use crate::patient::{Patient, PatientId};

pub type AppointmentId = Id;
pub type StateId = Id;
pub type ConsultationTypeId = Id;

/* -------------------------
   Catalog entries
--------------------------*/

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawState", rename_all = "camelCase")]
pub struct AppointmentState {
    pub id: StateId,
    pub name: String,
    pub is_final: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConsultationType", rename_all = "camelCase")]
pub struct ConsultationType {
    pub id: ConsultationTypeId,
    pub name: String,
    pub duration_minutes: u32,
}

// Catalog rows may carry the Spanish and the English spelling side by side;
// each spelling gets its own slot and the first non-empty one wins.

#[derive(Debug, Deserialize)]
struct RawState {
    id: StateId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    nombre: Option<String>,
    #[serde(default, rename = "isFinal")]
    is_final: Option<bool>,
    #[serde(default, rename = "esFinal")]
    es_final: Option<bool>,
}

impl TryFrom<RawState> for AppointmentState {
    type Error = String;

    fn try_from(raw: RawState) -> Result<Self, Self::Error> {
        let name = first_text([raw.name, raw.nombre])
            .ok_or_else(|| format!("appointment state {} has no name", raw.id))?;
        Ok(AppointmentState {
            id: raw.id,
            name,
            is_final: raw.is_final.or(raw.es_final).unwrap_or(false),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawConsultationType {
    id: ConsultationTypeId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    nombre: Option<String>,
    #[serde(default, rename = "durationMinutes")]
    duration_minutes: Option<u32>,
    #[serde(default, rename = "duracionMinutos")]
    duracion_minutos: Option<u32>,
    #[serde(default)]
    duracion: Option<u32>,
}

impl TryFrom<RawConsultationType> for ConsultationType {
    type Error = String;

    fn try_from(raw: RawConsultationType) -> Result<Self, Self::Error> {
        let name = first_text([raw.name, raw.nombre])
            .ok_or_else(|| format!("consultation type {} has no name", raw.id))?;
        let duration_minutes = raw
            .duration_minutes
            .or(raw.duracion_minutos)
            .or(raw.duracion)
            .ok_or_else(|| format!("consultation type {} has no duration", raw.id))?;
        Ok(ConsultationType {
            id: raw.id,
            name,
            duration_minutes,
        })
    }
}

/// First candidate that is non-blank after trimming.
pub(crate) fn first_text<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

impl ConsultationType {
    /// When a consultation of this type starting at `scheduled_at` should end.
    pub fn expected_end(&self, scheduled_at: DateTime<Utc>) -> DateTime<Utc> {
        scheduled_at + Duration::minutes(i64::from(self.duration_minutes))
    }
}

/* -------------------------
   Appointment
--------------------------*/

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    #[serde(rename = "usuarioId")]
    pub patient_id: PatientId,
    #[serde(rename = "fechaHora")]
    pub scheduled_at: DateTime<Utc>,
    #[serde(rename = "horaInicio", default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "horaFin", default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(rename = "tipoConsultaId")]
    pub consultation_type_id: ConsultationTypeId,
    #[serde(rename = "estadoCitaId")]
    pub state_id: StateId,
    #[serde(rename = "motivo", default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(rename = "observaciones", default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    #[serde(rename = "diagnostico", default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(
        rename = "tratamientoRecomendado",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub treatment_recommendation: Option<String>,
    /// Patient record embedded by the server, already normalized.
    #[serde(rename = "usuario", default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<Patient>,
}

/* -------------------------
   Request bodies
--------------------------*/

/// What the "new appointment" form collects. The patient is deliberately absent:
/// it is injected from the current selection, never taken from form input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentDraft {
    pub scheduled_at: Option<DateTime<Utc>>,
    pub consultation_type_id: Option<ConsultationTypeId>,
    pub state_id: Option<StateId>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub observations: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment_recommendation: Option<String>,
}

/// Body of `POST /citas-medicas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    #[serde(rename = "usuarioId")]
    pub patient_id: PatientId,
    #[serde(rename = "fechaHora")]
    pub scheduled_at: DateTime<Utc>,
    #[serde(rename = "tipoConsultaId")]
    pub consultation_type_id: ConsultationTypeId,
    #[serde(rename = "estadoCitaId")]
    pub state_id: StateId,
    #[serde(rename = "horaInicio", default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "horaFin", default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(rename = "motivo", default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(rename = "observaciones", default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    #[serde(rename = "diagnostico", default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(
        rename = "tratamientoRecomendado",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub treatment_recommendation: Option<String>,
}

/// Partial body of `PATCH /citas-medicas/{id}`; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentPatch {
    #[serde(rename = "fechaHora", default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(rename = "tipoConsultaId", default, skip_serializing_if = "Option::is_none")]
    pub consultation_type_id: Option<ConsultationTypeId>,
    #[serde(rename = "estadoCitaId", default, skip_serializing_if = "Option::is_none")]
    pub state_id: Option<StateId>,
    #[serde(rename = "horaInicio", default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "horaFin", default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(rename = "motivo", default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(rename = "observaciones", default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    #[serde(rename = "diagnostico", default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(
        rename = "tratamientoRecomendado",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub treatment_recommendation: Option<String>,
}

impl AppointmentPatch {
    pub fn is_empty(&self) -> bool {
        *self == AppointmentPatch::default()
    }
}

/* -------------------------
   Fetch parameters
--------------------------*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchScope {
    /// Everything the caller is allowed to see (`GET /citas-medicas`).
    All,
    /// Only the practitioner's own patients (`GET /citas-medicas/mis-citas`).
    #[default]
    Mine,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchFilters {
    pub state_id: Option<StateId>,
    pub date_from: Option<DateTime<Utc>>,
    /// Passed through untouched; only honoured by the global listing.
    pub extra: BTreeMap<String, String>,
}

impl FetchFilters {
    /// Query string pairs for the given scope.
    pub fn to_query(&self, scope: FetchScope) -> Vec<(String, String)> {
        let mut q = Vec::new();
        if let Some(id) = &self.state_id {
            q.push(("estadoCitaId".to_string(), id.to_string()));
        }
        if let Some(from) = self.date_from {
            q.push((
                "fechaInicio".to_string(),
                from.to_rfc3339_opts(SecondsFormat::Millis, true),
            ));
        }
        if scope == FetchScope::All {
            for (k, v) in &self.extra {
                q.push((k.clone(), v.clone()));
            }
        }
        q
    }
}

/// A list response: either a bare array or `{ data, total }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AppointmentPage {
    List(Vec<Appointment>),
    Envelope {
        data: Vec<Appointment>,
        #[serde(default)]
        total: Option<usize>,
    },
}

impl AppointmentPage {
    /// Records plus the server-reported total (array length when not reported).
    pub fn into_parts(self) -> (Vec<Appointment>, usize) {
        match self {
            AppointmentPage::List(items) => {
                let total = items.len();
                (items, total)
            }
            AppointmentPage::Envelope { data, total } => {
                let total = total.unwrap_or(data.len());
                (data, total)
            }
        }
    }
}
