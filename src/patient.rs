//! Canonical patient shape.
//!
//! Patient records come from a service that is not consistent about field
//! names. Every spelling is accepted here, on ingress, so the rest of the crate
//! only ever sees [`Patient`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::id::Id;
use crate::models::first_text;

pub type PatientId = Id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPatient", rename_all = "camelCase")]
pub struct Patient {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

impl Patient {
    pub fn new(
        id: impl Into<PatientId>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// "First Last", skipping whichever part is missing.
    pub fn display_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => String::new(),
        }
    }
}

/// The practitioner's patients, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct PatientRoster {
    by_id: HashMap<PatientId, Patient>,
}

impl PatientRoster {
    pub fn new(patients: impl IntoIterator<Item = Patient>) -> Self {
        Self {
            by_id: patients.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    pub fn insert(&mut self, patient: Patient) {
        self.by_id.insert(patient.id.clone(), patient);
    }

    pub fn get(&self, id: &PatientId) -> Option<&Patient> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Every spelling the service has been seen to use gets its own slot, so a
/// record that carries two of them side by side still decodes.
#[derive(Debug, Deserialize)]
struct RawPatient {
    #[serde(default)]
    id: Option<PatientId>,
    #[serde(default, rename = "usuarioId")]
    usuario_id: Option<PatientId>,
    #[serde(default, rename = "pacienteId")]
    paciente_id: Option<PatientId>,

    #[serde(default)]
    nombre: Option<String>,
    #[serde(default)]
    nombres: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "firstName")]
    first_name: Option<String>,

    #[serde(default)]
    apellido: Option<String>,
    #[serde(default)]
    apellidos: Option<String>,
    #[serde(default, rename = "lastName")]
    last_name: Option<String>,

    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    correo: Option<String>,
    #[serde(default, rename = "correoElectronico")]
    correo_electronico: Option<String>,
}

impl TryFrom<RawPatient> for Patient {
    type Error = String;

    fn try_from(raw: RawPatient) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .or(raw.usuario_id)
            .or(raw.paciente_id)
            .ok_or_else(|| "patient record has no id".to_string())?;

        Ok(Patient {
            id,
            first_name: first_text([raw.nombre, raw.nombres, raw.name, raw.first_name])
                .unwrap_or_default(),
            last_name: first_text([raw.apellido, raw.apellidos, raw.last_name]).unwrap_or_default(),
            email: first_text([raw.email, raw.correo, raw.correo_electronico]),
        })
    }
}
