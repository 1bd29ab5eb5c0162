//! In-process stand-in for the `/citas-medicas` service.
//!
//! Appointments get UUID ids; patients, states and consultation types keep
//! numeric ones, the way mixed backends hand them out.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
};
use axum_extra::TypedHeader;
use chrono::{DateTime, Duration, Utc};
use headers::{Authorization, authorization::Bearer};
use serde_json::json;
use uuid::Uuid;

use citas_core::{
    Appointment, AppointmentPatch, AppointmentState, ConsultationType, Id, NewAppointment,
    Patient,
};

pub const TOKEN: &str = "test-token";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub query: HashMap<String, String>,
    pub request_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub appointments: Vec<Appointment>,
    pub patients: HashMap<Id, Patient>,
    pub states: Vec<AppointmentState>,
    pub types: Vec<ConsultationType>,
    pub fail_status: Option<u16>,
    pub requests: Vec<Recorded>,
}

pub fn state(id: impl Into<Id>, name: &str, is_final: bool) -> AppointmentState {
    AppointmentState {
        id: id.into(),
        name: name.into(),
        is_final,
    }
}

fn consultation_type(id: i64, name: &str, duration_minutes: u32) -> ConsultationType {
    ConsultationType {
        id: Id::from(id),
        name: name.into(),
        duration_minutes,
    }
}

impl MockState {
    pub fn seeded() -> Self {
        let patients = [
            Patient::new(1, "Juan", "Pérez").with_email("jperez@clinica.mx"),
            Patient::new(2, "María", "López").with_email("mlopez@clinica.mx"),
        ];
        Self {
            patients: patients.into_iter().map(|p| (p.id.clone(), p)).collect(),
            states: vec![
                state(1, "Programada", false),
                state(2, "Completada", true),
                state(3, "Cancelada", true),
                state(4, "En Proceso", false),
            ],
            types: vec![
                consultation_type(1, "Primera vez", 45),
                consultation_type(2, "Seguimiento", 20),
            ],
            ..Default::default()
        }
    }

    pub fn add(
        &mut self,
        patient_id: i64,
        scheduled_at: DateTime<Utc>,
        state_id: i64,
        reason: Option<&str>,
    ) -> Id {
        let id = Id::from(Uuid::new_v4());
        self.appointments.push(Appointment {
            id: id.clone(),
            patient_id: Id::from(patient_id),
            scheduled_at,
            started_at: None,
            ended_at: None,
            consultation_type_id: Id::from(1),
            state_id: Id::from(state_id),
            reason: reason.map(str::to_string),
            observations: None,
            diagnosis: None,
            treatment_recommendation: None,
            patient: None,
        });
        id
    }

    fn embed(&self, a: &Appointment) -> Appointment {
        let mut a = a.clone();
        a.patient = self.patients.get(&a.patient_id).cloned();
        a
    }
}

pub type Shared = Arc<Mutex<MockState>>;

pub async fn spawn(state: MockState) -> (String, Shared) {
    let shared: Shared = Arc::new(Mutex::new(state));
    let app = Router::new()
        .route("/citas-medicas", get(list_all).post(create))
        .route("/citas-medicas/mis-citas", get(list_mine))
        .route("/citas-medicas/estados", get(list_states))
        .route("/citas-medicas/tipos-consulta", get(list_types))
        .route(
            "/citas-medicas/{id}",
            get(get_one).patch(update).delete(remove),
        )
        .route("/citas-medicas/{id}/estado/{state_id}", patch(change_state))
        .with_state(shared.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), shared)
}

fn error(status: StatusCode, message: &str) -> Response {
    let body = json!({ "statusCode": status.as_u16(), "message": message });
    (status, Json(body)).into_response()
}

/// Records the call, checks the token and applies any injected failure.
fn guard(
    st: &mut MockState,
    auth: &Authorization<Bearer>,
    headers: &HeaderMap,
    method: &'static str,
    path: String,
    query: HashMap<String, String>,
) -> Result<(), Response> {
    st.requests.push(Recorded {
        method,
        path,
        query,
        request_id: headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });
    if auth.token() != TOKEN {
        return Err(error(StatusCode::UNAUTHORIZED, "invalid token"));
    }
    if let Some(code) = st.fail_status {
        let status = StatusCode::from_u16(code).unwrap();
        return Err(error(status, "injected failure"));
    }
    Ok(())
}

fn matching(st: &MockState, q: &HashMap<String, String>) -> Vec<Appointment> {
    let state_id = q.get("estadoCitaId").map(|s| Id::from(s.as_str()));
    let from = q
        .get("fechaInicio")
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc));

    st.appointments
        .iter()
        .filter(|a| state_id.as_ref().is_none_or(|id| a.state_id == *id))
        .filter(|a| {
            from.is_none_or(|f| a.scheduled_at >= f && a.scheduled_at < f + Duration::days(1))
        })
        .map(|a| st.embed(a))
        .collect()
}

async fn list_all(
    State(shared): State<Shared>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let mut st = shared.lock().unwrap();
    let path = "/citas-medicas".to_string();
    if let Err(r) = guard(&mut st, &auth, &headers, "GET", path, q.clone()) {
        return r;
    }
    Json(matching(&st, &q)).into_response()
}

async fn list_mine(
    State(shared): State<Shared>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    let mut st = shared.lock().unwrap();
    let path = "/citas-medicas/mis-citas".to_string();
    if let Err(r) = guard(&mut st, &auth, &headers, "GET", path, q.clone()) {
        return r;
    }
    let all = matching(&st, &q);
    if all.is_empty() {
        return error(StatusCode::NOT_FOUND, "No se encontraron citas");
    }
    let total = st.appointments.len();
    Json(json!({ "data": all, "total": total })).into_response()
}

async fn list_states(
    State(shared): State<Shared>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    headers: HeaderMap,
) -> Response {
    let mut st = shared.lock().unwrap();
    let path = "/citas-medicas/estados".to_string();
    if let Err(r) = guard(&mut st, &auth, &headers, "GET", path, HashMap::new()) {
        return r;
    }
    let body: Vec<_> = st
        .states
        .iter()
        .map(|s| json!({ "id": s.id, "nombre": s.name, "esFinal": s.is_final }))
        .collect();
    Json(body).into_response()
}

async fn list_types(
    State(shared): State<Shared>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    headers: HeaderMap,
) -> Response {
    let mut st = shared.lock().unwrap();
    let path = "/citas-medicas/tipos-consulta".to_string();
    if let Err(r) = guard(&mut st, &auth, &headers, "GET", path, HashMap::new()) {
        return r;
    }
    Json(json!({ "data": st.types })).into_response()
}

async fn get_one(
    State(shared): State<Shared>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut st = shared.lock().unwrap();
    let path = format!("/citas-medicas/{id}");
    if let Err(r) = guard(&mut st, &auth, &headers, "GET", path, HashMap::new()) {
        return r;
    }
    let id = Id::from(id);
    match st.appointments.iter().find(|a| a.id == id) {
        Some(a) => Json(st.embed(a)).into_response(),
        None => error(StatusCode::NOT_FOUND, "Cita no encontrada"),
    }
}

async fn create(
    State(shared): State<Shared>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    headers: HeaderMap,
    Json(body): Json<NewAppointment>,
) -> Response {
    let mut st = shared.lock().unwrap();
    let path = "/citas-medicas".to_string();
    if let Err(r) = guard(&mut st, &auth, &headers, "POST", path, HashMap::new()) {
        return r;
    }
    let id = Id::from(Uuid::new_v4());
    let created = Appointment {
        id,
        patient_id: body.patient_id,
        scheduled_at: body.scheduled_at,
        started_at: body.started_at,
        ended_at: body.ended_at,
        consultation_type_id: body.consultation_type_id,
        state_id: body.state_id,
        reason: body.reason,
        observations: body.observations,
        diagnosis: body.diagnosis,
        treatment_recommendation: body.treatment_recommendation,
        patient: None,
    };
    let answer = st.embed(&created);
    st.appointments.push(created);
    (StatusCode::CREATED, Json(json!({ "data": answer }))).into_response()
}

async fn update(
    State(shared): State<Shared>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<AppointmentPatch>,
) -> Response {
    let mut st = shared.lock().unwrap();
    let path = format!("/citas-medicas/{id}");
    if let Err(r) = guard(&mut st, &auth, &headers, "PATCH", path, HashMap::new()) {
        return r;
    }
    let id = Id::from(id);
    let Some(a) = st.appointments.iter_mut().find(|a| a.id == id) else {
        return error(StatusCode::NOT_FOUND, "Cita no encontrada");
    };
    if let Some(v) = patch.scheduled_at {
        a.scheduled_at = v;
    }
    if let Some(v) = patch.consultation_type_id {
        a.consultation_type_id = v;
    }
    if let Some(v) = patch.reason {
        a.reason = Some(v);
    }
    if let Some(v) = patch.diagnosis {
        a.diagnosis = Some(v);
    }
    let a = a.clone();
    Json(st.embed(&a)).into_response()
}

async fn remove(
    State(shared): State<Shared>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut st = shared.lock().unwrap();
    let path = format!("/citas-medicas/{id}");
    if let Err(r) = guard(&mut st, &auth, &headers, "DELETE", path, HashMap::new()) {
        return r;
    }
    let id = Id::from(id);
    let before = st.appointments.len();
    st.appointments.retain(|a| a.id != id);
    if st.appointments.len() == before {
        return error(StatusCode::NOT_FOUND, "Cita no encontrada");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn change_state(
    State(shared): State<Shared>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    headers: HeaderMap,
    Path((id, state_id)): Path<(String, String)>,
) -> Response {
    let mut st = shared.lock().unwrap();
    let path = format!("/citas-medicas/{id}/estado/{state_id}");
    if let Err(r) = guard(&mut st, &auth, &headers, "PATCH", path, HashMap::new()) {
        return r;
    }
    let (id, state_id) = (Id::from(id), Id::from(state_id));
    let now = Utc::now();
    let in_progress = st
        .states
        .iter()
        .any(|s| s.id == state_id && s.name == "En Proceso");
    let Some(a) = st.appointments.iter_mut().find(|a| a.id == id) else {
        return error(StatusCode::NOT_FOUND, "Cita no encontrada");
    };
    a.state_id = state_id;
    if in_progress {
        a.started_at.get_or_insert(now);
    }
    let a = a.clone();
    Json(st.embed(&a)).into_response()
}
