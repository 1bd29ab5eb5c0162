// src/api/appointments.rs

use reqwest::Method;

use super::HttpGateway;
use super::http::{Payload, check_response, decode};
use crate::error::Result;
use crate::models::{
    Appointment, AppointmentId, AppointmentPage, AppointmentPatch, FetchFilters, FetchScope,
    NewAppointment, StateId,
};

/* ============================================================
   GET /citas-medicas  |  GET /citas-medicas/mis-citas
   ============================================================ */

impl HttpGateway {
    pub(super) async fn fetch_list(
        &self,
        scope: FetchScope,
        filters: &FetchFilters,
    ) -> Result<AppointmentPage> {
        let segments: &[&str] = match scope {
            FetchScope::All => &[],
            FetchScope::Mine => &["mis-citas"],
        };
        let resp = self
            .request(Method::GET, segments)
            .query(&filters.to_query(scope))
            .send()
            .await?;
        let resp = check_response(resp, "appointment list").await?;
        decode(resp).await
    }

    /* ============================================================
       GET /citas-medicas/{id}
       ============================================================ */

    pub(super) async fn fetch_one(&self, id: &AppointmentId) -> Result<Appointment> {
        let resp = self
            .request(Method::GET, &[id.as_str()])
            .send()
            .await?;
        let resp = check_response(resp, &format!("appointment {id}")).await?;
        Ok(decode::<Payload<Appointment>>(resp).await?.into_inner())
    }

    /* ============================================================
       POST /citas-medicas
       ============================================================ */

    pub(super) async fn post_appointment(&self, body: &NewAppointment) -> Result<Appointment> {
        let resp = self
            .request(Method::POST, &[])
            .json(body)
            .send()
            .await?;
        let resp = check_response(resp, "appointment").await?;
        Ok(decode::<Payload<Appointment>>(resp).await?.into_inner())
    }

    /* ============================================================
       PATCH /citas-medicas/{id}
       ============================================================ */

    pub(super) async fn patch_appointment(
        &self,
        id: &AppointmentId,
        patch: &AppointmentPatch,
    ) -> Result<Appointment> {
        let resp = self
            .request(Method::PATCH, &[id.as_str()])
            .json(patch)
            .send()
            .await?;
        let resp = check_response(resp, &format!("appointment {id}")).await?;
        Ok(decode::<Payload<Appointment>>(resp).await?.into_inner())
    }

    /* ============================================================
       DELETE /citas-medicas/{id}
       ============================================================ */

    pub(super) async fn remove_appointment(&self, id: &AppointmentId) -> Result<()> {
        let resp = self
            .request(Method::DELETE, &[id.as_str()])
            .send()
            .await?;
        check_response(resp, &format!("appointment {id}")).await?;
        Ok(())
    }

    /* ============================================================
       PATCH /citas-medicas/{id}/estado/{stateId}   (no body)
       ============================================================ */

    pub(super) async fn patch_state(
        &self,
        id: &AppointmentId,
        state_id: &StateId,
    ) -> Result<Appointment> {
        let resp = self
            .request(Method::PATCH, &[id.as_str(), "estado", state_id.as_str()])
            .send()
            .await?;
        let resp = check_response(resp, &format!("appointment {id}")).await?;
        Ok(decode::<Payload<Appointment>>(resp).await?.into_inner())
    }
}
