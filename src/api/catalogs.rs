// src/api/catalogs.rs

use reqwest::Method;

use super::HttpGateway;
use super::http::{Payload, check_response, decode};
use crate::error::Result;
use crate::models::{AppointmentState, ConsultationType};

impl HttpGateway {
    pub(super) async fn fetch_states(&self) -> Result<Vec<AppointmentState>> {
        let resp = self
            .request(Method::GET, &["estados"])
            .send()
            .await?;
        let resp = check_response(resp, "appointment states").await?;
        Ok(decode::<Payload<Vec<AppointmentState>>>(resp).await?.into_inner())
    }

    pub(super) async fn fetch_consultation_types(&self) -> Result<Vec<ConsultationType>> {
        let resp = self
            .request(Method::GET, &["tipos-consulta"])
            .send()
            .await?;
        let resp = check_response(resp, "consultation types").await?;
        Ok(decode::<Payload<Vec<ConsultationType>>>(resp).await?.into_inner())
    }
}
