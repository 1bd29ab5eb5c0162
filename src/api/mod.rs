//! Boundary to the remote appointment service.
//!
//! [`AppointmentGateway`] is the only way the crate reaches the network;
//! [`HttpGateway`] implements it over the `/citas-medicas` REST surface.

use async_trait::async_trait;
use reqwest::{Method, Url};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppointmentError, Result};
use crate::models::{
    Appointment, AppointmentId, AppointmentPage, AppointmentPatch, AppointmentState,
    ConsultationType, FetchFilters, FetchScope, NewAppointment, StateId,
};

mod appointments;
mod catalogs;
pub(crate) mod http;

/// Path segment every endpoint lives under.
pub const COLLECTION: &str = "citas-medicas";

#[async_trait]
pub trait AppointmentGateway: Send + Sync {
    async fn list_appointments(
        &self,
        scope: FetchScope,
        filters: &FetchFilters,
    ) -> Result<AppointmentPage>;

    async fn get_appointment(&self, id: &AppointmentId) -> Result<Appointment>;

    async fn create_appointment(&self, body: &NewAppointment) -> Result<Appointment>;

    async fn update_appointment(
        &self,
        id: &AppointmentId,
        patch: &AppointmentPatch,
    ) -> Result<Appointment>;

    async fn delete_appointment(&self, id: &AppointmentId) -> Result<()>;

    async fn change_state(&self, id: &AppointmentId, state_id: &StateId) -> Result<Appointment>;

    async fn list_states(&self) -> Result<Vec<AppointmentState>>;

    async fn list_consultation_types(&self) -> Result<Vec<ConsultationType>>;
}

#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpGateway {
    pub fn new(cfg: &Config) -> Result<Self> {
        Self::with_client(reqwest::Client::new(), cfg)
    }

    /// Fails when `cfg.api_url` is not an absolute http(s) URL.
    pub fn with_client(http: reqwest::Client, cfg: &Config) -> Result<Self> {
        let base_url = Url::parse(&cfg.api_url).map_err(|e| {
            AppointmentError::Config(format!("invalid api url {:?}: {e}", cfg.api_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppointmentError::Config(format!(
                "api url {:?} cannot carry a path",
                cfg.api_url
            )));
        }
        Ok(Self {
            http,
            base_url,
            token: cfg.api_token.clone(),
        })
    }

    /// Builder for `/citas-medicas/<segments..>` under the service root, tagged
    /// with a fresh `x-request-id`. Each segment is percent-encoded, so opaque
    /// ids never change the shape of the path.
    fn request(&self, method: Method, segments: &[&str]) -> reqwest::RequestBuilder {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(COLLECTION).extend(segments);
        }

        let request_id = Uuid::new_v4();
        tracing::debug!(%request_id, %method, path = url.path(), "dispatching request");

        let req = self
            .http
            .request(method, url)
            .header("x-request-id", request_id.to_string());
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl AppointmentGateway for HttpGateway {
    async fn list_appointments(
        &self,
        scope: FetchScope,
        filters: &FetchFilters,
    ) -> Result<AppointmentPage> {
        self.fetch_list(scope, filters).await
    }

    async fn get_appointment(&self, id: &AppointmentId) -> Result<Appointment> {
        self.fetch_one(id).await
    }

    async fn create_appointment(&self, body: &NewAppointment) -> Result<Appointment> {
        self.post_appointment(body).await
    }

    async fn update_appointment(
        &self,
        id: &AppointmentId,
        patch: &AppointmentPatch,
    ) -> Result<Appointment> {
        self.patch_appointment(id, patch).await
    }

    async fn delete_appointment(&self, id: &AppointmentId) -> Result<()> {
        self.remove_appointment(id).await
    }

    async fn change_state(&self, id: &AppointmentId, state_id: &StateId) -> Result<Appointment> {
        self.patch_state(id, state_id).await
    }

    async fn list_states(&self) -> Result<Vec<AppointmentState>> {
        self.fetch_states().await
    }

    async fn list_consultation_types(&self) -> Result<Vec<ConsultationType>> {
        self.fetch_consultation_types().await
    }
}
