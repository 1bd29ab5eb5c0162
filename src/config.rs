use std::env;

use crate::error::{AppointmentError, Result};

pub const DEFAULT_STATE_NAME: &str = "Programada";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    pub default_state_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_url = env::var("CITAS_API_URL")
            .map_err(|_| AppointmentError::Config("CITAS_API_URL is not set".into()))?;
        let api_token = env::var("CITAS_API_TOKEN")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let default_state_name = env::var("CITAS_DEFAULT_STATE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STATE_NAME.to_string());

        Ok(Self::new(api_url).with_token(api_token).with_default_state(default_state_name))
    }

    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_token: None,
            default_state_name: DEFAULT_STATE_NAME.to_string(),
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.api_token = token;
        self
    }

    pub fn with_default_state(mut self, name: impl Into<String>) -> Self {
        self.default_state_name = name.into();
        self
    }
}
