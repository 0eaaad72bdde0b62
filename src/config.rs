use std::env;

use crate::opencti::error::OpenCtiApiError;

pub const DEFAULT_OPENCTI_URL: &str = "http://localhost:8080";

/// Connection settings for the OpenCTI instance, read once at startup.
#[derive(Clone)]
pub struct OpenCtiConfig {
    pub base_url: String,
    pub api_token: String,
    pub verify_ssl: bool,
}

impl OpenCtiConfig {
    pub fn new(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        verify_ssl: bool,
    ) -> Result<Self, OpenCtiApiError> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(OpenCtiApiError::ConfigurationError(
                "OPENCTI_TOKEN environment variable is required".to_string(),
            ));
        }

        Ok(Self {
            base_url: base_url.into(),
            api_token,
            verify_ssl,
        })
    }

    /// Reads `OPENCTI_URL`, `OPENCTI_TOKEN` and `VERIFY_SSL`.
    pub fn from_env() -> Result<Self, OpenCtiApiError> {
        let base_url = env::var("OPENCTI_URL").unwrap_or_else(|_| DEFAULT_OPENCTI_URL.to_string());

        let api_token = env::var("OPENCTI_TOKEN").map_err(|_| {
            OpenCtiApiError::ConfigurationError(
                "OPENCTI_TOKEN environment variable is required".to_string(),
            )
        })?;

        let verify_ssl = env::var("VERIFY_SSL")
            .map(|v| parse_bool_flag(&v))
            .unwrap_or(true);

        Self::new(base_url, api_token, verify_ssl)
    }

    pub fn graphql_endpoint(&self) -> String {
        format!("{}/graphql", self.base_url.trim_end_matches('/'))
    }
}

// Keep the token out of logs.
impl std::fmt::Debug for OpenCtiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenCtiConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"***")
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

fn parse_bool_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}
