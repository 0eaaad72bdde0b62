use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info};

use super::error::OpenCtiApiError;
use crate::config::OpenCtiConfig;

/// Body of a single GraphQL POST.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest {
    pub query: &'static str,
    pub variables: Value,
}

#[derive(Debug, Clone)]
pub struct OpenCtiClient {
    client: Client,
    endpoint: String,
}

impl OpenCtiClient {
    pub fn new(config: &OpenCtiConfig) -> Result<Self, OpenCtiApiError> {
        debug!(base_url = %config.base_url, verify_ssl = %config.verify_ssl, "Creating new OpenCtiClient with API token");

        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", config.api_token))
            .map_err(|e| {
                OpenCtiApiError::ConfigurationError(format!(
                    "OPENCTI_TOKEN is not a valid header value: {}",
                    e
                ))
            })?;
        auth_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .danger_accept_invalid_certs(!config.verify_ssl)
            .user_agent(concat!("mcp-server-opencti/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(OpenCtiApiError::HttpClientCreationError)?;

        let endpoint = config.graphql_endpoint();
        debug!(%endpoint, "OpenCTI client configuration created successfully");

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts one GraphQL document and returns the decoded response body.
    ///
    /// Any 2xx answer is returned as-is, or as a JSON string when the body
    /// does not decode; checking for `data` is up to the caller. Non-2xx
    /// answers become [`OpenCtiApiError::ApiError`] carrying the upstream body.
    pub async fn execute(&self, request: &GraphQlRequest) -> Result<Value, OpenCtiApiError> {
        info!(endpoint = %self.endpoint, variables = %request.variables, "Executing OpenCTI GraphQL query");

        let response = match self.client.post(&self.endpoint).json(request).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to reach OpenCTI at {}: {}", self.endpoint, e);
                return Err(OpenCtiApiError::RequestError(e));
            }
        };

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = status.as_u16(), "OpenCTI returned an error response: {}", body);
            let body = if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                body
            };
            return Err(OpenCtiApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        // A 2xx body that is not JSON is kept as a string so the caller
        // reports it as a malformed response, raw text included.
        let value: Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(e) => {
                error!("Error decoding OpenCTI response: {}. Raw body: {}", e, body);
                return Ok(Value::String(body));
            }
        };

        debug!(
            "OpenCTI Response: {}",
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| body.clone())
        );

        Ok(value)
    }
}
