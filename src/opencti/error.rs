use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenCtiApiError {
    #[error("Failed to create HTTP client: {0}")]
    HttpClientCreationError(reqwest::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Non-2xx answer from OpenCTI. `body` is the raw response text.
    #[error("{body}")]
    ApiError { status: u16, body: String },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl OpenCtiApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            OpenCtiApiError::ApiError { status, .. } => Some(*status),
            OpenCtiApiError::RequestError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
