use rmcp::{
    model::{CallToolResult, Content, ErrorCode},
    Error as McpError,
};
use thiserror::Error;

use crate::opencti::error::OpenCtiApiError;

/// Failure of a single tool invocation.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    InvalidParams(String),

    #[error("Invalid response format from OpenCTI: {0}")]
    InvalidResponse(String),

    #[error("OpenCTI API error: {0}")]
    Api(#[from] OpenCtiApiError),
}

impl ToolError {
    /// Protocol-level failures become JSON-RPC errors; upstream failures are
    /// reported as a tool result flagged `isError`.
    pub fn into_call_result(self) -> Result<CallToolResult, McpError> {
        match self {
            ToolError::UnknownTool(_) => {
                Err(McpError::new(ErrorCode::METHOD_NOT_FOUND, self.to_string(), None))
            }
            ToolError::InvalidParams(_) => Err(McpError::invalid_params(self.to_string(), None)),
            ToolError::InvalidResponse(_) => Err(McpError::internal_error(self.to_string(), None)),
            ToolError::Api(_) => Ok(CallToolResult::error(vec![Content::text(self.to_string())])),
        }
    }
}
