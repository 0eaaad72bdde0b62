// `OpenCtiToolsServer` is the MCP face of the crate. It implements
// `rmcp::ServerHandler` by hand: `list_tools` answers from the static
// `OpenCtiTool` registry and `call_tool` runs a single round trip
//
//   name -> OpenCtiTool -> GraphQlRequest -> POST /graphql -> records -> text
//
// Argument and naming problems are rejected before the HTTP call. Upstream
// transport failures come back as `isError` tool results so the agent host
// can read them.
//
// Tools are declared by hand rather than through `#[tool(tool_box)]` and
// schemars: a non-numeric `first` must fall back to 10, where derived
// parameter structs would reject the call.

use std::sync::Arc;

use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject,
        ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    Error as McpError, RoleServer, ServerHandler,
};
use tracing::{error, info};

use crate::config::OpenCtiConfig;
use crate::error::ToolError;
use crate::opencti::client::OpenCtiClient;
use crate::tools::OpenCtiTool;

#[derive(Clone)]
pub struct OpenCtiToolsServer {
    opencti_client: Arc<OpenCtiClient>,
}

impl OpenCtiToolsServer {
    pub fn new(config: &OpenCtiConfig) -> Result<Self, anyhow::Error> {
        tracing::debug!(?config, "Creating OpenCTI client");

        let opencti_client = OpenCtiClient::new(config)?;

        Ok(Self {
            opencti_client: Arc::new(opencti_client),
        })
    }

    pub fn tools() -> Vec<rmcp::model::Tool> {
        OpenCtiTool::ALL.iter().map(|tool| tool.descriptor()).collect()
    }

    /// Runs one tool invocation end to end.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<&JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        match self.invoke(name, arguments).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) => {
                error!(tool = %name, "Error invoking OpenCTI tool: {}", e);
                e.into_call_result()
            }
        }
    }

    async fn invoke(&self, name: &str, arguments: Option<&JsonObject>) -> Result<String, ToolError> {
        let tool = OpenCtiTool::from_name(name)?;
        let request = tool.build_request(arguments)?;

        info!(tool = %name, "Invoking OpenCTI tool");

        let body = self.opencti_client.execute(&request).await?;
        let text = tool.normalize(&body)?;

        info!(tool = %name, "Successfully processed OpenCTI response");
        Ok(text)
    }
}

impl ServerHandler for OpenCtiToolsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "This server provides tools to query an OpenCTI threat intelligence platform.\n\
                Available tools:\n\
                - 'get_latest_reports': Retrieves the most recently published reports. \
                Optionally takes 'first' to control the number of reports returned (defaults to 10).\n\
                - 'search_indicators': Searches indicators by keyword. Requires 'query'; optional 'first'.\n\
                - 'search_malware': Searches malware by keyword. Requires 'query'; optional 'first'.\n\
                - 'search_threat_actors': Searches threat actors by keyword. Requires 'query'; optional 'first'.\n\
                Results are returned as a JSON array of flattened records."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: PaginatedRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            next_cursor: None,
            tools: Self::tools(),
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch(&request.name, request.arguments.as_ref()).await
    }
}
