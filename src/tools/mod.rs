//! The fixed set of OpenCTI tools exposed over MCP.
//!
//! Each [`OpenCtiTool`] variant owns everything needed to serve it: its
//! descriptor and input schema, the GraphQL document it sends, how its
//! arguments become GraphQL variables, and which [`ResponseShape`] its answer
//! is flattened with.

pub mod records;

use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};
use serde::Serialize;
use serde_json::{json, Number, Value};
use tracing::warn;

use crate::error::ToolError;
use crate::opencti::client::GraphQlRequest;
use crate::opencti::queries::{
    LATEST_REPORTS_QUERY, SEARCH_INDICATORS_QUERY, SEARCH_MALWARE_QUERY,
    SEARCH_THREAT_ACTORS_QUERY,
};
use records::{Connection, ReportNode, ReportRecord, StixObjectNode, StixObjectRecord};

pub const DEFAULT_RESULT_LIMIT: u64 = 10;

const LIMIT_DESCRIPTION: &str = "Maximum number of results to return (default: 10)";
const QUERY_DESCRIPTION: &str = "Search keyword";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenCtiTool {
    LatestReports,
    SearchIndicators,
    SearchMalware,
    SearchThreatActors,
}

/// How an upstream answer is flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `data.reports.edges[].node`
    Reports,
    /// `data.stixCoreObjects.edges[].node`
    StixCoreObjects,
}

impl ResponseShape {
    fn connection_field(self) -> &'static str {
        match self {
            ResponseShape::Reports => "reports",
            ResponseShape::StixCoreObjects => "stixCoreObjects",
        }
    }
}

impl OpenCtiTool {
    pub const ALL: [OpenCtiTool; 4] = [
        OpenCtiTool::LatestReports,
        OpenCtiTool::SearchIndicators,
        OpenCtiTool::SearchMalware,
        OpenCtiTool::SearchThreatActors,
    ];

    pub fn from_name(name: &str) -> Result<Self, ToolError> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.name() == name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    pub fn name(self) -> &'static str {
        match self {
            OpenCtiTool::LatestReports => "get_latest_reports",
            OpenCtiTool::SearchIndicators => "search_indicators",
            OpenCtiTool::SearchMalware => "search_malware",
            OpenCtiTool::SearchThreatActors => "search_threat_actors",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            OpenCtiTool::LatestReports => "Retrieves the latest threat intelligence reports from OpenCTI, most recently published first.",
            OpenCtiTool::SearchIndicators => "Searches OpenCTI indicators (e.g. IP addresses, domains, file hashes) by keyword.",
            OpenCtiTool::SearchMalware => "Searches OpenCTI malware entities by keyword.",
            OpenCtiTool::SearchThreatActors => "Searches OpenCTI threat actors by keyword.",
        }
    }

    pub fn query_document(self) -> &'static str {
        match self {
            OpenCtiTool::LatestReports => LATEST_REPORTS_QUERY,
            OpenCtiTool::SearchIndicators => SEARCH_INDICATORS_QUERY,
            OpenCtiTool::SearchMalware => SEARCH_MALWARE_QUERY,
            OpenCtiTool::SearchThreatActors => SEARCH_THREAT_ACTORS_QUERY,
        }
    }

    pub fn response_shape(self) -> ResponseShape {
        match self {
            OpenCtiTool::LatestReports => ResponseShape::Reports,
            OpenCtiTool::SearchIndicators
            | OpenCtiTool::SearchMalware
            | OpenCtiTool::SearchThreatActors => ResponseShape::StixCoreObjects,
        }
    }

    fn requires_search_term(self) -> bool {
        !matches!(self, OpenCtiTool::LatestReports)
    }

    pub fn input_schema(self) -> JsonObject {
        let mut properties = serde_json::Map::new();
        if self.requires_search_term() {
            properties.insert(
                "query".to_string(),
                json!({ "type": "string", "description": QUERY_DESCRIPTION }),
            );
        }
        properties.insert(
            "first".to_string(),
            json!({
                "type": "number",
                "description": LIMIT_DESCRIPTION,
                "default": DEFAULT_RESULT_LIMIT,
            }),
        );

        let mut schema = serde_json::Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        if self.requires_search_term() {
            schema.insert("required".to_string(), json!(["query"]));
        }
        schema
    }

    pub fn descriptor(self) -> Tool {
        Tool::new(self.name(), self.description(), Arc::new(self.input_schema()))
    }

    /// Validates the caller's arguments and builds the GraphQL request.
    pub fn build_request(self, arguments: Option<&JsonObject>) -> Result<GraphQlRequest, ToolError> {
        let first = result_limit(arguments);

        let variables = if self.requires_search_term() {
            let search = arguments
                .and_then(|args| args.get("query"))
                .and_then(Value::as_str)
                .ok_or_else(|| ToolError::InvalidParams("Query parameter is required".to_string()))?;
            json!({ "search": search, "first": first })
        } else {
            json!({ "first": first })
        };

        Ok(GraphQlRequest {
            query: self.query_document(),
            variables,
        })
    }

    /// Flattens a decoded GraphQL body into pretty-printed JSON records.
    pub fn normalize(self, body: &Value) -> Result<String, ToolError> {
        let data = match body.get("data") {
            Some(data) if !data.is_null() => data,
            _ => return Err(ToolError::InvalidResponse(raw_text(body))),
        };

        let connection = data
            .get(self.response_shape().connection_field())
            .filter(|c| !c.is_null())
            .ok_or_else(|| ToolError::InvalidResponse(raw_text(body)))?;

        match self.response_shape() {
            ResponseShape::Reports => render::<ReportNode, ReportRecord>(connection, body),
            ResponseShape::StixCoreObjects => {
                render::<StixObjectNode, StixObjectRecord>(connection, body)
            }
        }
    }
}

/// Undecodable bodies arrive as a JSON string and are reported verbatim.
fn raw_text(body: &Value) -> String {
    match body {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn render<N, R>(connection: &Value, body: &Value) -> Result<String, ToolError>
where
    N: serde::de::DeserializeOwned,
    R: From<N> + Serialize,
{
    let connection: Connection<N> = serde_json::from_value(connection.clone())
        .map_err(|_| ToolError::InvalidResponse(raw_text(body)))?;

    let records: Vec<R> = connection
        .edges
        .into_iter()
        .map(|edge| R::from(edge.node))
        .collect();

    serde_json::to_string_pretty(&records).map_err(|e| ToolError::InvalidResponse(e.to_string()))
}

/// Any JSON number is accepted as-is; anything else falls back to the default.
fn result_limit(arguments: Option<&JsonObject>) -> Number {
    match arguments.and_then(|args| args.get("first")) {
        Some(Value::Number(n)) => n.clone(),
        Some(other) => {
            warn!(first = %other, "Ignoring non-numeric 'first' argument, using default");
            Number::from(DEFAULT_RESULT_LIMIT)
        }
        None => Number::from(DEFAULT_RESULT_LIMIT),
    }
}
