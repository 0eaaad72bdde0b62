//! Flat records produced from OpenCTI's edge/node connections.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub(crate) struct Connection<T> {
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportNode {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    content: Option<String>,
    published: Option<Value>,
    confidence: Option<Value>,
    created: Option<Value>,
    modified: Option<Value>,
    report_types: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StixObjectNode {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    created: Option<Value>,
    modified: Option<Value>,
    malware_types: Option<Vec<String>>,
    threat_actor_types: Option<Vec<String>>,
    is_family: Option<bool>,
    first_seen: Option<String>,
    last_seen: Option<String>,
    pattern: Option<String>,
    valid_from: Option<String>,
    valid_until: Option<String>,
    x_opencti_score: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<Value>,
    pub report_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StixObjectRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<Value>,
    #[serde(rename = "type")]
    pub object_type: String,
    pub family: String,
    pub first_seen: String,
    pub last_seen: String,
    pub pattern: String,
    pub valid_from: String,
    pub valid_until: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<Value>,
}

/// Empty strings are treated the same as missing ones.
fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn joined(types: Option<&Vec<String>>) -> Option<String> {
    types.map(|t| t.join(", ")).filter(|t| !t.is_empty())
}

impl From<ReportNode> for ReportRecord {
    fn from(node: ReportNode) -> Self {
        Self {
            id: node.id,
            name: or_default(node.name, "Unnamed"),
            description: or_default(node.description, ""),
            content: or_default(node.content, ""),
            published: node.published,
            confidence: node.confidence,
            created: node.created,
            modified: node.modified,
            report_types: node.report_types.unwrap_or_default(),
        }
    }
}

impl From<StixObjectNode> for StixObjectRecord {
    fn from(node: StixObjectNode) -> Self {
        let object_type = joined(node.malware_types.as_ref())
            .or_else(|| joined(node.threat_actor_types.as_ref()))
            .unwrap_or_default();

        Self {
            id: node.id,
            name: or_default(node.name, "Unnamed"),
            description: or_default(node.description, ""),
            created: node.created,
            modified: node.modified,
            object_type,
            family: if node.is_family.unwrap_or(false) {
                "Yes".to_string()
            } else {
                "No".to_string()
            },
            first_seen: or_default(node.first_seen, ""),
            last_seen: or_default(node.last_seen, ""),
            pattern: or_default(node.pattern, ""),
            valid_from: or_default(node.valid_from, ""),
            valid_until: or_default(node.valid_until, ""),
            score: node.x_opencti_score,
        }
    }
}
