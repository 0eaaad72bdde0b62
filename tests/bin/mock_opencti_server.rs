use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Search terms that make the mock misbehave on purpose.
const MISSING_DATA_TRIGGER: &str = "trigger-missing-data";
const UPSTREAM_FAILURE_TRIGGER: &str = "trigger-upstream-failure";

struct MockData {
    reports: Vec<Value>,
    // (entity_type, node)
    stix_objects: Vec<(&'static str, Value)>,
}

fn days_ago(days: i64) -> String {
    (Utc::now() - Duration::days(days)).to_rfc3339_opts(SecondsFormat::Millis, true)
}

static MOCK_DATA: Lazy<MockData> = Lazy::new(|| {
    let reports = vec![
        json!({
            "id": "report_001",
            "name": "APT29 Spear-Phishing Campaign",
            "description": "Targeted phishing against diplomatic entities.",
            "content": "<p>Full analysis</p>",
            "published": days_ago(1),
            "confidence": 85,
            "created": days_ago(2),
            "modified": days_ago(1),
            "report_types": ["threat-report"],
        }),
        json!({
            "id": "report_002",
            "name": null,
            "description": null,
            "content": null,
            "published": "2024-01-01T00:00:00.000Z",
            "confidence": null,
            "created": null,
            "modified": null,
            "report_types": null,
        }),
    ];

    let stix_objects = vec![
        (
            "Indicator",
            json!({
                "id": "indicator_001",
                "entity_type": "Indicator",
                "name": "203.0.113.42",
                "description": "C2 server observed in Emotet traffic",
                "created": days_ago(10),
                "modified": days_ago(3),
                "pattern": "[ipv4-addr:value = '203.0.113.42']",
                "valid_from": days_ago(10),
                "valid_until": null,
                "x_opencti_score": 75,
            }),
        ),
        (
            "Malware",
            json!({
                "id": "malware_001",
                "entity_type": "Malware",
                "name": "Emotet",
                "description": "Modular banking trojan and loader.",
                "created": days_ago(400),
                "modified": days_ago(5),
                "malware_types": ["trojan", "downloader"],
                "is_family": true,
                "first_seen": "2014-06-01T00:00:00.000Z",
                "last_seen": days_ago(5),
            }),
        ),
        (
            "Malware",
            json!({
                "id": "malware_002",
                "entity_type": "Malware",
                "name": "LockBit",
                "description": null,
                "created": days_ago(300),
                "modified": days_ago(30),
                "malware_types": ["ransomware"],
                "is_family": false,
                "first_seen": null,
                "last_seen": null,
            }),
        ),
        (
            "Threat-Actor",
            json!({
                "id": "threat_actor_001",
                "entity_type": "Threat-Actor-Group",
                "name": "Wizard Spider",
                "description": "Financially motivated group operating TrickBot.",
                "created": days_ago(200),
                "modified": days_ago(20),
                "threat_actor_types": ["crime-syndicate"],
                "first_seen": "2016-01-01T00:00:00.000Z",
                "last_seen": days_ago(20),
            }),
        ),
    ];

    MockData {
        reports,
        stix_objects,
    }
});

#[derive(Debug, Deserialize)]
struct GraphQlBody {
    query: String,
    #[serde(default)]
    variables: Value,
}

fn operation_name(query: &str) -> Option<&str> {
    let rest = query.trim_start().strip_prefix("query")?.trim_start();
    let end = rest.find(|c: char| c == '(' || c == '{' || c.is_whitespace())?;
    Some(&rest[..end])
}

fn limit(variables: &Value) -> usize {
    variables
        .get("first")
        .and_then(Value::as_u64)
        .unwrap_or(10) as usize
}

fn connection(field: &str, nodes: Vec<Value>) -> Value {
    let edges: Vec<Value> = nodes.into_iter().map(|node| json!({ "node": node })).collect();
    let mut data = serde_json::Map::new();
    data.insert(field.to_string(), json!({ "edges": edges }));
    json!({ "data": data })
}

fn search_objects(entity_type: &str, variables: &Value) -> Value {
    let search = variables
        .get("search")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase();

    let nodes: Vec<Value> = MOCK_DATA
        .stix_objects
        .iter()
        .filter(|(t, _)| *t == entity_type)
        .filter(|(_, node)| {
            search.is_empty()
                || node["name"]
                    .as_str()
                    .map(|n| n.to_lowercase().contains(&search))
                    .unwrap_or(false)
        })
        .take(limit(variables))
        .map(|(_, node)| node.clone())
        .collect();

    connection("stixCoreObjects", nodes)
}

async fn health_check() -> impl IntoResponse {
    "OK"
}

async fn handle_graphql(headers: HeaderMap, Json(payload): Json<GraphQlBody>) -> impl IntoResponse {
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("Bearer ") && v.len() > "Bearer ".len())
        .unwrap_or(false);
    if !authorized {
        warn!("Rejecting GraphQL request without bearer token");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"errors": [{"message": "You must be logged in to do this."}]})),
        )
            .into_response();
    }

    let operation = operation_name(&payload.query).unwrap_or_default();
    info!(%operation, variables = %payload.variables, "POST /graphql");

    match payload.variables.get("search").and_then(Value::as_str) {
        Some(MISSING_DATA_TRIGGER) => {
            warn!("Simulating a response without data");
            return (
                StatusCode::OK,
                Json(json!({"errors": [{"message": "Simulated resolver failure"}]})),
            )
                .into_response();
        }
        Some(UPSTREAM_FAILURE_TRIGGER) => {
            warn!("Simulating an upstream failure");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"message": "Simulated upstream failure"})),
            )
                .into_response();
        }
        _ => {}
    }

    let body = match operation {
        "LatestReports" => {
            let nodes = MOCK_DATA
                .reports
                .iter()
                .take(limit(&payload.variables))
                .cloned()
                .collect();
            connection("reports", nodes)
        }
        "SearchIndicators" => search_objects("Indicator", &payload.variables),
        "SearchMalware" => search_objects("Malware", &payload.variables),
        "SearchThreatActors" => search_objects("Threat-Actor", &payload.variables),
        unknown => {
            warn!("Unknown GraphQL operation: {}", unknown);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"errors": [{"message": format!("Unknown operation: {}", unknown)}]})),
            )
                .into_response();
        }
    };

    (StatusCode::OK, Json(body)).into_response()
}

async fn catch_all(method: axum::http::Method, uri: axum::http::Uri) -> impl IntoResponse {
    warn!("Unhandled request: {} {}", method, uri.path());
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "message": format!("No handler for: {} {}", method, uri.path()),
            "available_routes_info": ["GET /health", "POST /graphql"]
        })),
    )
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr) // Log to stderr for tests
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Starting Mock OpenCTI Server...");

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/graphql", post(handle_graphql))
        .fallback(catch_all)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    println!("MOCK_SERVER_PORT={}", port); // Critical for test harness
    info!("Mock server listening on 127.0.0.1:{}", port);

    axum::serve(listener, app).await.unwrap();
}
