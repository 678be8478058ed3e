use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
    time::Duration,
};

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub const DEFAULT_USERNAME: &str = "AmirMahdi-Tizchang";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionNum {
    pub difficulty: String,
    pub count: u64,
    pub submissions: u64,
}

impl SubmissionNum {
    pub fn new(difficulty: &str, count: u64, submissions: u64) -> Self {
        Self {
            difficulty: difficulty.to_string(),
            count,
            submissions,
        }
    }
}

#[derive(Deserialize)]
pub struct GraphQLBody {
    pub query: String,
}

/// A scripted answer consumed by the next `/graphql` call.
#[derive(Clone, Debug)]
pub enum MockReply {
    /// Reply with this status and an empty body.
    Status(u16),
    /// Reply with this status and raw body text.
    Body { status: u16, body: String },
    /// Sleep, then answer from the profile table.
    Delay(u64),
}

pub type Profiles = Arc<RwLock<HashMap<String, Vec<SubmissionNum>>>>;
pub type Script = Arc<RwLock<VecDeque<MockReply>>>;

#[derive(Clone)]
pub struct MockState {
    pub profiles: Profiles,
    pub script: Script,
}

impl Default for MockState {
    fn default() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(
            DEFAULT_USERNAME.to_string(),
            vec![
                SubmissionNum::new("All", 210, 390),
                SubmissionNum::new("Easy", 120, 150),
                SubmissionNum::new("Medium", 80, 200),
                SubmissionNum::new("Hard", 10, 40),
            ],
        );
        Self::new(profiles, Vec::new())
    }
}

impl MockState {
    pub fn new(profiles: HashMap<String, Vec<SubmissionNum>>, script: Vec<MockReply>) -> Self {
        Self {
            profiles: Arc::new(RwLock::new(profiles)),
            script: Arc::new(RwLock::new(script.into_iter().collect())),
        }
    }

    /// Default profiles with `script` queued ahead of them.
    pub fn scripted(script: Vec<MockReply>) -> Self {
        let state = Self::default();
        Self {
            script: Arc::new(RwLock::new(script.into_iter().collect())),
            ..state
        }
    }
}

pub fn app() -> Router {
    app_with(MockState::default())
}

pub fn app_with(state: MockState) -> Router {
    Router::new()
        .route("/graphql", post(graphql))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(state)).await
}

async fn graphql(State(state): State<MockState>, Json(input): Json<GraphQLBody>) -> Response {
    let scripted = state.script.write().await.pop_front();
    match scripted {
        Some(MockReply::Status(code)) => return raw_reply(code, String::new()),
        Some(MockReply::Body { status, body }) => return raw_reply(status, body),
        Some(MockReply::Delay(ms)) => tokio::time::sleep(Duration::from_millis(ms)).await,
        None => {}
    }

    let Some(username) = extract_username(&input.query) else {
        let body = json!({ "errors": [{ "message": "matchedUser requires a username argument" }] });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };
    debug!(%username, "answering matchedUser query");

    let profiles = state.profiles.read().await;
    let body = match profiles.get(&username) {
        Some(counts) => json!({
            "data": { "matchedUser": { "submitStats": { "acSubmissionNum": counts } } }
        }),
        None => json!({
            "data": { "matchedUser": null },
            "errors": [{ "message": "That user does not exist.", "path": ["matchedUser"] }]
        }),
    };
    Json(body).into_response()
}

fn raw_reply(status: u16, body: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Pull the string literal passed as `username:` out of a query document.
pub fn extract_username(query: &str) -> Option<String> {
    let start = query.find("username:")? + "username:".len();
    let rest = query[start..].trim_start();
    if !rest.starts_with('"') {
        return None;
    }

    let mut escaped = false;
    let mut end = None;
    for (i, c) in rest.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => {
                end = Some(i);
                break;
            }
            _ => {}
        }
    }
    serde_json::from_str(&rest[..=end?]).ok()
}
