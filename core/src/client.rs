//! Stateless HTTP request builder and response parser for the stats query.
//!
//! # Design
//! `StatsClient` holds only its `ClientConfig` and carries no mutable state
//! between calls. The single operation is split into
//! `build_submission_counts`, which produces an `HttpRequest`, and
//! `parse_submission_counts`, which consumes an `HttpResponse`. The caller
//! executes the actual HTTP round-trip, keeping the core deterministic and
//! free of I/O dependencies.

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::submission_counts_document;
use crate::types::{GraphQLReply, SubmissionCount};

/// Synchronous, stateless client for the profile GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct StatsClient {
    config: ClientConfig,
}

impl StatsClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build_submission_counts(&self) -> Result<HttpRequest, FetchError> {
        let query = submission_counts_document(&self.config.username)?;
        let body = serde_json::to_string(&serde_json::json!({ "query": query }))
            .map_err(|e| FetchError::Serialization(e.to_string()))?;
        debug!(
            url = %self.config.endpoint,
            username = %self.config.username,
            timeout_ms = self.config.timeout_ms,
            "built submission counts request"
        );
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.config.endpoint.clone(),
            headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("user-agent".to_string(), self.config.user_agent.clone()),
            ],
            body: Some(body),
            timeout_ms: self.config.timeout_ms,
        })
    }

    pub fn parse_submission_counts(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<SubmissionCount>, FetchError> {
        check_status(&response)?;
        let reply: GraphQLReply = serde_json::from_str(&response.body)
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        let matched_user = reply
            .data
            .and_then(|data| data.matched_user)
            .ok_or_else(|| missing_user(&reply.errors))?;
        Ok(matched_user.submit_stats.ac_submission_num)
    }
}

/// Only 200 counts as success; every other status is surfaced as-is.
fn check_status(response: &HttpResponse) -> Result<(), FetchError> {
    if response.status == 200 {
        return Ok(());
    }
    Err(FetchError::HttpStatus {
        status: response.status,
        body: response.body.clone(),
    })
}

fn missing_user(errors: &[crate::types::GraphQLError]) -> FetchError {
    if errors.is_empty() {
        return FetchError::Decode("missing data.matchedUser".to_string());
    }
    let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
    FetchError::Decode(format!("missing data.matchedUser: {}", messages.join("; ")))
}
