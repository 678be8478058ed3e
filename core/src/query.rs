//! The GraphQL document sent to the profile endpoint.

use crate::error::FetchError;

/// Render the submission-stats query for `username`.
///
/// The username is embedded as a GraphQL string literal. JSON string escapes
/// are a subset of GraphQL's, so `serde_json` does the quoting.
pub fn submission_counts_document(username: &str) -> Result<String, FetchError> {
    let literal =
        serde_json::to_string(username).map_err(|e| FetchError::Serialization(e.to_string()))?;
    Ok(format!(
        r#"{{
    matchedUser(username: {literal}) {{
        submitStats: submitStatsGlobal {{
            acSubmissionNum {{
                difficulty
                count
                submissions
            }}
        }}
    }}
}}"#
    ))
}
