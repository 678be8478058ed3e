//! Domain types for the submission-stats query.
//!
//! # Design
//! `SubmissionCount` is the only value the view ever displays. The GraphQL
//! envelope structs mirror the nesting of the endpoint's JSON reply and stay
//! crate-private: callers see a flat `Vec<SubmissionCount>` or a `Failure`.

use serde::{Deserialize, Serialize};

use crate::error::{FetchError, TransportError};
use crate::http::TRANSPORT_FAILURE_STATUS;

/// Accepted-submission tally for one difficulty bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionCount {
    pub difficulty: String,
    pub count: u64,
}

/// Which layer produced a `Failure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server answered with a non-200 status.
    HttpStatus,
    /// No response arrived (timeout, DNS, refused connection).
    Transport,
    /// A 200 response whose body did not decode.
    Decode,
}

/// A failed fetch as the view sees it: a code plus its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Failure {
    pub code: u16,
    pub kind: FailureKind,
}

/// Result of one fetch, exactly one variant active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(Vec<SubmissionCount>),
    Failure(Failure),
}

impl FetchOutcome {
    /// Collapse a parse result into the outcome shown to the user.
    pub fn from_result(result: Result<Vec<SubmissionCount>, FetchError>) -> Self {
        match result {
            Ok(counts) => FetchOutcome::Success(counts),
            Err(FetchError::HttpStatus { status, .. }) => FetchOutcome::Failure(Failure {
                code: status,
                kind: FailureKind::HttpStatus,
            }),
            Err(FetchError::Decode(_)) => FetchOutcome::Failure(Failure {
                code: TRANSPORT_FAILURE_STATUS,
                kind: FailureKind::Decode,
            }),
            Err(FetchError::Serialization(_)) => FetchOutcome::transport_failure(),
        }
    }

    /// The outcome for a round-trip that never produced a response.
    pub fn transport_failure() -> Self {
        FetchOutcome::Failure(Failure {
            code: TRANSPORT_FAILURE_STATUS,
            kind: FailureKind::Transport,
        })
    }

    pub fn from_transport_error(_err: &TransportError) -> Self {
        Self::transport_failure()
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// The failure code, or `None` on success.
    pub fn failure_code(&self) -> Option<u16> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failure(failure) => Some(failure.code),
        }
    }
}

// ---------------------------------------------------------------------------
// GraphQL reply envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQLReply {
    #[serde(default)]
    pub data: Option<ReplyData>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQLError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReplyData {
    #[serde(rename = "matchedUser")]
    pub matched_user: Option<MatchedUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatchedUser {
    #[serde(rename = "submitStats")]
    pub submit_stats: SubmitStats,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitStats {
    #[serde(rename = "acSubmissionNum")]
    pub ac_submission_num: Vec<SubmissionCount>,
}
