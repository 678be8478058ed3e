//! Synchronous client core for the submission-stats screen.
//!
//! # Overview
//! Builds the GraphQL `HttpRequest` and parses the `HttpResponse` without
//! touching the network (host-does-IO pattern), and owns the view state
//! machine that decides when a fetch may start. The host executes the
//! actual HTTP round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - `StatsClient` is stateless; it holds only its `ClientConfig`.
//! - The fetch is split into `build_submission_counts` and
//!   `parse_submission_counts`; `fetch_submission_counts` glues both ends to
//!   a host-supplied `Transport`.
//! - `ViewController` owns the only mutable value, a `ViewState`, and tells
//!   the host through `Effect` when to invoke the client.
//! - Types use owned `String` / `Vec` fields to simplify FFI mapping.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod query;
pub mod state;
pub mod transport;
pub mod types;

pub use client::StatsClient;
pub use config::ClientConfig;
pub use error::{FetchError, TransitionError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, TRANSPORT_FAILURE_STATUS};
pub use state::{Effect, UserAction, ViewController, ViewEvent, ViewState};
pub use transport::{fetch_submission_counts, Transport};
pub use types::{Failure, FailureKind, FetchOutcome, SubmissionCount};
