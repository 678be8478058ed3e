//! The seam where a host plugs in real I/O.
//!
//! The core never opens a socket. A `Transport` takes the plain-data request
//! built by `StatsClient` and returns the plain-data response, or a
//! `TransportError` when no response arrived at all.

use tracing::warn;

use crate::client::StatsClient;
use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::FetchOutcome;

/// Executes one HTTP round-trip, honoring `HttpRequest::timeout_ms`.
///
/// Non-2xx statuses are responses, not errors: they must come back as
/// `Ok(HttpResponse)` so the client can surface the code.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

/// Build, execute and parse the submission-stats query.
///
/// Performs exactly one `execute` call and never retries.
pub fn fetch_submission_counts<T>(client: &StatsClient, transport: &T) -> FetchOutcome
where
    T: Transport + ?Sized,
{
    let request = match client.build_submission_counts() {
        Ok(request) => request,
        Err(err) => {
            warn!(error = %err, "could not build submission counts request");
            return FetchOutcome::from_result(Err(err));
        }
    };

    let response = match transport.execute(request) {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "transport failure");
            return FetchOutcome::from_transport_error(&err);
        }
    };

    let result = client.parse_submission_counts(response);
    if let Err(err) = &result {
        warn!(error = %err, "submission counts fetch failed");
    }
    FetchOutcome::from_result(result)
}
