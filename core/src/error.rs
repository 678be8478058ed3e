//! Error types for the submission-stats client.
//!
//! # Design
//! `FetchError` covers everything the core itself can detect: a non-200
//! status, a body that does not decode, or a request body that cannot be
//! serialized. `TransportError` is produced by the host when the round-trip
//! never yields a response. Both collapse into a `Failure` with a numeric
//! code once they reach the view layer.

use thiserror::Error;

/// Errors returned by `StatsClient` build and parse methods.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a status other than 200.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// A 200 response whose body is not the expected GraphQL shape.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Failures raised by a `Transport` before any response arrived.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    /// DNS failure, connection refused, TLS handshake and similar.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other socket failure while sending or reading the exchange.
    #[error("I/O error: {0}")]
    Io(String),
}

/// A view event that is not defined for the current state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("event `{event}` is not allowed in state `{state}`")]
    NotAllowed {
        state: &'static str,
        event: &'static str,
    },
}
