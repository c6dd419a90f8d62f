//! Error types for the HTTP parser.

use thiserror::Error;

/// Errors that can occur while interpreting a parsed request.
///
/// The incremental parser itself never fails: malformed or oversized lines are
/// skipped. These errors surface when the collected fields are converted into
/// typed values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The HTTP method in the request is not one we recognise.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The request line carried no method token.
    #[error("Empty HTTP method")]
    EmptyMethod,
}
