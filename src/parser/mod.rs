//! HTTP parser module.
//!
//! This module turns the raw byte stream of a connection into a sequence of
//! completed requests. Bytes may arrive in arbitrary chunks; the parser
//! buffers partial lines until their terminator shows up.

mod request;
mod method;
mod incremental;
mod error;

// Re-export public items
pub use request::Request;
pub use method::Method;
pub use incremental::{ParserState, RequestParser, DEFAULT_MAX_LINE_LENGTH};
pub use error::Error;
