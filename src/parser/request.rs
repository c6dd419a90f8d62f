//! HTTP request representation.

use crate::parser::error::Error;
use crate::parser::method::Method;

/// A request as collected by the [`RequestParser`](crate::parser::RequestParser).
///
/// Only the fields the file server acts on are kept. Missing tokens are left as
/// empty strings; it is up to the consumer to reject them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// The method token of the request line, verbatim
    pub method: String,
    /// The path token of the request line, verbatim
    pub path: String,
    /// The value of the `Host` header, empty if none was sent
    pub host: String,
    /// Set once the blank line terminating the header block has been seen
    pub complete: bool,
}

impl Request {
    /// Create an empty, incomplete request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret the method token.
    ///
    /// # Returns
    ///
    /// The typed method, or an error if the token is empty or unknown
    pub fn parsed_method(&self) -> Result<Method, Error> {
        self.method.parse()
    }
}
