//! HTTP request methods.

use std::fmt;
use std::str::FromStr;

use crate::parser::error::Error;

/// A recognised request method token.
///
/// Parsing tells an unknown token apart from an empty one. Only
/// [`Method::GET`] is served; every other method, known or not, is answered
/// with `405 Method Not Allowed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    HEAD,
    OPTIONS,
    PATCH,
}

const TOKENS: [(&str, Method); 7] = [
    ("GET", Method::GET),
    ("POST", Method::POST),
    ("PUT", Method::PUT),
    ("DELETE", Method::DELETE),
    ("HEAD", Method::HEAD),
    ("OPTIONS", Method::OPTIONS),
    ("PATCH", Method::PATCH),
];

impl Method {
    /// The token as it appears on the request line.
    pub fn as_str(self) -> &'static str {
        TOKENS
            .iter()
            .find(|(_, method)| *method == self)
            .map_or("", |(token, _)| token)
    }

    /// Whether a request with this method gets a file.
    pub fn serves_files(self) -> bool {
        self == Method::GET
    }
}

// Tokens are case-sensitive (RFC 7230 section 3.1.1)
impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(Error::EmptyMethod);
        }
        TOKENS
            .iter()
            .find(|(token, _)| *token == s)
            .map(|(_, method)| *method)
            .ok_or_else(|| Error::InvalidMethod(s.to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
