//! Incremental request parsing.
//!
//! TCP hands us bytes in whatever chunks the network produced, so a request
//! line, a header, or the terminating blank line can be split across any
//! number of reads. [`RequestParser`] keeps the unterminated tail of the
//! stream between calls to [`RequestParser::feed`] and only interprets a line
//! once its `\n` has arrived.

use log::{debug, warn};

use crate::parser::request::Request;

/// Longest line, excluding its terminator, that the parser will interpret.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 500;

/// Where the parser is within the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Waiting for the first non-empty line of a request.
    AwaitingRequestLine,
    /// Request line seen, collecting headers until a blank line.
    ReadingHeaders,
    /// The last processed line completed a request.
    Complete,
}

/// A per-connection state machine turning bytes into [`Request`]s.
///
/// Create one per connection. Every completed request is handed out by value
/// and the parser starts over with an empty request, so pipelined requests on
/// the same connection never share fields.
#[derive(Debug)]
pub struct RequestParser {
    state: ParserState,
    request: Request,
    /// Bytes of the current, not yet terminated line
    pending: Vec<u8>,
    /// Set while dropping the remainder of an oversized line
    discarding: bool,
    max_line_length: usize,
}

impl RequestParser {
    /// Create a parser with the default line length limit.
    pub fn new() -> Self {
        Self::with_max_line_length(DEFAULT_MAX_LINE_LENGTH)
    }

    /// Create a parser that skips lines longer than `max_line_length` bytes.
    pub fn with_max_line_length(max_line_length: usize) -> Self {
        Self {
            state: ParserState::AwaitingRequestLine,
            request: Request::new(),
            pending: Vec::new(),
            discarding: false,
            max_line_length,
        }
    }

    /// The current state.
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// The request being assembled.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Number of bytes held back waiting for a line terminator.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Feed the next chunk read from the connection.
    ///
    /// # Returns
    ///
    /// Every request completed by this chunk, in arrival order. Most chunks
    /// complete zero or one request; pipelining clients may complete several.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Request> {
        let mut completed = Vec::new();
        let mut rest = chunk;

        while !rest.is_empty() {
            match rest.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    let line = &rest[..pos];
                    rest = &rest[pos + 1..];

                    if self.discarding {
                        // Tail of a line already reported as skipped
                        self.discarding = false;
                        continue;
                    }

                    let mut buffered = std::mem::take(&mut self.pending);
                    buffered.extend_from_slice(line);
                    if let Some(request) = self.process_line(&buffered) {
                        completed.push(request);
                    }
                    buffered.clear();
                    self.pending = buffered;
                }
                None => {
                    if !self.discarding {
                        self.pending.extend_from_slice(rest);
                        // One extra byte for a `\r` whose `\n` has not arrived yet
                        if self.pending.len() > self.max_line_length + 1 {
                            self.pending.clear();
                            self.discarding = true;
                            self.skip_line();
                        }
                    }
                    rest = &[];
                }
            }
        }

        completed
    }

    fn process_line(&mut self, line: &[u8]) -> Option<Request> {
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        if self.state == ParserState::Complete {
            self.state = ParserState::AwaitingRequestLine;
        }

        if line.len() > self.max_line_length {
            self.skip_line();
            return None;
        }

        let blank = line.is_empty();

        match self.state {
            ParserState::AwaitingRequestLine => {
                // Stray CRLFs between requests are tolerated
                if blank {
                    return None;
                }
                let text = String::from_utf8_lossy(line);
                let mut tokens = text.split_whitespace();
                self.request.method = tokens.next().unwrap_or_default().to_string();
                self.request.path = tokens.next().unwrap_or_default().to_string();
                self.state = ParserState::ReadingHeaders;
                None
            }
            ParserState::ReadingHeaders if blank => {
                self.request.complete = true;
                self.state = ParserState::Complete;
                let request = std::mem::take(&mut self.request);
                debug!(
                    "Request complete: {method} {path} (host {host:?})",
                    method = request.method,
                    path = request.path,
                    host = request.host
                );
                Some(request)
            }
            ParserState::ReadingHeaders => {
                let text = String::from_utf8_lossy(line);
                if let Some((name, value)) = text.split_once(": ") {
                    if name.eq_ignore_ascii_case("Host") {
                        self.request.host = value.trim().to_string();
                    }
                }
                None
            }
            ParserState::Complete => None,
        }
    }

    fn skip_line(&mut self) {
        warn!("Skipping line longer than {} bytes", self.max_line_length);
        match self.state {
            // The skipped line occupies the request line position
            ParserState::AwaitingRequestLine | ParserState::Complete => {
                self.state = ParserState::ReadingHeaders;
            }
            ParserState::ReadingHeaders => {}
        }
    }
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}
