//! Static file responses.

use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

use crate::parser::Request;
use crate::server::error::Error;
use crate::server::host::HostValidator;
use crate::server::mime::mime_type;
use crate::server::response::{HttpResponse, StatusCode};

/// File served for the root path and for directories.
pub const INDEX_FILE: &str = "index.html";

/// Default size of the chunks a file body is streamed in.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

const WRONG_HOST_BODY: &str = "Wrong hostname.\n";
const WRONG_METHOD_BODY: &str = "Wrong method.\n";
const NOT_FOUND_BODY: &str = "Not found.\n";

/// A file ready to be streamed.
#[derive(Debug)]
pub struct ResolvedFile {
    /// Location on disk
    pub path: PathBuf,
    /// The opened file
    pub file: File,
    /// Size announced as `Content-Length`
    pub len: u64,
}

/// Turns completed requests into responses for files below a document root.
#[derive(Clone)]
pub struct ResponseBuilder {
    document_root: PathBuf,
    hosts: Arc<dyn HostValidator>,
    chunk_size: usize,
}

impl ResponseBuilder {
    /// Serve files below `document_root` to requests whose `Host` passes `hosts`.
    pub fn new(document_root: impl Into<PathBuf>, hosts: impl HostValidator + 'static) -> Self {
        Self {
            document_root: document_root.into(),
            hosts: Arc::new(hosts),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Stream file bodies in chunks of `chunk_size` bytes.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// The directory files are served from.
    pub fn document_root(&self) -> &Path {
        &self.document_root
    }

    /// Write the response for `request` to `out`.
    ///
    /// Client mistakes become `400`, `405` or `404` responses and are not
    /// errors. An error means the connection can no longer be used: the write
    /// failed, or the file delivered fewer bytes than announced.
    ///
    /// # Returns
    ///
    /// The status that was sent
    pub fn respond<W: Write>(&self, request: &Request, out: &mut W) -> Result<StatusCode, Error> {
        let status = if !self.hosts.is_allowed(&request.host) {
            Self::send_error(out, StatusCode::BadRequest, WRONG_HOST_BODY)?
        } else if !Self::is_get(request) {
            Self::send_error(out, StatusCode::MethodNotAllowed, WRONG_METHOD_BODY)?
        } else {
            match self.resolve(&request.path) {
                Some(resolved) => self.send_file(out, resolved)?,
                None => Self::send_error(out, StatusCode::NotFound, NOT_FOUND_BODY)?,
            }
        };

        info!(
            "{host} {code} {reason} {method} {path}",
            host = request.host,
            code = status.as_u16(),
            reason = status.reason_phrase(),
            method = request.method,
            path = request.path
        );
        Ok(status)
    }

    fn is_get(request: &Request) -> bool {
        match request.parsed_method() {
            Ok(method) => method.serves_files(),
            Err(e) => {
                debug!("Rejecting request method: {e}");
                false
            }
        }
    }

    /// Map a request path onto an open file below the document root.
    ///
    /// The query string and fragment are ignored, the leading `/` is dropped,
    /// and directories resolve to their `index.html`. Paths that would leave
    /// the document root resolve to nothing.
    pub fn resolve(&self, request_path: &str) -> Option<ResolvedFile> {
        let request_path = request_path
            .find(|c: char| c == '?' || c == '#')
            .map_or(request_path, |end| &request_path[..end]);
        let relative = request_path.strip_prefix('/').unwrap_or(request_path);

        let mut path = self.document_root.clone();
        if relative.is_empty() {
            path.push(INDEX_FILE);
        }
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    debug!("Refusing path outside document root: {request_path}");
                    return None;
                }
            }
        }

        let mut metadata = fs::metadata(&path).ok()?;
        if metadata.is_dir() {
            path.push(INDEX_FILE);
            metadata = fs::metadata(&path).ok()?;
        }
        if !metadata.is_file() {
            return None;
        }

        let file = File::open(&path).ok()?;
        let len = file.metadata().ok()?.len();
        Some(ResolvedFile { path, file, len })
    }

    fn send_error<W: Write>(out: &mut W, status: StatusCode, body: &str) -> Result<StatusCode, Error> {
        let response = HttpResponse::new(status)
            .with_content_type("text/html")
            .with_body_string(body);
        out.write_all(&response.to_bytes())?;
        out.flush()?;
        Ok(status)
    }

    fn send_file<W: Write>(&self, out: &mut W, resolved: ResolvedFile) -> Result<StatusCode, Error> {
        let ResolvedFile { path, file, len } = resolved;
        let response = HttpResponse::new(StatusCode::Ok)
            .with_content_type(mime_type(&path))
            .with_content_length(len);
        out.write_all(&response.head_bytes())?;

        let sent = self.stream_body(file, len, out)?;
        out.flush()?;
        if sent < len {
            return Err(Error::ShortBody {
                path,
                expected: len,
                sent,
            });
        }
        debug!("Sent {sent} bytes of {path}", path = path.display());
        Ok(StatusCode::Ok)
    }

    /// Copy at most `len` bytes of `body` to `out`, returning how many were sent.
    fn stream_body<R: Read, W: Write>(&self, body: R, len: u64, out: &mut W) -> Result<u64, Error> {
        let mut body = body.take(len);
        let mut buf = vec![0; self.chunk_size];
        let mut sent = 0u64;

        loop {
            let n = match body.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            out.write_all(&buf[..n])?;
            sent += n as u64;
        }

        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn builder() -> ResponseBuilder {
        ResponseBuilder::new(std::env::temp_dir(), |_: &str| true).with_chunk_size(4)
    }

    #[test]
    fn test_stream_body_writes_exact_length() {
        let mut out = Vec::new();
        let sent = builder()
            .stream_body(Cursor::new(b"0123456789abcdef".to_vec()), 10, &mut out)
            .unwrap();
        assert_eq!(sent, 10);
        assert_eq!(out, b"0123456789");
    }

    #[test]
    fn test_stream_body_reports_short_source() {
        let mut out = Vec::new();
        let sent = builder()
            .stream_body(Cursor::new(b"abc".to_vec()), 10, &mut out)
            .unwrap();
        assert_eq!(sent, 3);
    }

    #[test]
    fn test_resolve_rejects_parent_segments() {
        let builder = builder();
        assert!(builder.resolve("/../etc/passwd").is_none());
        assert!(builder.resolve("//etc/passwd").is_none());
        assert!(builder.resolve("/a/../../b").is_none());
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        let builder = ResponseBuilder::new(".", |_: &str| true).with_chunk_size(0);
        let mut out = Vec::new();
        let sent = builder.stream_body(Cursor::new(b"xy".to_vec()), 2, &mut out).unwrap();
        assert_eq!(sent, 2);
    }
}
