//! A minimal concurrent HTTP/1.1 static file server.
//!
//! The server accepts TCP connections on one listener thread and hands them
//! through a fixed-capacity queue to a pool of worker threads. Each worker
//! reads requests incrementally, checks the `Host` header and method, and
//! streams the requested file from the document root.
//!
//! # Features
//!
//! - Incremental, chunk-boundary independent request parsing
//! - Several requests per connection, answered in order
//! - Backpressure: a full queue stops the listener from accepting
//! - Content type from the file extension
//! - Graceful shutdown with a bounded grace period
//!
//! # Examples
//!
//! ## Parsing a byte stream
//!
//! ```
//! use microhttp_static::{ParserState, RequestParser};
//!
//! let mut parser = RequestParser::new();
//!
//! // Bytes may arrive split anywhere
//! assert!(parser.feed(b"GET /index.html HTTP/1.1\r\nHo").is_empty());
//! let requests = parser.feed(b"st: localhost:8080\r\n\r\n");
//!
//! assert_eq!(requests.len(), 1);
//! assert_eq!(requests[0].method, "GET");
//! assert_eq!(requests[0].path, "/index.html");
//! assert_eq!(requests[0].host, "localhost:8080");
//! assert_eq!(parser.state(), ParserState::Complete);
//! ```
//!
//! ## Running a server
//!
//! ```no_run
//! use microhttp_static::{HttpServer, ServerConfig};
//!
//! let config = ServerConfig {
//!     port: 8080,
//!     document_root: "./public".into(),
//!     allowed_hosts: vec!["localhost:8080".to_string()],
//!     ..ServerConfig::default()
//! };
//!
//! let server = HttpServer::bind(config)?;
//! let shutdown = server.shutdown_handle();
//! std::thread::spawn(move || {
//!     std::thread::sleep(std::time::Duration::from_secs(60));
//!     shutdown.trigger();
//! });
//! server.run()?;
//! # Ok::<(), microhttp_static::ServerError>(())
//! ```

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, Method, ParserState, Request, RequestParser};
pub use server::{
    handle_connection, mime_type, AllowedHosts, BoundedQueue, Error as ServerError, HostValidator,
    HttpResponse, HttpServer, ResponseBuilder, ServerConfig, Shutdown, StatusCode,
};
