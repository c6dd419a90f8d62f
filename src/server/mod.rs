//! HTTP server implementation for microhttp-static.
//!
//! Connections flow from the [`Listener`] through a [`BoundedQueue`] to a
//! fixed [`WorkerPool`]. Each worker owns one connection at a time and runs
//! its request loop until the client goes away; [`ResponseBuilder`] maps each
//! request onto a file below the document root.

mod response;
mod config;
mod connection;
mod error;
mod handler;
mod host;
mod http_server;
mod listener;
mod mime;
mod queue;
mod shutdown;
mod worker;

// Re-export public items
pub use response::{HttpResponse, StatusCode};
pub use config::ServerConfig;
pub use connection::{Connection, ConnectionRegistry, Registration};
pub use error::Error;
pub use handler::{ResolvedFile, ResponseBuilder, DEFAULT_CHUNK_SIZE, INDEX_FILE};
pub use host::{AllowedHosts, HostValidator};
pub use http_server::HttpServer;
pub use listener::Listener;
pub use mime::{mime_type, DEFAULT_MIME_TYPE};
pub use queue::{BoundedQueue, QueueClosed};
pub use shutdown::Shutdown;
pub use worker::{handle_connection, WorkerContext, WorkerPool};
