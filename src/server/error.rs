//! Error types for the HTTP server.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during HTTP server operation.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The configuration cannot be used to start a server.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be read or decoded.
    #[error("Cannot load configuration from {path}: {reason}")]
    ConfigFile {
        /// The file that was being loaded
        path: PathBuf,
        /// Why loading failed
        reason: String,
    },

    /// The file ended before the announced `Content-Length` was sent.
    #[error("Short body for {path}: announced {expected} bytes, sent {sent}")]
    ShortBody {
        /// The file being streamed
        path: PathBuf,
        /// The announced length
        expected: u64,
        /// What was actually written
        sent: u64,
    },

    /// A worker thread could not be started.
    #[error("Cannot spawn worker {index}: {source}")]
    WorkerSpawn {
        /// Position of the worker in the pool
        index: usize,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },
}
