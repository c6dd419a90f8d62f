//! Server configuration.

use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::parser::DEFAULT_MAX_LINE_LENGTH;
use crate::server::error::Error;
use crate::server::handler::DEFAULT_CHUNK_SIZE;
use crate::server::host::AllowedHosts;

/// HTTP server configuration.
///
/// Every field has a default, so a JSON file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// The address to bind to.
    pub bind_address: IpAddr,
    /// The port to listen on.
    pub port: u16,
    /// Number of worker threads.
    pub workers: usize,
    /// Maximum number of accepted connections waiting for a worker.
    pub queue_capacity: usize,
    /// Directory files are served from.
    pub document_root: PathBuf,
    /// The read buffer size, also used as the file streaming chunk size.
    pub read_buffer_size: usize,
    /// Request and header lines longer than this are skipped.
    pub max_line_length: usize,
    /// Accepted `Host` header values. Empty means the loopback names for `port`.
    pub allowed_hosts: Vec<String>,
    /// How long shutdown waits for busy workers before closing their connections.
    pub shutdown_grace_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            workers: 10,
            queue_capacity: 100,
            document_root: PathBuf::from("."),
            read_buffer_size: DEFAULT_CHUNK_SIZE,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            allowed_hosts: Vec::new(),
            shutdown_grace_ms: 5_000,
        }
    }
}

impl ServerConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let config_error = |reason: String| Error::ConfigFile {
            path: path.to_path_buf(),
            reason,
        };
        let text = fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        Self::from_json_str(&text).map_err(|e| config_error(e.to_string()))
    }

    /// The socket address to bind.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// The shutdown grace period.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// The `Host` validator built from `allowed_hosts`.
    pub fn host_validator(&self) -> AllowedHosts {
        if self.allowed_hosts.is_empty() {
            AllowedHosts::loopback(self.port)
        } else {
            AllowedHosts::new(self.allowed_hosts.iter().cloned())
        }
    }

    /// Check that a server can be started with this configuration.
    pub fn validate(&self) -> Result<(), Error> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig("workers must be >= 1".to_string()));
        }
        if self.queue_capacity == 0 {
            return Err(Error::InvalidConfig("queue capacity must be >= 1".to_string()));
        }
        if self.read_buffer_size == 0 {
            return Err(Error::InvalidConfig("read buffer size must be >= 1".to_string()));
        }
        if self.max_line_length == 0 {
            return Err(Error::InvalidConfig("max line length must be >= 1".to_string()));
        }
        if !self.document_root.is_dir() {
            return Err(Error::InvalidConfig(format!(
                "document root {} is not a directory",
                self.document_root.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.workers, 10);
        assert_eq!(config.queue_capacity, 100);
        assert_eq!(config.read_buffer_size, 10_000);
        assert_eq!(config.max_line_length, 500);
        assert_eq!(config.shutdown_grace(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = ServerConfig::from_json_str(
            r#"{"port": 9090, "workers": 4, "allowed_hosts": ["example:9090"]}"#,
        )
        .unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.workers, 4);
        assert_eq!(config.queue_capacity, 100);
        assert_eq!(config.host_validator().hosts(), ["example:9090".to_string()]);
    }

    #[test]
    fn test_unknown_json_field_is_rejected() {
        assert!(ServerConfig::from_json_str(r#"{"prot": 1}"#).is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = ServerConfig::from_json_file("/nonexistent/microhttp.json");
        assert!(matches!(result, Err(Error::ConfigFile { .. })));
    }

    #[test]
    fn test_default_hosts_follow_port() {
        let config = ServerConfig {
            port: 9000,
            ..ServerConfig::default()
        };
        assert_eq!(
            config.host_validator().hosts(),
            ["localhost:9000".to_string(), "127.0.0.1:9000".to_string()]
        );
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        for config in [
            ServerConfig { workers: 0, ..ServerConfig::default() },
            ServerConfig { queue_capacity: 0, ..ServerConfig::default() },
            ServerConfig { read_buffer_size: 0, ..ServerConfig::default() },
            ServerConfig { max_line_length: 0, ..ServerConfig::default() },
        ] {
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_validate_rejects_missing_root() {
        let config = ServerConfig {
            document_root: PathBuf::from("/nonexistent/microhttp-root"),
            ..ServerConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
