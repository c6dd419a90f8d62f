//! Host header validation.

/// Decides whether a request's `Host` header names this server.
pub trait HostValidator: Send + Sync {
    /// Returns true if `host` is an accepted name for this server.
    fn is_allowed(&self, host: &str) -> bool;
}

impl<F> HostValidator for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_allowed(&self, host: &str) -> bool {
        self(host)
    }
}

/// Accepts an exact `name:port` match against a fixed list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedHosts {
    hosts: Vec<String>,
}

impl AllowedHosts {
    /// Create a validator accepting exactly the given names.
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
        }
    }

    /// The names served on the loopback interface for `port`.
    pub fn loopback(port: u16) -> Self {
        Self::new([format!("localhost:{port}"), format!("127.0.0.1:{port}")])
    }

    /// The accepted names.
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }
}

impl HostValidator for AllowedHosts {
    fn is_allowed(&self, host: &str) -> bool {
        !host.is_empty() && self.hosts.iter().any(|allowed| allowed == host)
    }
}
