//! Accepted connections and the registry used to force them closed.

use std::collections::HashMap;
use std::net::{Shutdown as SocketShutdown, SocketAddr, TcpStream};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, warn};

/// An accepted client socket.
///
/// Moves from the listener into the queue and from there to exactly one
/// worker. Dropping it closes the socket.
#[derive(Debug)]
pub struct Connection {
    /// Sequence number assigned by the listener, used in log lines
    pub id: u64,
    /// The client socket
    pub stream: TcpStream,
    /// The client address
    pub peer: SocketAddr,
}

impl Connection {
    /// Wrap an accepted socket.
    pub fn new(id: u64, stream: TcpStream, peer: SocketAddr) -> Self {
        Self { id, stream, peer }
    }
}

#[derive(Default)]
struct RegistryState {
    open: HashMap<u64, TcpStream>,
    closed: bool,
}

/// Tracks the connections workers are currently serving so shutdown can end
/// them once the grace period runs out.
///
/// Only a cloned handle of each socket is kept here; the worker remains the
/// sole reader and writer.
#[derive(Default)]
pub struct ConnectionRegistry {
    state: Mutex<RegistryState>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Track `connection` until the returned guard is dropped.
    ///
    /// After [`close_all`](Self::close_all) a newly registered connection is
    /// shut down immediately.
    pub fn register(&self, connection: &Connection) -> Registration<'_> {
        match connection.stream.try_clone() {
            Ok(handle) => {
                let mut state = self.lock();
                if state.closed {
                    let _ = handle.shutdown(SocketShutdown::Both);
                } else {
                    state.open.insert(connection.id, handle);
                }
            }
            Err(e) => warn!("Cannot track connection {id}: {e}", id = connection.id),
        }

        Registration {
            registry: self,
            id: connection.id,
        }
    }

    /// Number of connections currently tracked.
    pub fn len(&self) -> usize {
        self.lock().open.len()
    }

    /// Whether no connection is tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shut down every tracked socket, and any registered later.
    ///
    /// # Returns
    ///
    /// How many sockets were shut down.
    pub fn close_all(&self) -> usize {
        let mut state = self.lock();
        state.closed = true;
        let count = state.open.len();
        for (id, handle) in state.open.drain() {
            if let Err(e) = handle.shutdown(SocketShutdown::Both) {
                debug!("Shutdown of connection {id} failed: {e}");
            }
        }
        count
    }

    fn remove(&self, id: u64) {
        self.lock().open.remove(&id);
    }
}

/// Keeps a connection listed in its [`ConnectionRegistry`] while alive.
pub struct Registration<'a> {
    registry: &'a ConnectionRegistry,
    id: u64,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;

    fn pair(listener: &TcpListener, id: u64) -> (Connection, TcpStream) {
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (stream, peer) = listener.accept().unwrap();
        (Connection::new(id, stream, peer), client)
    }

    #[test]
    fn test_registration_is_removed_on_drop() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let (connection, _client) = pair(&listener, 1);
        let registry = ConnectionRegistry::new();

        let guard = registry.register(&connection);
        assert_eq!(registry.len(), 1);
        drop(guard);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_close_all_ends_blocked_reads() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let (mut connection, _client) = pair(&listener, 1);
        let registry = ConnectionRegistry::new();
        let _guard = registry.register(&connection);

        assert_eq!(registry.close_all(), 1);
        let mut buf = [0u8; 16];
        assert_eq!(connection.stream.read(&mut buf).unwrap_or(0), 0);
    }

    #[test]
    fn test_register_after_close_all_shuts_down() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let registry = ConnectionRegistry::new();
        registry.close_all();

        let (mut connection, _client) = pair(&listener, 2);
        let _guard = registry.register(&connection);
        assert!(registry.is_empty());
        let mut buf = [0u8; 16];
        assert_eq!(connection.stream.read(&mut buf).unwrap_or(0), 0);
    }
}
