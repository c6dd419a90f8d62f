//! The accept loop feeding the connection queue.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::server::connection::Connection;
use crate::server::queue::BoundedQueue;
use crate::server::shutdown::Shutdown;

/// Pause after a failed `accept` so a persistent error (for example running
/// out of file descriptors) does not spin.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Accepts connections and hands them to the workers through the queue.
///
/// [`BoundedQueue::put`] blocks while the queue is full, so a saturated pool
/// stops the listener from accepting and new clients wait in the kernel
/// backlog.
pub struct Listener {
    listener: TcpListener,
    queue: Arc<BoundedQueue<Connection>>,
    shutdown: Shutdown,
    next_id: u64,
}

impl Listener {
    /// Create a listener feeding `queue` until `shutdown` is triggered.
    pub fn new(listener: TcpListener, queue: Arc<BoundedQueue<Connection>>, shutdown: Shutdown) -> Self {
        Self {
            listener,
            queue,
            shutdown,
            next_id: 0,
        }
    }

    /// Run the accept loop on the current thread until shutdown.
    ///
    /// # Returns
    ///
    /// The number of connections handed to the queue.
    pub fn run(mut self) -> u64 {
        if let Ok(addr) = self.listener.local_addr() {
            info!("Accepting connections on {addr}");
        }

        while !self.shutdown.is_triggered() {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    if !self.enqueue(stream, peer) {
                        break;
                    }
                }
                Err(e) => {
                    if self.shutdown.is_triggered() {
                        break;
                    }
                    warn!("Error accepting connection: {e}");
                    thread::sleep(ACCEPT_RETRY_DELAY);
                }
            }
        }

        info!("Listener stopped after {count} connections", count = self.next_id);
        self.next_id
    }

    /// Queue an accepted socket; false once the server is shutting down.
    fn enqueue(&mut self, stream: TcpStream, peer: SocketAddr) -> bool {
        if self.shutdown.is_triggered() {
            debug!("Dropping connection from {peer}: shutting down");
            return false;
        }

        let connection = Connection::new(self.next_id, stream, peer);
        debug!("Accepted connection {id} from {peer}", id = connection.id);

        match self.queue.put(connection) {
            Ok(()) => {
                self.next_id += 1;
                true
            }
            Err(closed) => {
                let connection = closed.into_inner();
                debug!("Dropping connection {id} from {peer}: queue closed", id = connection.id);
                false
            }
        }
    }
}
