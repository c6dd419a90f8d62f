//! HTTP server implementation.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::server::config::ServerConfig;
use crate::server::connection::{Connection, ConnectionRegistry};
use crate::server::error::Error;
use crate::server::handler::ResponseBuilder;
use crate::server::listener::Listener;
use crate::server::queue::BoundedQueue;
use crate::server::shutdown::Shutdown;
use crate::server::worker::{WorkerContext, WorkerPool};

/// How often shutdown checks whether the workers have drained.
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long the loopback connection that wakes `accept` may take.
const WAKE_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// A static file server: one listener, a bounded queue and a worker pool.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    listener: TcpListener,
    local_addr: SocketAddr,
    shutdown: Shutdown,
}

impl HttpServer {
    /// Validate `config` and bind the listening socket.
    pub fn bind(config: ServerConfig) -> Result<Self, Error> {
        config.validate()?;

        let listener = TcpListener::bind(config.addr())?;
        let local_addr = listener.local_addr()?;
        info!("Server listening on http://{local_addr}");

        let shutdown = Shutdown::new();
        // A blocked accept only returns for a new connection, so make one
        let wake_addr = Self::wake_addr(local_addr);
        shutdown.on_trigger(move || {
            if let Err(e) = TcpStream::connect_timeout(&wake_addr, WAKE_CONNECT_TIMEOUT) {
                debug!("Wake-up connection to {wake_addr} failed: {e}");
            }
        });

        Ok(Self {
            config,
            listener,
            local_addr,
            shutdown,
        })
    }

    /// The address actually bound, useful when the configured port is 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// A token that stops [`run`](Self::run) when triggered.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    fn wake_addr(local_addr: SocketAddr) -> SocketAddr {
        let ip = match local_addr.ip() {
            IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
            ip => ip,
        };
        SocketAddr::new(ip, local_addr.port())
    }

    /// Serve until the shutdown token is triggered.
    ///
    /// The listener runs on the calling thread. On shutdown, connections still
    /// waiting in the queue are dropped, busy workers get the configured grace
    /// period to finish, and any connection still open afterwards is closed.
    pub fn run(self) -> Result<(), Error> {
        let queue = Arc::new(BoundedQueue::<Connection>::new(self.config.queue_capacity));
        let registry = Arc::new(ConnectionRegistry::new());
        let builder = ResponseBuilder::new(self.config.document_root.clone(), self.config.host_validator())
            .with_chunk_size(self.config.read_buffer_size);

        let pool = WorkerPool::spawn(
            self.config.workers,
            WorkerContext {
                queue: Arc::clone(&queue),
                builder: Arc::new(builder),
                registry: Arc::clone(&registry),
                read_buffer_size: self.config.read_buffer_size,
                max_line_length: self.config.max_line_length,
            },
        )?;
        info!(
            "Started {workers} workers, queue capacity {capacity}, serving {root}",
            workers = pool.size(),
            capacity = queue.capacity(),
            root = self.config.document_root.display()
        );

        {
            let queue = Arc::clone(&queue);
            self.shutdown.on_trigger(move || {
                let dropped = queue.close();
                if !dropped.is_empty() {
                    info!("Dropping {count} queued connections", count = dropped.len());
                }
            });
        }

        Listener::new(self.listener, Arc::clone(&queue), self.shutdown.clone()).run();

        Self::perform_shutdown(&pool, &registry, self.config.shutdown_grace());
        pool.join();
        info!("Server shutdown complete");
        Ok(())
    }

    fn perform_shutdown(pool: &WorkerPool, registry: &ConnectionRegistry, grace: Duration) {
        info!(
            "Waiting up to {grace:?} for {active} active connections to complete...",
            active = registry.len()
        );

        let deadline = Instant::now() + grace;
        while !pool.is_finished() && Instant::now() < deadline {
            thread::sleep(SHUTDOWN_POLL_INTERVAL);
        }

        if !pool.is_finished() {
            let closed = registry.close_all();
            warn!("Grace period expired, closed {closed} connections");
        }
    }
}
