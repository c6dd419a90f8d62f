//! The worker pool and the per-connection request loop.

use std::io::{ErrorKind, Read, Write};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use crate::parser::RequestParser;
use crate::server::connection::{Connection, ConnectionRegistry};
use crate::server::error::Error;
use crate::server::handler::ResponseBuilder;
use crate::server::queue::BoundedQueue;

/// Everything a worker needs, shared by all workers of a pool.
#[derive(Clone)]
pub struct WorkerContext {
    /// Source of connections
    pub queue: Arc<BoundedQueue<Connection>>,
    /// Produces the responses
    pub builder: Arc<ResponseBuilder>,
    /// Connections currently being served
    pub registry: Arc<ConnectionRegistry>,
    /// Maximum bytes taken from the socket per read
    pub read_buffer_size: usize,
    /// Lines longer than this are skipped by the parser
    pub max_line_length: usize,
}

/// A fixed set of threads, each serving one connection at a time.
pub struct WorkerPool {
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `size` workers pulling connections from `context.queue`.
    ///
    /// Workers run until the queue is closed. If a thread cannot be started
    /// the queue is closed, so the workers already running exit, and the
    /// error is returned.
    pub fn spawn(size: usize, context: WorkerContext) -> Result<Self, Error> {
        let mut workers = Vec::with_capacity(size);

        for index in 0..size {
            let worker_context = context.clone();
            let spawned = thread::Builder::new()
                .name(format!("worker-{index}"))
                .spawn(move || run_worker(index, &worker_context));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(source) => {
                    context.queue.close();
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(Error::WorkerSpawn { index, source });
                }
            }
        }

        Ok(Self { workers })
    }

    /// Number of workers in the pool.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Whether every worker has exited.
    pub fn is_finished(&self) -> bool {
        self.workers.iter().all(JoinHandle::is_finished)
    }

    /// Wait for every worker to exit.
    pub fn join(self) {
        for handle in self.workers {
            if handle.join().is_err() {
                warn!("A worker panicked");
            }
        }
    }
}

fn run_worker(index: usize, context: &WorkerContext) {
    debug!("Worker {index} started");
    while let Some(connection) = context.queue.get() {
        serve(connection, context);
    }
    debug!("Worker {index} exiting");
}

fn serve(mut connection: Connection, context: &WorkerContext) {
    let id = connection.id;
    let peer = connection.peer;
    debug!("Connection {id} from {peer} accepted");

    let _registration = context.registry.register(&connection);
    let result = handle_connection(
        &mut connection.stream,
        &context.builder,
        context.read_buffer_size,
        context.max_line_length,
    );

    match result {
        Ok(served) => debug!("Connection {id} from {peer} closed after {served} requests"),
        Err(e) => warn!("Connection {id} from {peer} terminated: {e}"),
    }
    // Dropping `connection` closes the socket
}

/// Serve every request arriving on `stream` until the peer closes it.
///
/// A fresh parser, and with it a fresh request, is used for each call, so no
/// state survives from one connection to the next.
///
/// # Returns
///
/// The number of responses sent, or the error that ended the connection.
pub fn handle_connection<S: Read + Write>(
    stream: &mut S,
    builder: &ResponseBuilder,
    read_buffer_size: usize,
    max_line_length: usize,
) -> Result<usize, Error> {
    let mut parser = RequestParser::with_max_line_length(max_line_length);
    let mut buf = vec![0; read_buffer_size.max(1)];
    let mut served = 0;

    loop {
        let n = match stream.read(&mut buf) {
            Ok(0) => return Ok(served),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        debug!("{n} bytes of data received");

        for request in parser.feed(&buf[..n]) {
            builder.respond(&request, stream)?;
            served += 1;
        }
    }
}
