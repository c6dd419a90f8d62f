//! Command line entry point for microhttp-static.
//!
//! ```bash
//! microhttp-static --port 8080 --root ./public --allow-host localhost:8080
//! MICROHTTP_WORKERS=4 MICROHTTP_ROOT=./public microhttp-static
//! ```

use std::net::IpAddr;
use std::path::PathBuf;
use std::process;
use std::thread;

use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};

use microhttp_static::{HttpServer, ServerConfig, ServerError, Shutdown};

/// Serve a directory over HTTP/1.1.
///
/// Values given here override the configuration file, which overrides the
/// built-in defaults.
#[derive(Debug, Parser)]
#[command(name = "microhttp-static")]
#[command(about = "A minimal concurrent HTTP/1.1 static file server")]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, env = "MICROHTTP_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "MICROHTTP_PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(long, env = "MICROHTTP_BIND")]
    bind: Option<IpAddr>,

    /// Number of worker threads
    #[arg(short, long, env = "MICROHTTP_WORKERS")]
    workers: Option<usize>,

    /// Accepted connections allowed to wait for a worker
    #[arg(long, env = "MICROHTTP_QUEUE_CAPACITY")]
    queue_capacity: Option<usize>,

    /// Directory to serve
    #[arg(short, long, env = "MICROHTTP_ROOT")]
    root: Option<PathBuf>,

    /// Accepted Host header value, may be repeated
    #[arg(long = "allow-host", env = "MICROHTTP_ALLOWED_HOSTS", value_delimiter = ',')]
    allowed_hosts: Vec<String>,

    /// Milliseconds busy workers get to finish on shutdown
    #[arg(long)]
    shutdown_grace_ms: Option<u64>,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, ServerError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_json_file(path)?,
            None => ServerConfig::default(),
        };

        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(bind) = self.bind {
            config.bind_address = bind;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(capacity) = self.queue_capacity {
            config.queue_capacity = capacity;
        }
        if let Some(root) = self.root {
            config.document_root = root;
        }
        if !self.allowed_hosts.is_empty() {
            config.allowed_hosts = self.allowed_hosts;
        }
        if let Some(grace) = self.shutdown_grace_ms {
            config.shutdown_grace_ms = grace;
        }

        Ok(config)
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        error!("{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), ServerError> {
    let config = cli.into_config()?;
    let server = HttpServer::bind(config)?;
    spawn_signal_handler(server.shutdown_handle());
    server.run()
}

/// Trigger `shutdown` on Ctrl+C.
fn spawn_signal_handler(shutdown: Shutdown) {
    let spawned = thread::Builder::new()
        .name("signal".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    warn!("Unable to start signal runtime: {e}");
                    return;
                }
            };

            match runtime.block_on(tokio::signal::ctrl_c()) {
                Ok(()) => {
                    info!("Received Ctrl+C, shutting down...");
                    shutdown.trigger();
                }
                Err(e) => warn!("Unable to listen for Ctrl+C: {e}"),
            }
        });

    if let Err(e) = spawned {
        warn!("Unable to start signal thread, Ctrl+C will not shut down cleanly: {e}");
    }
}
