mod cache;
mod client;
mod dispatcher;
mod hasher;
mod logging;
mod protocol;
mod queue;
mod server;
mod transport;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::error;

#[derive(Parser)]
#[command(name = "hashd")]
#[command(about = "Local SHA-256 file-hashing daemon with request coalescing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the daemon server
    Start {
        /// Custom intake socket path
        #[arg(long)]
        socket_path: Option<String>,

        /// Maximum number of concurrent hashing workers
        #[arg(long, default_value_t = dispatcher::DEFAULT_POOL_LIMIT)]
        pool_size: usize,

        /// Maximum number of cached path digests
        #[arg(long, default_value_t = cache::DEFAULT_CAPACITY)]
        cache_capacity: usize,
    },
    /// Request the digest of a file from a running daemon
    Hash {
        /// File to hash
        path: PathBuf,

        /// Intake socket path of the daemon
        #[arg(long)]
        socket_path: Option<String>,
    },
}

fn main() {
    logging::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            socket_path,
            pool_size,
            cache_capacity,
        } => {
            let config = server::ServerConfig {
                socket_path: socket_path
                    .unwrap_or_else(|| transport::DEFAULT_SOCKET_PATH.to_string()),
                pool_limit: pool_size,
                cache_capacity,
            };
            if let Err(e) = server::run(config) {
                error!("Server error: {}", e);
            }
        }
        Commands::Hash { path, socket_path } => {
            let socket_path =
                socket_path.unwrap_or_else(|| transport::DEFAULT_SOCKET_PATH.to_string());
            if let Err(e) = client::run(&path, &socket_path) {
                error!("Client error: {}", e);
            }
        }
    }
}
