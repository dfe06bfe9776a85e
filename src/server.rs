//! Daemon wiring: the intake loop feeding the dispatcher.

use tracing::{debug, error, info};

use crate::dispatcher::{Dispatcher, FileDigester};
use crate::protocol;
use crate::transport::Intake;

pub struct ServerConfig {
    pub socket_path: String,
    pub pool_limit: usize,
    pub cache_capacity: usize,
}

/// Run the daemon until Ctrl-C. The intake socket is created on startup
/// and removed on shutdown; individual request errors never stop the loop.
#[tokio::main]
pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let intake = Intake::bind(&config.socket_path)?;
    info!(
        socket = %config.socket_path,
        pool_limit = config.pool_limit,
        cache_capacity = config.cache_capacity,
        "daemon listening"
    );

    let dispatcher = Dispatcher::new(FileDigester, config.pool_limit, config.cache_capacity);

    loop {
        tokio::select! {
            received = intake.recv() => {
                match received {
                    Ok(raw) => match protocol::parse_request(&raw) {
                        Some(request) => dispatcher.submit(&request.path, request.reply_dest),
                        None => debug!(len = raw.len(), "malformed request dropped"),
                    },
                    Err(e) => error!(error = %e, "intake receive failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}
