//! One-shot client: ask a running daemon for a file's digest.
//!
//! The client binds a reply socket unique to its process, sends exactly
//! one request, reads exactly one response, and cleans the socket up.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::net::UnixDatagram;

use crate::protocol::{self, MAX_REQUEST_LEN};

/// A socket name unique to this process and instant, so a recycled pid
/// cannot collide with a stale socket left by an unclean exit.
fn reply_socket_path() -> std::path::PathBuf {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!(
        "hashd_client_{}_{:08x}.sock",
        std::process::id(),
        nonce
    ))
}

#[tokio::main]
pub async fn run(path: &Path, server_socket: &str) -> Result<(), Box<dyn std::error::Error>> {
    let reply_path = reply_socket_path();
    let _ = std::fs::remove_file(&reply_path);
    let socket = UnixDatagram::bind(&reply_path)?;

    let result = exchange(&socket, server_socket, path, &reply_path).await;

    // The reply socket is ours to clean up, success or not.
    let _ = std::fs::remove_file(&reply_path);

    print!("{}", result?);
    Ok(())
}

async fn exchange(
    socket: &UnixDatagram,
    server_socket: &str,
    path: &Path,
    reply_path: &Path,
) -> Result<String, std::io::Error> {
    let request = protocol::format_request(path, &reply_path.to_string_lossy());
    socket.send_to(request.as_bytes(), server_socket).await?;

    let mut buf = [0u8; MAX_REQUEST_LEN];
    let n = socket.recv(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf[..n]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_socket_path_is_unique_per_call() {
        let first = reply_socket_path();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = reply_socket_path();
        assert_ne!(first, second);
    }
}
