//! Datagram IPC: the shared intake socket and one-shot reply delivery.
//!
//! One well-known Unix datagram socket accepts requests from any number
//! of concurrent clients; each reply goes to the per-client socket named
//! in the request.

use std::path::PathBuf;

use tokio::net::UnixDatagram;

use crate::protocol::MAX_REQUEST_LEN;

/// Default well-known intake socket path.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/hashd.sock";

/// The daemon's request intake endpoint.
pub struct Intake {
    socket: UnixDatagram,
    path: PathBuf,
}

impl Intake {
    /// Bind the intake socket, replacing any stale socket file left by a
    /// previous run.
    pub fn bind(path: &str) -> std::io::Result<Self> {
        let _ = std::fs::remove_file(path);
        let socket = UnixDatagram::bind(path)?;
        Ok(Self {
            socket,
            path: PathBuf::from(path),
        })
    }

    /// Receive one raw request, truncated to `MAX_REQUEST_LEN` bytes.
    pub async fn recv(&self) -> std::io::Result<Vec<u8>> {
        let mut buf = [0u8; MAX_REQUEST_LEN];
        let n = self.socket.recv(&mut buf).await?;
        Ok(buf[..n].to_vec())
    }
}

impl Drop for Intake {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Deliver one reply message to a client's reply socket.
pub async fn send_reply(dest: &str, message: &[u8]) -> std::io::Result<()> {
    let socket = UnixDatagram::unbound()?;
    socket.send_to(message, dest).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn socket_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("hashd-{}-{}.sock", name, std::process::id()))
    }

    #[tokio::test]
    async fn test_intake_receives_client_datagram() {
        let path = socket_path("intake-recv");
        let intake = Intake::bind(path.to_str().unwrap()).unwrap();

        let client = UnixDatagram::unbound().unwrap();
        client.send_to(b"/etc/hosts|/tmp/reply", &path).await.unwrap();

        let raw = intake.recv().await.unwrap();
        assert_eq!(raw, b"/etc/hosts|/tmp/reply");
    }

    #[tokio::test]
    async fn test_oversized_datagram_is_truncated() {
        let path = socket_path("intake-trunc");
        let intake = Intake::bind(path.to_str().unwrap()).unwrap();

        let message = vec![b'a'; MAX_REQUEST_LEN + 500];
        let client = UnixDatagram::unbound().unwrap();
        client.send_to(&message, &path).await.unwrap();

        let raw = intake.recv().await.unwrap();
        assert_eq!(raw.len(), MAX_REQUEST_LEN);
        assert_eq!(raw, message[..MAX_REQUEST_LEN]);
    }

    #[tokio::test]
    async fn test_send_reply_reaches_bound_socket() {
        let path = socket_path("reply");
        let _ = std::fs::remove_file(&path);
        let receiver = UnixDatagram::bind(&path).unwrap();

        send_reply(path.to_str().unwrap(), b"SHA256(/a) = 00\n")
            .await
            .unwrap();

        let mut buf = [0u8; 64];
        let n = receiver.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"SHA256(/a) = 00\n");

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_send_reply_to_missing_socket_fails() {
        let path = socket_path("reply-missing");
        let _ = std::fs::remove_file(&path);
        assert!(send_reply(path.to_str().unwrap(), b"x").await.is_err());
    }

    #[tokio::test]
    async fn test_drop_removes_socket_file() {
        let path = socket_path("intake-drop");
        let intake = Intake::bind(path.to_str().unwrap()).unwrap();
        assert!(path.exists());
        drop(intake);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_bind_replaces_stale_socket() {
        let path = socket_path("intake-stale");
        {
            let first = Intake::bind(path.to_str().unwrap()).unwrap();
            // Simulate a crashed daemon: leak the fd, leave the file.
            std::mem::forget(first);
        }
        assert!(path.exists());
        let second = Intake::bind(path.to_str().unwrap()).unwrap();
        assert!(path.exists());
        drop(second);
    }
}
