//! Chunked SHA-256 digest of file contents.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use sha2::{Digest, Sha256};

/// Length of a SHA-256 digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// A raw SHA-256 digest of one file's contents.
pub type FileDigest = [u8; DIGEST_LEN];

const CHUNK_SIZE: usize = 8192;

#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to open file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Hash a single file, reading sequentially in fixed-size chunks.
///
/// A read failure partway through discards the partial digest.
pub async fn digest_file(path: &Path) -> Result<FileDigest, HashError> {
    let mut file = File::open(path).await.map_err(|source| HashError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHUNK_SIZE];

    loop {
        let n = file.read(&mut buf).await.map_err(|source| HashError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hasher.finalize().into())
}

/// Lowercase hex rendering of a digest.
pub fn to_hex(digest: &FileDigest) -> String {
    hex::encode(digest)
}
