//! Wire format: delimiter-separated requests, single-line text responses.
//!
//! Kept free of socket I/O so parsing and formatting are unit-testable.

use std::path::PathBuf;

use crate::hasher::{self, FileDigest};

/// Largest raw request the intake reads; longer datagrams are truncated,
/// not rejected.
pub const MAX_REQUEST_LEN: usize = 1024;

const FIELD_DELIMITER: char = '|';

/// One raw client request: the file to hash and where to send the answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub path: PathBuf,
    pub reply_dest: String,
}

/// Parse a raw request of the shape `<file_path>|<reply_socket_path>`.
///
/// Returns `None` when the message is not UTF-8, the delimiter is
/// missing, or either field is empty; such requests are dropped.
pub fn parse_request(raw: &[u8]) -> Option<Request> {
    let text = std::str::from_utf8(raw).ok()?;
    let (path, reply_dest) = text.split_once(FIELD_DELIMITER)?;
    if path.is_empty() || reply_dest.is_empty() {
        return None;
    }
    Some(Request {
        path: PathBuf::from(path),
        reply_dest: reply_dest.to_string(),
    })
}

/// Encode a request for sending. Used by the client side.
pub fn format_request(path: &std::path::Path, reply_dest: &str) -> String {
    format!("{}{}{}", path.display(), FIELD_DELIMITER, reply_dest)
}

/// The single success line delivered to every waiter.
pub fn format_success(path: &std::path::Path, digest: &FileDigest) -> String {
    format!("SHA256({}) = {}\n", path.display(), hasher::to_hex(digest))
}

/// The single error line delivered to every waiter.
pub fn format_error(path: &std::path::Path) -> String {
    format!("ERROR: cannot read file {}\n", path.display())
}
