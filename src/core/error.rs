// Centralized error types for peer-guard

use thiserror::Error;

/// Errors talking to the download client's RPC interface
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("RPC call timed out")]
    Timeout,

    #[error("RPC request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("RPC endpoint returned HTTP status {0}")]
    Status(u16),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Malformed RPC response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_decode() {
            TransportError::MalformedResponse(err.to_string())
        } else {
            TransportError::Request(err)
        }
    }
}

/// Errors from the firewall blocklist
#[derive(Error, Debug)]
pub enum BlockError {
    #[error("Failed to run blocklist command: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Blocklist command exited with {code:?}: {stderr}")]
    Rejected { code: Option<i32>, stderr: String },
}
