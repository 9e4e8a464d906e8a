use crate::core::error::BlockError;
use async_trait::async_trait;
use std::fmt;

/// Time-limited address blocklist
///
/// `block` must be idempotent: blocking an address that is already listed
/// refreshes its timeout instead of failing. Implementations must tolerate
/// concurrent calls.
#[async_trait]
pub trait Blocklist: Send + Sync {
    async fn block(&self, address: &str, timeout_secs: u64) -> Result<(), BlockError>;
}

/// What happened when a peer was flagged for blocking
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockStatus {
    Applied,
    /// Dry run, nothing was sent to the blocklist
    DryRun,
    /// Already blocked earlier in this scan
    AlreadyBlocked,
    /// The blocklist rejected the address; the scan carried on
    Failed(String),
}

impl BlockStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, BlockStatus::Failed(_))
    }
}

impl fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockStatus::Applied => write!(f, "blocked"),
            BlockStatus::DryRun => write!(f, "dry-run"),
            BlockStatus::AlreadyBlocked => write!(f, "already blocked"),
            BlockStatus::Failed(reason) => write!(f, "block failed: {}", reason),
        }
    }
}
