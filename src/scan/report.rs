use crate::identity::classifier::ClientTag;
use crate::models::score::ScoreResult;
use crate::security::blocklist::BlockStatus;
use crate::utils::time::format_timestamp;
use chrono::{DateTime, Local};
use std::fmt;

/// What the scan decided for one peer
#[derive(Clone, Debug, PartialEq)]
pub enum Verdict {
    /// Targeted client family, banned without scoring
    DirectBan(BlockStatus),
    /// Scored; `block` is set when the score crossed the ban threshold
    Scored {
        result: ScoreResult,
        block: Option<BlockStatus>,
    },
}

/// One reported peer. Skipped peers produce no outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct PeerOutcome {
    pub transfer_id: String,
    pub address: String,
    pub client: ClientTag,
    pub download_speed: u64,
    pub upload_speed: u64,
    pub verdict: Verdict,
}

impl PeerOutcome {
    pub fn is_direct_ban(&self) -> bool {
        matches!(self.verdict, Verdict::DirectBan(_))
    }

    pub fn is_score_ban(&self) -> bool {
        matches!(self.verdict, Verdict::Scored { block: Some(_), .. })
    }

    pub fn block_status(&self) -> Option<&BlockStatus> {
        match &self.verdict {
            Verdict::DirectBan(status) => Some(status),
            Verdict::Scored { block, .. } => block.as_ref(),
        }
    }
}

impl fmt::Display for PeerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.verdict {
            Verdict::DirectBan(_) => write!(f, "{:15} {:6}  DIRECT BAN", self.address, self.client),
            Verdict::Scored { result, block } => {
                write!(
                    f,
                    "{:15} {:6} DL={:4}KB UL={:4}KB R={:.3} S={:.2}",
                    self.address,
                    self.client,
                    self.download_speed / 1024,
                    self.upload_speed / 1024,
                    result.ratio,
                    result.score,
                )?;
                if block.is_some() {
                    write!(f, "\n  >>> SCORE BAN")?;
                }
                Ok(())
            }
        }
    }
}

/// A transfer whose peers could not be listed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailedTransfer {
    pub transfer_id: String,
    pub reason: String,
}

#[derive(Clone, Debug)]
pub struct ScanReport {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub transfers_scanned: usize,
    pub transfers_failed: Vec<FailedTransfer>,
    pub outcomes: Vec<PeerOutcome>,
}

impl ScanReport {
    pub fn bans(&self) -> impl Iterator<Item = &PeerOutcome> {
        self.outcomes.iter().filter(|o| o.block_status().is_some())
    }

    pub fn direct_bans(&self) -> impl Iterator<Item = &PeerOutcome> {
        self.outcomes.iter().filter(|o| o.is_direct_ban())
    }

    pub fn score_bans(&self) -> impl Iterator<Item = &PeerOutcome> {
        self.outcomes.iter().filter(|o| o.is_score_ban())
    }

    pub fn failed_blocks(&self) -> usize {
        self.bans()
            .filter(|o| o.block_status().is_some_and(BlockStatus::is_failed))
            .count()
    }

    /// Full report: start line, one entry per outcome, end line
    pub fn render(&self) -> String {
        let mut out = format!("\n[{}] scan start\n", format_timestamp(&self.started_at));
        for outcome in &self.outcomes {
            out.push_str(&outcome.to_string());
            out.push('\n');
        }
        out.push_str(&format!("[{}] scan end", format_timestamp(&self.finished_at)));
        out
    }
}
