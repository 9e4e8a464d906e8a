use crate::anti_leech::scorer::LeechScorer;
use crate::api::client::PeerSource;
use crate::core::config::Config;
use crate::core::error::TransportError;
use crate::identity::classifier::{classify, ClientTag};
use crate::identity::decoder::decode;
use crate::models::peer::PeerObservation;
use crate::models::score::Evaluation;
use crate::scan::report::{FailedTransfer, PeerOutcome, ScanReport, Verdict};
use crate::security::blocklist::{BlockStatus, Blocklist};
use crate::utils::time;
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Tunables for a scan, fixed at construction
#[derive(Clone, Copy, Debug)]
pub struct ScanSettings {
    pub ban_timeout_secs: u64,
    pub dry_run: bool,
    /// Upper bound on each RPC call
    pub call_timeout: Duration,
}

impl ScanSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ban_timeout_secs: config.blocking.ban_timeout,
            dry_run: config.blocking.dry_run,
            call_timeout: config.rpc.timeout(),
        }
    }
}

/// Single-pass sweep over every peer of every active transfer
///
/// Holds no state between scans; each call to [`Scanner::run_scan`] starts
/// from scratch.
pub struct Scanner<S, B> {
    source: S,
    blocklist: B,
    scorer: LeechScorer,
    settings: ScanSettings,
}

impl<S: PeerSource, B: Blocklist> Scanner<S, B> {
    pub fn new(source: S, blocklist: B, scorer: LeechScorer, settings: ScanSettings) -> Self {
        Self {
            source,
            blocklist,
            scorer,
            settings,
        }
    }

    pub fn from_config(source: S, blocklist: B, config: &Config) -> Self {
        Self::new(
            source,
            blocklist,
            LeechScorer::from_config(&config.detection),
            ScanSettings::from_config(config),
        )
    }

    pub fn blocklist(&self) -> &B {
        &self.blocklist
    }

    /// Run one scan. Fails only if the active transfer list cannot be fetched.
    pub async fn run_scan(&self) -> Result<ScanReport, TransportError> {
        let started_at = time::now();
        info!(dry_run = self.settings.dry_run, "Scan started");

        let transfers = self.bounded(self.source.list_active_transfers()).await?;

        let mut outcomes = Vec::new();
        let mut transfers_failed = Vec::new();
        let mut blocked = HashSet::new();

        for transfer in &transfers {
            let peers = match self.bounded(self.source.list_peers(&transfer.gid)).await {
                Ok(peers) => peers,
                Err(e) => {
                    warn!(
                        gid = %transfer.gid,
                        error = %e,
                        "Failed to list peers, skipping transfer"
                    );
                    transfers_failed.push(FailedTransfer {
                        transfer_id: transfer.gid.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            debug!(gid = %transfer.gid, peers = peers.len(), "Inspecting transfer");

            for peer in &peers {
                if let Some(outcome) = self.inspect_peer(&transfer.gid, peer, &mut blocked).await {
                    outcomes.push(outcome);
                }
            }
        }

        let report = ScanReport {
            started_at,
            finished_at: time::now(),
            transfers_scanned: transfers.len(),
            transfers_failed,
            outcomes,
        };

        info!(
            transfers = report.transfers_scanned,
            transfers_failed = report.transfers_failed.len(),
            reported_peers = report.outcomes.len(),
            direct_bans = report.direct_bans().count(),
            score_bans = report.score_bans().count(),
            failed_blocks = report.failed_blocks(),
            "Scan finished"
        );

        Ok(report)
    }

    async fn inspect_peer(
        &self,
        transfer_id: &str,
        peer: &PeerObservation,
        blocked: &mut HashSet<String>,
    ) -> Option<PeerOutcome> {
        let peer_id = decode(&peer.raw_identifier);
        let client = classify(&peer_id);

        let verdict = if client == ClientTag::Xunlei {
            let status = self.ban(&peer.address, blocked).await;
            info!(ip = %peer.address, gid = transfer_id, status = %status, "Direct ban");
            Verdict::DirectBan(status)
        } else {
            match self.scorer.evaluate(peer) {
                Evaluation::Skipped(reason) => {
                    trace!(ip = %peer.address, peer_id = %peer_id, client = %client, reason = ?reason, "Peer not scored");
                    return None;
                }
                Evaluation::Scored(result) => {
                    let block = if result.ban {
                        let status = self.ban(&peer.address, blocked).await;
                        info!(
                            ip = %peer.address,
                            gid = transfer_id,
                            client = %client,
                            ratio = result.ratio,
                            score = result.score,
                            status = %status,
                            "Score ban"
                        );
                        Some(status)
                    } else {
                        debug!(
                            ip = %peer.address,
                            client = %client,
                            ratio = result.ratio,
                            score = result.score,
                            "Peer scored below threshold"
                        );
                        None
                    };
                    Verdict::Scored { result, block }
                }
            }
        };

        Some(PeerOutcome {
            transfer_id: transfer_id.to_string(),
            address: peer.address.clone(),
            client,
            download_speed: peer.download_speed,
            upload_speed: peer.upload_speed,
            verdict,
        })
    }

    async fn ban(&self, address: &str, blocked: &mut HashSet<String>) -> BlockStatus {
        if self.settings.dry_run {
            return BlockStatus::DryRun;
        }

        if blocked.contains(address) {
            return BlockStatus::AlreadyBlocked;
        }

        match self.blocklist.block(address, self.settings.ban_timeout_secs).await {
            Ok(()) => {
                blocked.insert(address.to_string());
                BlockStatus::Applied
            }
            Err(e) => {
                warn!(ip = %address, error = %e, "Failed to block peer");
                BlockStatus::Failed(e.to_string())
            }
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, TransportError>>,
    ) -> Result<T, TransportError> {
        tokio::time::timeout(self.settings.call_timeout, call)
            .await
            .unwrap_or(Err(TransportError::Timeout))
    }
}
