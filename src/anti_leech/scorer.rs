use crate::core::config::DetectionConfig;
use crate::models::peer::PeerObservation;
use crate::models::score::{Evaluation, ScoreResult, SkipReason};

/// Scores peers that take much more than they give
///
/// `ratio = upload / (download + 1)` and
/// `score = (1 - ratio) * log2(download + 1)`. The `+1` offsets are part of
/// the policy: they shift outcomes for peers near the minimum speed.
#[derive(Clone, Copy, Debug)]
pub struct LeechScorer {
    min_download_speed: u64,
    score_ban: f64,
}

impl LeechScorer {
    pub fn new(min_download_speed: u64, score_ban: f64) -> Self {
        Self {
            min_download_speed,
            score_ban,
        }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(config.min_download_speed, config.score_ban)
    }

    pub fn evaluate(&self, obs: &PeerObservation) -> Evaluation {
        if obs.is_seeder {
            return Evaluation::Skipped(SkipReason::Seeder);
        }

        // Too slow to judge
        if obs.download_speed < self.min_download_speed {
            return Evaluation::Skipped(SkipReason::SlowDownload);
        }

        let download = obs.download_speed as f64 + 1.0;
        let ratio = obs.upload_speed as f64 / download;
        let score = (1.0 - ratio) * download.log2();

        Evaluation::Scored(ScoreResult {
            ratio,
            score,
            ban: score >= self.score_ban,
        })
    }
}
