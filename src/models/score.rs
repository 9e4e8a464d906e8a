/// Result of scoring a peer's transfer behavior
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreResult {
    /// upload / (download + 1)
    pub ratio: f64,
    pub score: f64,
    pub ban: bool,
}

/// Why a peer was not scored
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    Seeder,
    SlowDownload,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Evaluation {
    Skipped(SkipReason),
    Scored(ScoreResult),
}

impl Evaluation {
    pub fn score(&self) -> Option<&ScoreResult> {
        match self {
            Evaluation::Scored(result) => Some(result),
            Evaluation::Skipped(_) => None,
        }
    }
}
