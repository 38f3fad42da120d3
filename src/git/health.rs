//! Repository health scoring
//!
//! The score is a weighted sum of clamped sub-scores in `[0, 1]`:
//!
//! | Signal        | Weight | Sub-score                                   |
//! |---------------|--------|---------------------------------------------|
//! | not archived  | 0.10   | 1 unless archived                           |
//! | recency       | 0.30   | step function of days since the last commit |
//! | popularity    | 0.20   | `ln(1 + stars + forks) / ln(1 + 1000)`      |
//! | issues        | 0.15   | issue resolution rate                       |
//! | contributors  | 0.15   | `ln(1 + contributors) / ln(1 + 20)`         |
//! | readme        | 0.05   | present / absent                            |
//! | license       | 0.05   | present / absent                            |
//!
//! Archived repositories lose the maintenance share and the remaining sum is
//! scaled by [`ARCHIVED_FACTOR`], so they never exceed 0.27.

use chrono::{DateTime, Utc};

use crate::git::types::GitRepositoryHealth;

/// Multiplier applied to the score of archived repositories
pub const ARCHIVED_FACTOR: f64 = 0.3;

/// Stars + forks at which popularity saturates
const POPULARITY_SATURATION: f64 = 1000.0;

/// Contributors at which the contributor signal saturates
const CONTRIBUTOR_SATURATION: f64 = 20.0;

/// Relative weight of each signal; the weights sum to 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthWeights {
    pub maintained: f64,
    pub recency: f64,
    pub popularity: f64,
    pub issues: f64,
    pub contributors: f64,
    pub readme: f64,
    pub license: f64,
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            maintained: 0.10,
            recency: 0.30,
            popularity: 0.20,
            issues: 0.15,
            contributors: 0.15,
            readme: 0.05,
            license: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GitHealthScorer {
    weights: HealthWeights,
}

impl GitHealthScorer {
    pub fn new(weights: HealthWeights) -> Self {
        Self { weights }
    }

    /// Score relative to the current time
    pub fn score(&self, health: &GitRepositoryHealth) -> f64 {
        self.score_at(health, Utc::now())
    }

    /// Score relative to `now`
    pub fn score_at(&self, health: &GitRepositoryHealth, now: DateTime<Utc>) -> f64 {
        let w = &self.weights;

        let signals = w.recency * recency_score(health.last_commit_date, now)
            + w.popularity * popularity_score(health.star_count.saturating_add(health.fork_count))
            + w.issues * health.issue_resolution_rate().clamp(0.0, 1.0)
            + w.contributors * contributor_score(health.contributor_count)
            + w.readme * flag(health.has_readme)
            + w.license * flag(health.has_license);

        let total = if health.is_archived {
            signals * ARCHIVED_FACTOR
        } else {
            w.maintained + signals
        };

        total.clamp(0.0, 1.0)
    }
}

/// Step function over the age of the newest commit; unknown age scores 0
fn recency_score(last_commit: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(last_commit) = last_commit else {
        return 0.0;
    };

    match (now - last_commit).num_days().max(0) {
        0..=30 => 1.0,
        31..=90 => 0.8,
        91..=180 => 0.6,
        181..=365 => 0.4,
        366..=730 => 0.2,
        _ => 0.05,
    }
}

fn popularity_score(stars_and_forks: u64) -> f64 {
    saturating_log(stars_and_forks, POPULARITY_SATURATION)
}

fn contributor_score(contributors: u64) -> f64 {
    saturating_log(contributors, CONTRIBUTOR_SATURATION)
}

fn saturating_log(value: u64, saturation: f64) -> f64 {
    ((value as f64).ln_1p() / saturation.ln_1p()).clamp(0.0, 1.0)
}

fn flag(present: bool) -> f64 {
    if present { 1.0 } else { 0.0 }
}
