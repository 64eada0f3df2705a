//! Score rollup and weakness derivation
//!
//! Aggregates per-round results into an overall score and a per-topic
//! weakness map. Both are computed on demand from the session's round
//! states and never persisted, so they always reflect the latest
//! submission.

use std::collections::{BTreeMap, HashMap};
use std::cmp::Ordering;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::RoundId;
use crate::error::{ConfigError, ScoringError};
use crate::session::AssessmentSession;

/// What `overall_score` does when no round has been completed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyScorePolicy {
    /// Fail with [`ScoringError::NoCompletedRounds`]
    Error,
    /// Report 0.0
    Zero,
}

/// Configuration for score rollup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Per-round weight overrides; rounds without an entry weigh 1.0
    pub weights: HashMap<RoundId, f64>,
    /// Behavior when no round has completed
    pub empty_policy: EmptyScorePolicy,
    /// Topics with mean weakness below this are not reported (0.0 to 1.0)
    pub weakness_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: HashMap::new(),
            empty_policy: EmptyScorePolicy::Error,
            weakness_threshold: 0.4,
        }
    }
}

impl ScoringConfig {
    /// Effective weight for a round.
    #[must_use]
    pub fn weight_for(&self, id: RoundId) -> f64 {
        self.weights.get(&id).copied().unwrap_or(1.0)
    }

    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults; an unreadable or malformed
    /// file is an error.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

/// Per-topic weakness scores in `[0, 1]`, worst topics first when
/// iterated by severity.
///
/// Derived from completed rounds' topic breakdowns; not a stored entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaknessMap(BTreeMap<String, f64>);

impl WeaknessMap {
    /// Weakness score for a topic, if it surfaced.
    #[must_use]
    pub fn get(&self, topic: &str) -> Option<f64> {
        self.0.get(topic).copied()
    }

    /// Number of weak topics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether any weak topic surfaced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in topic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(topic, weakness)| (topic.as_str(), *weakness))
    }

    /// Topics ordered by descending weakness; ties broken by topic label
    /// for determinism.
    #[must_use]
    pub fn topics_by_severity(&self) -> Vec<(String, f64)> {
        let mut topics: Vec<(String, f64)> = self
            .0
            .iter()
            .map(|(topic, weakness)| (topic.clone(), *weakness))
            .collect();
        topics.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        topics
    }
}

impl FromIterator<(String, f64)> for WeaknessMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Weighted mean score across completed rounds.
///
/// Skipped rounds contribute nothing to numerator or denominator. With no
/// completed rounds the result follows the configured
/// [`EmptyScorePolicy`].
pub fn overall_score(
    session: &AssessmentSession,
    config: &ScoringConfig,
) -> Result<f64, ScoringError> {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for (round_id, state) in session.completed_rounds() {
        if let Some(score) = state.score {
            let weight = config.weight_for(round_id);
            weighted_sum += weight * score;
            total_weight += weight;
        }
    }

    if total_weight == 0.0 {
        return match config.empty_policy {
            EmptyScorePolicy::Error => Err(ScoringError::NoCompletedRounds),
            EmptyScorePolicy::Zero => Ok(0.0),
        };
    }
    Ok(weighted_sum / total_weight)
}

/// Per-topic weakness across all completed rounds.
///
/// For every topic reported by any completed round, the weakness is the
/// mean of `1 - normalized_score` across the rounds reporting it; topics
/// below the configured threshold are dropped.
#[must_use]
pub fn weakness_map(session: &AssessmentSession, config: &ScoringConfig) -> WeaknessMap {
    let mut sums: BTreeMap<String, (f64, u32)> = BTreeMap::new();

    for (_, state) in session.completed_rounds() {
        if let Some(breakdown) = &state.topic_breakdown {
            for (topic, score) in breakdown {
                let entry = sums.entry(topic.clone()).or_insert((0.0, 0));
                entry.0 += 1.0 - score;
                entry.1 += 1;
            }
        }
    }

    sums.into_iter()
        .filter_map(|(topic, (sum, count))| {
            let mean = sum / f64::from(count);
            (mean >= config.weakness_threshold).then_some((topic, mean))
        })
        .collect()
}
