//! Memory models: how likely a true context is to degrade into a given
//! distortion.

use crate::error::{LossyError, Result};
use crate::symbol::Symbol;
use ahash::AHashMap as HashMap;
use serde::{Deserialize, Serialize};

/// Probability that a true context is remembered as a particular distortion.
///
/// Callers are expected to pass distortions obtainable from the true sequence
/// by deleting words. This is not checked, except that a distortion longer
/// than the true sequence always gets probability 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistortionPolicy {
    /// No memory loss; reduces lossy-context surprisal to plain surprisal.
    #[default]
    Identity,

    /// Every word is forgotten independently with probability `deletion_rate`.
    UniformDeletion { deletion_rate: f64 },

    /// Word `j` steps back from the end of the context is retained with
    /// probability `max_retention_probability * rate_falloff^j`.
    RecencyWeighted {
        max_retention_probability: f64,
        rate_falloff: f64,
    },
}

impl DistortionPolicy {
    pub fn uniform_deletion(deletion_rate: f64) -> Self {
        DistortionPolicy::UniformDeletion { deletion_rate }
    }

    pub fn recency_weighted(max_retention_probability: f64, rate_falloff: f64) -> Self {
        DistortionPolicy::RecencyWeighted {
            max_retention_probability,
            rate_falloff,
        }
    }

    /// `P(distortion | true_sequence)`.
    pub fn probability(&self, true_sequence: &[Symbol], distortion: &[Symbol]) -> f64 {
        if distortion.len() > true_sequence.len() {
            return 0.0;
        }

        match *self {
            DistortionPolicy::Identity => {
                if true_sequence == distortion {
                    1.0
                } else {
                    0.0
                }
            }
            DistortionPolicy::UniformDeletion { deletion_rate } => {
                let kept = distortion.len() as i32;
                let dropped = (true_sequence.len() - distortion.len()) as i32;
                deletion_rate.powi(dropped) * (1.0 - deletion_rate).powi(kept)
            }
            DistortionPolicy::RecencyWeighted {
                max_retention_probability,
                rate_falloff,
            } => recency_weighted_probability(
                true_sequence,
                distortion,
                max_retention_probability,
                rate_falloff,
            ),
        }
    }

    /// Checks that every parameter is a probability.
    pub fn validate(&self) -> Result<()> {
        match *self {
            DistortionPolicy::Identity => Ok(()),
            DistortionPolicy::UniformDeletion { deletion_rate } => {
                check_probability("deletion_rate", deletion_rate)
            }
            DistortionPolicy::RecencyWeighted {
                max_retention_probability,
                rate_falloff,
            } => {
                check_probability("max_retention_probability", max_retention_probability)?;
                check_probability("rate_falloff", rate_falloff)
            }
        }
    }

    /// Updates the deletion rate. Returns false for other policies.
    pub fn set_deletion_rate(&mut self, rate: f64) -> bool {
        match self {
            DistortionPolicy::UniformDeletion { deletion_rate } => {
                *deletion_rate = rate;
                true
            }
            _ => false,
        }
    }

    /// Updates the retention of the most recent word. Returns false for other
    /// policies.
    pub fn set_max_retention_probability(&mut self, probability: f64) -> bool {
        match self {
            DistortionPolicy::RecencyWeighted {
                max_retention_probability,
                ..
            } => {
                *max_retention_probability = probability;
                true
            }
            _ => false,
        }
    }

    /// Updates the per-step falloff. Returns false for other policies.
    pub fn set_rate_falloff(&mut self, falloff: f64) -> bool {
        match self {
            DistortionPolicy::RecencyWeighted { rate_falloff, .. } => {
                *rate_falloff = falloff;
                true
            }
            _ => false,
        }
    }
}

/// Product over true positions of the retention probability if the word
/// survives, else its complement.
///
/// Survival is decided by word, not position: scanning left to right, each
/// occurrence of a word in the distortion claims the earliest unclaimed
/// position holding that word.
fn recency_weighted_probability(
    true_sequence: &[Symbol],
    distortion: &[Symbol],
    max_retention_probability: f64,
    rate_falloff: f64,
) -> f64 {
    let mut remaining: HashMap<&Symbol, usize> = HashMap::new();
    for word in distortion {
        *remaining.entry(word).or_insert(0) += 1;
    }

    let n = true_sequence.len();
    let mut prob = 1.0;
    for (i, word) in true_sequence.iter().enumerate() {
        let steps_back = (n - 1 - i) as i32;
        let retention = max_retention_probability * rate_falloff.powi(steps_back);
        match remaining.get_mut(word) {
            Some(count) if *count > 0 => {
                *count -= 1;
                prob *= retention;
            }
            _ => prob *= 1.0 - retention,
        }
    }
    prob
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(LossyError::InvalidParameter(format!(
            "{name} must lie in [0, 1], got {value}"
        )))
    }
}
