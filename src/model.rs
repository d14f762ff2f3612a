use crate::distortion::DistortionIter;
use crate::error::{LossyError, Result};
use crate::grammar::Pcfg;
use crate::language::{generate_language, Language};
use crate::policy::DistortionPolicy;
use crate::reconstruction::{find_reconstructions, reconstruction_records};
use crate::symbol::{join, Sequence, Symbol};
use tracing::{debug, instrument, trace};

/// Lossy-context surprisal model.
///
/// Predicts the processing difficulty of a word as its expected surprisal
/// under a distribution of noisy memory traces of the preceding context.
/// Each trace is reconstructed against the language of a grammar, weighting
/// every candidate context by its prior probability and by how likely it is
/// to have degraded into the trace.
///
/// # Example
///
/// ```
/// use lossy_surprisal::{symbols, DistortionPolicy, LossyContextModel, Pcfg};
///
/// let grammar: Pcfg = "S -> 'a' 'b' [0.5] | 'a' 'c' [0.5]".parse().unwrap();
/// let model = LossyContextModel::new(&grammar, DistortionPolicy::Identity, None);
///
/// let difficulty = model.processing_difficulty(&symbols(["a", "b"])).unwrap();
/// assert!((difficulty - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct LossyContextModel {
    language: Language,
    policy: DistortionPolicy,
}

/// One reconstructed context considered for a distortion.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructionTrace {
    pub reconstruction: Sequence,
    /// `p_L(r)`
    pub context_prob: f64,
    /// `p_L(w | r)`
    pub target_prob: f64,
    /// `P(d | r)`
    pub distortion_prob: f64,
}

/// Contribution of one distortion of the context.
#[derive(Debug, Clone, PartialEq)]
pub struct DistortionTrace {
    pub distortion: Sequence,
    /// `P(d | c)`
    pub probability: f64,
    pub reconstructions: Vec<ReconstructionTrace>,
    /// `E[p(w | d)]`, or `None` when no reconstruction carries weight
    pub expected_target_prob: Option<f64>,
    pub contribution: f64,
}

/// Full breakdown of a single processing difficulty computation.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyTrace {
    pub context: Sequence,
    pub target: Symbol,
    /// Distortions with nonzero probability, longest first
    pub distortions: Vec<DistortionTrace>,
    pub difficulty: f64,
}

impl LossyContextModel {
    /// Enumerates the language of `grammar` and wraps it with `policy`.
    #[instrument(skip(grammar), fields(productions = grammar.num_productions()))]
    pub fn new(grammar: &Pcfg, policy: DistortionPolicy, max_depth: Option<usize>) -> Self {
        Self::from_language(generate_language(grammar, max_depth), policy)
    }

    /// Wraps an existing language table, e.g. one loaded from disk.
    pub fn from_language(language: Language, policy: DistortionPolicy) -> Self {
        Self { language, policy }
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn policy(&self) -> &DistortionPolicy {
        &self.policy
    }

    /// Mutable access for parameter sweeps; the language is not regenerated.
    pub fn policy_mut(&mut self) -> &mut DistortionPolicy {
        &mut self.policy
    }

    pub fn set_policy(&mut self, policy: DistortionPolicy) {
        self.policy = policy;
    }

    /// `p_L(sequence)`.
    pub fn prob(&self, sequence: &[Symbol]) -> f64 {
        self.language.prob(sequence)
    }

    /// `p_L(sequence[-1] | sequence[..-1])`.
    pub fn conditional_prob(&self, sequence: &[Symbol]) -> f64 {
        self.language.conditional_prob(sequence)
    }

    /// Every distortion of `context` paired with `P(d | context)`.
    pub fn distortions(&self, context: &[Symbol]) -> Vec<(Sequence, f64)> {
        DistortionIter::new(context)
            .map(|d| {
                let p = self.policy.probability(context, &d);
                (d, p)
            })
            .collect()
    }

    /// Language sequences that could have produced `distortion`.
    pub fn reconstructions<'a>(&'a self, distortion: &'a [Symbol]) -> Vec<&'a Sequence> {
        find_reconstructions(&self.language, distortion)
    }

    /// Processing difficulty of the last word of `sequence` given the rest.
    ///
    /// A single word is scored by its plain surprisal as a sentence start.
    /// Impossible events score `f64::INFINITY`.
    #[instrument(skip(self, sequence), fields(sequence = %join(sequence)))]
    pub fn processing_difficulty(&self, sequence: &[Symbol]) -> Result<f64> {
        let difficulty = self.evaluate(sequence, None)?;
        debug!(difficulty, "computed processing difficulty");
        Ok(difficulty)
    }

    /// Like [`processing_difficulty`](Self::processing_difficulty) but also
    /// returns every intermediate quantity.
    pub fn processing_difficulty_trace(&self, sequence: &[Symbol]) -> Result<DifficultyTrace> {
        let (context, target) = split_target(sequence)?;
        let mut branches = Vec::new();
        let difficulty = self.evaluate(sequence, Some(&mut branches))?;
        Ok(DifficultyTrace {
            context: context.to_vec(),
            target: target.clone(),
            distortions: branches,
            difficulty,
        })
    }

    /// Processing difficulty of every word of `sequence`, each given the
    /// words before it.
    pub fn sequence_processing_difficulty(&self, sequence: &[Symbol]) -> Result<Vec<f64>> {
        (1..=sequence.len())
            .map(|end| self.processing_difficulty(&sequence[..end]))
            .collect()
    }

    fn evaluate(
        &self,
        sequence: &[Symbol],
        mut branches: Option<&mut Vec<DistortionTrace>>,
    ) -> Result<f64> {
        let (context, target) = split_target(sequence)?;

        if context.is_empty() {
            return Ok(surprisal(self.language.prob(sequence)));
        }

        let mut difficulty = 0.0;
        for distortion in DistortionIter::new(context) {
            let probability = self.policy.probability(context, &distortion);
            if probability == 0.0 {
                continue;
            }
            trace!(distortion = %join(&distortion), probability, "distortion");

            let mut reconstructions = branches.as_ref().map(|_| Vec::new());
            let expected = self.expected_target_prob(&distortion, target, reconstructions.as_mut());

            let contribution = match expected {
                Some(p) => surprisal(p) * probability,
                None => 0.0,
            };
            difficulty += contribution;

            if let Some(branches) = branches.as_deref_mut() {
                branches.push(DistortionTrace {
                    distortion,
                    probability,
                    reconstructions: reconstructions.unwrap_or_default(),
                    expected_target_prob: expected,
                    contribution,
                });
            }
        }

        Ok(difficulty)
    }

    /// `E[p(w | d)]` over all reconstructions of `distortion`, weighted by
    /// `p_L(r) * P(d | r)`. `None` if the total weight is zero.
    fn expected_target_prob(
        &self,
        distortion: &[Symbol],
        target: &Symbol,
        mut sink: Option<&mut Vec<ReconstructionTrace>>,
    ) -> Option<f64> {
        let mut weighted = 0.0;
        let mut normaliser = 0.0;
        let mut extended: Sequence = Vec::new();

        for record in reconstruction_records(&self.language, distortion) {
            let context_prob = record.probability;
            let target_prob = if context_prob == 0.0 {
                0.0
            } else {
                extended.clear();
                extended.extend_from_slice(&record.sequence);
                extended.push(target.clone());
                self.language.prob(&extended) / context_prob
            };
            let distortion_prob = self.policy.probability(&record.sequence, distortion);

            trace!(
                reconstruction = %join(&record.sequence),
                context_prob,
                target_prob,
                distortion_prob,
                "reconstruction"
            );

            weighted += context_prob * distortion_prob * target_prob;
            normaliser += context_prob * distortion_prob;

            if let Some(sink) = sink.as_deref_mut() {
                sink.push(ReconstructionTrace {
                    reconstruction: record.sequence.clone(),
                    context_prob,
                    target_prob,
                    distortion_prob,
                });
            }
        }

        if normaliser == 0.0 {
            trace!(distortion = %join(distortion), "no weighted reconstruction, skipping");
            return None;
        }
        Some(weighted / normaliser)
    }
}

fn split_target(sequence: &[Symbol]) -> Result<(&[Symbol], &Symbol)> {
    match sequence.split_last() {
        Some((target, context)) => Ok((context, target)),
        None => Err(LossyError::EmptySequence),
    }
}

/// `-log2(p)` in bits, with `p == 0` mapped to infinity.
fn surprisal(p: f64) -> f64 {
    if p > 0.0 {
        -p.log2()
    } else {
        f64::INFINITY
    }
}
