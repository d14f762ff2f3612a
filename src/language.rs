//! The language table: every derivable sequence and every proper prefix of
//! one, with their probabilities.

use crate::derive::{derive_all, Derivation};
use crate::grammar::Pcfg;
use crate::symbol::{Sequence, Symbol};
use ahash::AHashMap as HashMap;
use slotmap::{new_key_type, SlotMap};
use std::collections::hash_map::Entry;
use tracing::{debug, instrument};

new_key_type! {
    struct RecordKey;
}

/// A single `(sequence, probability)` row of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub sequence: Sequence,
    pub probability: f64,
}

/// Immutable lookup table from sequences to probabilities.
///
/// Records live in an arena; a hash index gives exact-match lookup and a
/// separate key list keeps insertion order (full sequences in generation
/// order, then prefixes in first-seen order). Sequences that are absent
/// have probability 0.
#[derive(Debug, Clone, Default)]
pub struct Language {
    records: SlotMap<RecordKey, Record>,
    index: HashMap<Sequence, RecordKey>,
    order: Vec<RecordKey>,
}

/// Generates the language of `grammar`, including all proper prefixes.
///
/// See [`derive_all`] for the meaning of `max_depth`.
#[instrument(skip(grammar), fields(productions = grammar.num_productions()))]
pub fn generate_language(grammar: &Pcfg, max_depth: Option<usize>) -> Language {
    let derivations = derive_all(grammar, max_depth);
    debug!(derivations = derivations.len(), "enumerated derivations");
    let language = Language::from_derivations(derivations);
    debug!(records = language.len(), "built language table");
    language
}

impl Language {
    /// Builds the table from complete derivations.
    ///
    /// Repeated derivations of one sequence are summed, so an ambiguous
    /// sequence scores the total probability of all its parses rather than
    /// that of a single derivation. This keeps the full sequences summing to
    /// one. Each proper prefix is
    /// then added once with the summed probability of every full sequence
    /// that starts with it; a prefix that is itself a full sequence keeps a
    /// single record holding that sum plus its own probability.
    pub fn from_derivations<I>(derivations: I) -> Self
    where
        I: IntoIterator<Item = Derivation>,
    {
        let mut language = Language::default();

        for Derivation {
            sequence,
            probability,
        } in derivations
        {
            match language.index.entry(sequence) {
                Entry::Occupied(e) => {
                    language.records[*e.get()].probability += probability;
                }
                Entry::Vacant(e) => {
                    let key = language.records.insert(Record {
                        sequence: e.key().clone(),
                        probability,
                    });
                    e.insert(key);
                    language.order.push(key);
                }
            }
        }

        let mut prefix_totals: HashMap<Sequence, f64> = HashMap::new();
        let mut prefix_order: Vec<Sequence> = Vec::new();
        for &key in &language.order {
            let record = &language.records[key];
            for i in 1..record.sequence.len() {
                match prefix_totals.entry(record.sequence[..i].to_vec()) {
                    Entry::Occupied(mut e) => *e.get_mut() += record.probability,
                    Entry::Vacant(e) => {
                        prefix_order.push(e.key().clone());
                        e.insert(record.probability);
                    }
                }
            }
        }

        for prefix in prefix_order {
            let total = prefix_totals[&prefix];
            if let Some(&key) = language.index.get(&prefix) {
                language.records[key].probability += total;
            } else {
                language.push(prefix, total);
            }
        }

        language
    }

    /// Builds the table from stored records, keeping the first record when a
    /// sequence appears more than once.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (Sequence, f64)>,
    {
        let mut language = Language::default();
        for (sequence, probability) in records {
            if language.index.contains_key(&sequence) {
                debug!(sequence = ?sequence, "ignoring duplicate language record");
                continue;
            }
            language.push(sequence, probability);
        }
        language
    }

    fn push(&mut self, sequence: Sequence, probability: f64) {
        let key = self.records.insert(Record {
            sequence: sequence.clone(),
            probability,
        });
        self.index.insert(sequence, key);
        self.order.push(key);
    }

    /// The a priori probability of `sequence`, or 0 if it is not in the table.
    pub fn prob(&self, sequence: &[Symbol]) -> f64 {
        self.index
            .get(sequence)
            .map_or(0.0, |&key| self.records[key].probability)
    }

    /// Probability of the last symbol of `sequence` given the rest.
    ///
    /// Returns 0 when the context has probability 0 (or `sequence` is empty).
    pub fn conditional_prob(&self, sequence: &[Symbol]) -> f64 {
        let Some((_, context)) = sequence.split_last() else {
            return 0.0;
        };
        let context_prob = self.prob(context);
        if context_prob == 0.0 {
            0.0
        } else {
            self.prob(sequence) / context_prob
        }
    }

    pub fn contains(&self, sequence: &[Symbol]) -> bool {
        self.index.contains_key(sequence)
    }

    /// Iterates over the records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> + '_ {
        self.order.iter().map(move |&key| &self.records[key])
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
