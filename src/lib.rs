//! # Lossy-context surprisal
//!
//! Models human sentence-processing difficulty under lossy-context surprisal:
//! readers predict the next word from a noisy, partially forgotten memory of
//! the preceding context rather than from the context itself.
//!
//! The pipeline:
//! 1. **Language**: every sequence a probabilistic grammar derives, plus every
//!    proper prefix with its marginal probability ([`generate_language`]).
//! 2. **Distortions**: every order-preserving subsequence of the observed
//!    context, i.e. every possible memory trace ([`DistortionIter`]).
//! 3. **Reconstructions**: language sequences consistent with a trace
//!    ([`find_reconstructions`]).
//! 4. **Difficulty**: the expected surprisal of the next word, averaged over
//!    traces weighted by a [`DistortionPolicy`] ([`LossyContextModel`]).
//!
//! ## Example
//!
//! ```
//! use lossy_surprisal::{symbols, DistortionPolicy, LossyContextModel, Pcfg};
//!
//! let grammar: Pcfg = "
//!     RC -> 'RPErg' 'DO' 'V' [0.5] | 'RPAcc' 'Subj' 'V' [0.5]
//! ".parse().unwrap();
//!
//! let model = LossyContextModel::new(&grammar, DistortionPolicy::uniform_deletion(0.2), None);
//! let difficulties = model
//!     .sequence_processing_difficulty(&symbols(["RPErg", "DO", "V"]))
//!     .unwrap();
//!
//! assert_eq!(difficulties.len(), 3);
//! assert!((difficulties[0] - 1.0).abs() < 1e-12);
//! ```
//!
//! ## Cost
//!
//! Enumeration is exhaustive: a context of `n` words has `2^n` distortions and
//! each is matched against the whole language table. This is intended for
//! the short sequences and small grammars of psycholinguistic experiments.

mod config;
mod derive;
mod distortion;
mod error;
mod grammar;
mod language;
mod model;
mod policy;
mod reconstruction;
mod rule;
mod store;
mod symbol;


pub use config::ModelConfig;
pub use derive::{derive_all, Derivation};
pub use distortion::{distortions_of_length, enumerate_distortions, DistortionIter};
pub use error::{LossyError, Result};
pub use grammar::Pcfg;
pub use language::{generate_language, Language, Record};
pub use model::{DifficultyTrace, DistortionTrace, LossyContextModel, ReconstructionTrace};
pub use policy::DistortionPolicy;
pub use reconstruction::{find_reconstructions, is_reconstruction};
pub use rule::Production;
pub use store::{load_language, read_language, save_language, write_language};
pub use symbol::{symbols, GrammarSymbol, Sequence, Symbol};
