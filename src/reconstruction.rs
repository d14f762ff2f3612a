use crate::language::{Language, Record};
use crate::symbol::{Sequence, Symbol};

/// Returns true if every word of `distortion` occurs somewhere in `candidate`.
///
/// Order and multiplicity are ignored.
#[inline]
pub fn is_reconstruction(candidate: &[Symbol], distortion: &[Symbol]) -> bool {
    distortion.iter().all(|word| candidate.contains(word))
}

/// Language records that could be the true context behind `distortion`,
/// in table order.
pub fn reconstruction_records<'a>(
    language: &'a Language,
    distortion: &'a [Symbol],
) -> impl Iterator<Item = &'a Record> + 'a {
    language
        .iter()
        .filter(move |record| is_reconstruction(&record.sequence, distortion))
}

/// Every sequence in `language` (prefixes included) containing all words of
/// `distortion`. The empty distortion matches every entry.
pub fn find_reconstructions<'a>(language: &'a Language, distortion: &'a [Symbol]) -> Vec<&'a Sequence> {
    reconstruction_records(language, distortion)
        .map(|record| &record.sequence)
        .collect()
}
