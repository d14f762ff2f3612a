use crate::symbol::{Sequence, Symbol};

/// Iterator over every order-preserving subsequence of a context.
///
/// Distortions come grouped by descending length, from the full sequence
/// down to the empty one. Within a length they follow the lexicographic
/// order of the kept positions, so a context of length `n` yields `C(n, L)`
/// distortions of length `L` and `2^n` in total. Repeated words are not
/// deduplicated: each choice of positions is its own distortion.
pub struct DistortionIter<'a> {
    sequence: &'a [Symbol],
    /// Positions kept by the next distortion
    positions: Vec<usize>,
    done: bool,
}

impl<'a> DistortionIter<'a> {
    pub fn new(sequence: &'a [Symbol]) -> Self {
        Self::starting_at(sequence, sequence.len())
    }

    fn starting_at(sequence: &'a [Symbol], length: usize) -> Self {
        Self {
            sequence,
            positions: (0..length).collect(),
            done: false,
        }
    }

    /// Moves `positions` to the next combination of the same size.
    ///
    /// Returns false once the last combination has been passed.
    fn advance_within_length(&mut self) -> bool {
        let n = self.sequence.len();
        let k = self.positions.len();
        for i in (0..k).rev() {
            if self.positions[i] < n - k + i {
                self.positions[i] += 1;
                for j in i + 1..k {
                    self.positions[j] = self.positions[j - 1] + 1;
                }
                return true;
            }
        }
        false
    }
}

impl<'a> Iterator for DistortionIter<'a> {
    type Item = Sequence;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let distortion = self
            .positions
            .iter()
            .map(|&i| self.sequence[i].clone())
            .collect();

        if !self.advance_within_length() {
            match self.positions.len() {
                0 => self.done = true,
                k => self.positions = (0..k - 1).collect(),
            }
        }

        Some(distortion)
    }
}

/// Every possible memory trace of `sequence`, longest first.
pub fn enumerate_distortions(sequence: &[Symbol]) -> Vec<Sequence> {
    DistortionIter::new(sequence).collect()
}

/// Every order-preserving subsequence of `sequence` with exactly `length` words.
///
/// Returns nothing if `length` exceeds the length of `sequence`.
pub fn distortions_of_length(sequence: &[Symbol], length: usize) -> Vec<Sequence> {
    if length > sequence.len() {
        return Vec::new();
    }
    DistortionIter::starting_at(sequence, length)
        .take_while(|d| d.len() == length)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::symbols;

    #[test]
    fn test_order_for_three_words() {
        let seq = symbols(["a", "b", "c"]);
        let distortions = enumerate_distortions(&seq);
        assert_eq!(
            distortions,
            vec![
                symbols(["a", "b", "c"]),
                symbols(["a", "b"]),
                symbols(["a", "c"]),
                symbols(["b", "c"]),
                symbols(["a"]),
                symbols(["b"]),
                symbols(["c"]),
                symbols(Vec::<&str>::new()),
            ]
        );
    }

    #[test]
    fn test_empty_context() {
        let distortions = enumerate_distortions(&[]);
        assert_eq!(distortions, vec![Sequence::new()]);
    }

    #[test]
    fn test_distortions_of_length() {
        let seq = symbols(["w", "x", "y", "z"]);
        assert_eq!(distortions_of_length(&seq, 4), vec![seq.clone()]);
        assert_eq!(distortions_of_length(&seq, 0), vec![Sequence::new()]);
        assert_eq!(distortions_of_length(&seq, 2).len(), 6);
        assert_eq!(
            distortions_of_length(&seq, 3),
            vec![
                symbols(["w", "x", "y"]),
                symbols(["w", "x", "z"]),
                symbols(["w", "y", "z"]),
                symbols(["x", "y", "z"]),
            ]
        );
        assert!(distortions_of_length(&seq, 5).is_empty());
    }

    #[test]
    fn test_repeated_words_are_kept_per_position() {
        let seq = symbols(["a", "a"]);
        assert_eq!(
            enumerate_distortions(&seq),
            vec![
                symbols(["a", "a"]),
                symbols(["a"]),
                symbols(["a"]),
                Sequence::new(),
            ]
        );
    }
}
