use crate::grammar::Pcfg;
use crate::symbol::{GrammarSymbol, Sequence};

/// A complete terminal sequence together with the probability of the
/// derivation that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
    pub sequence: Sequence,
    pub probability: f64,
}

/// Exhaustively derives every terminal sequence of `grammar`.
///
/// Derivations are produced depth-first in production order. Expanding a
/// nonterminal at depth `d` expands its right-hand side at depth `d - 1`,
/// and nothing is produced at depth 0, so `S -> 'a'` needs a bound of at
/// least 2. With no bound the grammar must be non-recursive or enumeration
/// will not terminate.
///
/// Ambiguous grammars yield one entry per derivation; merging is left to
/// the caller.
pub fn derive_all(grammar: &Pcfg, max_depth: Option<usize>) -> Vec<Derivation> {
    let start = [GrammarSymbol::Nonterminal {
        id: grammar.start(),
    }];
    let depth = max_depth.unwrap_or(usize::MAX);
    expand_all(grammar, &start, depth)
}

fn expand_all(grammar: &Pcfg, items: &[GrammarSymbol], depth: usize) -> Vec<Derivation> {
    let Some((first, rest)) = items.split_first() else {
        return vec![Derivation {
            sequence: Vec::new(),
            probability: 1.0,
        }];
    };

    let heads = expand_one(grammar, first, depth);
    if heads.is_empty() {
        return heads;
    }
    let tails = expand_all(grammar, rest, depth);

    let mut out = Vec::with_capacity(heads.len() * tails.len());
    for head in &heads {
        for tail in &tails {
            let mut sequence = Vec::with_capacity(head.sequence.len() + tail.sequence.len());
            sequence.extend_from_slice(&head.sequence);
            sequence.extend_from_slice(&tail.sequence);
            out.push(Derivation {
                sequence,
                probability: head.probability * tail.probability,
            });
        }
    }
    out
}

fn expand_one(grammar: &Pcfg, item: &GrammarSymbol, depth: usize) -> Vec<Derivation> {
    if depth == 0 {
        return Vec::new();
    }

    match item {
        GrammarSymbol::Terminal(word) => vec![Derivation {
            sequence: vec![word.clone()],
            probability: 1.0,
        }],
        GrammarSymbol::Nonterminal { id } => {
            let mut out = Vec::new();
            for prod in grammar.productions(*id) {
                for mut derivation in expand_all(grammar, &prod.rhs, depth - 1) {
                    derivation.probability *= prod.probability;
                    out.push(derivation);
                }
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::symbols;

    fn sequences(derivations: &[Derivation]) -> Vec<Sequence> {
        derivations.iter().map(|d| d.sequence.clone()).collect()
    }

    #[test]
    fn test_single_rule() {
        let grammar: Pcfg = "S -> 'a' 'b' [1.0]".parse().unwrap();
        let derivations = derive_all(&grammar, None);
        assert_eq!(derivations.len(), 1);
        assert_eq!(derivations[0].sequence, symbols(["a", "b"]));
        assert_eq!(derivations[0].probability, 1.0);
    }

    #[test]
    fn test_production_order_and_probabilities() {
        let grammar: Pcfg = "
            S -> A 'x' [0.5] | 'y' [0.5]
            A -> 'p' [0.25] | 'q' [0.75]
        "
        .parse()
        .unwrap();
        let derivations = derive_all(&grammar, None);

        assert_eq!(
            sequences(&derivations),
            vec![symbols(["p", "x"]), symbols(["q", "x"]), symbols(["y"])]
        );
        assert!((derivations[0].probability - 0.125).abs() < 1e-12);
        assert!((derivations[1].probability - 0.375).abs() < 1e-12);
        assert!((derivations[2].probability - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_depth_bound() {
        let grammar: Pcfg = "
            S -> 'a' [0.5] | A [0.5]
            A -> 'b' [1.0]
        "
        .parse()
        .unwrap();

        assert!(derive_all(&grammar, Some(1)).is_empty());
        assert_eq!(sequences(&derive_all(&grammar, Some(2))), vec![symbols(["a"])]);
        assert_eq!(
            sequences(&derive_all(&grammar, Some(3))),
            vec![symbols(["a"]), symbols(["b"])]
        );
    }

    #[test]
    fn test_depth_bound_terminates_recursion() {
        let grammar: Pcfg = "S -> 'a' S [0.5] | 'a' [0.5]".parse().unwrap();
        let derivations = derive_all(&grammar, Some(4));
        assert_eq!(
            sequences(&derivations),
            vec![symbols(["a", "a", "a"]), symbols(["a", "a"]), symbols(["a"])]
        );
    }

    #[test]
    fn test_ambiguous_grammar_keeps_each_derivation() {
        let grammar: Pcfg = "
            S -> A [0.5] | B [0.5]
            A -> 'x' [1.0]
            B -> 'x' [1.0]
        "
        .parse()
        .unwrap();
        let derivations = derive_all(&grammar, None);
        assert_eq!(derivations.len(), 2);
        assert!(derivations.iter().all(|d| d.sequence == symbols(["x"])));
    }
}
