use crate::symbol::GrammarSymbol;

/// A single weighted production `lhs -> rhs [probability]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Production {
    /// Index of the left-hand side nonterminal in the owning grammar.
    pub lhs: u32,
    pub rhs: Vec<GrammarSymbol>,
    pub probability: f64,
}

impl Production {
    pub fn new(lhs: u32, rhs: Vec<GrammarSymbol>, probability: f64) -> Self {
        Self {
            lhs,
            rhs,
            probability,
        }
    }

    /// Iterates over the nonterminal ids referenced on the right-hand side.
    pub fn nonterminals(&self) -> impl Iterator<Item = u32> + '_ {
        self.rhs.iter().filter_map(|item| match item {
            GrammarSymbol::Nonterminal { id } => Some(*id),
            GrammarSymbol::Terminal(_) => None,
        })
    }
}
