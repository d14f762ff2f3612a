//! Probabilistic context-free grammars.
//!
//! Grammars are normally written in the compact textual form used by the
//! experiment templates:
//!
//! ```text
//! RC  -> SRC [0.58] | ORC [0.42]
//! SRC -> 'RPErg' 'DO' 'V' [1.0]
//! ORC -> 'RPAcc' 'Subj' 'V' [1.0]
//! ```
//!
//! Quoted items are terminals, bare identifiers are nonterminals, and the
//! first left-hand side is the start symbol.

use crate::error::{LossyError, Result};
use crate::rule::Production;
use crate::symbol::{GrammarSymbol, Symbol};
use ahash::AHashMap as HashMap;
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// A probabilistic context-free grammar.
#[derive(Debug, Clone)]
pub struct Pcfg {
    names: Vec<String>,
    name_index: HashMap<String, u32>,
    /// Productions indexed by left-hand side id
    productions: Vec<Vec<Production>>,
    start: u32,
}

impl Pcfg {
    /// Creates an empty grammar whose start symbol is `start`.
    pub fn new(start: &str) -> Self {
        let mut grammar = Self {
            names: Vec::new(),
            name_index: HashMap::new(),
            productions: Vec::new(),
            start: 0,
        };
        grammar.start = grammar.intern(start);
        grammar
    }

    /// Returns the id of the nonterminal `name`, registering it if unseen.
    fn intern(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.name_index.get(name) {
            return id;
        }
        let id = self.names.len() as u32;
        self.names.push(name.to_string());
        self.name_index.insert(name.to_string(), id);
        self.productions.push(Vec::new());
        id
    }

    /// Returns a right-hand side reference to the nonterminal `name`.
    pub fn nonterminal(&mut self, name: &str) -> GrammarSymbol {
        GrammarSymbol::Nonterminal {
            id: self.intern(name),
        }
    }

    /// Adds `lhs -> rhs [probability]`.
    pub fn add_production(&mut self, lhs: &str, rhs: Vec<GrammarSymbol>, probability: f64) {
        let lhs = self.intern(lhs);
        self.productions[lhs as usize].push(Production::new(lhs, rhs, probability));
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn name(&self, id: u32) -> &str {
        &self.names[id as usize]
    }

    pub fn id(&self, name: &str) -> Option<u32> {
        self.name_index.get(name).copied()
    }

    /// Productions whose left-hand side is `lhs`, in declaration order.
    /// Ids this grammar never issued have none.
    pub fn productions(&self, lhs: u32) -> &[Production] {
        self.productions
            .get(lhs as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn num_nonterminals(&self) -> usize {
        self.names.len()
    }

    pub fn num_productions(&self) -> usize {
        self.productions.iter().map(Vec::len).sum()
    }

    /// Checks that every referenced nonterminal belongs to this grammar and has
    /// productions, and that the probabilities of each left-hand side sum to
    /// one.
    ///
    /// Grammar construction does not call this; callers that build grammars
    /// from untrusted parameters should.
    pub fn validate(&self) -> Result<()> {
        for (id, prods) in self.productions.iter().enumerate() {
            let name = &self.names[id];
            if let Some(unknown) = prods
                .iter()
                .flat_map(|p| p.nonterminals())
                .find(|&rhs| rhs as usize >= self.num_nonterminals())
            {
                return Err(LossyError::Grammar {
                    line: 0,
                    message: format!(
                        "production of {name} refers to unknown nonterminal id {unknown}"
                    ),
                });
            }

            if prods.is_empty() {
                return Err(LossyError::Grammar {
                    line: 0,
                    message: format!("nonterminal {name} has no productions"),
                });
            }

            if let Some(prod) = prods
                .iter()
                .find(|p| !(0.0..=1.0).contains(&p.probability))
            {
                return Err(LossyError::Grammar {
                    line: 0,
                    message: format!(
                        "production of {name} has probability {} outside [0, 1]",
                        prod.probability
                    ),
                });
            }

            let total: f64 = prods.iter().map(|p| p.probability).sum();
            if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
                return Err(LossyError::Grammar {
                    line: 0,
                    message: format!("productions of {name} sum to {total}, expected 1"),
                });
            }
        }
        Ok(())
    }
}

impl FromStr for Pcfg {
    type Err = LossyError;

    fn from_str(text: &str) -> Result<Self> {
        let mut grammar: Option<Pcfg> = None;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((lhs, rhs)) = line.split_once("->") else {
                return Err(grammar_error(line_no, "missing '->'"));
            };
            let lhs = lhs.trim();
            if lhs.is_empty() || lhs.contains(char::is_whitespace) {
                return Err(grammar_error(
                    line_no,
                    format!("invalid left-hand side {lhs:?}"),
                ));
            }

            let grammar = grammar.get_or_insert_with(|| Pcfg::new(lhs));
            for (items, probability) in parse_alternatives(rhs, line_no)? {
                let rhs = items
                    .into_iter()
                    .map(|item| match item {
                        Item::Terminal(word) => GrammarSymbol::Terminal(Symbol::from(word)),
                        Item::Nonterminal(name) => grammar.nonterminal(&name),
                    })
                    .collect();
                grammar.add_production(lhs, rhs, probability);
            }
        }

        grammar.ok_or_else(|| grammar_error(0, "grammar has no productions"))
    }
}

fn grammar_error(line: usize, message: impl Into<String>) -> LossyError {
    LossyError::Grammar {
        line,
        message: message.into(),
    }
}

enum Item {
    Terminal(String),
    Nonterminal(String),
}

/// Splits a right-hand side into `|`-separated alternatives, each closed by
/// a bracketed probability.
fn parse_alternatives(rhs: &str, line: usize) -> Result<Vec<(Vec<Item>, f64)>> {
    let mut chars = rhs.char_indices().peekable();
    let mut alternatives = Vec::new();
    let mut items = Vec::new();
    let mut closed = false;

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '|' => {
                if !closed {
                    return Err(grammar_error(line, "alternative without probability"));
                }
                closed = false;
                chars.next();
            }
            _ if closed => {
                return Err(grammar_error(
                    line,
                    format!("unexpected {c:?} after probability"),
                ));
            }
            '\'' | '"' => {
                chars.next();
                let word = take_until(&mut chars, rhs, c)
                    .ok_or_else(|| grammar_error(line, "unterminated quoted terminal"))?;
                if word.is_empty() || word.contains(|c: char| c == ':' || c.is_whitespace()) {
                    return Err(grammar_error(
                        line,
                        format!("terminal {word:?} must be non-empty without whitespace or ':'"),
                    ));
                }
                items.push(Item::Terminal(word.to_string()));
            }
            '[' => {
                chars.next();
                let body = take_until(&mut chars, rhs, ']')
                    .ok_or_else(|| grammar_error(line, "unterminated probability"))?;
                let probability: f64 = body.trim().parse().map_err(|_| {
                    grammar_error(line, format!("invalid probability {:?}", body.trim()))
                })?;
                alternatives.push((std::mem::take(&mut items), probability));
                closed = true;
            }
            _ => {
                let mut end = rhs.len();
                while let Some(&(i, c)) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '|' | '[' | '\'' | '"') {
                        end = i;
                        break;
                    }
                    chars.next();
                }
                items.push(Item::Nonterminal(rhs[start..end].to_string()));
            }
        }
    }

    if !closed {
        return Err(grammar_error(line, "missing probability"));
    }
    Ok(alternatives)
}

/// Consumes characters up to `terminator`, returning the enclosed text.
fn take_until<'a>(
    chars: &mut Peekable<CharIndices<'_>>,
    text: &'a str,
    terminator: char,
) -> Option<&'a str> {
    let begin = chars.peek().map(|&(i, _)| i).unwrap_or(text.len());
    for (i, c) in chars.by_ref() {
        if c == terminator {
            return Some(&text[begin..i]);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_rule() {
        let grammar: Pcfg = "S -> 'a' 'b' [1.0]".parse().unwrap();
        assert_eq!(grammar.num_nonterminals(), 1);
        assert_eq!(grammar.name(grammar.start()), "S");

        let prods = grammar.productions(grammar.start());
        assert_eq!(prods.len(), 1);
        assert_eq!(prods[0].probability, 1.0);
        assert_eq!(
            prods[0].rhs,
            vec![
                GrammarSymbol::Terminal(Symbol::new("a")),
                GrammarSymbol::Terminal(Symbol::new("b")),
            ]
        );
    }

    #[test]
    fn test_parse_alternatives_and_nonterminals() {
        let text = "
            RC -> SRC [0.6] | ORC [0.4]
            SRC -> 'RPErg' InnerSRC [0.7] | 'RPErg' 'V' [0.3]
            InnerSRC -> \"DO\" 'V' [1.0]
            ORC -> 'RPAcc' 'V' [1]
        ";
        let grammar: Pcfg = text.parse().unwrap();
        assert_eq!(grammar.name(grammar.start()), "RC");
        assert_eq!(grammar.num_nonterminals(), 4);
        assert_eq!(grammar.num_productions(), 6);

        let src = grammar.id("SRC").unwrap();
        let inner = grammar.id("InnerSRC").unwrap();
        assert_eq!(
            grammar.productions(src)[0].rhs,
            vec![
                GrammarSymbol::Terminal(Symbol::new("RPErg")),
                GrammarSymbol::Nonterminal { id: inner },
            ]
        );
        assert!(grammar.validate().is_ok());
    }

    #[test]
    fn test_parse_scientific_probability() {
        let grammar: Pcfg = "S -> 'a' [1e-1] | 'b' [9.0e-1]".parse().unwrap();
        let prods = grammar.productions(grammar.start());
        assert!((prods[0].probability - 0.1).abs() < 1e-12);
        assert!((prods[1].probability - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_parse_errors_report_line() {
        let err = "S -> 'a' [1.0]\nA 'b' [1.0]".parse::<Pcfg>().unwrap_err();
        assert!(matches!(err, LossyError::Grammar { line: 2, .. }));

        let err = "S -> 'a'".parse::<Pcfg>().unwrap_err();
        assert!(matches!(err, LossyError::Grammar { line: 1, .. }));

        let err = "S -> 'a [1.0]".parse::<Pcfg>().unwrap_err();
        assert!(matches!(err, LossyError::Grammar { line: 1, .. }));

        let err = "S -> 'a' [x]".parse::<Pcfg>().unwrap_err();
        assert!(err.to_string().contains("invalid probability"));

        let err = "S -> 'a' | 'b' [1.0]".parse::<Pcfg>().unwrap_err();
        assert!(err.to_string().contains("without probability"));

        assert!("".parse::<Pcfg>().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_sums() {
        let grammar: Pcfg = "S -> 'a' [0.5] | 'b' [0.4]".parse().unwrap();
        assert!(grammar.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_undefined_nonterminal() {
        let grammar: Pcfg = "S -> A 'b' [1.0]".parse().unwrap();
        let err = grammar.validate().unwrap_err();
        assert!(err.to_string().contains("A has no productions"));
    }

    #[test]
    fn test_parse_rejects_unstorable_terminals() {
        for text in ["S -> 'a b' [1.0]", "S -> 'a:b' [1.0]", "S -> '' [1.0]", "S -> \"x\ty\" [1.0]"] {
            let err = text.parse::<Pcfg>().unwrap_err();
            assert!(matches!(err, LossyError::Grammar { line: 1, .. }), "{text:?} parsed");
        }
    }

    #[test]
    fn test_unknown_nonterminal_id() {
        let mut grammar = Pcfg::new("S");
        grammar.add_production(
            "S",
            vec![
                GrammarSymbol::Terminal(Symbol::new("x")),
                GrammarSymbol::Nonterminal { id: 7 },
            ],
            1.0,
        );

        let err = grammar.validate().unwrap_err();
        assert!(err.to_string().contains("unknown nonterminal id 7"));
        assert!(grammar.productions(7).is_empty());
        assert!(crate::derive::derive_all(&grammar, None).is_empty());
    }

    #[test]
    fn test_programmatic_construction() {
        let mut grammar = Pcfg::new("S");
        let a = grammar.nonterminal("A");
        grammar.add_production("S", vec![a, GrammarSymbol::Terminal(Symbol::new("x"))], 1.0);
        grammar.add_production("A", vec![GrammarSymbol::Terminal(Symbol::new("y"))], 1.0);

        assert_eq!(grammar.start(), 0);
        assert_eq!(grammar.id("A"), Some(1));
        assert!(grammar.validate().is_ok());
    }
}
