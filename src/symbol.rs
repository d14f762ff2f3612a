use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// A terminal token of the language.
///
/// Backed by a shared string so that the many sequences built during
/// enumeration can clone symbols without copying their text.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn new(text: &str) -> Self {
        Symbol(Arc::from(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(text: &str) -> Self {
        Symbol::new(text)
    }
}

impl From<String> for Symbol {
    fn from(text: String) -> Self {
        Symbol(Arc::from(text))
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// An ordered list of terminal symbols.
pub type Sequence = Vec<Symbol>;

/// Builds a [`Sequence`] from anything yielding string-like words.
///
/// ```
/// use lossy_surprisal::symbols;
///
/// let seq = symbols(["RPErg", "DO", "V"]);
/// assert_eq!(seq.len(), 3);
/// assert_eq!(seq[2], "V");
/// ```
pub fn symbols<I, S>(words: I) -> Sequence
where
    I: IntoIterator<Item = S>,
    S: Into<Symbol>,
{
    words.into_iter().map(Into::into).collect()
}

/// Renders a sequence as whitespace-joined words.
pub(crate) fn join(sequence: &[Symbol]) -> String {
    let mut out = String::new();
    for (i, symbol) in sequence.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(symbol.as_str());
    }
    out
}

/// Items on the right-hand side of a production.
///
/// Nonterminals are referred to by their index in the owning grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GrammarSymbol {
    /// A word of the language.
    Terminal(Symbol),

    /// A reference to the productions of another left-hand side.
    Nonterminal { id: u32 },
}
