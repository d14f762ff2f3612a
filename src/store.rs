//! Flat text persistence for [`Language`] tables.
//!
//! One record per line, `<space separated symbols>:<probability>`. The empty
//! sequence is written with nothing before the colon.

use crate::error::{LossyError, Result};
use crate::language::Language;
use crate::symbol::{join, symbols};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, instrument};

/// Writes every record of `language` in insertion order.
///
/// Fails without writing the offending record if a symbol contains
/// whitespace or `:`, since it could not be read back unchanged.
pub fn write_language<W: Write>(language: &Language, mut writer: W) -> Result<()> {
    for record in language.iter() {
        if let Some(symbol) = record.sequence.iter().find(|s| !is_storable(s.as_str())) {
            return Err(LossyError::InvalidParameter(format!(
                "symbol {:?} cannot be stored: contains whitespace or ':'",
                symbol.as_str()
            )));
        }
        writeln!(writer, "{}:{}", join(&record.sequence), record.probability)?;
    }
    writer.flush()?;
    Ok(())
}

fn is_storable(symbol: &str) -> bool {
    !symbol.is_empty() && !symbol.contains(|c: char| c == ':' || c.is_whitespace())
}

/// Reads a language previously written by [`write_language`].
///
/// Blank lines are skipped. A line without a colon, or whose probability is
/// not a finite non-negative float, fails the whole read.
pub fn read_language<R: BufRead>(reader: R) -> Result<Language> {
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((words, prob)) = line.split_once(':') else {
            return Err(LossyError::Parse {
                line: index + 1,
                message: "missing ':' separator".to_string(),
            });
        };
        let probability: f64 = prob.trim().parse().map_err(|_| LossyError::Parse {
            line: index + 1,
            message: format!("invalid probability {:?}", prob.trim()),
        })?;
        if !probability.is_finite() || probability < 0.0 {
            return Err(LossyError::Parse {
                line: index + 1,
                message: format!("probability {probability} is not a finite non-negative number"),
            });
        }

        records.push((symbols(words.split_whitespace()), probability));
    }

    Ok(Language::from_records(records))
}

#[instrument(skip(language), fields(records = language.len()))]
pub fn save_language(language: &Language, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_language(language, BufWriter::new(file))?;
    debug!("saved language");
    Ok(())
}

#[instrument]
pub fn load_language(path: &Path) -> Result<Language> {
    let file = File::open(path)?;
    let language = read_language(BufReader::new(file))?;
    debug!(records = language.len(), "loaded language");
    Ok(language)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Pcfg;
    use crate::language::generate_language;
    use crate::symbol::{symbols, Sequence, Symbol};
    use std::io::Cursor;

    fn to_string(language: &Language) -> String {
        let mut buf = Vec::new();
        write_language(language, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn pairs(language: &Language) -> Vec<(Sequence, f64)> {
        language
            .iter()
            .map(|r| (r.sequence.clone(), r.probability))
            .collect()
    }

    #[test]
    fn test_write_format() {
        let grammar: Pcfg = "S -> 'a' 'b' [1.0]".parse().unwrap();
        let language = generate_language(&grammar, None);
        assert_eq!(to_string(&language), "a b:1\na:1\n");
    }

    #[test]
    fn test_roundtrip_in_memory() {
        let grammar: Pcfg = "
            S -> 'RPErg' Inner [0.7] | 'RPErg' 'V' [0.3]
            Inner -> 'DO' 'V' [0.123456789] | 'V' 'DO' [0.876543211]
        "
        .parse()
        .unwrap();
        let language = generate_language(&grammar, None);

        let text = to_string(&language);
        let read = read_language(Cursor::new(text)).unwrap();
        assert_eq!(pairs(&read), pairs(&language));
    }

    #[test]
    fn test_roundtrip_through_file() {
        let grammar: Pcfg = "S -> 'a' [0.1] | 'b' 'c' [0.9]".parse().unwrap();
        let language = generate_language(&grammar, None);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("language.txt");
        save_language(&language, &path).unwrap();
        let read = load_language(&path).unwrap();
        assert_eq!(pairs(&read), pairs(&language));
    }

    #[test]
    fn test_read_scientific_notation_and_empty_sequence() {
        let text = "a b:1.23e-05\n:0.5\n\nc:2E-3\n";
        let language = read_language(Cursor::new(text)).unwrap();
        assert_eq!(language.len(), 3);
        assert_eq!(language.prob(&symbols(["a", "b"])), 1.23e-05);
        assert_eq!(language.prob(&[]), 0.5);
        assert_eq!(language.prob(&symbols(["c"])), 0.002);
    }

    #[test]
    fn test_read_missing_separator_fails() {
        let err = read_language(Cursor::new("a b:0.5\na b 0.5\n")).unwrap_err();
        assert!(matches!(err, LossyError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_read_bad_probability_fails() {
        let err = read_language(Cursor::new("a:zero\n")).unwrap_err();
        assert!(matches!(err, LossyError::Parse { line: 1, .. }));
        assert!(err.to_string().contains("invalid probability"));
    }

    #[test]
    fn test_read_rejects_non_finite_and_negative_probabilities() {
        for text in ["a:NaN\n", "a:inf\n", "a:-inf\n", "a:-0.5\n", "b:0.5\na:NaN\n"] {
            let err = read_language(Cursor::new(text)).unwrap_err();
            assert!(matches!(err, LossyError::Parse { .. }), "{text:?} loaded");
        }
        let err = read_language(Cursor::new("b:0.5\na:-0.5\n")).unwrap_err();
        assert!(matches!(err, LossyError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_write_rejects_unstorable_symbols() {
        for word in ["a b", "a:b", "a\tb", ""] {
            let language = Language::from_records(vec![(vec![Symbol::from(word)], 1.0)]);
            let mut buf = Vec::new();
            let err = write_language(&language, &mut buf).unwrap_err();
            assert!(matches!(err, LossyError::InvalidParameter(_)), "{word:?} written");
            assert!(buf.is_empty());
        }
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_language(&dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, LossyError::Io(_)));
    }
}
