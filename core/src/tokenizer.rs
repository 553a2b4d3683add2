use crate::error::{IndexError, Result};
use std::collections::BTreeSet;

const SEPARATOR: char = ' ';

/// Split text into words on runs of spaces, dropping empty pieces.
pub fn split(text: &str) -> impl Iterator<Item = &str> {
    text.split(SEPARATOR).filter(|w| !w.is_empty())
}

/// Reject words containing a control character (code point 0..=31).
pub fn validate_symbols(word: &str) -> Result<()> {
    if word.chars().any(|c| (c as u32) <= 31) {
        return Err(IndexError::InvalidToken(word.to_string()));
    }
    Ok(())
}

/// Reject a bare `-` and words starting with `--`.
pub fn validate_negation(word: &str) -> Result<()> {
    if word == "-" || word.starts_with("--") {
        return Err(IndexError::InvalidNegation(word.to_string()));
    }
    Ok(())
}

/// Validate a query word and split off its leading `-`.
///
/// Returns the word text and whether it was negated. Both checks run on the
/// word as written, before the `-` is stripped.
pub fn classify(word: &str) -> Result<(&str, bool)> {
    validate_symbols(word)?;
    validate_negation(word)?;
    match word.strip_prefix('-') {
        Some(rest) => Ok((rest, true)),
        None => Ok((word, false)),
    }
}

/// Collect distinct non-empty words, validating each one.
pub fn unique_non_empty<I, S>(words: I) -> Result<BTreeSet<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = BTreeSet::new();
    for word in words {
        let word = word.as_ref();
        if word.is_empty() {
            continue;
        }
        validate_symbols(word)?;
        out.insert(word.to_string());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_drops_empty_runs() {
        let words: Vec<_> = split("  big   cat ").collect();
        assert_eq!(words, vec!["big", "cat"]);
        assert_eq!(split("").count(), 0);
    }

    #[test]
    fn classify_strips_single_minus() {
        assert_eq!(classify("-cat").unwrap(), ("cat", true));
        assert_eq!(classify("cat-").unwrap(), ("cat-", false));
        assert!(matches!(classify("--cat"), Err(IndexError::InvalidNegation(_))));
        assert!(matches!(classify("-"), Err(IndexError::InvalidNegation(_))));
    }

    #[test]
    fn classify_checks_symbols_first() {
        assert!(matches!(classify("--c\x01t"), Err(IndexError::InvalidToken(_))));
    }
}
