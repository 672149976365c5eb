//! # Word Space
//!
//! Candidate sources for the submission run.
//!
//! [`WordSpace`] is the exhaustive Cartesian product of `length` digits drawn
//! from `1..=alphabet`. It is never materialized: every index maps directly to
//! its candidate, so workers can share a single atomic cursor. [`MatchList`]
//! replays a precomputed list of words instead.

use crate::error::{ConfigError, PersistenceError};
use crate::traits::CandidateSource;
use smallvec::SmallVec;
use std::fmt;
use std::fs;
use std::path::Path;

/// Largest alphabet whose symbols each render as one decimal digit.
pub const MAX_ALPHABET: u8 = 9;
pub const MAX_LENGTH: usize = 16;

/// One guess: an ordered sequence of digits in `1..=alphabet`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    digits: SmallVec<[u8; 8]>,
}

impl Candidate {
    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.digits {
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSpace {
    length: usize,
    alphabet: u8,
    size: usize,
}

impl WordSpace {
    pub fn new(length: usize, alphabet: u8) -> Result<Self, ConfigError> {
        if length == 0 || length > MAX_LENGTH {
            return Err(ConfigError::InvalidValue {
                field: "word_length".to_string(),
                reason: format!("must be between 1 and {}, got {}", MAX_LENGTH, length),
            });
        }
        if alphabet == 0 || alphabet > MAX_ALPHABET {
            return Err(ConfigError::InvalidValue {
                field: "alphabet_size".to_string(),
                reason: format!("must be between 1 and {}, got {}", MAX_ALPHABET, alphabet),
            });
        }

        let size = (alphabet as usize)
            .checked_pow(length as u32)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "word_length".to_string(),
                reason: format!("{}^{} candidates overflow the index space", alphabet, length),
            })?;

        Ok(Self {
            length,
            alphabet,
            size,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn alphabet(&self) -> u8 {
        self.alphabet
    }

    /// Total number of candidates, `alphabet ^ length`.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Candidate at lexicographic position `index`; the last digit varies fastest.
    pub fn get(&self, index: usize) -> Option<Candidate> {
        if index >= self.size {
            return None;
        }

        let base = self.alphabet as usize;
        let mut digits: SmallVec<[u8; 8]> = SmallVec::from_elem(1, self.length);
        let mut rest = index;
        for slot in digits.iter_mut().rev() {
            *slot = (rest % base) as u8 + 1;
            rest /= base;
        }

        Some(Candidate { digits })
    }

    /// Lazy iterator over the whole space, starting from the first candidate.
    pub fn iter(&self) -> WordSpaceIter {
        WordSpaceIter {
            space: *self,
            next: 0,
        }
    }
}

impl CandidateSource for WordSpace {
    fn len(&self) -> usize {
        self.size
    }

    fn word(&self, index: usize) -> Option<String> {
        self.get(index).map(|c| c.to_string())
    }
}

impl IntoIterator for &WordSpace {
    type Item = Candidate;
    type IntoIter = WordSpaceIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct WordSpaceIter {
    space: WordSpace,
    next: usize,
}

impl Iterator for WordSpaceIter {
    type Item = Candidate;

    fn next(&mut self) -> Option<Self::Item> {
        let candidate = self.space.get(self.next)?;
        self.next += 1;
        Some(candidate)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.space.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.next = self.next.saturating_add(n);
        self.next()
    }
}

impl ExactSizeIterator for WordSpaceIter {}

/// Precomputed words to replay, one per line in the source file.
#[derive(Debug, Clone, Default)]
pub struct MatchList {
    words: Vec<String>,
}

impl MatchList {
    /// Keeps trimmed, non-empty words of at least `min_length` characters.
    pub fn from_words<I, S>(words: I, min_length: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty() && w.chars().count() >= min_length)
            .collect();
        Self { words }
    }

    pub fn load(path: impl AsRef<Path>, min_length: usize) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| PersistenceError::Read {
            path: path.display().to_string(),
            msg: e.to_string(),
        })?;
        Ok(Self::from_words(content.lines(), min_length))
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

impl CandidateSource for MatchList {
    fn len(&self) -> usize {
        self.words.len()
    }

    fn word(&self, index: usize) -> Option<String> {
        self.words.get(index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_and_last_candidates() {
        let space = WordSpace::new(6, 7).unwrap();
        assert_eq!(space.len(), 117_649);
        assert_eq!(space.get(0).unwrap().to_string(), "111111");
        assert_eq!(space.get(1).unwrap().to_string(), "111112");
        assert_eq!(space.get(7).unwrap().to_string(), "111121");
        assert_eq!(space.get(space.len() - 1).unwrap().to_string(), "777777");
        assert!(space.get(space.len()).is_none());
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        assert!(WordSpace::new(0, 7).is_err());
        assert!(WordSpace::new(6, 0).is_err());
        assert!(WordSpace::new(6, 10).is_err());
    }

    #[test]
    fn match_list_filters_short_and_blank_lines() {
        let list = MatchList::from_words(["  1234 ", "", "12", "7654321", "   "], 4);
        assert_eq!(list.words(), &["1234".to_string(), "7654321".to_string()]);
        assert_eq!(list.word(1).as_deref(), Some("7654321"));
        assert!(list.word(2).is_none());
    }
}
