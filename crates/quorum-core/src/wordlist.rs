//! The 1024-word share dictionary and word↔index codec.
//!
//! This module provides:
//! - [`Wordlist`] — a validated, immutable 1024-entry word table
//! - [`Wordlist::standard`] — the embedded English list, parsed once
//! - [`Wordlist::indices`] / [`Wordlist::sentence`] — mnemonic codec halves
//!
//! The standard list is embedded at compile time via `include_str!` and
//! parsed lazily behind a `OnceLock`. Callers may also supply their own
//! list; anything that is not exactly 1024 entries is rejected.

use crate::error::ShareError;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Number of words in a share dictionary (the 10-bit alphabet).
pub const WORDLIST_SIZE: usize = 1024;

const ENGLISH_RAW: &str = include_str!("wordlists/english.txt");

static ENGLISH_LOCK: OnceLock<Wordlist> = OnceLock::new();

/// An ordered 1024-entry word table with its inverse mapping.
#[derive(Debug, Clone)]
pub struct Wordlist {
    words: Vec<String>,
    index: HashMap<String, u16>,
}

impl Wordlist {
    /// Build a wordlist from an ordered slice of words.
    ///
    /// Words are stored lowercased; lookups are case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::WordlistSize`] unless exactly 1024 words are
    /// supplied.
    pub fn new<S: AsRef<str>>(words: &[S]) -> Result<Self, ShareError> {
        if words.len() != WORDLIST_SIZE {
            return Err(ShareError::WordlistSize(words.len()));
        }
        let words: Vec<String> = words.iter().map(|w| w.as_ref().to_lowercase()).collect();
        let index = words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i as u16))
            .collect();
        Ok(Self { words, index })
    }

    /// The embedded standard English wordlist.
    ///
    /// # Panics
    ///
    /// Panics if the embedded list does not contain exactly
    /// [`WORDLIST_SIZE`] words — a build corruption, not a runtime input.
    #[must_use]
    pub fn standard() -> &'static Wordlist {
        ENGLISH_LOCK.get_or_init(|| {
            let words: Vec<&str> = ENGLISH_RAW.lines().collect();
            Wordlist::new(&words).expect("embedded wordlist must contain exactly 1024 words")
        })
    }

    /// The word at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is 1024 or more. Word indices produced by the
    /// codec are 10-bit and therefore always in range.
    #[must_use]
    pub fn word(&self, index: u16) -> &str {
        &self.words[index as usize]
    }

    /// Resolve a space-separated sentence into word indices.
    ///
    /// Tokens are split on ASCII whitespace and lowercased before lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::UnknownWord`] for any token absent from the
    /// list.
    pub fn indices(&self, sentence: &str) -> Result<Vec<u16>, ShareError> {
        sentence
            .split_ascii_whitespace()
            .map(|token| {
                let lowered = token.to_lowercase();
                self.index
                    .get(&lowered)
                    .copied()
                    .ok_or(ShareError::UnknownWord(lowered))
            })
            .collect()
    }

    /// Join word indices into a space-separated lowercase sentence.
    #[must_use]
    pub fn sentence(&self, indices: &[u16]) -> String {
        indices
            .iter()
            .map(|&i| self.word(i))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
