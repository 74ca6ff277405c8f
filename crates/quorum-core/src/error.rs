//! Error types for `quorum-core`.

use thiserror::Error;

/// Errors produced by share generation, combination, and mnemonic codecs.
#[derive(Debug, Error)]
pub enum ShareError {
    /// Master secret shorter than 16 bytes or of odd length.
    #[error("master secret must be at least 16 bytes and of even length, got {0} bytes")]
    InvalidSeedLength(usize),

    /// Group or member threshold/count outside the allowed 1..=16 bounds.
    #[error("invalid group configuration: {0}")]
    InvalidGroupConfig(String),

    /// Mnemonic token absent from the wordlist.
    #[error("word not found in the wordlist: {0:?}")]
    UnknownWord(String),

    /// Mnemonic word count below the minimum share length.
    #[error("mnemonic too short: {got} words (minimum {min})")]
    TooShort { got: usize, min: usize },

    /// RS1024 residue of the mnemonic is not 1.
    #[error("mnemonic checksum verification failed")]
    BadChecksum,

    /// Share value padding longer than 8 bits or containing set bits.
    #[error("invalid mnemonic padding")]
    InvalidPadding,

    /// Shares disagree on identifier, flags, or thresholds.
    #[error("mismatched share set: {0}")]
    MixedShareSet(String),

    /// Number of distinct groups presented differs from the group threshold.
    #[error("wrong number of groups: {got} present, {expected} required")]
    WrongGroupCount { got: usize, expected: usize },

    /// Number of member shares in a group differs from its member threshold.
    #[error("wrong number of member shares: {got} present, {expected} required")]
    WrongMemberCount { got: usize, expected: usize },

    /// Repeated group or member index within its scope.
    #[error("duplicate share index {0}")]
    DuplicateIndex(u8),

    /// Reconstructed digest share does not match the recomputed HMAC prefix.
    #[error("share digest verification failed")]
    DigestMismatch,

    /// Passphrase contains a byte outside printable ASCII.
    #[error("passphrase must contain only printable ASCII characters")]
    NonAsciiPassphrase,

    /// Bit reader exhausted before the requested field was complete.
    #[error("bit buffer exhausted: wanted {wanted} bits, {available} available")]
    ShortBuffer { wanted: usize, available: usize },

    /// Wordlist does not contain exactly 1024 entries.
    #[error("wordlist must contain exactly 1024 words, got {0}")]
    WordlistSize(usize),

    /// No shares were presented for combination.
    #[error("at least one share is required")]
    EmptyShareSet,

    /// Iteration exponent does not fit in the 4-bit wire field.
    #[error("iteration exponent must be at most 15, got {0}")]
    InvalidIterationExponent(u8),
}
