//! Share wire format and mnemonic codec.
//!
//! A share serializes to a sequence of 10-bit word indices (MSB first):
//!
//! ```text
//! id                 : 15 bits
//! extendable flag    :  1 bit
//! iteration exponent :  4 bits
//! group index        :  4 bits
//! group threshold-1  :  4 bits
//! group count-1      :  4 bits
//! member index       :  4 bits
//! member threshold-1 :  4 bits
//! padding            :  p bits, all zero, 0 <= p <= 8
//! share value        :  8 * len bits
//! checksum           : 30 bits
//! ```
//!
//! The identifier, flag, and exponent fill the first two words exactly,
//! so the extendable flag — which selects the checksum customization —
//! can be read before the checksum is verified, and everything else is
//! parsed only afterwards.

use crate::bits::{BitReader, BitWriter};
use crate::error::ShareError;
use crate::rs1024;
use crate::wordlist::Wordlist;
use std::fmt;

/// Bits per mnemonic word.
const RADIX_BITS: usize = 10;

/// Width of the share identifier.
const ID_BITS: u32 = 15;

/// Mask selecting a valid 15-bit identifier.
pub(crate) const ID_MASK: u32 = (1 << ID_BITS) - 1;

/// Words occupied by the identifier, flag, and iteration exponent.
const PREFIX_WORDS: usize = 2;

/// Non-value words in every mnemonic: prefix, group/member fields, checksum.
const METADATA_WORDS: usize = PREFIX_WORDS + 2 + rs1024::CHECKSUM_WORDS;

/// Minimum master secret strength in bits.
const MIN_STRENGTH_BITS: usize = 128;

/// Minimum words in a valid share mnemonic.
pub const MIN_MNEMONIC_WORDS: usize = METADATA_WORDS + MIN_STRENGTH_BITS.div_ceil(RADIX_BITS);

/// One member share of a split secret.
///
/// All shares of one split carry the same identifier, flag, exponent, and
/// group parameters; a share is immutable once produced.
#[derive(Clone, PartialEq, Eq)]
pub struct Share {
    pub(crate) id: u16,
    pub(crate) extendable: bool,
    pub(crate) iteration_exponent: u8,
    pub(crate) group_index: u8,
    pub(crate) group_threshold: u8,
    pub(crate) group_count: u8,
    pub(crate) member_index: u8,
    pub(crate) member_threshold: u8,
    pub(crate) value: Vec<u8>,
}

impl Share {
    /// 15-bit identifier shared by every share of one split.
    #[must_use]
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Whether the share set may be extended without changing derivation.
    #[must_use]
    pub fn extendable(&self) -> bool {
        self.extendable
    }

    /// PBKDF2 iteration exponent.
    #[must_use]
    pub fn iteration_exponent(&self) -> u8 {
        self.iteration_exponent
    }

    /// Index of the group this share belongs to.
    #[must_use]
    pub fn group_index(&self) -> u8 {
        self.group_index
    }

    /// Number of groups required for recovery.
    #[must_use]
    pub fn group_threshold(&self) -> u8 {
        self.group_threshold
    }

    /// Total number of groups in the split.
    #[must_use]
    pub fn group_count(&self) -> u8 {
        self.group_count
    }

    /// Index of this share within its group.
    #[must_use]
    pub fn member_index(&self) -> u8 {
        self.member_index
    }

    /// Number of member shares required to recover this share's group.
    #[must_use]
    pub fn member_threshold(&self) -> u8 {
        self.member_threshold
    }

    /// Encode this share as a space-joined mnemonic sentence.
    #[must_use]
    pub fn to_mnemonic(&self, wordlist: &Wordlist) -> String {
        wordlist.sentence(&self.to_words())
    }

    /// Decode and validate a mnemonic sentence.
    ///
    /// # Errors
    ///
    /// Returns [`ShareError::UnknownWord`], [`ShareError::TooShort`],
    /// [`ShareError::BadChecksum`], or [`ShareError::InvalidPadding`]
    /// depending on which validation stage fails.
    pub fn from_mnemonic(sentence: &str, wordlist: &Wordlist) -> Result<Self, ShareError> {
        Self::from_words(&wordlist.indices(sentence)?)
    }

    /// Serialize to 10-bit word indices, checksum included.
    pub(crate) fn to_words(&self) -> Vec<u16> {
        let mut writer = BitWriter::new();
        writer.write(u64::from(self.id), ID_BITS);
        writer.write(u64::from(self.extendable), 1);
        writer.write(u64::from(self.iteration_exponent), 4);
        writer.write(u64::from(self.group_index), 4);
        writer.write(u64::from(self.group_threshold - 1), 4);
        writer.write(u64::from(self.group_count - 1), 4);
        writer.write(u64::from(self.member_index), 4);
        writer.write(u64::from(self.member_threshold - 1), 4);

        let value_bits = self.value.len() * 8;
        let value_words = value_bits.div_ceil(RADIX_BITS);
        let pad_bits = value_words * RADIX_BITS - value_bits;
        writer.write(0, pad_bits as u32);
        for &byte in &self.value {
            writer.write(u64::from(byte), 8);
        }

        let bit_len = writer.bit_len();
        debug_assert_eq!(bit_len % RADIX_BITS, 0);
        let bytes = writer.into_bytes();
        let mut reader = BitReader::with_bit_len(&bytes, bit_len);
        let mut words = Vec::with_capacity(bit_len / RADIX_BITS + rs1024::CHECKSUM_WORDS);
        while reader.available() > 0 {
            let word = reader
                .read(RADIX_BITS as u32)
                .expect("packed share is word-aligned");
            words.push(word as u16);
        }

        let checksum = rs1024::checksum(self.extendable, &words);
        words.extend_from_slice(&checksum);
        words
    }

    /// Deserialize from word indices, validating checksum and padding.
    pub(crate) fn from_words(indices: &[u16]) -> Result<Self, ShareError> {
        if indices.len() < MIN_MNEMONIC_WORDS {
            return Err(ShareError::TooShort {
                got: indices.len(),
                min: MIN_MNEMONIC_WORDS,
            });
        }

        // The flag lives in bit 15 of the 20-bit prefix, i.e. bit 4 of the
        // second word; it selects the checksum customization, so it is the
        // only field read ahead of verification.
        let extendable = (indices[1] >> 4) & 1 == 1;
        if !rs1024::verify(extendable, indices) {
            return Err(ShareError::BadChecksum);
        }

        let data = &indices[..indices.len() - rs1024::CHECKSUM_WORDS];
        let mut writer = BitWriter::new();
        for &word in data {
            writer.write(u64::from(word), RADIX_BITS as u32);
        }
        let bit_len = writer.bit_len();
        let bytes = writer.into_bytes();
        let mut reader = BitReader::with_bit_len(&bytes, bit_len);

        let id = reader.read(ID_BITS)? as u16;
        let _ = reader.read(1)?; // the extendable flag, already extracted
        let iteration_exponent = reader.read(4)? as u8;
        let group_index = reader.read(4)? as u8;
        let group_threshold = reader.read(4)? as u8 + 1;
        let group_count = reader.read(4)? as u8 + 1;
        let member_index = reader.read(4)? as u8;
        let member_threshold = reader.read(4)? as u8 + 1;

        let value_words = indices.len() - METADATA_WORDS;
        let pad_bits = (RADIX_BITS * value_words) % 16;
        if pad_bits > 8 {
            return Err(ShareError::InvalidPadding);
        }
        if pad_bits > 0 && reader.read(pad_bits as u32)? != 0 {
            return Err(ShareError::InvalidPadding);
        }

        let mut value = Vec::with_capacity(reader.available() / 8);
        while reader.available() >= 8 {
            value.push(reader.read(8)? as u8);
        }
        debug_assert_eq!(reader.available(), 0);

        Ok(Self {
            id,
            extendable,
            iteration_exponent,
            group_index,
            group_threshold,
            group_count,
            member_index,
            member_threshold,
            value,
        })
    }
}

// The share value is key material — never print it.
impl fmt::Debug for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Share")
            .field("id", &self.id)
            .field("extendable", &self.extendable)
            .field("iteration_exponent", &self.iteration_exponent)
            .field("group_index", &self.group_index)
            .field("group_threshold", &self.group_threshold)
            .field("group_count", &self.group_count)
            .field("member_index", &self.member_index)
            .field("member_threshold", &self.member_threshold)
            .field("value", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_share() -> Share {
        Share {
            id: 0x1a2b,
            extendable: false,
            iteration_exponent: 2,
            group_index: 1,
            group_threshold: 2,
            group_count: 3,
            member_index: 4,
            member_threshold: 3,
            value: b"ABCDEFGHIJKLMNOP".to_vec(),
        }
    }

    #[test]
    fn words_round_trip() {
        for extendable in [false, true] {
            for value_len in [16usize, 18, 20, 28, 32] {
                let mut share = sample_share();
                share.extendable = extendable;
                share.value = vec![0xa5; value_len];
                let words = share.to_words();
                let decoded = Share::from_words(&words).expect("decode should succeed");
                assert_eq!(decoded, share);
            }
        }
    }

    #[test]
    fn sixteen_byte_share_is_twenty_words() {
        let words = sample_share().to_words();
        assert_eq!(words.len(), MIN_MNEMONIC_WORDS);
        assert_eq!(MIN_MNEMONIC_WORDS, 20);
    }

    #[test]
    fn mnemonic_round_trips_through_wordlist() {
        let share = sample_share();
        let sentence = share.to_mnemonic(Wordlist::standard());
        assert!(sentence
            .split(' ')
            .all(|w| w.bytes().all(|b| b.is_ascii_lowercase())));
        let decoded =
            Share::from_mnemonic(&sentence, Wordlist::standard()).expect("decode should succeed");
        assert_eq!(decoded, share);
    }

    #[test]
    fn short_mnemonic_is_rejected() {
        let words = vec![0u16; MIN_MNEMONIC_WORDS - 1];
        let err = Share::from_words(&words).expect_err("short input should fail");
        assert!(matches!(err, ShareError::TooShort { got: 19, min: 20 }));
    }

    #[test]
    fn flipping_any_word_bit_breaks_the_checksum() {
        let words = sample_share().to_words();
        for word_idx in 0..words.len() {
            for bit in 0..10 {
                let mut corrupted = words.clone();
                corrupted[word_idx] ^= 1 << bit;
                let err = Share::from_words(&corrupted)
                    .expect_err("corrupted share should fail");
                assert!(
                    matches!(err, ShareError::BadChecksum),
                    "word {word_idx} bit {bit}: unexpected {err:?}"
                );
            }
        }
    }

    #[test]
    fn flipping_the_extendable_flag_breaks_the_checksum() {
        let mut words = sample_share().to_words();
        words[1] ^= 1 << 4;
        let err = Share::from_words(&words).expect_err("flag flip should fail");
        assert!(matches!(err, ShareError::BadChecksum));
    }

    #[test]
    fn nonzero_padding_is_rejected() {
        // Rebuild a share's words with a set padding bit and a fixed-up
        // checksum, so only the padding validation can object.
        let share = sample_share();
        let mut writer = BitWriter::new();
        writer.write(u64::from(share.id), 15);
        writer.write(0, 1);
        writer.write(u64::from(share.iteration_exponent), 4);
        writer.write(u64::from(share.group_index), 4);
        writer.write(u64::from(share.group_threshold - 1), 4);
        writer.write(u64::from(share.group_count - 1), 4);
        writer.write(u64::from(share.member_index), 4);
        writer.write(u64::from(share.member_threshold - 1), 4);
        writer.write(0b10, 2); // padding bits, deliberately nonzero
        for &b in &share.value {
            writer.write(u64::from(b), 8);
        }
        let bit_len = writer.bit_len();
        let bytes = writer.into_bytes();
        let mut reader = BitReader::with_bit_len(&bytes, bit_len);
        let mut words = Vec::new();
        while reader.available() > 0 {
            words.push(reader.read(10).expect("word-aligned") as u16);
        }
        let checksum = rs1024::checksum(false, &words);
        words.extend_from_slice(&checksum);

        let err = Share::from_words(&words).expect_err("nonzero padding should fail");
        assert!(matches!(err, ShareError::InvalidPadding));
    }

    #[test]
    fn debug_output_masks_the_value() {
        let rendered = format!("{:?}", sample_share());
        assert!(rendered.contains("***"));
        assert!(!rendered.contains('A'));
    }
}
