//! RS1024 checksum over the 10-bit word alphabet.
//!
//! A 30-bit Reed-Solomon style checksum computed over the mnemonic's word
//! indices, bound to the share mode through a customization string that is
//! prepended to the value stream as 10-bit lanes (never byte-concatenated).
//! A mnemonic is valid iff the recurrence over `customization || words`
//! leaves a residue of exactly 1.

/// Number of checksum words appended to every mnemonic.
pub(crate) const CHECKSUM_WORDS: usize = 3;

/// Customization string bound into non-extendable share checksums.
const CUSTOMIZATION: &[u8] = b"shamir";

/// Customization string bound into extendable share checksums.
const CUSTOMIZATION_EXTENDABLE: &[u8] = b"shamir_extendable";

/// Generator constants of the checksum recurrence, fixed by the standard.
const GEN: [u32; 10] = [
    0x00E0_E040,
    0x01C1_C080,
    0x0383_8100,
    0x0707_0200,
    0x0E0E_0009,
    0x1C0C_2412,
    0x3808_6C24,
    0x3090_FC48,
    0x21B1_F890,
    0x03F3_F120,
];

fn customization(extendable: bool) -> &'static [u8] {
    if extendable {
        CUSTOMIZATION_EXTENDABLE
    } else {
        CUSTOMIZATION
    }
}

/// Run the checksum recurrence over a stream of 10-bit lanes.
fn polymod<I: IntoIterator<Item = u32>>(values: I) -> u32 {
    let mut chk: u32 = 1;
    for v in values {
        let b = chk >> 20;
        chk = ((chk & 0x000F_FFFF) << 10) ^ v;
        for (i, gen) in GEN.iter().enumerate() {
            if (b >> i) & 1 != 0 {
                chk ^= gen;
            }
        }
    }
    chk
}

fn lanes<'a>(extendable: bool, words: &'a [u16]) -> impl Iterator<Item = u32> + 'a {
    customization(extendable)
        .iter()
        .map(|&c| u32::from(c))
        .chain(words.iter().map(|&w| u32::from(w)))
}

/// Verify the checksum of a complete mnemonic (data words plus the three
/// trailing checksum words).
#[must_use]
pub(crate) fn verify(extendable: bool, words: &[u16]) -> bool {
    polymod(lanes(extendable, words)) == 1
}

/// Compute the three checksum words for `data` (the mnemonic without its
/// checksum), most significant limb first.
#[must_use]
pub(crate) fn checksum(extendable: bool, data: &[u16]) -> [u16; CHECKSUM_WORDS] {
    let zeros = [0u32; CHECKSUM_WORDS];
    let chk = polymod(lanes(extendable, data).chain(zeros)) ^ 1;
    [
        ((chk >> 20) & 0x3ff) as u16,
        ((chk >> 10) & 0x3ff) as u16,
        (chk & 0x3ff) as u16,
    ]
}
