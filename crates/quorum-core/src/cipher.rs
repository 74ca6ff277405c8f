//! Passphrase encryption of the master secret.
//!
//! A four-round Feistel network over the two halves of the secret, with
//! PBKDF2-HMAC-SHA256 as the round function. Encryption and decryption
//! are the same walk in opposite round order, so the construction is its
//! own inverse and works for any even secret length.
//!
//! The round salt binds the share identifier unless the share set is
//! extendable, in which case the prefix is empty and re-sharing the same
//! secret under a fresh identifier derives the same ciphertext.

use crate::error::ShareError;
use ring::pbkdf2;
use std::num::NonZeroU32;
use zeroize::Zeroizing;

/// Number of Feistel rounds.
const ROUND_COUNT: u8 = 4;

/// Total PBKDF2 iterations across all rounds at exponent 0.
const BASE_ITERATION_COUNT: u32 = 10_000;

/// Largest iteration exponent encodable in the 4-bit wire field.
pub(crate) const MAX_ITERATION_EXPONENT: u8 = 15;

/// Salt prefix binding the identifier into non-extendable derivations.
const SALT_PREFIX: &[u8] = b"shamir";

/// Encrypt `master` under `passphrase`. Inverse of [`decrypt`].
///
/// # Errors
///
/// Returns [`ShareError::NonAsciiPassphrase`] for passphrases containing
/// anything but printable ASCII, and
/// [`ShareError::InvalidIterationExponent`] when the exponent exceeds 15.
pub(crate) fn encrypt(
    master: &[u8],
    passphrase: &str,
    iteration_exponent: u8,
    id: u16,
    extendable: bool,
) -> Result<Zeroizing<Vec<u8>>, ShareError> {
    feistel(
        master,
        passphrase,
        iteration_exponent,
        id,
        extendable,
        0..ROUND_COUNT,
    )
}

/// Decrypt `master` under `passphrase`. Inverse of [`encrypt`].
///
/// # Errors
///
/// Same failure modes as [`encrypt`].
pub(crate) fn decrypt(
    master: &[u8],
    passphrase: &str,
    iteration_exponent: u8,
    id: u16,
    extendable: bool,
) -> Result<Zeroizing<Vec<u8>>, ShareError> {
    feistel(
        master,
        passphrase,
        iteration_exponent,
        id,
        extendable,
        (0..ROUND_COUNT).rev(),
    )
}

/// Reject passphrases containing control characters or non-ASCII bytes.
///
/// The empty passphrase is allowed and equivalent to no passphrase.
///
/// # Errors
///
/// Returns [`ShareError::NonAsciiPassphrase`] on the first offending byte.
pub(crate) fn check_passphrase(passphrase: &str) -> Result<(), ShareError> {
    if passphrase.bytes().all(|b| (0x20..=0x7e).contains(&b)) {
        Ok(())
    } else {
        Err(ShareError::NonAsciiPassphrase)
    }
}

fn feistel(
    master: &[u8],
    passphrase: &str,
    iteration_exponent: u8,
    id: u16,
    extendable: bool,
    rounds: impl Iterator<Item = u8>,
) -> Result<Zeroizing<Vec<u8>>, ShareError> {
    check_passphrase(passphrase)?;
    if iteration_exponent > MAX_ITERATION_EXPONENT {
        return Err(ShareError::InvalidIterationExponent(iteration_exponent));
    }
    debug_assert!(master.len() % 2 == 0, "secret length must be even");

    let iterations = (BASE_ITERATION_COUNT / u32::from(ROUND_COUNT)) << iteration_exponent;
    let iterations =
        NonZeroU32::new(iterations).expect("per-round iteration count is nonzero for e <= 15");

    let salt_prefix = salt_prefix(extendable, id);
    let half = master.len() / 2;
    let mut left = Zeroizing::new(master[..half].to_vec());
    let mut right = Zeroizing::new(master[half..].to_vec());
    let mut f = Zeroizing::new(vec![0u8; half]);

    for step in rounds {
        round_function(
            step,
            passphrase.as_bytes(),
            &salt_prefix,
            &right,
            iterations,
            &mut f,
        );
        for (o, l) in f.iter_mut().zip(left.iter()) {
            *o ^= *l;
        }
        left.copy_from_slice(&right);
        right.copy_from_slice(&f);
    }

    let mut out = Zeroizing::new(Vec::with_capacity(master.len()));
    out.extend_from_slice(&right);
    out.extend_from_slice(&left);
    Ok(out)
}

/// One PBKDF2 round: password `[step] || passphrase`, salt
/// `salt_prefix || right`, output as long as a half.
fn round_function(
    step: u8,
    passphrase: &[u8],
    salt_prefix: &[u8],
    right: &[u8],
    iterations: NonZeroU32,
    out: &mut [u8],
) {
    let mut password = Zeroizing::new(Vec::with_capacity(1 + passphrase.len()));
    password.push(step);
    password.extend_from_slice(passphrase);

    let mut salt = Vec::with_capacity(salt_prefix.len() + right.len());
    salt.extend_from_slice(salt_prefix);
    salt.extend_from_slice(right);

    pbkdf2::derive(pbkdf2::PBKDF2_HMAC_SHA256, iterations, &salt, &password, out);
}

/// Empty for extendable share sets; otherwise `"shamir"` followed by the
/// 15-bit identifier as 16 bits big-endian.
fn salt_prefix(extendable: bool, id: u16) -> Vec<u8> {
    if extendable {
        Vec::new()
    } else {
        let mut prefix = SALT_PREFIX.to_vec();
        prefix.extend_from_slice(&id.to_be_bytes());
        prefix
    }
}
