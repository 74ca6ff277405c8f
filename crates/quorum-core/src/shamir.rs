//! Polynomial secret splitting and recovery over GF(256).
//!
//! Each byte position of a secret is an independent polynomial of degree
//! `threshold - 1`. Two y-coordinates are reserved: the secret itself sits
//! at x = 255 and a digest share at x = 254, so interpolating a qualified
//! share set at those x-values yields the secret and a verifiable
//! HMAC-SHA256 prefix over it. Outward-facing share indices are 0..=15 and
//! can never collide with the reserved coordinates.

use crate::error::ShareError;
use crate::gf256;
use rand::{CryptoRng, RngCore};
use ring::hmac;
use zeroize::Zeroizing;

/// Reserved x-coordinate of the digest share.
pub(crate) const DIGEST_INDEX: u8 = 254;

/// Reserved x-coordinate of the shared secret.
pub(crate) const SECRET_INDEX: u8 = 255;

/// Length of the digest prefix stored in the digest share.
pub(crate) const DIGEST_LEN: usize = 4;

/// Maximum number of shares (and maximum threshold) per split.
pub(crate) const MAX_SHARES: u8 = 16;

/// Split `secret` into `count` shares requiring `threshold` of them for
/// recovery. Returns `(x, value)` pairs with x = 0..count-1.
///
/// With `threshold == 1` every share is a plain copy of the secret and no
/// digest share is produced. Otherwise `threshold - 2` share values are
/// drawn from `rng`, the digest and secret occupy the reserved
/// coordinates, and the remaining shares are interpolated from those
/// `threshold` defining points.
///
/// # Errors
///
/// Returns [`ShareError::InvalidGroupConfig`] when the threshold is zero,
/// exceeds `count`, or `count` exceeds [`MAX_SHARES`].
pub(crate) fn split<R: RngCore + CryptoRng>(
    rng: &mut R,
    threshold: u8,
    count: u8,
    secret: &[u8],
) -> Result<Vec<(u8, Vec<u8>)>, ShareError> {
    if threshold < 1 {
        return Err(ShareError::InvalidGroupConfig(
            "threshold must be at least 1".into(),
        ));
    }
    if count > MAX_SHARES {
        return Err(ShareError::InvalidGroupConfig(format!(
            "share count {count} exceeds the maximum of {MAX_SHARES}"
        )));
    }
    if threshold > count {
        return Err(ShareError::InvalidGroupConfig(format!(
            "threshold {threshold} exceeds share count {count}"
        )));
    }

    if threshold == 1 {
        return Ok((0..count).map(|i| (i, secret.to_vec())).collect());
    }

    let random_count = threshold - 2;
    let mut shares: Vec<(u8, Vec<u8>)> = Vec::with_capacity(count as usize);
    for i in 0..random_count {
        let mut value = vec![0u8; secret.len()];
        rng.fill_bytes(&mut value);
        shares.push((i, value));
    }

    // The defining points: the random shares plus the two reserved
    // coordinates carrying the digest and the secret.
    let mut pad = vec![0u8; secret.len() - DIGEST_LEN];
    rng.fill_bytes(&mut pad);
    let mut digest_value = share_digest(&pad, secret).to_vec();
    digest_value.extend_from_slice(&pad);

    let mut base = shares.clone();
    base.push((DIGEST_INDEX, digest_value));
    base.push((SECRET_INDEX, secret.to_vec()));

    for i in random_count..count {
        shares.push((i, interpolate(&base, i)?));
    }
    Ok(shares)
}

/// Recover the secret from exactly `threshold` shares.
///
/// With `threshold == 1` the sole share's value is the secret. Otherwise
/// the secret and digest coordinates are interpolated and the digest is
/// recomputed and compared without short-circuiting.
///
/// # Errors
///
/// Returns [`ShareError::WrongMemberCount`] when the share count differs
/// from `threshold`, [`ShareError::DuplicateIndex`] /
/// [`ShareError::MixedShareSet`] for malformed sets, and
/// [`ShareError::DigestMismatch`] when the digest does not verify.
pub(crate) fn recover(
    threshold: u8,
    shares: &[(u8, Vec<u8>)],
) -> Result<Zeroizing<Vec<u8>>, ShareError> {
    if shares.len() != threshold as usize {
        return Err(ShareError::WrongMemberCount {
            got: shares.len(),
            expected: threshold as usize,
        });
    }
    if threshold == 1 {
        return Ok(Zeroizing::new(shares[0].1.clone()));
    }

    let secret = Zeroizing::new(interpolate(shares, SECRET_INDEX)?);
    let digest_share = Zeroizing::new(interpolate(shares, DIGEST_INDEX)?);

    let expected = share_digest(&digest_share[DIGEST_LEN..], &secret);
    if !constant_time_eq(&digest_share[..DIGEST_LEN], &expected) {
        return Err(ShareError::DigestMismatch);
    }
    Ok(secret)
}

/// Evaluate the polynomial defined by `shares` at `x`, one byte position
/// at a time, using log-domain Lagrange basis factors.
pub(crate) fn interpolate(shares: &[(u8, Vec<u8>)], x: u8) -> Result<Vec<u8>, ShareError> {
    if shares.is_empty() {
        return Err(ShareError::WrongMemberCount {
            got: 0,
            expected: 1,
        });
    }
    for (n, (i, _)) in shares.iter().enumerate() {
        if shares[..n].iter().any(|(j, _)| j == i) {
            return Err(ShareError::DuplicateIndex(*i));
        }
    }
    let len = shares[0].1.len();
    if shares.iter().any(|(_, v)| v.len() != len) {
        return Err(ShareError::MixedShareSet(
            "share values differ in length".into(),
        ));
    }
    if let Some((_, value)) = shares.iter().find(|(i, _)| *i == x) {
        return Ok(value.clone());
    }

    // Lagrange basis in the log domain: basis_i = prod_j (x ^ j) over
    // prod_j (i ^ j), accumulated as signed sums of logs and reduced
    // mod 255 at use. Sums stay far inside i32 for up to 16 shares.
    let log_prod: i32 = shares
        .iter()
        .map(|(i, _)| i32::from(gf256::LOG[usize::from(i ^ x)]))
        .sum();

    let mut result = vec![0u8; len];
    for (i, value) in shares {
        let log_denominator: i32 = shares
            .iter()
            .map(|(j, _)| i32::from(gf256::LOG[usize::from(j ^ i)]))
            .sum();
        let log_basis = gf256::mod_255(
            log_prod - i32::from(gf256::LOG[usize::from(i ^ x)]) - log_denominator,
        );
        let basis = gf256::EXP[log_basis];
        for (r, &s) in result.iter_mut().zip(value.iter()) {
            *r = gf256::add(*r, gf256::mul(basis, s));
        }
    }
    Ok(result)
}

/// First four bytes of `HMAC-SHA256(pad, secret)`.
fn share_digest(pad: &[u8], secret: &[u8]) -> [u8; DIGEST_LEN] {
    let key = hmac::Key::new(hmac::HMAC_SHA256, pad);
    let tag = hmac::sign(&key, secret);
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&tag.as_ref()[..DIGEST_LEN]);
    out
}

/// Constant-time byte comparison for digest prefixes.
///
/// Uses bitwise OR accumulation to avoid short-circuit timing leaks on
/// the digest value. Lengths here are fixed and public.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn split_recover_round_trips_for_all_thresholds() {
        let secret = b"ABCDEFGHIJKLMNOP";
        let mut rng = rng();
        for count in 1..=MAX_SHARES {
            for threshold in 1..=count {
                let shares =
                    split(&mut rng, threshold, count, secret).expect("split should succeed");
                assert_eq!(shares.len(), count as usize);
                let recovered = recover(threshold, &shares[..threshold as usize])
                    .expect("recover should succeed");
                assert_eq!(&recovered[..], secret);
            }
        }
    }

    #[test]
    fn any_threshold_subset_recovers() {
        let secret = b"0123456789abcdef";
        let mut rng = rng();
        let shares = split(&mut rng, 3, 5, secret).expect("split should succeed");
        for skip in 0..3 {
            let subset: Vec<_> = shares
                .iter()
                .cloned()
                .cycle()
                .skip(skip)
                .take(3)
                .collect();
            let recovered = recover(3, &subset).expect("recover should succeed");
            assert_eq!(&recovered[..], secret);
        }
    }

    #[test]
    fn threshold_one_emits_plain_copies() {
        let secret = b"ABCDEFGHIJKLMNOP";
        let mut rng = rng();
        let shares = split(&mut rng, 1, 4, secret).expect("split should succeed");
        for (i, (x, value)) in shares.iter().enumerate() {
            assert_eq!(*x, i as u8);
            assert_eq!(value.as_slice(), secret);
        }
        let recovered = recover(1, &shares[2..3]).expect("recover should succeed");
        assert_eq!(&recovered[..], secret);
    }

    #[test]
    fn tampered_share_fails_digest() {
        let secret = b"ABCDEFGHIJKLMNOP";
        let mut rng = rng();
        let mut shares = split(&mut rng, 3, 3, secret).expect("split should succeed");
        shares[1].1[0] ^= 0x40;
        let err = recover(3, &shares).expect_err("tampered set should fail");
        assert!(matches!(err, ShareError::DigestMismatch));
    }

    #[test]
    fn wrong_share_count_is_rejected() {
        let secret = b"ABCDEFGHIJKLMNOP";
        let mut rng = rng();
        let shares = split(&mut rng, 3, 5, secret).expect("split should succeed");
        let err = recover(3, &shares[..2]).expect_err("short set should fail");
        assert!(matches!(
            err,
            ShareError::WrongMemberCount {
                got: 2,
                expected: 3
            }
        ));
    }

    #[test]
    fn duplicate_x_coordinates_are_rejected() {
        let points = vec![(1u8, vec![1u8, 2]), (1u8, vec![3u8, 4])];
        let err = interpolate(&points, 0).expect_err("duplicate x should fail");
        assert!(matches!(err, ShareError::DuplicateIndex(1)));
    }

    #[test]
    fn mismatched_value_lengths_are_rejected() {
        let points = vec![(0u8, vec![1u8, 2]), (1u8, vec![3u8])];
        let err = interpolate(&points, 2).expect_err("length mismatch should fail");
        assert!(matches!(err, ShareError::MixedShareSet(_)));
    }

    #[test]
    fn interpolation_at_known_x_returns_that_value() {
        let points = vec![(0u8, vec![9u8, 9]), (1u8, vec![7u8, 7])];
        let value = interpolate(&points, 1).expect("interpolate should succeed");
        assert_eq!(value, vec![7, 7]);
    }

    #[test]
    fn reserved_coordinates_interpolate_back() {
        let secret = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ012345";
        let mut rng = rng();
        let shares = split(&mut rng, 4, 4, secret).expect("split should succeed");
        let at_secret = interpolate(&shares, SECRET_INDEX).expect("interpolate should succeed");
        assert_eq!(at_secret.as_slice(), secret);
        let at_digest = interpolate(&shares, DIGEST_INDEX).expect("interpolate should succeed");
        assert_eq!(
            &at_digest[..DIGEST_LEN],
            share_digest(&at_digest[DIGEST_LEN..], secret)
        );
    }

    #[test]
    fn split_rejects_bad_parameters() {
        let secret = b"ABCDEFGHIJKLMNOP";
        let mut rng = rng();
        assert!(matches!(
            split(&mut rng, 0, 3, secret),
            Err(ShareError::InvalidGroupConfig(_))
        ));
        assert!(matches!(
            split(&mut rng, 5, 3, secret),
            Err(ShareError::InvalidGroupConfig(_))
        ));
        assert!(matches!(
            split(&mut rng, 2, 17, secret),
            Err(ShareError::InvalidGroupConfig(_))
        ));
    }

    #[test]
    fn constant_time_eq_matches_slice_equality() {
        assert!(constant_time_eq(b"abcd", b"abcd"));
        assert!(!constant_time_eq(b"abcd", b"abce"));
        assert!(!constant_time_eq(b"abcd", b"abc"));
    }
}
