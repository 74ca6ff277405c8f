//! Two-level share generation and recovery.
//!
//! Generation: the master secret is passphrase-encrypted, split once at
//! the group level, and each group secret is split again among that
//! group's members. Recovery runs the same construction backwards,
//! validating that the presented shares form exactly one coherent,
//! threshold-satisfying set.
//!
//! The caller supplies the randomness as a [`RngCore`] + [`CryptoRng`]
//! value: production code passes [`rand::rngs::OsRng`], tests pass a
//! seeded generator. Nothing here reaches for a global RNG.

use crate::cipher;
use crate::error::ShareError;
use crate::shamir;
use crate::share::{Share, ID_MASK};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use zeroize::Zeroizing;

/// Minimum master secret length in bytes.
pub const MIN_SECRET_BYTES: usize = 16;

/// Maximum number of groups, and of members per group.
pub const MAX_GROUP_COUNT: u8 = shamir::MAX_SHARES;

/// Member threshold and count for one group of a split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    /// Member shares required to recover this group's secret.
    pub member_threshold: u8,
    /// Member shares generated for this group.
    pub member_count: u8,
}

impl GroupSpec {
    /// Convenience constructor for `(threshold, count)` pairs.
    #[must_use]
    pub const fn new(member_threshold: u8, member_count: u8) -> Self {
        Self {
            member_threshold,
            member_count,
        }
    }
}

/// Split `master_secret` into mnemonic shares.
///
/// Recovering the secret requires, for `group_threshold` of the listed
/// groups, the member threshold of that group's shares. The returned
/// shares are ordered group by group, members in index order.
///
/// # Errors
///
/// - [`ShareError::InvalidSeedLength`] — secret shorter than
///   [`MIN_SECRET_BYTES`] or of odd length
/// - [`ShareError::InvalidGroupConfig`] — thresholds or counts outside
///   1..=16, a threshold above its count, group threshold above the group
///   count, or a group with threshold 1 and more than one member
/// - [`ShareError::NonAsciiPassphrase`] — passphrase with control or
///   non-ASCII characters
/// - [`ShareError::InvalidIterationExponent`] — exponent above 15
pub fn generate<R: RngCore + CryptoRng>(
    rng: &mut R,
    group_threshold: u8,
    groups: &[GroupSpec],
    master_secret: &[u8],
    passphrase: &str,
    iteration_exponent: u8,
    extendable: bool,
) -> Result<Vec<Share>, ShareError> {
    cipher::check_passphrase(passphrase)?;
    if iteration_exponent > cipher::MAX_ITERATION_EXPONENT {
        return Err(ShareError::InvalidIterationExponent(iteration_exponent));
    }
    if master_secret.len() < MIN_SECRET_BYTES || master_secret.len() % 2 != 0 {
        return Err(ShareError::InvalidSeedLength(master_secret.len()));
    }
    validate_groups(group_threshold, groups)?;

    let id = draw_identifier(rng);
    let encrypted = cipher::encrypt(
        master_secret,
        passphrase,
        iteration_exponent,
        id,
        extendable,
    )?;

    let group_count = groups.len() as u8;
    let group_secrets = Zeroizing::new(shamir::split(
        rng,
        group_threshold,
        group_count,
        &encrypted,
    )?);

    let mut shares = Vec::new();
    for (group_index, group_secret) in group_secrets.iter() {
        let group = groups[usize::from(*group_index)];
        let members = shamir::split(rng, group.member_threshold, group.member_count, group_secret)?;
        for (member_index, value) in members {
            shares.push(Share {
                id,
                extendable,
                iteration_exponent,
                group_index: *group_index,
                group_threshold,
                group_count,
                member_index,
                member_threshold: group.member_threshold,
                value,
            });
        }
    }
    Ok(shares)
}

/// [`generate`] with the operating-system CSPRNG.
///
/// # Errors
///
/// Same failure modes as [`generate`].
pub fn generate_with_os_rng(
    group_threshold: u8,
    groups: &[GroupSpec],
    master_secret: &[u8],
    passphrase: &str,
    iteration_exponent: u8,
    extendable: bool,
) -> Result<Vec<Share>, ShareError> {
    generate(
        &mut OsRng,
        group_threshold,
        groups,
        master_secret,
        passphrase,
        iteration_exponent,
        extendable,
    )
}

/// Recover the master secret from an unordered collection of shares.
///
/// The collection must contain shares from exactly the group threshold
/// of groups, and exactly the member threshold of shares inside each of
/// those groups — no duplicates, no extras.
///
/// # Errors
///
/// - [`ShareError::EmptyShareSet`] — no shares presented
/// - [`ShareError::MixedShareSet`] — shares disagree on identifier,
///   flags, thresholds, or value length
/// - [`ShareError::WrongGroupCount`] / [`ShareError::WrongMemberCount`] /
///   [`ShareError::DuplicateIndex`] — threshold bookkeeping violations
/// - [`ShareError::DigestMismatch`] — interpolation produced a secret
///   whose digest share does not verify (e.g. shares from unrelated
///   splits that happen to share metadata)
/// - [`ShareError::NonAsciiPassphrase`] — invalid passphrase
pub fn combine(shares: &[Share], passphrase: &str) -> Result<Zeroizing<Vec<u8>>, ShareError> {
    cipher::check_passphrase(passphrase)?;
    let first = shares.first().ok_or(ShareError::EmptyShareSet)?;

    for share in &shares[1..] {
        if share.id != first.id {
            return Err(ShareError::MixedShareSet(
                "shares carry different identifiers".into(),
            ));
        }
        if share.extendable != first.extendable {
            return Err(ShareError::MixedShareSet(
                "shares disagree on the extendable flag".into(),
            ));
        }
        if share.iteration_exponent != first.iteration_exponent {
            return Err(ShareError::MixedShareSet(
                "shares carry different iteration exponents".into(),
            ));
        }
        if share.group_threshold != first.group_threshold {
            return Err(ShareError::MixedShareSet(
                "shares carry different group thresholds".into(),
            ));
        }
        if share.group_count != first.group_count {
            return Err(ShareError::MixedShareSet(
                "shares carry different group counts".into(),
            ));
        }
        if share.value.len() != first.value.len() {
            return Err(ShareError::MixedShareSet(
                "share values differ in length".into(),
            ));
        }
    }
    if first.group_threshold > first.group_count {
        return Err(ShareError::InvalidGroupConfig(format!(
            "group threshold {} exceeds group count {}",
            first.group_threshold, first.group_count
        )));
    }

    let mut groups: BTreeMap<u8, Vec<&Share>> = BTreeMap::new();
    for share in shares {
        groups.entry(share.group_index).or_default().push(share);
    }
    if groups.len() != usize::from(first.group_threshold) {
        return Err(ShareError::WrongGroupCount {
            got: groups.len(),
            expected: usize::from(first.group_threshold),
        });
    }

    let mut group_points: Zeroizing<Vec<(u8, Vec<u8>)>> = Zeroizing::new(Vec::new());
    for (group_index, members) in &groups {
        let member_threshold = members[0].member_threshold;
        if members
            .iter()
            .any(|m| m.member_threshold != member_threshold)
        {
            return Err(ShareError::MixedShareSet(format!(
                "group {group_index} mixes member thresholds"
            )));
        }
        for (n, member) in members.iter().enumerate() {
            if members[..n]
                .iter()
                .any(|m| m.member_index == member.member_index)
            {
                return Err(ShareError::DuplicateIndex(member.member_index));
            }
        }
        if members.len() != usize::from(member_threshold) {
            return Err(ShareError::WrongMemberCount {
                got: members.len(),
                expected: usize::from(member_threshold),
            });
        }

        let points: Vec<(u8, Vec<u8>)> = members
            .iter()
            .map(|m| (m.member_index, m.value.clone()))
            .collect();
        let group_secret = shamir::recover(member_threshold, &points)?;
        group_points.push((*group_index, group_secret.to_vec()));
    }

    let encrypted = shamir::recover(first.group_threshold, &group_points)?;
    cipher::decrypt(
        &encrypted,
        passphrase,
        first.iteration_exponent,
        first.id,
        first.extendable,
    )
}

fn validate_groups(group_threshold: u8, groups: &[GroupSpec]) -> Result<(), ShareError> {
    if groups.is_empty() {
        return Err(ShareError::InvalidGroupConfig(
            "at least one group is required".into(),
        ));
    }
    if groups.len() > usize::from(MAX_GROUP_COUNT) {
        return Err(ShareError::InvalidGroupConfig(format!(
            "{} groups exceed the maximum of {MAX_GROUP_COUNT}",
            groups.len()
        )));
    }
    if group_threshold < 1 || usize::from(group_threshold) > groups.len() {
        return Err(ShareError::InvalidGroupConfig(format!(
            "group threshold {group_threshold} must be between 1 and the group count {}",
            groups.len()
        )));
    }
    for (index, group) in groups.iter().enumerate() {
        if group.member_threshold < 1
            || group.member_threshold > group.member_count
            || group.member_count > MAX_GROUP_COUNT
        {
            return Err(ShareError::InvalidGroupConfig(format!(
                "group {index}: member threshold {} and count {} must satisfy \
                 1 <= threshold <= count <= {MAX_GROUP_COUNT}",
                group.member_threshold, group.member_count
            )));
        }
        if group.member_threshold == 1 && group.member_count > 1 {
            return Err(ShareError::InvalidGroupConfig(format!(
                "group {index}: a group with member threshold 1 must have exactly one member",
            )));
        }
    }
    Ok(())
}

/// Draw a fresh 15-bit identifier: four bytes from the source, read
/// big-endian, masked to the low 15 bits.
fn draw_identifier<R: RngCore + CryptoRng>(rng: &mut R) -> u16 {
    let mut bytes = [0u8; 4];
    rng.fill_bytes(&mut bytes);
    (u32::from_be_bytes(bytes) & ID_MASK) as u16
}
