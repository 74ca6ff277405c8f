//! `quorum-core` — SLIP-39 Shamir mnemonic primitives for QUORUM.
//!
//! This crate is the audit target: zero I/O, zero async, zero UI
//! dependencies. It splits a master secret into a two-level hierarchy of
//! word-encoded shares and recovers it from a threshold-satisfying
//! subset, with optional passphrase encryption.
//!
//! ```
//! use quorum_core::{combine, generate, GroupSpec, Share, Wordlist};
//! use rand::rngs::OsRng;
//!
//! let seed = b"ABCDEFGHIJKLMNOP";
//! let shares = generate(
//!     &mut OsRng,
//!     1,
//!     &[GroupSpec::new(2, 3)],
//!     seed,
//!     "passphrase",
//!     1,
//!     true,
//! )?;
//!
//! let sentence = shares[0].to_mnemonic(Wordlist::standard());
//! let restored = Share::from_mnemonic(&sentence, Wordlist::standard())?;
//! assert_eq!(restored, shares[0]);
//!
//! let recovered = combine(&shares[..2], "passphrase")?;
//! assert_eq!(&recovered[..], seed);
//! # Ok::<(), quorum_core::ShareError>(())
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod bits;
pub mod error;

mod cipher;
mod gf256;
mod rs1024;
mod shamir;

pub mod scheme;
pub mod share;
pub mod wordlist;

pub use error::ShareError;
pub use scheme::{
    combine, generate, generate_with_os_rng, GroupSpec, MAX_GROUP_COUNT, MIN_SECRET_BYTES,
};
pub use share::{Share, MIN_MNEMONIC_WORDS};
pub use wordlist::{Wordlist, WORDLIST_SIZE};
