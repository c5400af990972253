#![cfg_attr(not(feature = "alloc"), no_std)]
//! SLH-DSA (FIPS-205) over SHAKE-256, signed through a first-order masked
//! Keccak-f[1600] core.
//!
//! Key generation and signing route `sk_seed` through a fresh 3-share XOR
//! mask on every call ([`session::SigningContext`]); verification is plain,
//! unmasked SLH-DSA-SHAKE.
//!
//! ```
//! # #[cfg(feature = "alloc")] {
//! use slh_dsa_masked::params::Shake128f;
//! use slh_dsa_masked::signing_key::SigningKey;
//! use signature::{RandomizedSigner, Verifier};
//!
//! let mut rng = rand::thread_rng();
//! let sk = SigningKey::<Shake128f>::new(&mut rng);
//! let vk = sk.verifying_key();
//!
//! let message = b"Hello world";
//! let sig = sk.sign_with_rng(&mut rng, message);
//! assert!(vk.verify(message, &sig).is_ok());
//! # }
//! ```

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod address;
pub mod fors;
pub mod hashes;
pub mod hypertree;
pub mod masked;
pub mod params;
mod session;
#[cfg(feature = "alloc")]
pub mod signature_encoding;
#[cfg(feature = "alloc")]
pub mod signing_key;
pub mod util;
#[cfg(feature = "alloc")]
pub mod verifying_key;
pub mod wots;
