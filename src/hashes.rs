//! The unmasked SHAKE-256 hash suite (FIPS-205 §11.1's `Shake` construction).
//!
//! Everything here runs over fully-reconstructed values: message hashing,
//! and the verifier's side of WOTS+/FORS/the hypertree, none of which ever
//! touch signing-key secret material. The signer's equivalent operations
//! over masked secrets live in [`crate::masked`] instead.

use digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;

use crate::address::Adrs;
use crate::params::{ParameterSet, MAX_N};

/// `PRF_msg`: the randomizer used for randomized-hashing the message.
pub fn prf_msg<P: ParameterSet>(sk_prf: &[u8], opt_rand: &[u8], msg: &[u8]) -> [u8; MAX_N] {
    let mut hasher = Shake256::default();
    hasher.update(&sk_prf[..P::N]);
    hasher.update(&opt_rand[..P::N]);
    hasher.update(msg);
    let mut out = [0u8; MAX_N];
    hasher.finalize_xof_into(&mut out[..P::N]);
    out
}

/// `H_msg`: hashes the randomized message to the digest that is later split
/// into the FORS message and the hypertree leaf/tree indices.
pub fn h_msg<P: ParameterSet>(rand: &[u8], pk_seed: &[u8], pk_root: &[u8], msg: &[u8]) -> [u8; 64] {
    let mut hasher = Shake256::default();
    hasher.update(&rand[..P::N]);
    hasher.update(&pk_seed[..P::N]);
    hasher.update(&pk_root[..P::N]);
    hasher.update(msg);
    let mut out = [0u8; 64];
    hasher.finalize_xof_into(&mut out[..P::M]);
    out
}

/// `T_l`: hashes an `l*n`-byte message (`l` chain tips or FORS roots) down to
/// `n` bytes.
pub fn t<P: ParameterSet>(pk_seed: &[u8], adrs: &Adrs, parts: &[&[u8]]) -> [u8; MAX_N] {
    let mut hasher = Shake256::default();
    hasher.update(&pk_seed[..P::N]);
    hasher.update(adrs.as_ref());
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; MAX_N];
    hasher.finalize_xof_into(&mut out[..P::N]);
    out
}

/// `H`: the two-child specialization of `T_l` used for Merkle-tree nodes.
pub fn h<P: ParameterSet>(pk_seed: &[u8], adrs: &Adrs, m1: &[u8], m2: &[u8]) -> [u8; MAX_N] {
    t::<P>(pk_seed, adrs, &[&m1[..P::N], &m2[..P::N]])
}

/// `F`: the WOTS+ chain step, unmasked (verifier-side only; the signer uses
/// [`crate::masked::chain::ChainState`] instead).
pub fn f<P: ParameterSet>(pk_seed: &[u8], adrs: &Adrs, m: &[u8]) -> [u8; MAX_N] {
    t::<P>(pk_seed, adrs, &[&m[..P::N]])
}

/// A reusable XOF reader over `pk_seed ‖ ADRS ‖ ..`, for callers that need
/// more than `N` bytes of output (FORS's randomized secret-key expansion).
pub fn xof_reader(pk_seed: &[u8], adrs: &Adrs) -> impl XofReader {
    Shake256::default()
        .chain(pk_seed)
        .chain(adrs.as_ref())
        .finalize_xof()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Shake128f;
    use hex_literal::hex;

    /// Cross-check against the teacher crate's own SHAKE128f KAT for `prf_msg`.
    #[test]
    fn prf_msg_matches_known_answer() {
        let sk_prf = [0u8; 16];
        let opt_rand = [1u8; 16];
        let msg = [2u8; 32];

        let out = prf_msg::<Shake128f>(&sk_prf, &opt_rand, &msg);
        assert_eq!(&out[..16], hex!("bc5c062307df0a41aeeae19ad655f7b2"));
    }
}
