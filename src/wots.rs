//! WOTS+ one-time signatures (FIPS-205 algorithms 5-7).
//!
//! Verification (`wots_pk_from_sig`, and the chain-stepping it shares with
//! key generation) runs over plain bytes via [`crate::hashes`]. Signing runs
//! the per-chain secret draw and every non-final chain step through the
//! masked core in [`crate::masked`]; only the last step of each chain is
//! unblinded, since that value is the one the signature actually reveals.

use alloc::vec::Vec;

use crate::address::Adrs;
use crate::hashes::{f, t};
use crate::masked::chain::{reveal, ChainState};
use crate::params::{ParameterSet, LOG_W, MAX_WOTS_LEN, W, WOTS_LEN2};
use crate::session::SigningContext;
use crate::util::base_2b;

fn checksum_digits(msg_digits: &[u16]) -> [u16; WOTS_LEN2] {
    let csum: u16 = (msg_digits.iter().map(|&d| (W as u16 - 1) - d).sum::<u16>()) << 4;
    let csum_bytes = csum.to_be_bytes();
    let mut out = [0u16; WOTS_LEN2];
    base_2b(&mut out, &csum_bytes, LOG_W as u32);
    out
}

/// All `P::WOTS_LEN` message digits (base-`w`) plus the checksum digits, in
/// the order WOTS+ hashes them.
fn message_and_checksum_digits<P: ParameterSet>(m: &[u8]) -> [u16; MAX_WOTS_LEN] {
    let mut digits = [0u16; MAX_WOTS_LEN];
    let msg_len = P::WOTS_LEN - WOTS_LEN2;
    base_2b(&mut digits[..msg_len], m, LOG_W as u32);
    let csum = checksum_digits(&digits[..msg_len]);
    digits[msg_len..P::WOTS_LEN].copy_from_slice(&csum);
    digits
}

/// Algorithm 5 (verifier-side) / algorithm 6's tail (signer-side): run `s`
/// chain steps over a plain byte value, starting at ADRS hash-index `i`.
pub fn wots_chain<P: ParameterSet>(pk_seed: &[u8], adrs: &mut Adrs, x: &[u8], i: u32, s: u32) -> [u8; crate::params::MAX_N] {
    let mut tmp = [0u8; crate::params::MAX_N];
    tmp[..P::N].copy_from_slice(&x[..P::N]);
    for j in i..i + s {
        adrs.set_hash_address(j);
        tmp = f::<P>(pk_seed, adrs, &tmp);
    }
    tmp
}

/// Algorithm 5: the verifier's / keygen's WOTS+ public key, generated from
/// `sk_seed` (used only by tests and by masked key generation's unmasked
/// cross-check; actual signing derives secrets through [`SigningContext`]).
fn wots_pk_from_chains<P: ParameterSet>(
    pk_seed: &[u8],
    adrs: &Adrs,
    keypair: u32,
    chain_tip: impl Fn(u32) -> [u8; crate::params::MAX_N],
) -> [u8; crate::params::MAX_N] {
    let mut pk_adrs = *adrs;
    pk_adrs.wots_pk(keypair);
    let mut tips = [[0u8; crate::params::MAX_N]; MAX_WOTS_LEN];
    for chain in 0..P::WOTS_LEN as u32 {
        tips[chain as usize] = chain_tip(chain);
    }
    let refs: [&[u8]; MAX_WOTS_LEN] = core::array::from_fn(|i| &tips[i][..P::N]);
    t::<P>(pk_seed, &pk_adrs, &refs[..P::WOTS_LEN])
}

/// Run a WOTS+ keypair's chains from each chain's masked secret draw up to
/// the top of the chain (`W - 1` steps), revealing only the final, public
/// chain-tip value. Used to build the WOTS+ public key for a keypair whose
/// secret material is available through `ctx`.
pub fn wots_pk_gen_masked<P: ParameterSet>(
    ctx: &SigningContext<P>,
    pk_seed: &[u8],
    layer: usize,
    keypair: u32,
    idx_tree: u64,
) -> [u8; crate::params::MAX_N] {
    let mut adrs = Adrs::new();
    adrs.set_layer_address(layer as u32);
    adrs.set_tree_address(idx_tree);
    adrs.wots_hash(keypair);

    let mut secrets = [[[0u8; crate::params::MAX_N]; 3]; MAX_WOTS_LEN];
    for (chain, secret) in ctx.wots_chain_secrets(layer, keypair).map(|(_, s)| s).enumerate() {
        secrets[chain] = secret;
    }

    wots_pk_from_chains::<P>(pk_seed, &adrs, keypair, |chain| {
        let secret = secrets[chain as usize];
        let mut chain_adrs = adrs;
        chain_adrs.set_chain_address(chain);
        chain_adrs.set_hash_address(0);
        let mut cs = ChainState::<P>::new(pk_seed, &chain_adrs, &secret);
        for step in 0..W - 1 {
            let last = step + 1 == W - 1;
            cs.f_transform(!last);
            if !last {
                cs.increment_hash_addr(&mut chain_adrs);
            }
        }
        cs.untransform_f()
    })
}

/// Algorithm 6: sign `m` (`P::N` bytes) with the WOTS+ keypair at
/// `(layer, keypair)`, revealing one chain-tip value per digit of `m`'s
/// base-`w` representation (plus its checksum).
pub fn wots_sign<P: ParameterSet>(
    ctx: &SigningContext<P>,
    pk_seed: &[u8],
    layer: usize,
    keypair: u32,
    idx_tree: u64,
    m: &[u8],
) -> Vec<[u8; crate::params::MAX_N]> {
    let digits = message_and_checksum_digits::<P>(m);

    let mut adrs = Adrs::new();
    adrs.set_layer_address(layer as u32);
    adrs.set_tree_address(idx_tree);
    adrs.wots_hash(keypair);

    let mut secrets = [[[0u8; crate::params::MAX_N]; 3]; MAX_WOTS_LEN];
    for (chain, secret) in ctx.wots_chain_secrets(layer, keypair).map(|(_, s)| s).enumerate() {
        secrets[chain] = secret;
    }

    (0..P::WOTS_LEN)
        .map(|chain| {
            let secret = secrets[chain];
            let mut chain_adrs = adrs;
            chain_adrs.set_chain_address(chain as u32);
            chain_adrs.set_hash_address(0);
            let steps = u32::from(digits[chain]);
            if steps == 0 {
                return reveal::<P>(&secret);
            }
            let mut cs = ChainState::<P>::new(pk_seed, &chain_adrs, &secret);
            for step in 0..steps {
                let last = step + 1 == steps;
                cs.f_transform(!last);
                if !last {
                    cs.increment_hash_addr(&mut chain_adrs);
                }
            }
            cs.untransform_f()
        })
        .collect()
}

/// Algorithm 5 (verifier direction): reconstruct the WOTS+ public key from a
/// signature and message.
pub fn wots_pk_from_sig<P: ParameterSet>(
    pk_seed: &[u8],
    layer: u32,
    keypair: u32,
    idx_tree: u64,
    sig: &[[u8; crate::params::MAX_N]],
    m: &[u8],
) -> [u8; crate::params::MAX_N] {
    let digits = message_and_checksum_digits::<P>(m);

    let mut adrs = Adrs::new();
    adrs.set_layer_address(layer);
    adrs.set_tree_address(idx_tree);
    adrs.wots_hash(keypair);

    wots_pk_from_chains::<P>(pk_seed, &adrs, keypair, |chain| {
        let mut chain_adrs = adrs;
        chain_adrs.set_chain_address(chain);
        let start = u32::from(digits[chain as usize]);
        wots_chain::<P>(pk_seed, &mut chain_adrs, &sig[chain as usize][..], start, W - 1 - start)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Shake128f, MAX_N};
    use rand::rngs::mock::StepRng;

    #[test]
    fn sign_then_verify_recovers_same_public_key() {
        let pk_seed = [2u8; 16];
        let sk_seed = [1u8; 16];
        let mut rng = StepRng::new(11, 17);
        let mut ctx = SigningContext::<Shake128f>::new(&mut rng, &pk_seed, &sk_seed);
        ctx.prepare_path(2, 1);

        let pk = wots_pk_gen_masked::<Shake128f>(&ctx, &pk_seed, 0, 3, 2);

        let mut m = [0u8; MAX_N];
        m[..16].copy_from_slice(&[7u8; 16]);

        let sig = wots_sign::<Shake128f>(&ctx, &pk_seed, 0, 3, 2, &m);
        let pk_recovered = wots_pk_from_sig::<Shake128f>(&pk_seed, 0, 3, 2, &sig, &m);

        assert_eq!(pk, pk_recovered);
    }

    #[test]
    fn tampered_message_yields_different_public_key() {
        let pk_seed = [2u8; 16];
        let sk_seed = [1u8; 16];
        let mut rng = StepRng::new(11, 17);
        let mut ctx = SigningContext::<Shake128f>::new(&mut rng, &pk_seed, &sk_seed);
        ctx.prepare_path(2, 1);

        let mut m = [0u8; MAX_N];
        m[..16].copy_from_slice(&[7u8; 16]);
        let sig = wots_sign::<Shake128f>(&ctx, &pk_seed, 0, 3, 2, &m);

        let pk = wots_pk_gen_masked::<Shake128f>(&ctx, &pk_seed, 0, 3, 2);
        m[0] ^= 0xff;
        let pk_tampered = wots_pk_from_sig::<Shake128f>(&pk_seed, 0, 3, 2, &sig, &m);

        assert_ne!(pk, pk_tampered);
    }

    /// A single chain run through the masked, multi-step path must land on
    /// the same tip as the unmasked `wots_chain` run over the same secret.
    #[test]
    fn single_chain_masked_matches_plain() {
        let pk_seed = [2u8; 16];
        let sk_seed = [1u8; 16];
        let mut rng = StepRng::new(11, 17);
        let mut ctx = SigningContext::<Shake128f>::new(&mut rng, &pk_seed, &sk_seed);
        ctx.prepare_path(2, 1);

        let (layer, keypair, chain) = (0usize, 3u32, 5u32);
        let secret = ctx.wots_chain_secret(layer, keypair, chain);
        let plain_secret = reveal::<Shake128f>(&secret);

        let mut adrs = Adrs::new();
        adrs.set_layer_address(layer as u32);
        adrs.wots_hash(keypair);
        adrs.set_chain_address(chain);
        adrs.set_hash_address(0);
        let plain_tip = wots_chain::<Shake128f>(&pk_seed, &mut adrs, &plain_secret, 0, 15);

        let mut chain_adrs = adrs;
        chain_adrs.set_hash_address(0);
        let mut cs = ChainState::<Shake128f>::new(&pk_seed, &chain_adrs, &secret);
        for step in 0..15u32 {
            let last = step + 1 == 15;
            cs.f_transform(!last);
            if !last {
                cs.increment_hash_addr(&mut chain_adrs);
            }
        }

        assert_eq!(&plain_tip[..16], &cs.untransform_f()[..16]);
    }
}
