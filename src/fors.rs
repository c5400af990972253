//! FORS: the forest of random subsets used as the hypertree's bottom-layer
//! few-time signature (FIPS-205 algorithms 14-16).
//!
//! A FORS leaf secret is drawn through the masked PRF tree
//! ([`crate::session::SigningContext::fors_leaf_secret`]) and, when that
//! leaf needs to become a public Merkle node, run through exactly one
//! masked `F` call revealed immediately -- the leaf node is public data the
//! instant it is computed, so there is nothing left to protect past that
//! point. The signed secret itself (algorithm 15's `sig.sk`) is disclosed
//! raw, as FIPS-205 requires; everything above the leaf layer (`fors_node`'s
//! recursive `H` combination) runs over already-public values.

use alloc::vec::Vec;
use core::marker::PhantomData;

use crate::address::Adrs;
use crate::hashes::h;
use crate::masked::chain::{reveal, ChainState};
use crate::params::{ParameterSet, MAX_K, MAX_N};
use crate::session::SigningContext;
use crate::util::base_2b;

fn fors_base_adrs(idx_tree: u64, idx_leaf: u32) -> Adrs {
    let mut adrs = Adrs::new();
    adrs.set_tree_address(idx_tree);
    adrs.fors_tree(idx_leaf, 0, 0);
    adrs
}

/// The raw (unhashed) FORS secret key revealed by a signature -- FIPS-205
/// discloses this value directly, so there is no masked-chain step here.
fn fors_sk_gen_masked<P: ParameterSet>(ctx: &SigningContext<P>, idx_tree: u64, idx_leaf: u32, i: u64) -> [u8; MAX_N] {
    reveal::<P>(&ctx.fors_leaf_secret(idx_tree, idx_leaf, i))
}

/// `F` applied to a masked FORS leaf secret, revealed immediately: the
/// result is a public Merkle leaf node regardless of whether its secret
/// ends up disclosed by the signature.
fn fors_leaf_node_masked<P: ParameterSet>(
    ctx: &SigningContext<P>,
    pk_seed: &[u8],
    idx_tree: u64,
    idx_leaf: u32,
    i: u64,
) -> [u8; MAX_N] {
    let secret = ctx.fors_leaf_secret(idx_tree, idx_leaf, i);
    let mut adrs = fors_base_adrs(idx_tree, idx_leaf);
    adrs.fors_tree(idx_leaf, 0, i as u32);
    let mut cs = ChainState::<P>::new(pk_seed, &adrs, &secret);
    cs.f_transform(false);
    cs.untransform_f()
}

/// Algorithm 14's recursive Merkle combination, its `z == 0` base case
/// re-grounded in the masked leaf draw above.
fn fors_node<P: ParameterSet>(
    ctx: &SigningContext<P>,
    pk_seed: &[u8],
    idx_tree: u64,
    idx_leaf: u32,
    i: u32,
    z: u32,
) -> [u8; MAX_N] {
    debug_assert!(z <= P::A as u32);
    debug_assert!((i as u64) < (P::K as u64) << (P::A as u32 - z));

    if z == 0 {
        fors_leaf_node_masked::<P>(ctx, pk_seed, idx_tree, idx_leaf, i as u64)
    } else {
        let lnode = fors_node::<P>(ctx, pk_seed, idx_tree, idx_leaf, 2 * i, z - 1);
        let rnode = fors_node::<P>(ctx, pk_seed, idx_tree, idx_leaf, 2 * i + 1, z - 1);
        let mut adrs = fors_base_adrs(idx_tree, idx_leaf);
        adrs.fors_tree(idx_leaf, z, i);
        h::<P>(pk_seed, &adrs, &lnode, &rnode)
    }
}

/// A FORS signature: one revealed secret and one authentication path per
/// tree, `K` trees in total.
#[derive(Clone)]
pub struct ForsSignature<P: ParameterSet> {
    sk: Vec<[u8; MAX_N]>,
    auth: Vec<[[u8; MAX_N]; MAX_A_BOUND]>,
    _p: PhantomData<P>,
}

const MAX_A_BOUND: usize = 35;

impl<P: ParameterSet> ForsSignature<P> {
    /// Encoded length in bytes: `K * (A + 1) * N`.
    pub fn encoded_len() -> usize {
        P::K * (P::A + 1) * P::N
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::encoded_len());
        for tree in 0..P::K {
            out.extend_from_slice(&self.sk[tree][..P::N]);
            for level in 0..P::A {
                out.extend_from_slice(&self.auth[tree][level][..P::N]);
            }
        }
        out
    }

    pub(crate) fn try_from_slice(slice: &[u8]) -> Result<Self, ()> {
        if slice.len() != Self::encoded_len() {
            return Err(());
        }
        let mut sk = Vec::with_capacity(P::K);
        let mut auth = Vec::with_capacity(P::K);
        let mut cursor = 0;
        for _ in 0..P::K {
            let mut sk_val = [0u8; MAX_N];
            sk_val[..P::N].copy_from_slice(&slice[cursor..cursor + P::N]);
            cursor += P::N;
            sk.push(sk_val);

            let mut auth_val = [[0u8; MAX_N]; MAX_A_BOUND];
            for level in 0..P::A {
                auth_val[level][..P::N].copy_from_slice(&slice[cursor..cursor + P::N]);
                cursor += P::N;
            }
            auth.push(auth_val);
        }
        Ok(Self { sk, auth, _p: PhantomData })
    }
}

/// Algorithm 15: sign the FORS message digest `md` (`P::MD_LEN` bytes) with
/// the keypair at hypertree position `(idx_tree, idx_leaf)`.
pub fn fors_sign<P: ParameterSet>(
    ctx: &SigningContext<P>,
    pk_seed: &[u8],
    idx_tree: u64,
    idx_leaf: u32,
    md: &[u8],
) -> ForsSignature<P> {
    let mut indices = [0u16; MAX_K];
    base_2b(&mut indices[..P::K], md, P::A as u32);

    let mut sk = Vec::with_capacity(P::K);
    let mut auth = Vec::with_capacity(P::K);

    for i in 0..P::K as u32 {
        let leaf = (i << P::A) + u32::from(indices[i as usize]);
        sk.push(fors_sk_gen_masked::<P>(ctx, idx_tree, idx_leaf, leaf as u64));

        let mut auth_path = [[0u8; MAX_N]; MAX_A_BOUND];
        for j in 0..P::A as u32 {
            let s = (u32::from(indices[i as usize]) >> j) ^ 1;
            let sibling = (i << (P::A as u32 - j)) + s;
            auth_path[j as usize] = fors_node::<P>(ctx, pk_seed, idx_tree, idx_leaf, sibling, j);
        }
        auth.push(auth_path);
    }

    ForsSignature { sk, auth, _p: PhantomData }
}

/// Algorithm 16: reconstruct the FORS public key from a signature and
/// message digest.
pub fn fors_pk_from_sig<P: ParameterSet>(
    pk_seed: &[u8],
    idx_tree: u64,
    idx_leaf: u32,
    sig: &ForsSignature<P>,
    md: &[u8],
) -> [u8; MAX_N] {
    let mut indices = [0u16; MAX_K];
    base_2b(&mut indices[..P::K], md, P::A as u32);

    let mut roots = Vec::with_capacity(P::K);
    for i in 0..P::K as u32 {
        let mut adrs = fors_base_adrs(idx_tree, idx_leaf);
        let mut tree_index = (i << P::A) + u32::from(indices[i as usize]);
        adrs.fors_tree(idx_leaf, 0, tree_index);
        let mut node = crate::hashes::f::<P>(pk_seed, &adrs, &sig.sk[i as usize]);

        for j in 0..P::A as u32 {
            tree_index >>= 1;
            adrs.fors_tree(idx_leaf, j + 1, tree_index);
            node = if (u32::from(indices[i as usize]) >> j) & 1 == 0 {
                h::<P>(pk_seed, &adrs, &node, &sig.auth[i as usize][j as usize])
            } else {
                h::<P>(pk_seed, &adrs, &sig.auth[i as usize][j as usize], &node)
            };
        }
        roots.push(node);
    }

    let mut pk_adrs = fors_base_adrs(idx_tree, idx_leaf);
    pk_adrs.fors_roots(idx_leaf);
    let refs: Vec<&[u8]> = roots.iter().map(|r| &r[..P::N]).collect();
    crate::hashes::t::<P>(pk_seed, &pk_adrs, &refs)
}

/// The FORS public key for a keypair whose secret material is available
/// through `ctx` -- used by hypertree leaf key generation.
pub fn fors_pk_gen_masked<P: ParameterSet>(ctx: &SigningContext<P>, pk_seed: &[u8], idx_tree: u64, idx_leaf: u32) -> [u8; MAX_N] {
    let mut roots = Vec::with_capacity(P::K);
    for i in 0..P::K as u32 {
        roots.push(fors_node::<P>(ctx, pk_seed, idx_tree, idx_leaf, i, P::A as u32));
    }
    let mut pk_adrs = fors_base_adrs(idx_tree, idx_leaf);
    pk_adrs.fors_roots(idx_leaf);
    let refs: Vec<&[u8]> = roots.iter().map(|r| &r[..P::N]).collect();
    crate::hashes::t::<P>(pk_seed, &pk_adrs, &refs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Shake128f;
    use rand::rngs::mock::StepRng;

    #[test]
    fn sign_then_verify_recovers_same_public_key() {
        let pk_seed = [2u8; 16];
        let sk_seed = [1u8; 16];
        let mut rng = StepRng::new(11, 17);
        let mut ctx = SigningContext::<Shake128f>::new(&mut rng, &pk_seed, &sk_seed);

        let (idx_tree, idx_leaf) = (3u64, 5u32);
        ctx.prepare_path(idx_tree, idx_leaf);
        let md = [7u8; 25];

        let pk = fors_pk_gen_masked::<Shake128f>(&ctx, &pk_seed, idx_tree, idx_leaf);
        let sig = fors_sign::<Shake128f>(&ctx, &pk_seed, idx_tree, idx_leaf, &md);
        let pk_recovered = fors_pk_from_sig::<Shake128f>(&pk_seed, idx_tree, idx_leaf, &sig, &md);

        assert_eq!(pk, pk_recovered);
    }

    #[test]
    fn tampered_digest_yields_different_public_key() {
        let pk_seed = [2u8; 16];
        let sk_seed = [1u8; 16];
        let mut rng = StepRng::new(11, 17);
        let mut ctx = SigningContext::<Shake128f>::new(&mut rng, &pk_seed, &sk_seed);

        let (idx_tree, idx_leaf) = (3u64, 5u32);
        ctx.prepare_path(idx_tree, idx_leaf);
        let mut md = [7u8; 25];
        let sig = fors_sign::<Shake128f>(&ctx, &pk_seed, idx_tree, idx_leaf, &md);

        let pk = fors_pk_gen_masked::<Shake128f>(&ctx, &pk_seed, idx_tree, idx_leaf);
        md[0] ^= 0xff;
        let pk_tampered = fors_pk_from_sig::<Shake128f>(&pk_seed, idx_tree, idx_leaf, &sig, &md);

        assert_ne!(pk, pk_tampered);
    }

    #[test]
    fn encoded_signature_round_trips() {
        let pk_seed = [2u8; 16];
        let sk_seed = [1u8; 16];
        let mut rng = StepRng::new(11, 17);
        let mut ctx = SigningContext::<Shake128f>::new(&mut rng, &pk_seed, &sk_seed);
        ctx.prepare_path(1, 2);

        let md = [9u8; 25];
        let sig = fors_sign::<Shake128f>(&ctx, &pk_seed, 1, 2, &md);
        let bytes = sig.to_vec();
        assert_eq!(bytes.len(), ForsSignature::<Shake128f>::encoded_len());

        let decoded = ForsSignature::<Shake128f>::try_from_slice(&bytes).unwrap();
        assert_eq!(decoded.to_vec(), bytes);
    }
}
