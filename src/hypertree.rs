//! The hypertree: `D` stacked XMSS layers whose leaves are WOTS+ keypairs
//! and whose combined root is the SLH-DSA public key (FIPS-205 algorithms
//! 9-13). A single-layer XMSS tree has no standards-mandated module of its
//! own in this crate -- it is just the base case of the hypertree's
//! recursive node computation, so it lives here rather than in a separate
//! file.

use alloc::vec::Vec;

use subtle::ConstantTimeEq;

use crate::address::Adrs;
use crate::hashes::h;
use crate::params::{ParameterSet, MAX_N};
use crate::session::SigningContext;
use crate::wots::{wots_pk_from_sig, wots_pk_gen_masked, wots_sign};

fn xmss_tree_adrs(layer: u32, idx_tree: u64, tree_height: u32, tree_index: u32) -> Adrs {
    let mut adrs = Adrs::new();
    adrs.set_layer_address(layer);
    adrs.set_tree_address(idx_tree);
    adrs.tree(tree_height, tree_index);
    adrs
}

/// Algorithm 9's recursive node computation, its `z == 0` base case
/// re-grounded in the masked WOTS+ public-key generator. `idx_tree` is the
/// XMSS tree address within `layer`.
pub(crate) fn xmss_node_masked<P: ParameterSet>(
    ctx: &SigningContext<P>,
    pk_seed: &[u8],
    layer: usize,
    idx_tree: u64,
    i: u32,
    z: u32,
) -> [u8; MAX_N] {
    if z == 0 {
        wots_pk_gen_masked::<P>(ctx, pk_seed, layer, i, idx_tree)
    } else {
        let lnode = xmss_node_masked::<P>(ctx, pk_seed, layer, idx_tree, 2 * i, z - 1);
        let rnode = xmss_node_masked::<P>(ctx, pk_seed, layer, idx_tree, 2 * i + 1, z - 1);
        let adrs = xmss_tree_adrs(layer as u32, idx_tree, z, i);
        h::<P>(pk_seed, &adrs, &lnode, &rnode)
    }
}

/// One XMSS layer's signature: a WOTS+ signature over the layer's message
/// plus the sibling authentication path up to the layer's root.
#[derive(Clone)]
pub struct XmssSignature<P: ParameterSet> {
    wots_sig: Vec<[u8; MAX_N]>,
    auth: Vec<[u8; MAX_N]>,
    _p: core::marker::PhantomData<P>,
}

impl<P: ParameterSet> XmssSignature<P> {
    fn encoded_len() -> usize {
        (P::WOTS_LEN + P::H_PRIME) * P::N
    }

    fn try_from_slice(slice: &[u8]) -> Result<Self, ()> {
        if slice.len() != Self::encoded_len() {
            return Err(());
        }
        let mut wots_sig = Vec::with_capacity(P::WOTS_LEN);
        let mut cursor = 0;
        for _ in 0..P::WOTS_LEN {
            let mut chain = [0u8; MAX_N];
            chain[..P::N].copy_from_slice(&slice[cursor..cursor + P::N]);
            cursor += P::N;
            wots_sig.push(chain);
        }
        let mut auth = Vec::with_capacity(P::H_PRIME);
        for _ in 0..P::H_PRIME {
            let mut node = [0u8; MAX_N];
            node[..P::N].copy_from_slice(&slice[cursor..cursor + P::N]);
            cursor += P::N;
            auth.push(node);
        }
        Ok(Self { wots_sig, auth, _p: core::marker::PhantomData })
    }
}

/// Algorithm 10: sign `m` with the WOTS+ keypair `idx_leaf` of hypertree
/// layer `layer`, attaching the authentication path to that layer's root.
fn xmss_sign<P: ParameterSet>(ctx: &SigningContext<P>, pk_seed: &[u8], layer: usize, idx_tree: u64, idx_leaf: u32, m: &[u8]) -> XmssSignature<P> {
    let mut auth = Vec::with_capacity(P::H_PRIME);
    for j in 0..P::H_PRIME as u32 {
        let sibling = (idx_leaf >> j) ^ 1;
        auth.push(xmss_node_masked::<P>(ctx, pk_seed, layer, idx_tree, sibling, j));
    }
    let wots_sig = wots_sign::<P>(ctx, pk_seed, layer, idx_leaf, idx_tree, m);
    XmssSignature { wots_sig, auth, _p: core::marker::PhantomData }
}

/// Algorithm 11: reconstruct a layer's root from an XMSS signature.
fn xmss_pk_from_sig<P: ParameterSet>(pk_seed: &[u8], layer: usize, idx_tree: u64, mut idx_leaf: u32, sig: &XmssSignature<P>, m: &[u8]) -> [u8; MAX_N] {
    let mut node = wots_pk_from_sig::<P>(pk_seed, layer as u32, idx_leaf, idx_tree, &sig.wots_sig, m);
    for (k, sibling) in sig.auth.iter().enumerate() {
        let adrs = xmss_tree_adrs(layer as u32, idx_tree, k as u32 + 1, idx_leaf >> 1);
        node = if idx_leaf & 1 == 0 {
            h::<P>(pk_seed, &adrs, &node, sibling)
        } else {
            h::<P>(pk_seed, &adrs, sibling, &node)
        };
        idx_leaf >>= 1;
    }
    node
}

/// Algorithm 12's output: one XMSS signature per hypertree layer.
#[derive(Clone)]
pub struct HypertreeSignature<P: ParameterSet> {
    layers: Vec<XmssSignature<P>>,
}

impl<P: ParameterSet> HypertreeSignature<P> {
    pub fn encoded_len() -> usize {
        P::D * (P::WOTS_LEN + P::H_PRIME) * P::N
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for layer in &self.layers {
            for chain in &layer.wots_sig {
                out.extend_from_slice(&chain[..P::N]);
            }
            for node in &layer.auth {
                out.extend_from_slice(&node[..P::N]);
            }
        }
        out
    }

    pub(crate) fn try_from_slice(slice: &[u8]) -> Result<Self, ()> {
        if slice.len() != Self::encoded_len() {
            return Err(());
        }
        let layer_len = XmssSignature::<P>::encoded_len();
        let mut layers = Vec::with_capacity(P::D);
        for chunk in slice.chunks(layer_len) {
            layers.push(XmssSignature::<P>::try_from_slice(chunk)?);
        }
        Ok(Self { layers })
    }
}

/// Algorithm 12: sign `m` (the hypertree's root-level message, usually a
/// FORS public key) across all `D` layers, walking from the leaf tree
/// `(idx_tree, idx_leaf)` up to the hypertree root.
pub fn ht_sign<P: ParameterSet>(ctx: &SigningContext<P>, pk_seed: &[u8], mut idx_tree: u64, mut idx_leaf: u32, m: &[u8]) -> HypertreeSignature<P> {
    let mut layers = Vec::with_capacity(P::D);

    let mut layer_sig = xmss_sign::<P>(ctx, pk_seed, 0, idx_tree, idx_leaf, m);
    let mut root = xmss_pk_from_sig::<P>(pk_seed, 0, idx_tree, idx_leaf, &layer_sig, m);
    layers.push(layer_sig);

    for layer in 1..P::D {
        idx_leaf = (idx_tree & ((1u64 << P::H_PRIME) - 1)) as u32;
        idx_tree >>= P::H_PRIME;

        layer_sig = xmss_sign::<P>(ctx, pk_seed, layer, idx_tree, idx_leaf, &root);
        if layer != P::D - 1 {
            root = xmss_pk_from_sig::<P>(pk_seed, layer, idx_tree, idx_leaf, &layer_sig, &root);
        }
        layers.push(layer_sig);
    }

    HypertreeSignature { layers }
}

/// Algorithm 13: reconstruct the hypertree root from a signature and verify
/// it against the known public root.
pub fn ht_verify<P: ParameterSet>(pk_seed: &[u8], sig: &HypertreeSignature<P>, mut idx_tree: u64, mut idx_leaf: u32, m: &[u8], pk_root: &[u8]) -> bool {
    let mut root = xmss_pk_from_sig::<P>(pk_seed, 0, idx_tree, idx_leaf, &sig.layers[0], m);

    for layer in 1..P::D {
        idx_leaf = (idx_tree & ((1u64 << P::H_PRIME) - 1)) as u32;
        idx_tree >>= P::H_PRIME;
        root = xmss_pk_from_sig::<P>(pk_seed, layer, idx_tree, idx_leaf, &sig.layers[layer], &root);
    }

    bool::from(root[..P::N].ct_eq(&pk_root[..P::N]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParameterSet, Shake128f};
    use rand::rngs::mock::StepRng;

    fn ht_pk_root(ctx: &SigningContext<Shake128f>, pk_seed: &[u8]) -> [u8; MAX_N] {
        xmss_node_masked::<Shake128f>(ctx, pk_seed, Shake128f::D - 1, 0, 0, Shake128f::H_PRIME as u32)
    }

    #[test]
    fn sign_then_verify_recovers_same_root() {
        let pk_seed = [2u8; 16];
        let sk_seed = [1u8; 16];
        let mut rng = StepRng::new(11, 17);
        let mut ctx = SigningContext::<Shake128f>::new(&mut rng, &pk_seed, &sk_seed);

        let idx_tree = (1u64 << (Shake128f::H - Shake128f::H_PRIME)) - 7;
        let idx_leaf = 3u32;
        ctx.prepare_path(idx_tree, idx_leaf);
        let pk_root = ht_pk_root(&ctx, &pk_seed);

        let m = [5u8; MAX_N];

        let sig = ht_sign::<Shake128f>(&ctx, &pk_seed, idx_tree, idx_leaf, &m);
        assert!(ht_verify::<Shake128f>(&pk_seed, &sig, idx_tree, idx_leaf, &m, &pk_root));
    }

    #[test]
    fn tampered_message_fails_verification() {
        let pk_seed = [2u8; 16];
        let sk_seed = [1u8; 16];
        let mut rng = StepRng::new(11, 17);
        let mut ctx = SigningContext::<Shake128f>::new(&mut rng, &pk_seed, &sk_seed);

        let idx_tree = (1u64 << (Shake128f::H - Shake128f::H_PRIME)) - 7;
        let idx_leaf = 3u32;
        ctx.prepare_path(idx_tree, idx_leaf);
        let pk_root = ht_pk_root(&ctx, &pk_seed);

        let mut m = [5u8; MAX_N];

        let sig = ht_sign::<Shake128f>(&ctx, &pk_seed, idx_tree, idx_leaf, &m);
        m[0] ^= 0xff;
        assert!(!ht_verify::<Shake128f>(&pk_seed, &sig, idx_tree, idx_leaf, &m, &pk_root));
    }
}
