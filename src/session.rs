//! Component H: the per-signing-call session key schedule.
//!
//! A `SigningKey`'s `sk_seed` is fixed at key-generation time and never
//! changes -- but every signing call re-masks it with freshly drawn random
//! shares before touching it, and re-derives the per-layer Merkle root keys
//! and FORS seed from that freshly-masked value. The *logical* secret is
//! stable (so the same hypertree keypair always signs the same way and
//! verifies against the same public key); only the side-channel-relevant
//! masking randomness changes between calls.

use rand_core::RngCore;
use zeroize::Zeroize;

use crate::address::Adrs;
use crate::masked::chain::SharedSecret;
use crate::masked::prf::{eval_single, prf_hash, PrfIter};
use crate::params::{ParameterSet, MAX_D, MAX_N};

/// PRF-tree tags distinguishing the handful of root derivations that share
/// the `pk_seed ‖ ADRS ‖ sk_seed` hashing pattern but must never collide.
const TAG_MERKLE_ROOT: u32 = 0;
const TAG_WOTS_LEAF: u32 = 0;
const TAG_FORS_KEYPAIR: u32 = 0;
const TAG_FORS_LEAF: u32 = 1;

/// ADRS for the single-hash re-key step that ties a hypertree layer's
/// Merkle root key to the specific XMSS tree (`tree_addr`) being signed.
fn merkle_root_adrs(layer: u32, tree_addr: u64) -> Adrs {
    let mut adrs = Adrs::new();
    adrs.prf_tree(TAG_MERKLE_ROOT, layer);
    adrs.set_tree_address(tree_addr);
    adrs
}

fn fors_keypair_adrs(idx_tree: u64, idx_leaf: u32) -> Adrs {
    let mut adrs = Adrs::new();
    adrs.prf_tree(TAG_FORS_KEYPAIR, 0);
    adrs.set_tree_address(idx_tree);
    adrs.fors_tree(idx_leaf, 0, 0);
    adrs
}

/// Each hypertree layer's WOTS PRF tree reserves one extra external leaf per
/// Merkle leaf, past the `WOTS_LEN` leaves used for WOTS secret shares, to
/// derive the next layer down's (tree-specific) Merkle root key -- or, at
/// layer 0, the FORS seed.
fn wots_tree_n_ext<P: ParameterSet>() -> u64 {
    (P::WOTS_LEN as u64 + 1) << P::H_PRIME
}

/// Re-masked per-session secret material: one Merkle-root key per hypertree
/// layer, plus the single FORS seed shared across every FORS invocation.
pub struct SigningContext<P: ParameterSet> {
    pk_seed: [u8; MAX_N],
    merkle_key: [SharedSecret; MAX_D],
    fors_seed: SharedSecret,
    _p: core::marker::PhantomData<P>,
}

impl<P: ParameterSet> SigningContext<P> {
    /// `session_init`: draw fresh masking shares for `sk_seed` and derive the
    /// top hypertree layer's Merkle root key from them. The top layer always
    /// has exactly one XMSS tree (tree address 0), so this step needs no
    /// hypertree path and can run once per signing call, ahead of knowing
    /// which leaf the call will actually sign.
    pub fn new(rng: &mut impl RngCore, pk_seed: &[u8], sk_seed: &[u8]) -> Self {
        let mut r1 = [0u8; MAX_N];
        let mut r2 = [0u8; MAX_N];
        rng.fill_bytes(&mut r1[..P::N]);
        rng.fill_bytes(&mut r2[..P::N]);
        let mut share0 = [0u8; MAX_N];
        for i in 0..P::N {
            share0[i] = sk_seed[i] ^ r1[i] ^ r2[i];
        }
        let sk_shared: SharedSecret = [share0, r1, r2];

        let mut pk_seed_buf = [0u8; MAX_N];
        pk_seed_buf[..P::N].copy_from_slice(&pk_seed[..P::N]);

        let mut merkle_key = [[[0u8; MAX_N]; 3]; MAX_D];
        merkle_key[P::D - 1] = prf_hash::<P>(pk_seed, &merkle_root_adrs((P::D - 1) as u32, 0), &sk_shared);

        Self {
            pk_seed: pk_seed_buf,
            merkle_key,
            fors_seed: [[0u8; MAX_N]; 3],
            _p: core::marker::PhantomData,
        }
    }

    /// `session_prepare_path` (component H): given the hypertree leaf this
    /// call will sign, descend from the top layer's Merkle root key down to
    /// layer 0, re-keying each layer's root to the specific XMSS tree on the
    /// path (`tree_addr = tree >> level * H'`) and drawing the next layer's
    /// root key -- or, at level 0, the FORS seed -- from the reserved
    /// "child seed" slot of that layer's WOTS PRF tree.
    pub fn prepare_path(&mut self, idx_tree: u64, idx_leaf: u32) {
        let n_ext = wots_tree_n_ext::<P>();
        let mut parent = self.merkle_key[P::D - 1];

        for level in (0..P::D).rev() {
            let keyed = if level == P::D - 1 {
                parent
            } else {
                let tree_addr = idx_tree >> (level as u64 * P::H_PRIME as u64);
                let keyed = prf_hash::<P>(&self.pk_seed, &merkle_root_adrs(level as u32, tree_addr), &parent);
                self.merkle_key[level] = keyed;
                keyed
            };

            let child_leaf = if level == 0 {
                idx_leaf
            } else {
                ((idx_tree >> ((level as u64 - 1) * P::H_PRIME as u64)) & ((1u64 << P::H_PRIME) - 1)) as u32
            };
            let child_index = ((P::WOTS_LEN as u64) << P::H_PRIME) + child_leaf as u64;
            let child = eval_single::<P>(&self.pk_seed, TAG_WOTS_LEAF, &keyed, n_ext, child_index);

            if level == 0 {
                self.fors_seed = child;
            } else {
                parent = child;
            }
        }
    }

    /// The masked secret for WOTS+ chain `chain` of keypair `keypair` in
    /// hypertree layer `layer` (a single external leaf of that layer's PRF
    /// tree).
    pub fn wots_chain_secret(&self, layer: usize, keypair: u32, chain: u32) -> SharedSecret {
        let external = keypair as u64 * P::WOTS_LEN as u64 + chain as u64;
        eval_single::<P>(&self.pk_seed, TAG_WOTS_LEAF, &self.merkle_key[layer], wots_tree_n_ext::<P>(), external)
    }

    /// The masked secrets for every chain of WOTS+ keypair `keypair` in
    /// hypertree layer `layer`, in chain order -- the contiguous external
    /// range `[keypair*WOTS_LEN, (keypair+1)*WOTS_LEN)` of that layer's PRF
    /// tree, walked through the component-F iterator rather than one
    /// `eval_single` call per chain.
    pub fn wots_chain_secrets(&self, layer: usize, keypair: u32) -> PrfIter<'_, P> {
        let start = keypair as u64 * P::WOTS_LEN as u64;
        let stop = start + P::WOTS_LEN as u64 - 1;
        PrfIter::new(&self.pk_seed[..P::N], TAG_WOTS_LEAF, wots_tree_n_ext::<P>(), start, stop, self.merkle_key[layer])
    }

    /// The masked secret for FORS secret-key leaf `i` within the FORS
    /// instance keyed to hypertree position `(idx_tree, idx_leaf)`.
    pub fn fors_leaf_secret(&self, idx_tree: u64, idx_leaf: u32, i: u64) -> SharedSecret {
        let keypair_root = prf_hash::<P>(&self.pk_seed, &fors_keypair_adrs(idx_tree, idx_leaf), &self.fors_seed);
        let n_ext = P::K as u64 * (1u64 << P::A);
        eval_single::<P>(&self.pk_seed, TAG_FORS_LEAF, &keypair_root, n_ext, i)
    }
}

impl<P: ParameterSet> Drop for SigningContext<P> {
    fn drop(&mut self) {
        for key in self.merkle_key.iter_mut() {
            for share in key.iter_mut() {
                share.zeroize();
            }
        }
        for share in self.fors_seed.iter_mut() {
            share.zeroize();
        }
    }
}
