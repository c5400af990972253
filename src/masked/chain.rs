//! Component D: the F chain-state.
//!
//! Builds and mutates the pre-permutation state for one WOTS-chain / FORS-leaf
//! SHAKE-256(PK.seed ‖ ADRS ‖ secret) evaluation (spec §3, §4.D), and is
//! reused in place across successive chain steps to avoid reformatting the
//! whole buffer on every `F` call.

use core::marker::PhantomData;

use zeroize::Zeroize;

use crate::address::Adrs;
use crate::params::{ParameterSet, MAX_N};

use super::io::{bytes_to_lanes, lanes_to_bytes};
use super::permute::permute;

/// A shared (3-way XOR) `n`-byte secret, padded to `MAX_N` so it can be
/// passed around without threading a const generic through every call site.
pub type SharedSecret = [[u8; MAX_N]; 3];

/// Unmask a `SharedSecret` directly, with no `F` call -- used for the
/// zero-step case of a WOTS+ chain, where the revealed value is the raw
/// secret itself.
pub fn reveal<P: ParameterSet>(shared: &SharedSecret) -> [u8; MAX_N] {
    let mut out = [0u8; MAX_N];
    for i in 0..P::N {
        out[i] = shared[0][i] ^ shared[1][i] ^ shared[2][i];
    }
    out
}

pub struct ChainState<P: ParameterSet> {
    pk_seed: [u8; MAX_N],
    adrs: Adrs,
    /// The current (masked) input to the next `F` call -- the chain's
    /// secret at step 0, and the previous step's output thereafter.
    secret: SharedSecret,
    /// Scratch absorb/squeeze buffer, fully rebuilt by every `f_transform`
    /// call since the Keccak permutation overwrites the whole 1600-bit
    /// state, not just the digest lanes.
    state: [[u64; 25]; 3],
    _p: PhantomData<P>,
}

impl<P: ParameterSet> ChainState<P> {
    fn n_lanes() -> usize {
        P::N.div_ceil(8)
    }

    /// `set_up_f_block`: record the chain state described in spec §3.
    /// PK.seed and ADRS are public; the secret input is shared across all
    /// three planes.
    pub fn new(pk_seed: &[u8], adrs: &Adrs, shared_secret: &SharedSecret) -> Self {
        let mut pk_seed_buf = [0u8; MAX_N];
        pk_seed_buf[..P::N].copy_from_slice(&pk_seed[..P::N]);

        Self {
            pk_seed: pk_seed_buf,
            adrs: *adrs,
            secret: *shared_secret,
            state: [[0u64; 25]; 3],
            _p: PhantomData,
        }
    }

    /// Rebuild the absorb state (PK.seed, ADRS, masked secret, padding) from
    /// scratch in `self.state`, ready for `permute`.
    fn build_absorb_state(&mut self) {
        let n_lanes = Self::n_lanes();
        self.state = [[0u64; 25]; 3];

        bytes_to_lanes(&mut self.state[0][..n_lanes], &self.pk_seed[..P::N]);
        bytes_to_lanes(&mut self.state[0][n_lanes..n_lanes + 4], self.adrs.as_ref());
        for (plane, secret) in self.state.iter_mut().zip(self.secret.iter()) {
            bytes_to_lanes(
                &mut plane[n_lanes + 4..n_lanes + 4 + n_lanes],
                &secret[..P::N],
            );
        }

        let pad_lane = n_lanes + 4 + n_lanes;
        self.state[0][pad_lane] ^= 0x1f;
        self.state[0][16] ^= 1u64 << 63;
    }

    /// `increment_hash_addr`: bump the ADRS `hash` subfield ahead of the next
    /// `f_transform` call.
    pub fn increment_hash_addr(&mut self, adrs: &mut Adrs) {
        let next = adrs.hash_address().wrapping_add(1);
        adrs.set_hash_address(next);
        self.adrs = *adrs;
    }

    /// `f_transform`: rebuild the absorb state from PK.seed/ADRS/the current
    /// secret, run component B over it, and store the emitted digest as the
    /// secret for the next chain step (or for `untransform_f`/`shared_digest`
    /// to read off, if this was the chain's last step).
    pub fn f_transform(&mut self, keep_blinded: bool) {
        self.build_absorb_state();
        permute(&mut self.state, keep_blinded);

        let n_lanes = Self::n_lanes();
        let mut out: SharedSecret = [[0u8; MAX_N]; 3];
        lanes_to_bytes(&mut out[0][..P::N], &self.state[0][..n_lanes]);
        if keep_blinded {
            lanes_to_bytes(&mut out[1][..P::N], &self.state[1][..n_lanes]);
            lanes_to_bytes(&mut out[2][..P::N], &self.state[2][..n_lanes]);
        }
        self.secret = out;
    }

    /// Re-seed the chain's secret input from a fresh shared value.
    pub fn set_secret_input(&mut self, shared_secret: &SharedSecret) {
        self.secret = *shared_secret;
    }

    /// `untransform_f`: read the current secret as plain bytes -- valid
    /// once the chain has reached an unblinded `f_transform(false)` step, at
    /// which point plane 0 alone holds the full digest.
    pub fn untransform_f(&self) -> [u8; MAX_N] {
        self.secret[0]
    }

    /// Read the current secret as a still-shared value, without folding the
    /// planes together.
    pub fn shared_digest(&self) -> SharedSecret {
        self.secret
    }
}

impl<P: ParameterSet> Drop for ChainState<P> {
    fn drop(&mut self) {
        self.pk_seed.zeroize();
        for plane in self.secret.iter_mut() {
            plane.zeroize();
        }
        for plane in self.state.iter_mut() {
            plane.zeroize();
        }
    }
}
