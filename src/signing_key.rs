//! The SLH-DSA signing key: `sk_seed ‖ sk_prf ‖ pk_seed ‖ pk_root` (FIPS-205
//! algorithms 18, 20). Key material is stored here as plain bytes; it is
//! [`crate::session::SigningContext::new`] that re-masks `sk_seed` fresh for
//! every signing call.

use alloc::vec::Vec;
use core::marker::PhantomData;

use digest::{ExtendableOutput, Update, XofReader};
use rand_core::{CryptoRng, RngCore};
use sha3::{Shake256, Shake256Reader};
use signature::{Error, RandomizedSigner, Signer};
use zeroize::Zeroize;

use crate::fors::{fors_pk_from_sig, fors_sign};
use crate::hashes::{h_msg, prf_msg};
use crate::hypertree::{ht_sign, xmss_node_masked};
use crate::params::{ParameterSet, MAX_N};
use crate::session::SigningContext;
use crate::signature_encoding::Signature;
use crate::util::split_digest;
use crate::verifying_key::VerifyingKey;

/// An SLH-DSA signing key for parameter set `P`.
pub struct SigningKey<P: ParameterSet> {
    sk_seed: [u8; MAX_N],
    sk_prf: [u8; MAX_N],
    verifying_key: VerifyingKey<P>,
    _p: PhantomData<P>,
}

/// A `RngCore` stream drawn from `sk_prf ‖ sk_seed ‖ opt_rand ‖ msg`: the
/// masking shares a signing call draws must vary with every call, but the
/// crate carries no OS-RNG dependency, so it derives them the same way
/// `prf_msg` derives the signature randomizer.
struct MaskRng {
    reader: Shake256Reader,
}

impl MaskRng {
    fn new(sk_seed: &[u8], sk_prf: &[u8], opt_rand: &[u8], msg: &[u8]) -> Self {
        let reader = Shake256::default()
            .chain(sk_prf)
            .chain(sk_seed)
            .chain(opt_rand)
            .chain(msg)
            .finalize_xof();
        Self { reader }
    }
}

impl RngCore for MaskRng {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.reader.read(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.reader.read(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.reader.read(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl<P: ParameterSet> SigningKey<P> {
    /// Algorithm 18: generate a fresh keypair from a cryptographic RNG.
    pub fn new<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        let mut sk_seed = [0u8; MAX_N];
        let mut sk_prf = [0u8; MAX_N];
        let mut pk_seed = [0u8; MAX_N];
        rng.fill_bytes(&mut sk_seed[..P::N]);
        rng.fill_bytes(&mut sk_prf[..P::N]);
        rng.fill_bytes(&mut pk_seed[..P::N]);
        Self::from_seed(rng, &sk_seed[..P::N], &sk_prf[..P::N], &pk_seed[..P::N])
    }

    /// Construct a `SigningKey` from pre-chosen seeds. Published for KAT
    /// validation; `new` is the normal entry point.
    pub fn from_seed(rng: &mut impl RngCore, sk_seed: &[u8], sk_prf: &[u8], pk_seed: &[u8]) -> Self {
        let ctx = SigningContext::<P>::new(rng, pk_seed, sk_seed);
        let pk_root = xmss_node_masked::<P>(&ctx, pk_seed, P::D - 1, 0, 0, P::H_PRIME as u32);

        let mut sk_seed_buf = [0u8; MAX_N];
        let mut sk_prf_buf = [0u8; MAX_N];
        let mut pk_seed_buf = [0u8; MAX_N];
        sk_seed_buf[..P::N].copy_from_slice(sk_seed);
        sk_prf_buf[..P::N].copy_from_slice(sk_prf);
        pk_seed_buf[..P::N].copy_from_slice(pk_seed);

        Self {
            sk_seed: sk_seed_buf,
            sk_prf: sk_prf_buf,
            verifying_key: VerifyingKey::new(pk_seed_buf, pk_root),
            _p: PhantomData,
        }
    }

    pub fn verifying_key(&self) -> VerifyingKey<P> {
        self.verifying_key
    }

    fn raw_sign(&self, msg: &[u8], opt_rand: &[u8]) -> Signature<P> {
        let mut rng = MaskRng::new(&self.sk_seed[..P::N], &self.sk_prf[..P::N], opt_rand, msg);
        let pk_seed = &self.verifying_key.pk_seed;
        let pk_root = &self.verifying_key.pk_root;

        let mut randomizer = [0u8; MAX_N];
        randomizer[..P::N].copy_from_slice(&prf_msg::<P>(&self.sk_prf, opt_rand, msg)[..P::N]);

        let digest = h_msg::<P>(&randomizer, pk_seed, pk_root, msg);
        let (md, idx_tree, idx_leaf) = split_digest::<P>(&digest);

        let mut ctx = SigningContext::<P>::new(&mut rng, pk_seed, &self.sk_seed);
        ctx.prepare_path(idx_tree, idx_leaf);
        let fors_sig = fors_sign::<P>(&ctx, pk_seed, idx_tree, idx_leaf, md);
        let fors_pk = fors_pk_from_sig::<P>(pk_seed, idx_tree, idx_leaf, &fors_sig, md);
        let ht_sig = ht_sign::<P>(&ctx, pk_seed, idx_tree, idx_leaf, &fors_pk[..P::N]);

        Signature { randomizer, fors_sig, ht_sig }
    }

    /// Implements `slh-sign` with a context string (FIPS-205 §10.3). `ctx`
    /// must be 255 bytes or shorter. `opt_rand` substitutes for the
    /// freshly-drawn per-signature randomizer when given, matching
    /// `slh_sign_internal`'s deterministic-testing hook; ordinary callers
    /// should go through [`Signer`] or [`RandomizedSigner`] instead.
    pub fn try_sign_with_context(&self, msg: &[u8], ctx: &[u8], opt_rand: Option<&[u8]>) -> Result<Signature<P>, Error> {
        let ctx_len = u8::try_from(ctx.len()).map_err(|_| Error::new())?;
        let mut ctx_msg = Vec::with_capacity(2 + ctx.len() + msg.len());
        ctx_msg.push(0u8);
        ctx_msg.push(ctx_len);
        ctx_msg.extend_from_slice(ctx);
        ctx_msg.extend_from_slice(msg);

        let mut rand_buf = [0u8; MAX_N];
        let rand = match opt_rand {
            Some(r) => r,
            None => {
                rand_buf[..P::N].copy_from_slice(&self.verifying_key.pk_seed[..P::N]);
                &rand_buf[..P::N]
            }
        };
        Ok(self.raw_sign(&ctx_msg, rand))
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(P::SK_LEN);
        bytes.extend_from_slice(&self.sk_seed[..P::N]);
        bytes.extend_from_slice(&self.sk_prf[..P::N]);
        bytes.extend_from_slice(&self.verifying_key.to_vec());
        bytes
    }
}

impl<P: ParameterSet> Drop for SigningKey<P> {
    fn drop(&mut self) {
        self.sk_seed.zeroize();
        self.sk_prf.zeroize();
    }
}

impl<P: ParameterSet> TryFrom<&[u8]> for SigningKey<P> {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != P::SK_LEN {
            return Err(Error::new());
        }
        let (sk_seed, rest) = bytes.split_at(P::N);
        let (sk_prf, vk_bytes) = rest.split_at(P::N);
        let verifying_key = VerifyingKey::try_from(vk_bytes)?;

        let mut sk_seed_buf = [0u8; MAX_N];
        let mut sk_prf_buf = [0u8; MAX_N];
        sk_seed_buf[..P::N].copy_from_slice(sk_seed);
        sk_prf_buf[..P::N].copy_from_slice(sk_prf);

        Ok(Self { sk_seed: sk_seed_buf, sk_prf: sk_prf_buf, verifying_key, _p: PhantomData })
    }
}

impl<P: ParameterSet> Signer<Signature<P>> for SigningKey<P> {
    fn try_sign(&self, msg: &[u8]) -> Result<Signature<P>, Error> {
        self.try_sign_with_context(msg, &[], None)
    }
}

impl<P: ParameterSet> RandomizedSigner<Signature<P>> for SigningKey<P> {
    fn try_sign_with_rng(&self, rng: &mut impl signature::rand_core::CryptoRngCore, msg: &[u8]) -> Result<Signature<P>, Error> {
        let mut randomizer = [0u8; MAX_N];
        rng.fill_bytes(&mut randomizer[..P::N]);
        self.try_sign_with_context(msg, &[], Some(&randomizer[..P::N]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Shake128f;
    use rand::rngs::mock::StepRng;
    use signature::Verifier;

    #[test]
    fn sign_then_verify_round_trips() {
        let mut rng = StepRng::new(11, 17);
        let sk = SigningKey::<Shake128f>::from_seed(&mut rng, &[1u8; 16], &[2u8; 16], &[3u8; 16]);
        let vk = sk.verifying_key();

        let msg = b"a message worth signing";
        let sig = sk.try_sign(msg).unwrap();
        assert!(vk.verify(msg, &sig).is_ok());
    }

    #[test]
    fn tampered_message_fails_verification() {
        let mut rng = StepRng::new(11, 17);
        let sk = SigningKey::<Shake128f>::from_seed(&mut rng, &[1u8; 16], &[2u8; 16], &[3u8; 16]);
        let vk = sk.verifying_key();

        let sig = sk.try_sign(b"original message").unwrap();
        assert!(vk.verify(b"tampered message", &sig).is_err());
    }

    #[test]
    fn signing_key_bytes_round_trip() {
        let mut rng = StepRng::new(11, 17);
        let sk = SigningKey::<Shake128f>::from_seed(&mut rng, &[1u8; 16], &[2u8; 16], &[3u8; 16]);
        let bytes = sk.to_vec();
        assert_eq!(bytes.len(), Shake128f::SK_LEN);

        let sk2 = SigningKey::<Shake128f>::try_from(&bytes[..]).unwrap();
        let msg = b"round trip";
        let sig = sk2.try_sign(msg).unwrap();
        assert!(sk.verifying_key().verify(msg, &sig).is_ok());

        assert!(SigningKey::<Shake128f>::try_from(&bytes[..bytes.len() - 1]).is_err());
    }
}
