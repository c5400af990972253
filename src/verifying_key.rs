//! The SLH-DSA public key: `pk_seed ‖ pk_root` (FIPS-205 algorithms 20, 22).

use alloc::vec::Vec;
use core::marker::PhantomData;

use signature::{Error, Verifier};

use crate::fors::fors_pk_from_sig;
use crate::hashes::h_msg;
use crate::hypertree::ht_verify;
use crate::params::{ParameterSet, MAX_N};
use crate::signature_encoding::Signature;
use crate::util::split_digest;

/// An SLH-DSA public key: the seed used to key every hash in the scheme,
/// plus the hypertree root it commits to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerifyingKey<P: ParameterSet> {
    pub(crate) pk_seed: [u8; MAX_N],
    pub(crate) pk_root: [u8; MAX_N],
    _p: PhantomData<P>,
}

impl<P: ParameterSet> VerifyingKey<P> {
    pub(crate) fn new(pk_seed: [u8; MAX_N], pk_root: [u8; MAX_N]) -> Self {
        Self { pk_seed, pk_root, _p: PhantomData }
    }

    /// Algorithm 22: verify `msg` against a signature, without a context
    /// string. Published for KAT validation; `verify` below is the normal
    /// entry point.
    pub fn slh_verify_internal(&self, msg: &[u8], signature: &Signature<P>) -> Result<(), Error> {
        let digest = h_msg::<P>(&signature.randomizer, &self.pk_seed, &self.pk_root, msg);
        let (md, idx_tree, idx_leaf) = split_digest::<P>(&digest);

        let fors_pk = fors_pk_from_sig::<P>(&self.pk_seed, idx_tree, idx_leaf, &signature.fors_sig, md);
        let ok = ht_verify::<P>(&self.pk_seed, &signature.ht_sig, idx_tree, idx_leaf, &fors_pk, &self.pk_root);

        ok.then_some(()).ok_or_else(Error::new)
    }

    /// Verify `msg` against `signature` under context string `ctx` (FIPS-205
    /// `slh-verify`, §10.3). `ctx` must be 255 bytes or shorter.
    pub fn try_verify_with_context(&self, msg: &[u8], ctx: &[u8], signature: &Signature<P>) -> Result<(), Error> {
        let ctx_len = u8::try_from(ctx.len()).map_err(|_| Error::new())?;
        let mut ctx_msg = Vec::with_capacity(2 + ctx.len() + msg.len());
        ctx_msg.push(0u8);
        ctx_msg.push(ctx_len);
        ctx_msg.extend_from_slice(ctx);
        ctx_msg.extend_from_slice(msg);
        self.slh_verify_internal(&ctx_msg, signature)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(P::VK_LEN);
        bytes.extend_from_slice(&self.pk_seed[..P::N]);
        bytes.extend_from_slice(&self.pk_root[..P::N]);
        bytes
    }
}

impl<P: ParameterSet> TryFrom<&[u8]> for VerifyingKey<P> {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != P::VK_LEN {
            return Err(Error::new());
        }
        let mut pk_seed = [0u8; MAX_N];
        let mut pk_root = [0u8; MAX_N];
        pk_seed[..P::N].copy_from_slice(&bytes[..P::N]);
        pk_root[..P::N].copy_from_slice(&bytes[P::N..]);
        Ok(Self::new(pk_seed, pk_root))
    }
}

impl<P: ParameterSet> Verifier<Signature<P>> for VerifyingKey<P> {
    fn verify(&self, msg: &[u8], signature: &Signature<P>) -> Result<(), Error> {
        self.try_verify_with_context(msg, &[], signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Shake128f;
    use crate::signing_key::SigningKey;
    use rand::rngs::mock::StepRng;

    #[test]
    fn verifying_key_bytes_round_trip() {
        let mut rng = StepRng::new(11, 17);
        let sk = SigningKey::<Shake128f>::from_seed(&mut rng, &[1u8; 16], &[2u8; 16], &[3u8; 16]);
        let vk = sk.verifying_key();

        let bytes = vk.to_vec();
        assert_eq!(bytes.len(), Shake128f::VK_LEN);

        let vk2 = VerifyingKey::<Shake128f>::try_from(&bytes[..]).unwrap();
        assert_eq!(vk, vk2);

        assert!(VerifyingKey::<Shake128f>::try_from(&bytes[..bytes.len() - 1]).is_err());
    }
}
