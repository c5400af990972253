//! The wire encoding of an SLH-DSA signature: randomizer, FORS signature,
//! hypertree signature, concatenated in that order (FIPS-205 algorithm 19).

use alloc::vec::Vec;

use signature::Error;

use crate::fors::ForsSignature;
use crate::hypertree::HypertreeSignature;
use crate::params::{ParameterSet, MAX_N};

/// A parsed SLH-DSA signature. Every field is a hash value or a collection
/// of them; there are no further invariants to check beyond total length.
pub struct Signature<P: ParameterSet> {
    pub(crate) randomizer: [u8; MAX_N],
    pub(crate) fors_sig: ForsSignature<P>,
    pub(crate) ht_sig: HypertreeSignature<P>,
}

impl<P: ParameterSet> Signature<P> {
    pub fn encoded_len() -> usize {
        P::N + ForsSignature::<P>::encoded_len() + HypertreeSignature::<P>::encoded_len()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::encoded_len());
        bytes.extend_from_slice(&self.randomizer[..P::N]);
        bytes.extend_from_slice(&self.fors_sig.to_vec());
        bytes.extend_from_slice(&self.ht_sig.to_vec());
        bytes
    }
}

impl<P: ParameterSet> Clone for Signature<P> {
    fn clone(&self) -> Self {
        Self {
            randomizer: self.randomizer,
            fors_sig: self.fors_sig.clone(),
            ht_sig: self.ht_sig.clone(),
        }
    }
}

impl<P: ParameterSet> TryFrom<&[u8]> for Signature<P> {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != Self::encoded_len() {
            return Err(Error::new());
        }

        let mut randomizer = [0u8; MAX_N];
        randomizer[..P::N].copy_from_slice(&bytes[..P::N]);

        let fors_len = ForsSignature::<P>::encoded_len();
        let fors_sig = ForsSignature::try_from_slice(&bytes[P::N..P::N + fors_len]).map_err(|()| Error::new())?;
        let ht_sig = HypertreeSignature::try_from_slice(&bytes[P::N + fors_len..]).map_err(|()| Error::new())?;

        Ok(Self { randomizer, fors_sig, ht_sig })
    }
}

impl<P: ParameterSet> TryFrom<Signature<P>> for Vec<u8> {
    type Error = Error;

    fn try_from(sig: Signature<P>) -> Result<Self, Self::Error> {
        Ok(sig.to_vec())
    }
}

impl<P: ParameterSet> signature::SignatureEncoding for Signature<P> {
    type Repr = Vec<u8>;

    fn encoded_len(&self) -> usize {
        Self::encoded_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fors::fors_sign;
    use crate::hypertree::ht_sign;
    use crate::params::Shake128f;
    use crate::session::SigningContext;
    use rand::rngs::mock::StepRng;

    #[test]
    fn encoded_signature_round_trips() {
        let pk_seed = [2u8; 16];
        let sk_seed = [1u8; 16];
        let mut rng = StepRng::new(11, 17);
        let ctx = SigningContext::<Shake128f>::new(&mut rng, &pk_seed, &sk_seed);

        let md = [9u8; 25];
        let fors_sig = fors_sign::<Shake128f>(&ctx, &pk_seed, 1, 2, &md);
        let ht_sig = ht_sign::<Shake128f>(&ctx, &pk_seed, 1, 2, &[4u8; 16]);
        let sig = Signature::<Shake128f> { randomizer: [3u8; MAX_N], fors_sig, ht_sig };

        let bytes = sig.to_vec();
        assert_eq!(bytes.len(), Signature::<Shake128f>::encoded_len());

        let decoded = Signature::<Shake128f>::try_from(&bytes[..]).unwrap();
        assert_eq!(decoded.to_vec(), bytes);

        let mut tampered = bytes.clone();
        tampered[0] ^= 0xff;
        let decoded_tampered = Signature::<Shake128f>::try_from(&tampered[..]).unwrap();
        assert_ne!(decoded_tampered.to_vec(), bytes);

        assert!(Signature::<Shake128f>::try_from(&bytes[..bytes.len() - 1]).is_err());
    }
}
