//! SLH-DSA-SHAKE parameter sets (FIPS-205 table 2, SHAKE-256 "simple" family only).

use core::fmt::Debug;

/// Upper bound on `n` (bytes) across all supported parameter sets, used to size
/// fixed stack buffers instead of threading const generics through the masked
/// core.
pub const MAX_N: usize = 32;
/// Upper bound on hypertree layers `D`.
pub const MAX_D: usize = 22;
/// Upper bound on WOTS+ chain count (`2*MAX_N + 3`).
pub const MAX_WOTS_LEN: usize = 2 * MAX_N + 3;
/// Upper bound on FORS tree height `a`.
pub const MAX_A: usize = 35;
/// Upper bound on FORS tree count `k`.
pub const MAX_K: usize = 35;

/// The fixed Winternitz parameter used throughout FIPS-205: `w = 2^4`.
pub const LOG_W: usize = 4;
pub const W: u32 = 1 << LOG_W;
/// Length, in `w`-ary digits, of the WOTS+ checksum.
pub const WOTS_LEN2: usize = 3;

/// A concrete SLH-DSA-SHAKE parameter set.
///
/// Implemented only by the six zero-sized marker types below, so a
/// misconfigured `n` cannot be named at all -- parameter-set errors are a
/// compile-time condition, not a runtime one.
pub trait ParameterSet: Copy + Clone + Debug + PartialEq + Eq + Send + Sync + 'static {
    /// FIPS-205 designation, e.g. `"SLH-DSA-SHAKE-128s"`.
    const NAME: &'static str;
    /// Security parameter in bytes.
    const N: usize;
    /// Total hypertree height.
    const H: usize;
    /// Number of hypertree layers.
    const D: usize;
    /// Height of a single hypertree layer (`H / D`).
    const H_PRIME: usize = Self::H / Self::D;
    /// FORS tree height.
    const A: usize;
    /// Number of FORS trees.
    const K: usize;
    /// WOTS+ checksum-inclusive chain count (`2*N + 3`).
    const WOTS_LEN: usize = 2 * Self::N + WOTS_LEN2;
    /// `ceil(K*A/8)`, the FORS part of the message digest.
    const MD_LEN: usize = (Self::K * Self::A).div_ceil(8);
    /// Full message-digest length consumed by `split_digest`.
    const M: usize =
        Self::MD_LEN + (Self::H - Self::H_PRIME).div_ceil(8) + Self::H_PRIME.div_ceil(8);
    /// Encoded signature length in bytes.
    const SIG_LEN: usize;
    /// Encoded signing-key length in bytes (`4*N`).
    const SK_LEN: usize = 4 * Self::N;
    /// Encoded verifying-key length in bytes (`2*N`).
    const VK_LEN: usize = 2 * Self::N;
}

macro_rules! parameter_set {
    ($name:ident, $doc:literal, n = $n:literal, h = $h:literal, d = $d:literal, a = $a:literal, k = $k:literal, sig_len = $sig_len:literal) => {
        #[doc = $doc]
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name;

        impl ParameterSet for $name {
            const NAME: &'static str = concat!("SLH-DSA-SHAKE-", stringify!($name));
            const N: usize = $n;
            const H: usize = $h;
            const D: usize = $d;
            const A: usize = $a;
            const K: usize = $k;
            const SIG_LEN: usize = $sig_len;
        }
    };
}

parameter_set!(Shake128s, "SLH-DSA-SHAKE-128s", n = 16, h = 63, d = 7, a = 12, k = 14, sig_len = 7856);
parameter_set!(Shake128f, "SLH-DSA-SHAKE-128f", n = 16, h = 66, d = 22, a = 6, k = 33, sig_len = 17088);
parameter_set!(Shake192s, "SLH-DSA-SHAKE-192s", n = 24, h = 63, d = 7, a = 14, k = 17, sig_len = 16224);
parameter_set!(Shake192f, "SLH-DSA-SHAKE-192f", n = 24, h = 66, d = 22, a = 8, k = 33, sig_len = 35664);
parameter_set!(Shake256s, "SLH-DSA-SHAKE-256s", n = 32, h = 64, d = 8, a = 14, k = 22, sig_len = 29792);
parameter_set!(Shake256f, "SLH-DSA-SHAKE-256f", n = 32, h = 68, d = 17, a = 9, k = 35, sig_len = 49856);

#[cfg(test)]
mod tests {
    use super::*;

    fn check<P: ParameterSet>(h_prime: usize, wots_len: usize, md_len: usize, m: usize) {
        assert_eq!(P::H_PRIME, h_prime);
        assert_eq!(P::WOTS_LEN, wots_len);
        assert_eq!(P::MD_LEN, md_len);
        assert_eq!(P::M, m);
    }

    #[test]
    fn shake_128s_matches_fips_205_table_2() {
        check::<Shake128s>(9, 35, 21, 30);
    }

    #[test]
    fn shake_128f_matches_fips_205_table_2() {
        check::<Shake128f>(3, 35, 25, 34);
    }

    #[test]
    fn shake_192s_matches_fips_205_table_2() {
        check::<Shake192s>(9, 51, 30, 39);
    }

    #[test]
    fn shake_256f_matches_fips_205_table_2() {
        check::<Shake256f>(4, 67, 40, 49);
    }
}
