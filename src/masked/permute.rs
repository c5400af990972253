//! Component B: the masked permutation driver.
//!
//! Runs the fixed 24-round Keccak-f[1600] script as `{B shared, collapse,
//! unshared middle, [expand, B shared], emit}`. `B` is the compile-time
//! blinded-rounds prefix/suffix; FIPS-205 doesn't name a canonical value, so
//! this crate treats it as a constant generic the way the source material's
//! "macro-triplicated" rounds generalize to a loop over shares (spec §9).

use super::keccak::{round_constant, round_shared, round_unshared, ROUNDS};

/// The prefix/suffix width used by the production signing pipeline.
pub const B: usize = 3;

/// Run the masked permutation with a caller-chosen blinded-rounds width `B`.
///
/// `state` is mutated in place; on return, the logical digest occupies the
/// first 4 lanes of `state[0]` (and, if `want_shared_output`, of `state[1]`
/// and `state[2]` as well -- the expand step leaves those lanes holding
/// valid XOR-shares of the same logical value, see `fold_collapse`).
pub fn permute_with_b<const WIDTH: usize>(
    state: &mut [[u64; 25]; 3],
    want_shared_output: bool,
) {
    assert!(WIDTH == 2 || WIDTH == 3, "unsupported blinded-rounds width");

    for r in 0..WIDTH {
        round_shared(state, round_constant(r));
    }

    fold_collapse(state);

    let suffix = if want_shared_output { WIDTH } else { 0 };
    let middle = ROUNDS - WIDTH - suffix;

    let mut plane0 = state[0];
    for r in WIDTH..WIDTH + middle {
        round_unshared(&mut plane0, round_constant(r));
    }
    state[0] = plane0;

    if want_shared_output {
        fold_collapse(state);
        for r in (WIDTH + middle)..ROUNDS {
            round_shared(state, round_constant(r));
        }
    }
}

/// XOR-fold `state[1]` and `state[2]` into `state[0]`. Self-inverse: applying
/// it twice in a row returns `state[0]` to its original logical value
/// (spec invariant 4), which is exactly what lets "collapse" and "expand"
/// share one implementation.
fn fold_collapse(state: &mut [[u64; 25]; 3]) {
    for lane in 0..25 {
        state[0][lane] ^= state[1][lane] ^ state[2][lane];
    }
}

/// The production entry point: always uses the default blinded-rounds width.
pub fn permute(state: &mut [[u64; 25]; 3], want_shared_output: bool) {
    permute_with_b::<B>(state, want_shared_output);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_permute(state: &[u64; 25]) -> [u64; 25] {
        let mut s = *state;
        for r in 0..ROUNDS {
            round_unshared(&mut s, round_constant(r));
        }
        s
    }

    fn logical(state: &[[u64; 25]; 3]) -> [u64; 25] {
        let mut out = [0u64; 25];
        for lane in 0..25 {
            out[lane] = state[0][lane] ^ state[1][lane] ^ state[2][lane];
        }
        out
    }

    fn split(input: &[u64; 25]) -> [[u64; 25]; 3] {
        let r1 = [0x5555_5555_5555_5555u64; 25];
        let r2 = [0xAAAA_AAAA_AAAA_AAAAu64; 25];
        let mut s0 = [0u64; 25];
        for k in 0..25 {
            s0[k] = input[k] ^ r1[k] ^ r2[k];
        }
        [s0, r1, r2]
    }

    #[test]
    fn unshared_output_reconstructs_full_permutation() {
        let input = [0x0123_4567_89AB_CDEFu64; 25];
        let expected = reference_permute(&input);

        let mut shared = split(&input);
        permute(&mut shared, false);

        assert_eq!(shared[0], expected);
    }

    #[test]
    fn shared_output_reconstructs_full_permutation() {
        let input = {
            let mut x = [0u64; 25];
            for (k, lane) in x.iter_mut().enumerate() {
                *lane = (k as u64) * 0x1357_9BDF + 7;
            }
            x
        };
        let expected = reference_permute(&input);

        let mut shared = split(&input);
        permute(&mut shared, true);

        assert_eq!(logical(&shared), expected);
    }

    /// Spec invariant 2: for a fixed logical input, a single share of the
    /// shared output is uniformly distributed over its byte range as the
    /// masking randomness varies -- a first-order probe on one share alone
    /// should learn nothing about the logical value.
    #[test]
    fn shares_are_first_order_independent() {
        use rand::RngCore;

        let mut rng = rand::thread_rng();
        let input = [0xDEAD_BEEF_0BAD_F00Du64; 25];

        const SAMPLES: u32 = 10_000;
        let mut counts = [0u32; 256];
        for _ in 0..SAMPLES {
            let mut r1 = [0u64; 25];
            let mut r2 = [0u64; 25];
            for k in 0..25 {
                r1[k] = rng.next_u64();
                r2[k] = rng.next_u64();
            }
            let mut s0 = [0u64; 25];
            for k in 0..25 {
                s0[k] = input[k] ^ r1[k] ^ r2[k];
            }
            let mut shared = [s0, r1, r2];
            permute(&mut shared, true);
            counts[(shared[1][0] & 0xff) as usize] += 1;
        }

        let expected = f64::from(SAMPLES) / 256.0;
        let chi_square: f64 = counts
            .iter()
            .map(|&c| {
                let diff = f64::from(c) - expected;
                diff * diff / expected
            })
            .sum();

        // 255 degrees of freedom; chi-square critical value at p = 0.001.
        assert!(chi_square < 330.56, "chi-square {chi_square} exceeds critical value");
    }

    #[test]
    fn b_parameter_equivalence() {
        let input = [0x2222_3333_4444_5555u64; 25];

        let mut shared2 = split(&input);
        permute_with_b::<2>(&mut shared2, false);

        let mut shared3 = split(&input);
        permute_with_b::<3>(&mut shared3, false);

        assert_eq!(shared2[0], shared3[0]);

        let mut shared2_out = split(&input);
        permute_with_b::<2>(&mut shared2_out, true);
        let mut shared3_out = split(&input);
        permute_with_b::<3>(&mut shared3_out, true);
        assert_eq!(logical(&shared2_out), logical(&shared3_out));
    }
}
