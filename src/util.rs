//! Small bit-manipulation helpers shared by WOTS+, FORS, and the hypertree.

use crate::params::ParameterSet;

/// FIPS-205 algorithm 3 (`base_2^b`): split `x` into `out_len` big-endian
/// `b`-bit digits (`b <= 16`). `x` must hold at least `ceil(out_len*b/8)`
/// bytes.
pub fn base_2b(out: &mut [u16], x: &[u8], b: u32) {
    debug_assert!(x.len() * 8 >= out.len() * b as usize);
    debug_assert!(b <= 16);

    let mut bits = 0u32;
    let mut total: u32 = 0;
    let mut i = 0;

    for slot in out.iter_mut() {
        while bits < b {
            total = (total << 8) | x[i] as u32;
            bits += 8;
            i += 1;
        }
        bits -= b;
        *slot = ((total >> bits) & ((1u32 << b) - 1)) as u16;
        total &= (1u32 << bits) - 1;
    }
}

/// Splits `H_msg`'s output into the FORS message digest, the hypertree's
/// tree index, and its leaf index (FIPS-205 algorithm 22, steps 1-6).
pub fn split_digest<P: ParameterSet>(digest: &[u8]) -> (&[u8], u64, u32) {
    let md = &digest[..P::MD_LEN];
    let idx_tree_size = (P::H - P::H_PRIME).div_ceil(8);
    let idx_leaf_size = P::H_PRIME.div_ceil(8);

    let mut idx_tree_bytes = [0u8; 8];
    idx_tree_bytes[8 - idx_tree_size..]
        .copy_from_slice(&digest[P::MD_LEN..P::MD_LEN + idx_tree_size]);
    let mut idx_leaf_bytes = [0u8; 4];
    idx_leaf_bytes[4 - idx_leaf_size..]
        .copy_from_slice(&digest[P::MD_LEN + idx_tree_size..P::MD_LEN + idx_tree_size + idx_leaf_size]);

    let tree_bits = (P::H - P::H_PRIME) as u32;
    let tree_mask = 1u64.checked_shl(tree_bits).unwrap_or(0).wrapping_sub(1);
    let idx_tree = u64::from_be_bytes(idx_tree_bytes) & tree_mask;
    let idx_leaf = u32::from_be_bytes(idx_leaf_bytes) & ((1u32 << P::H_PRIME) - 1);

    (md, idx_tree, idx_leaf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Shake128f;

    #[test]
    fn base_2b_matches_hand_computation() {
        // 0xAB = 1010_1011, split into 4-bit digits: 0xA, 0xB.
        let mut out = [0u16; 2];
        base_2b(&mut out, &[0xAB], 4);
        assert_eq!(out, [0xA, 0xB]);
    }

    #[test]
    fn base_2b_handles_nonbyte_aligned_width() {
        // 0b101_010_01 split into three 3-bit digits (the last is padded).
        let mut out = [0u16; 2];
        base_2b(&mut out, &[0b1010_1001], 3);
        assert_eq!(out, [0b101, 0b010]);
    }

    #[test]
    fn split_digest_recovers_indices() {
        // M = MD_LEN(25) + idx_tree(8) + idx_leaf(1) for Shake128f (H=66, H'=3).
        let mut digest = [0u8; Shake128f_M];
        digest[25..33].copy_from_slice(&0x0000_0000_0123_4567u64.to_be_bytes());
        digest[33] = 0b0000_0101; // low 3 bits of idx_leaf

        let (md, idx_tree, idx_leaf) = split_digest::<Shake128f>(&digest);
        assert_eq!(md.len(), 25);
        assert_eq!(idx_tree, 0x0123_4567 & ((1u64 << 63) - 1));
        assert_eq!(idx_leaf, 0b101);
    }

    #[allow(non_upper_case_globals)]
    const Shake128f_M: usize = 34;
}
