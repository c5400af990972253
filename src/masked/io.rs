//! Component C: shared-word I/O -- byte-string / 64-bit-lane conversion.
//!
//! Neither direction touches secret material except to replicate already-
//! shared bytes into already-shared lanes; there is nothing to mask here,
//! the function is pure data movement.

/// Little-endian pack `src` into `dst`, eight bytes per lane. `src.len()`
/// need not be a multiple of 8; a short final chunk is zero-extended.
pub fn bytes_to_lanes(dst: &mut [u64], src: &[u8]) {
    for (lane, chunk) in dst.iter_mut().zip(src.chunks(8)) {
        let mut buf = [0u8; 8];
        buf[..chunk.len()].copy_from_slice(chunk);
        *lane = u64::from_le_bytes(buf);
    }
}

/// Inverse of `bytes_to_lanes` for an exactly-sized `n`-byte window.
pub fn lanes_to_bytes(dst: &mut [u8], src: &[u64]) {
    for (chunk, lane) in dst.chunks_mut(8).zip(src.iter()) {
        let buf = lane.to_le_bytes();
        chunk.copy_from_slice(&buf[..chunk.len()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_length() {
        let bytes: [u8; 13] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13];
        let mut lanes = [0u64; 2];
        bytes_to_lanes(&mut lanes, &bytes);

        let mut out = [0u8; 13];
        lanes_to_bytes(&mut out, &lanes);
        assert_eq!(out, bytes);
    }

    #[test]
    fn matches_hand_packed_lane() {
        let bytes = [0xEF, 0xCD, 0xAB, 0x89, 0x67, 0x45, 0x23, 0x01];
        let mut lanes = [0u64; 1];
        bytes_to_lanes(&mut lanes, &bytes);
        assert_eq!(lanes[0], 0x0123_4567_89AB_CDEF);
    }
}
