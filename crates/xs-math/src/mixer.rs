use log::trace;
use xs_core::{XsError, XsResult, DIGEST_LENGTH};

use crate::codec::rotate_left32;

const BLOCK: usize = 8;

/// The 128-bit Digest Mixer.
///
/// Non-cryptographic, SipHash-style rounds over 8-byte blocks. Rotation
/// constants and the sequential update order are part of the wire contract:
/// changing either changes every signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestMixer {
    iv: [u32; 4],
}

impl DigestMixer {
    pub const fn new(iv: [u32; 4]) -> Self {
        Self { iv }
    }

    /// Mixes `input` into 16 bytes.
    /// Input length must be a multiple of 8; anything else is an assembler bug.
    pub fn digest(&self, input: &[u8]) -> XsResult<[u8; DIGEST_LENGTH]> {
        if input.len() % BLOCK != 0 {
            return Err(XsError::ConfigurationInvariantViolation);
        }
        trace!("[MIXER] {} bytes, {} blocks", input.len(), input.len() / BLOCK);

        let len = input.len() as u32;
        let [mut s0, mut s1, mut s2, mut s3] = self.iv;

        // 1. Fold length
        s0 ^= len;
        s1 ^= len.wrapping_shl(8);
        s2 ^= len.wrapping_shl(16);
        s3 ^= len.wrapping_shl(24);

        // 2. Absorb (sequential: each lane sees the lanes already updated)
        for block in input.chunks_exact(BLOCK) {
            let v0 = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
            let v1 = u32::from_le_bytes([block[4], block[5], block[6], block[7]]);

            s0 = rotate_left32(s0.wrapping_add(v0) ^ s2, 7);
            s1 = rotate_left32((v0 ^ s1).wrapping_add(s3), 11);
            s2 = rotate_left32(s2.wrapping_add(v1) ^ s0, 13);
            s3 = rotate_left32((s3 ^ v1).wrapping_add(s1), 17);
        }

        // 3. Finalize
        let t0 = s0 ^ len;
        let t1 = s1 ^ t0;
        let t2 = s2.wrapping_add(t1);
        let t3 = s3 ^ t2;

        let rt0 = rotate_left32(t0, 9);
        let rt1 = rotate_left32(t1, 13);
        let rt2 = rotate_left32(t2, 17);
        let rt3 = rotate_left32(t3, 19);

        let f0 = rt0.wrapping_add(rt2);
        let f1 = rt1 ^ rt3;
        let f2 = rt2.wrapping_add(f0);
        let f3 = rt3 ^ f1;

        let mut out = [0u8; DIGEST_LENGTH];
        for (chunk, word) in out.chunks_exact_mut(4).zip([f0, f1, f2, f3]) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        Ok(out)
    }
}
