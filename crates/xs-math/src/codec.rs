/// 32-bit left rotation with wraparound.
#[inline(always)]
pub fn rotate_left32(value: u32, n: u32) -> u32 {
    value.rotate_left(n)
}

/// Truncating little-endian encode.
/// Bits beyond `N * 8` are dropped; widths past 8 bytes are zero-filled.
#[inline]
pub fn int_to_le_bytes<const N: usize>(value: u64) -> [u8; N] {
    let mut out = [0u8; N];
    write_le(value, &mut out);
    out
}

/// Slice form of `int_to_le_bytes`: fills the whole of `out`.
pub fn write_le(value: u64, out: &mut [u8]) {
    let mut v = value;
    for b in out.iter_mut() {
        *b = (v & 0xFF) as u8;
        v >>= 8;
    }
}
