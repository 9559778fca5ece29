use alloc::format;
use alloc::string::String;
use md5::{Digest, Md5};
use xs_core::{XsError, XsResult, EXPECTED_HEX_LENGTH};

/// Lowercase hex MD5 of `data`.
pub fn md5_hex(data: &[u8]) -> String {
    format!("{:x}", Md5::digest(data))
}

pub fn md5_bytes(data: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out.copy_from_slice(&Md5::digest(data));
    out
}

/// Decodes a 32-char hex digest. Wrong length or stray characters fail whole;
/// nothing is truncated.
pub fn parse_md5_hex(md5_hex: &str) -> XsResult<[u8; 16]> {
    if md5_hex.len() != EXPECTED_HEX_LENGTH {
        return Err(XsError::InvalidInput);
    }
    let mut out = [0u8; 16];
    hex::decode_to_slice(md5_hex, &mut out).map_err(|_| XsError::InvalidInput)?;
    Ok(out)
}
