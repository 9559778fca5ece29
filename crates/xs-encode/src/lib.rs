#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;
use alloc::string::String;

use base64::alphabet::Alphabet;
use base64::engine::general_purpose::PAD;
use base64::engine::GeneralPurpose;
use base64::Engine as _;
use zeroize::Zeroizing;

use xs_core::{XsError, XsResult, PAYLOAD_LENGTH};
use xs_payload::Payload;

pub const X3_PREFIX: &str = "mns0301_";

pub const X3_BASE64_ALPHABET: &str =
    "MfgqrsbcyzPQRStuvC7mn501HIJBo2DEFTKdeNOwxWXYZap89+/A4UVLhijkl63G";

/// Payload whitening key, one byte per payload byte.
pub const XOR_KEY: [u8; PAYLOAD_LENGTH] = [
    0x71, 0xa3, 0x02, 0x25, 0x77, 0x93, 0x27, 0x1d, 0xdd, 0x27, 0x3b, 0xce,
    0xe3, 0xe4, 0xb9, 0x8d, 0x9d, 0x79, 0x35, 0xe1, 0xda, 0x33, 0xf5, 0x76,
    0x5e, 0x2e, 0xa8, 0xaf, 0xb6, 0xdc, 0x77, 0xa5, 0x1a, 0x49, 0x9d, 0x23,
    0xb6, 0x7c, 0x20, 0x66, 0x00, 0x25, 0x86, 0x0c, 0xbf, 0x13, 0xd4, 0x54,
    0x0d, 0x92, 0x49, 0x7f, 0x58, 0x68, 0x6c, 0x57, 0x4e, 0x50, 0x8f, 0x46,
    0xe1, 0x95, 0x63, 0x44, 0xf3, 0x91, 0x39, 0xbf, 0x4f, 0xaf, 0x22, 0xa3,
    0xee, 0xf1, 0x20, 0xb7, 0x92, 0x58, 0x14, 0x5b, 0x2f, 0xeb, 0x51, 0x93,
    0xb6, 0x47, 0x86, 0x69, 0x96, 0x12, 0x98, 0xe7, 0x9b, 0xed, 0xca, 0x64,
    0x6e, 0x1a, 0x69, 0x3a, 0x92, 0x61, 0x54, 0xa5, 0xa7, 0xa1, 0xbd, 0x1c,
    0xf0, 0xde, 0xdb, 0x74, 0x2f, 0x91, 0x7a, 0x74, 0x7a, 0x1e, 0x38, 0x8b,
    0x23, 0x4f, 0x22, 0x77, 0x51, 0x6d, 0xb7, 0x11, 0x60, 0x35, 0x43, 0x97,
    0x30, 0xfa, 0x61, 0xe9, 0x82, 0x2a, 0x0e, 0xca, 0x7b, 0xff, 0x72, 0xd8,
];

const fn alphabet(symbols: &str) -> Alphabet {
    match Alphabet::new(symbols) {
        Ok(a) => a,
        Err(_) => panic!("invalid base64 alphabet"),
    }
}

const X3_ALPHABET: Alphabet = alphabet(X3_BASE64_ALPHABET);
const X3_ENGINE: GeneralPurpose = GeneralPurpose::new(&X3_ALPHABET, PAD);

fn xor_key(bytes: &[u8; PAYLOAD_LENGTH]) -> [u8; PAYLOAD_LENGTH] {
    let mut out = [0u8; PAYLOAD_LENGTH];
    for ((o, b), k) in out.iter_mut().zip(bytes.iter()).zip(XOR_KEY.iter()) {
        *o = b ^ k;
    }
    out
}

/// Byte-wise XOR of the payload against the key.
pub fn xor_transform(payload: &Payload) -> [u8; PAYLOAD_LENGTH] {
    xor_key(payload.as_bytes())
}

pub fn encode_x3(bytes: &[u8]) -> String {
    X3_ENGINE.encode(bytes)
}

/// The `x3` field: prefix + X3-alphabet base64 of the whitened payload.
pub fn build_x3(payload: &Payload) -> String {
    let whitened = Zeroizing::new(xor_transform(payload));
    let mut out = String::from(X3_PREFIX);
    out.push_str(&encode_x3(&whitened[..]));
    out
}

/// Inverse of [`build_x3`]: recovers the raw payload bytes.
///
/// Fails with `EncodingFailure` on a missing prefix, a symbol outside the
/// X3 alphabet, or a body that does not decode to exactly 144 bytes.
pub fn open_x3(x3: &str) -> XsResult<[u8; PAYLOAD_LENGTH]> {
    let body = x3.strip_prefix(X3_PREFIX).ok_or(XsError::EncodingFailure)?;
    let decoded = Zeroizing::new(X3_ENGINE.decode(body).map_err(|_| XsError::EncodingFailure)?);

    let whitened: &[u8; PAYLOAD_LENGTH] =
        decoded.as_slice().try_into().map_err(|_| XsError::EncodingFailure)?;
    Ok(xor_key(whitened))
}
