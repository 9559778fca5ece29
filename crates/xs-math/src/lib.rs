#![no_std]
#![forbid(unsafe_code)]

pub mod codec;
pub mod mixer;

pub use codec::{int_to_le_bytes, rotate_left32, write_le};
pub use mixer::DigestMixer;
