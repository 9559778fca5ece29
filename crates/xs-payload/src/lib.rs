#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

mod builder;
pub mod digest;
mod request;
pub mod url;

pub use builder::{Payload, PayloadBuilder};
pub use digest::{md5_bytes, md5_hex, parse_md5_hex};
pub use request::SignRequest;
pub use url::extract_api_path;
