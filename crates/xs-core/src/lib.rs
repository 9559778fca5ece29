#![no_std]
#![forbid(unsafe_code)]
#[cfg(feature = "std")]
extern crate std;

// Fixed Payload Layout (mns0301)
pub const PAYLOAD_LENGTH: usize = 144;
pub const VERSION_LENGTH: usize = 4;
pub const SEED_LENGTH: usize = 4;
pub const TIMESTAMP_LE_LENGTH: usize = 8;
pub const COUNTER_LENGTH: usize = 4;
pub const MD5_XOR_LENGTH: usize = 8;
pub const A1_LENGTH: usize = 52;
pub const APP_ID_LENGTH: usize = 10;
pub const ENV_TABLE_LEN: usize = 15;
pub const ENV_BLOCK_LENGTH: usize = 16;
pub const A3_PREFIX_LENGTH: usize = 4;
pub const DIGEST_LENGTH: usize = 16;

pub const EXPECTED_HEX_LENGTH: usize = 32;
pub const DEFAULT_APP_ID: &str = "xhs-pc-web";

/// Marker written as the first byte of the environment block.
pub const ENV_BLOCK_MARKER: u8 = 1;

/// Byte offsets of each payload field.
pub mod offsets {
    pub const VERSION: usize = 0;
    pub const SEED: usize = 4;
    pub const TIMESTAMP: usize = 8;
    pub const PAGE_LOAD_TIMESTAMP: usize = 16;
    pub const SEQUENCE: usize = 24;
    pub const WINDOW_PROPS: usize = 28;
    pub const URI_LENGTH: usize = 32;
    pub const MD5_XOR: usize = 36;
    pub const A1: usize = 44;
    pub const APP_ID: usize = 97;
    pub const ENV_BLOCK: usize = 108;
    pub const A3_PREFIX: usize = 124;
    pub const A3_DIGEST: usize = 128;
}

/// Inclusive draw range for the random provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRange {
    pub min: u32,
    pub max: u32,
}

impl DrawRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// The Parameter Table.
/// Read-only for the lifetime of a builder or session. Overrides go through
/// struct-update syntax on top of `SignConfig::default()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignConfig {
    pub version_bytes: [u8; VERSION_LENGTH],
    pub a3_prefix: [u8; A3_PREFIX_LENGTH],
    pub hash_iv: [u32; 4],
    pub env_table: [u8; ENV_TABLE_LEN],
    pub env_checks: [u8; ENV_TABLE_LEN],

    /// Seconds subtracted from the request time when no session is supplied.
    pub time_offset: DrawRange,
    pub sequence: DrawRange,
    pub window_props: DrawRange,

    pub session_sequence_init: DrawRange,
    pub session_window_props_init: DrawRange,
    pub session_sequence_step: DrawRange,
    pub session_window_props_step: DrawRange,
}

impl Default for SignConfig {
    fn default() -> Self {
        Self {
            version_bytes: [121, 104, 96, 41],
            a3_prefix: [2, 97, 51, 16],
            hash_iv: [1831565813, 461845907, 2246822507, 3266489909],
            env_table: [115, 248, 83, 102, 103, 201, 181, 131, 99, 94, 4, 68, 250, 132, 21],
            env_checks: [0, 1, 18, 1, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0, 0],

            time_offset: DrawRange::new(10, 50),
            sequence: DrawRange::new(15, 50),
            window_props: DrawRange::new(1000, 1200),

            session_sequence_init: DrawRange::new(15, 17),
            session_window_props_init: DrawRange::new(1000, 2000),
            session_sequence_step: DrawRange::new(0, 1),
            session_window_props_step: DrawRange::new(1, 10),
        }
    }
}

impl SignConfig {
    /// Rejects inverted ranges and a non-positive window-props step.
    pub fn validate(&self) -> XsResult<()> {
        let ranges = [
            self.time_offset,
            self.sequence,
            self.window_props,
            self.session_sequence_init,
            self.session_window_props_init,
            self.session_sequence_step,
            self.session_window_props_step,
        ];
        if ranges.iter().any(|r| !r.is_valid()) {
            return Err(XsError::ConfigurationInvariantViolation);
        }
        if self.session_window_props_step.min == 0 {
            return Err(XsError::ConfigurationInvariantViolation);
        }
        Ok(())
    }
}

pub type XsResult<T> = Result<T, XsError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XsError {
    /// Caller-supplied data is malformed (digest hex, URL).
    InvalidInput,
    /// Assembler or parameter table broke a layout rule.
    ConfigurationInvariantViolation,
    EncodingFailure,
}

impl core::fmt::Display for XsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for XsError {}
