use alloc::vec::Vec;
use log::{debug, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use xs_core::{
    offsets, SignConfig, XsError, XsResult, A1_LENGTH, APP_ID_LENGTH, COUNTER_LENGTH,
    DIGEST_LENGTH, ENV_BLOCK_LENGTH, ENV_BLOCK_MARKER, ENV_TABLE_LEN, MD5_XOR_LENGTH,
    PAYLOAD_LENGTH, SEED_LENGTH, TIMESTAMP_LE_LENGTH,
};
use xs_hal::{BoundedRandom, WallClock};
use xs_math::{int_to_le_bytes, DigestMixer};
use xs_session::SignState;

use crate::digest::{md5_bytes, parse_md5_hex};
use crate::request::SignRequest;
use crate::url::extract_api_path;

/// The 144-byte signing payload.
/// Carries the identity cookie, so the buffer is wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Payload([u8; PAYLOAD_LENGTH]);

impl Payload {
    pub fn as_bytes(&self) -> &[u8; PAYLOAD_LENGTH] { &self.0 }

    pub fn to_vec(&self) -> Vec<u8> { self.0.to_vec() }

    pub fn version(&self) -> [u8; 4] { self.array(offsets::VERSION) }

    pub fn seed(&self) -> u32 { u32::from_le_bytes(self.array(offsets::SEED)) }

    /// Low byte of the seed; the XOR mask for the MD5 and digest blocks.
    pub fn seed_byte(&self) -> u8 { self.0[offsets::SEED] }

    pub fn timestamp_ms(&self) -> u64 { u64::from_le_bytes(self.array(offsets::TIMESTAMP)) }

    pub fn page_load_timestamp(&self) -> u64 {
        u64::from_le_bytes(self.array(offsets::PAGE_LOAD_TIMESTAMP))
    }

    pub fn sequence_value(&self) -> u32 { u32::from_le_bytes(self.array(offsets::SEQUENCE)) }

    pub fn window_props_length(&self) -> u32 {
        u32::from_le_bytes(self.array(offsets::WINDOW_PROPS))
    }

    pub fn uri_length(&self) -> u32 { u32::from_le_bytes(self.array(offsets::URI_LENGTH)) }

    fn array<const N: usize>(&self, at: usize) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.0[at..at + N]);
        out
    }
}

impl core::fmt::Debug for Payload {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Identity bytes stay out of logs
        f.debug_struct("Payload")
            .field("seed", &self.seed())
            .field("timestamp_ms", &self.timestamp_ms())
            .finish_non_exhaustive()
    }
}

/// Where the four session-dependent fields come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldSource {
    Session,
    Random,
}

/// Values for the session-dependent fields, resolved before any byte is written.
#[derive(Debug, Clone, Copy)]
struct SessionFields {
    source: FieldSource,
    page_load_ms: u64,
    sequence: u32,
    window_props: u32,
    uri_length: u32,
}

/// Zero-padded, length-prefixed text field. The prefix is the padded width.
struct PrefixedField<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> PrefixedField<N> {
    fn encode(value: &str, name: &str) -> Self {
        let raw = value.as_bytes();
        if raw.len() > N {
            // Cut on the byte form, even mid-character
            warn!("[PAYLOAD] {} truncated from {} to {} bytes", name, raw.len(), N);
        }
        let take = raw.len().min(N);
        let mut bytes = [0u8; N];
        bytes[..take].copy_from_slice(&raw[..take]);
        Self { bytes }
    }

    fn prefix(&self) -> u8 { N as u8 }
}

impl<const N: usize> Drop for PrefixedField<N> {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// Fixed-capacity cursor over the payload buffer.
struct Assembler {
    buf: [u8; PAYLOAD_LENGTH],
    pos: usize,
}

impl Assembler {
    fn new() -> Self {
        Self { buf: [0u8; PAYLOAD_LENGTH], pos: 0 }
    }

    fn put(&mut self, segment: &[u8]) -> XsResult<()> {
        let end = self.pos + segment.len();
        if end > PAYLOAD_LENGTH {
            return Err(XsError::ConfigurationInvariantViolation);
        }
        self.buf[self.pos..end].copy_from_slice(segment);
        self.pos = end;
        Ok(())
    }

    fn finish(mut self) -> XsResult<Payload> {
        if self.pos != PAYLOAD_LENGTH {
            self.buf.zeroize();
            return Err(XsError::ConfigurationInvariantViolation);
        }
        Ok(Payload(self.buf))
    }
}

/// The Payload Builder.
/// Stateless apart from the read-only parameter table; safe to share.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    config: SignConfig,
    mixer: DigestMixer,
}

impl PayloadBuilder {
    pub fn new(config: SignConfig) -> XsResult<Self> {
        config.validate()?;
        let mixer = DigestMixer::new(config.hash_iv);
        Ok(Self { config, mixer })
    }

    pub fn config(&self) -> &SignConfig { &self.config }

    /// Builds with the clock's current time.
    pub fn build_now<R: BoundedRandom + ?Sized>(
        &self,
        request: &SignRequest<'_>,
        clock: &dyn WallClock,
        session: Option<&SignState>,
        rng: &mut R,
    ) -> XsResult<Payload> {
        self.build(request, clock.now_ms(), session, rng)
    }

    /// Assembles the payload.
    ///
    /// # Arguments
    /// * `timestamp_ms` - Request time, Unix milliseconds.
    /// * `session` - Snapshot from a `SignSession`; `None` draws fresh values.
    /// * `rng` - Consumes one seed draw, plus three more without a session.
    pub fn build<R: BoundedRandom + ?Sized>(
        &self,
        request: &SignRequest<'_>,
        timestamp_ms: u64,
        session: Option<&SignState>,
        rng: &mut R,
    ) -> XsResult<Payload> {
        // 0. Validate before anything is drawn or written
        let md5 = parse_md5_hex(request.md5_hex)?;

        // 1. Seed
        let seed = rng.random_u32();
        let seed_byte = (seed & 0xFF) as u8;

        // 2. Resolve field sources
        let fields = self.resolve_fields(request, timestamp_ms, session, rng);
        debug!(
            "[PAYLOAD] seed_byte={:#04x} source={:?} seq={} props={} uri_len={}",
            seed_byte, fields.source, fields.sequence, fields.window_props, fields.uri_length
        );

        // 3. Derived blocks
        let ts_bytes: [u8; TIMESTAMP_LE_LENGTH] = int_to_le_bytes(timestamp_ms);

        let mut md5_xor = [0u8; MD5_XOR_LENGTH];
        for (out, b) in md5_xor.iter_mut().zip(md5.iter()) {
            *out = b ^ seed_byte;
        }

        let a1 = PrefixedField::<A1_LENGTH>::encode(request.a1, "a1");
        let app_id = PrefixedField::<APP_ID_LENGTH>::encode(request.app_id, "app_id");

        let env_block = self.env_block(seed_byte);
        let a3_digest = self.a3_digest(&ts_bytes, request.uri_and_body, seed_byte)?;

        // 4. Emit, in layout order
        let mut asm = Assembler::new();
        asm.put(&self.config.version_bytes)?;
        asm.put(&int_to_le_bytes::<SEED_LENGTH>(seed as u64))?;
        asm.put(&ts_bytes)?;
        asm.put(&int_to_le_bytes::<TIMESTAMP_LE_LENGTH>(fields.page_load_ms))?;
        asm.put(&int_to_le_bytes::<COUNTER_LENGTH>(fields.sequence as u64))?;
        asm.put(&int_to_le_bytes::<COUNTER_LENGTH>(fields.window_props as u64))?;
        asm.put(&int_to_le_bytes::<COUNTER_LENGTH>(fields.uri_length as u64))?;
        asm.put(&md5_xor)?;
        asm.put(&[a1.prefix()])?;
        asm.put(&a1.bytes)?;
        asm.put(&[app_id.prefix()])?;
        asm.put(&app_id.bytes)?;
        asm.put(&env_block)?;
        asm.put(&self.config.a3_prefix)?;
        asm.put(&a3_digest)?;
        asm.finish()
    }

    fn resolve_fields<R: BoundedRandom + ?Sized>(
        &self,
        request: &SignRequest<'_>,
        timestamp_ms: u64,
        session: Option<&SignState>,
        rng: &mut R,
    ) -> SessionFields {
        match session {
            Some(state) => SessionFields {
                source: FieldSource::Session,
                page_load_ms: state.page_load_timestamp(),
                sequence: state.sequence_value(),
                window_props: state.window_props_length(),
                uri_length: state.uri_length(),
            },
            None => {
                let offset_s = rng.draw(self.config.time_offset);
                let sequence = rng.draw(self.config.sequence);
                let window_props = rng.draw(self.config.window_props);
                SessionFields {
                    source: FieldSource::Random,
                    page_load_ms: timestamp_ms.saturating_sub(offset_s as u64 * 1000),
                    sequence,
                    window_props,
                    uri_length: request.uri_and_body.len().min(u32::MAX as usize) as u32,
                }
            }
        }
    }

    fn env_block(&self, seed_byte: u8) -> [u8; ENV_BLOCK_LENGTH] {
        let table = &self.config.env_table;
        let checks = &self.config.env_checks;

        let mut block = [0u8; ENV_BLOCK_LENGTH];
        block[0] = ENV_BLOCK_MARKER;
        block[1] = seed_byte ^ table[0];
        for i in 1..ENV_TABLE_LEN {
            block[i + 1] = table[i] ^ checks[i];
        }
        block
    }

    /// Mixer over `timestamp || md5(api_path)`, masked with the seed byte.
    fn a3_digest(
        &self,
        ts_bytes: &[u8; TIMESTAMP_LE_LENGTH],
        uri_and_body: &str,
        seed_byte: u8,
    ) -> XsResult<[u8; DIGEST_LENGTH]> {
        let path_md5 = md5_bytes(extract_api_path(uri_and_body).as_bytes());

        let mut input = [0u8; TIMESTAMP_LE_LENGTH + 16];
        input[..TIMESTAMP_LE_LENGTH].copy_from_slice(ts_bytes);
        input[TIMESTAMP_LE_LENGTH..].copy_from_slice(&path_md5);

        let mut digest = self.mixer.digest(&input)?;
        for b in digest.iter_mut() {
            *b ^= seed_byte;
        }
        Ok(digest)
    }
}
