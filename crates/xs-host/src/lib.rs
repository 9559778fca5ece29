use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use log::{debug, info};
use rand::RngCore;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;

use xs_core::{SignConfig, DEFAULT_APP_ID};
use xs_encode::build_x3;
use xs_hal::{RngSource, WallClock};
use xs_payload::{md5_hex, Payload, PayloadBuilder, SignRequest};
use xs_session::SignSession;

pub mod target;

pub type SeededRandom = RngSource<ChaCha20Rng>;

/// Reproducible source for replays.
pub fn seeded_random(seed: u64) -> SeededRandom {
    RngSource::new(ChaCha20Rng::seed_from_u64(seed))
}

/// ChaCha20 keyed from the OS thread generator.
pub fn entropy_random() -> SeededRandom {
    let mut seed = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut seed);
    RngSource::new(ChaCha20Rng::from_seed(seed))
}

/// Unix wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Counters evolve across calls like a live page.
    Simulated,
    /// Every call draws fresh values.
    Stateless,
}

pub struct SignedRequest {
    pub payload: Payload,
    pub x3: String,
}

/// Hosted signer: one simulated page session plus a builder and encoder.
pub struct HostSigner<C = SystemClock> {
    builder: PayloadBuilder,
    session: Option<SignSession<SeededRandom>>,
    rng: SeededRandom,
    clock: C,
    app_id: String,
}

impl HostSigner<SystemClock> {
    pub fn new(config: SignConfig, mode: SessionMode, seed: Option<u64>) -> anyhow::Result<Self> {
        Self::with_clock(config, mode, seed, SystemClock)
    }
}

impl<C: WallClock> HostSigner<C> {
    pub fn with_clock(config: SignConfig, mode: SessionMode, seed: Option<u64>, clock: C) -> anyhow::Result<Self> {
        let mut rng = match seed {
            Some(s) => seeded_random(s),
            None => entropy_random(),
        };

        let session = match mode {
            SessionMode::Simulated => {
                let session_rng = seeded_random(rng.0.next_u64());
                let s = SignSession::new(&config, &clock, session_rng)
                    .context("session config rejected")?;
                Some(s)
            }
            SessionMode::Stateless => None,
        };

        let builder = PayloadBuilder::new(config).context("payload config rejected")?;

        info!("[HOST] signer ready (mode={:?}, seeded={})", mode, seed.is_some());

        Ok(Self { builder, session, rng, clock, app_id: DEFAULT_APP_ID.to_string() })
    }

    pub fn set_app_id(&mut self, app_id: &str) {
        self.app_id = app_id.to_string();
    }

    pub fn session(&self) -> Option<&SignSession<SeededRandom>> {
        self.session.as_ref()
    }

    /// Signs `uri` (+ optional JSON body or query suffix) for cookie `a1`.
    pub fn sign(&mut self, uri: &str, body: Option<&str>, a1: &str) -> anyhow::Result<SignedRequest> {
        let content = format!("{}{}", uri, body.unwrap_or(""));
        let digest = md5_hex(content.as_bytes());

        let state = self.session.as_mut().map(|s| s.snapshot(uri));
        let request = SignRequest::new(&digest, a1).app_id(&self.app_id).content(&content);

        let payload = self
            .builder
            .build_now(&request, &self.clock, state.as_ref(), &mut self.rng)
            .with_context(|| format!("payload assembly failed for {}", uri))?;
        let x3 = build_x3(&payload);

        debug!("[HOST] signed {} ({} chars)", uri, x3.len());
        Ok(SignedRequest { payload, x3 })
    }
}
