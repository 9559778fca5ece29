#![no_std]
#![forbid(unsafe_code)]

use log::debug;
use xs_core::{DrawRange, SignConfig, XsResult};
use xs_hal::{BoundedRandom, WallClock};

/// Immutable snapshot of the session counters for one signing call.
/// Only `SignSession::snapshot` can produce one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignState {
    page_load_timestamp: u64,
    sequence_value: u32,
    window_props_length: u32,
    uri_length: u32,
}

impl SignState {
    pub fn page_load_timestamp(&self) -> u64 { self.page_load_timestamp }
    pub fn sequence_value(&self) -> u32 { self.sequence_value }
    pub fn window_props_length(&self) -> u32 { self.window_props_length }
    pub fn uri_length(&self) -> u32 { self.uri_length }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Constructed, no snapshot taken yet.
    Fresh,
    Active,
}

/// The Session State Machine.
///
/// Simulates one page lifetime: the page-load timestamp is fixed at
/// construction while the sequence and window-props counters creep upward on
/// every snapshot. Not `Sync`-safe by contract: one session per logical
/// browsing session, serialized by the owner.
pub struct SignSession<R> {
    page_load_timestamp: u64,
    sequence_value: u32,
    window_props_length: u32,
    sequence_step: DrawRange,
    window_props_step: DrawRange,
    snapshots: u64,
    rng: R,
}

impl<R: BoundedRandom> SignSession<R> {
    pub fn new(config: &SignConfig, clock: &dyn WallClock, mut rng: R) -> XsResult<Self> {
        config.validate()?;

        let page_load_timestamp = clock.now_ms();
        let sequence_value = rng.draw(config.session_sequence_init);
        let window_props_length = rng.draw(config.session_window_props_init);

        debug!(
            "[SESSION] page_load={} seq={} props={}",
            page_load_timestamp, sequence_value, window_props_length
        );

        Ok(Self {
            page_load_timestamp,
            sequence_value,
            window_props_length,
            sequence_step: config.session_sequence_step,
            window_props_step: config.session_window_props_step,
            snapshots: 0,
            rng,
        })
    }

    /// Advances the counters, then captures them together with `uri`'s length.
    pub fn snapshot(&mut self, uri: &str) -> SignState {
        self.advance();
        self.snapshots += 1;

        SignState {
            page_load_timestamp: self.page_load_timestamp,
            sequence_value: self.sequence_value,
            window_props_length: self.window_props_length,
            // Character count, not UTF-8 length
            uri_length: uri.chars().count().min(u32::MAX as usize) as u32,
        }
    }

    fn advance(&mut self) {
        let seq_step = self.rng.draw(self.sequence_step);
        let props_step = self.rng.draw(self.window_props_step);

        // Saturate: counters never run backwards
        self.sequence_value = self.sequence_value.saturating_add(seq_step);
        self.window_props_length = self.window_props_length.saturating_add(props_step);

        debug!(
            "[SESSION] advance +{}/+{} -> seq={} props={}",
            seq_step, props_step, self.sequence_value, self.window_props_length
        );
    }

    pub fn phase(&self) -> SessionPhase {
        if self.snapshots == 0 { SessionPhase::Fresh } else { SessionPhase::Active }
    }

    pub fn page_load_timestamp(&self) -> u64 { self.page_load_timestamp }

    pub fn snapshots_taken(&self) -> u64 { self.snapshots }
}
