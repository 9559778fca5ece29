#![no_std]
#![forbid(unsafe_code)]

use rand::Rng;
use rand_core::RngCore;
use xs_core::DrawRange;

/// The Bounded Random Provider.
/// INVARIANT: Must be Non-Blocking.
pub trait BoundedRandom {
    /// One unsigned 32-bit draw, used as the payload seed.
    fn random_u32(&mut self) -> u32;

    /// Uniform draw in `[min, max]`, inclusive on both ends.
    fn random_in_range(&mut self, min: u32, max: u32) -> u32;

    fn draw(&mut self, range: DrawRange) -> u32 {
        self.random_in_range(range.min, range.max)
    }
}

/// The Wall Clock (Unix epoch, milliseconds).
pub trait WallClock {
    fn now_ms(&self) -> u64;
}

impl<T: BoundedRandom + ?Sized> BoundedRandom for &mut T {
    fn random_u32(&mut self) -> u32 { (**self).random_u32() }
    fn random_in_range(&mut self, min: u32, max: u32) -> u32 { (**self).random_in_range(min, max) }
}

impl<T: WallClock + ?Sized> WallClock for &T {
    fn now_ms(&self) -> u64 { (**self).now_ms() }
}

/// Adapts any `rand_core` generator into a `BoundedRandom` provider.
pub struct RngSource<R>(pub R);

impl<R: RngCore> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl<R: RngCore> BoundedRandom for RngSource<R> {
    fn random_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn random_in_range(&mut self, min: u32, max: u32) -> u32 {
        // Degenerate range: nothing to draw
        if min >= max { return min; }
        self.0.gen_range(min..=max)
    }
}

/// Fixed time source for replay and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl WallClock for FixedClock {
    fn now_ms(&self) -> u64 { self.0 }
}
