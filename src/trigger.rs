//! The periodic tick source that keeps all sensors in step.

use std::time::{Duration, Instant};

use crate::{constants::TICK_INTERVAL, utils::cancellation_token::CancellationToken};

/// How often a sensor wants to be polled, in ticks of the base interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cadence {
    /// Every tick.
    Fast,
    /// Every 4th tick.
    Medium,
    /// Every 8th tick.
    Slow,
}

impl Cadence {
    /// All cadences, fastest first. This is also the order they fire in on a tick.
    pub const ALL: [Cadence; 3] = [Cadence::Fast, Cadence::Medium, Cadence::Slow];

    /// The period of this cadence in ticks.
    pub const fn period(self) -> i64 {
        match self {
            Cadence::Fast => 1,
            Cadence::Medium => 4,
            Cadence::Slow => 8,
        }
    }

    /// Whether this cadence fires on the given tick.
    ///
    /// Note that medium and slow are independent moduli; a slow tick happens to
    /// also be a medium tick only because 4 divides 8.
    #[inline]
    pub fn fires_on(self, tick: i64) -> bool {
        tick % self.period() == 0
    }
}

/// The cadences that fired on one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fired {
    pub tick: i64,
}

impl Fired {
    /// Iterates over the cadences that fired, fastest first.
    pub fn cadences(&self) -> impl Iterator<Item = Cadence> {
        let tick = self.tick;
        Cadence::ALL
            .into_iter()
            .filter(move |cadence| cadence.fires_on(tick))
    }

    pub fn contains(&self, cadence: Cadence) -> bool {
        cadence.fires_on(self.tick)
    }
}

/// A periodic tick source.
///
/// The count starts at -1, so the first tick is tick 0 and fires every cadence.
#[derive(Debug)]
pub struct Trigger {
    count: i64,
    interval: Duration,
}

impl Default for Trigger {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

impl Trigger {
    pub fn new(interval: Duration) -> Self {
        Self {
            count: -1,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The last tick that fired, or -1 before the first one.
    pub fn count(&self) -> i64 {
        self.count
    }

    /// Moves to the next tick and returns what fired on it.
    pub fn advance(&mut self) -> Fired {
        self.count += 1;
        Fired { tick: self.count }
    }

    /// Ticks until `token` is cancelled, calling `on_fired` synchronously on every tick.
    ///
    /// The next wake-up is scheduled only after `on_fired` returns, so a slow handler
    /// delays the following tick rather than overlapping it. Missed wake-ups are
    /// never replayed.
    pub fn run(&mut self, token: &CancellationToken, mut on_fired: impl FnMut(Fired)) {
        loop {
            if token.is_cancelled() {
                break;
            }

            let start = Instant::now();
            let fired = self.advance();
            on_fired(fired);

            let remaining = self.interval.saturating_sub(start.elapsed());
            if token.sleep_with_cancellation(remaining) {
                break;
            }
        }

        log::debug!("Trigger: stopped after tick {}", self.count);
    }
}
