//! Memory and swap usage, on every slow tick.
//!
//! Unlike the other sensors, this one always publishes, even if nothing changed.
//! It also owns its history, since there is only one memory to show.

use std::sync::PoisonError;

use log::{debug, warn};
use tokio::sync::broadcast;

use super::{Sensor, publish};
use crate::{
    collection::SystemSource,
    event::{MemoryEvent, MemorySample},
    history::SharedHistory,
    trigger::Cadence,
    utils::data_units::bytes_to_text,
};

pub struct MemorySensor {
    events: broadcast::Sender<MemoryEvent>,
    /// Two columns: memory percent, swap percent.
    history: SharedHistory,
}

impl MemorySensor {
    pub const HISTORY_COLUMNS: usize = 2;

    pub fn new(events: broadcast::Sender<MemoryEvent>, history: SharedHistory) -> Self {
        Self { events, history }
    }

    fn sample(source: &mut dyn SystemSource) -> MemorySample {
        let vmem = source.virtual_memory().unwrap_or_else(|err| {
            warn!("MemorySensor: failed to read memory: {err}");
            Default::default()
        });
        let swapmem_percent = source.swap_memory().unwrap_or_else(|err| {
            warn!("MemorySensor: failed to read swap: {err}");
            0.0
        });

        MemorySample {
            vmem_percent: vmem.percent,
            vmem_avail_bytes: vmem.available_bytes,
            vmem_avail_text: bytes_to_text(vmem.available_bytes),
            swapmem_percent,
        }
    }

    fn poll(&mut self, source: &mut dyn SystemSource) {
        let sample = Self::sample(source);
        debug!(
            "MemorySensor: {:5.1}% memory, {:5.1}% swap",
            sample.vmem_percent, sample.swapmem_percent
        );

        let pushed = self
            .history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(&[sample.vmem_percent, sample.swapmem_percent]);
        if let Err(err) = pushed {
            warn!("MemorySensor: {err}");
        }

        publish(&self.events, MemoryEvent::Updated(sample));
    }
}

impl Sensor for MemorySensor {
    fn triggered(&mut self, cadence: Cadence, source: &mut dyn SystemSource) {
        if cadence == Cadence::Slow {
            self.poll(source);
        }
    }

    /// There are no baselines or deduplication to forget.
    fn reset(&mut self) {}
}
