use tokio::sync::broadcast;

use super::pending;
use crate::{
    SensorHub,
    event::{MemoryEvent, MemorySample},
    history::SharedHistory,
    observable::Observable,
};

/// Memory and swap usage.
pub struct MemInfo {
    events: broadcast::Receiver<MemoryEvent>,
    pub vmem_percent: Observable<f64>,
    pub vmem_avail_bytes: Observable<u64>,
    pub vmem_avail_text: Observable<String>,
    pub swapmem_percent: Observable<f64>,
    /// The memory sensor's own history: memory percent, swap percent. Views only
    /// read it.
    pub history: SharedHistory,
}

impl MemInfo {
    pub fn new(hub: &SensorHub) -> Self {
        Self {
            events: hub.subscribe_memory(),
            vmem_percent: Observable::new(0.0),
            vmem_avail_bytes: Observable::new(0),
            vmem_avail_text: Observable::default(),
            swapmem_percent: Observable::new(0.0),
            history: hub.memory_history(),
        }
    }

    fn apply(&mut self, sample: MemorySample) -> bool {
        let changes = [
            self.vmem_percent.set(sample.vmem_percent),
            self.vmem_avail_bytes.set(sample.vmem_avail_bytes),
            self.vmem_avail_text.set(sample.vmem_avail_text),
            self.swapmem_percent.set(sample.swapmem_percent),
        ];
        changes.contains(&true)
    }

    /// Applies pending events. Returns whether any property changed.
    pub fn sync(&mut self) -> bool {
        let mut changed = false;
        for MemoryEvent::Updated(sample) in pending(&mut self.events, "MemInfo") {
            changed |= self.apply(sample);
        }
        changed
    }
}
