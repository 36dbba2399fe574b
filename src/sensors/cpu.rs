//! Per-core load and process count, on every fast tick.

use log::{debug, info, warn};
use tokio::sync::{broadcast, watch};

use super::{Sensor, publish};
use crate::{
    collection::{CpuLoad, SystemSource},
    event::CpuEvent,
    trigger::Cadence,
};

/// The latest counts, for views that subscribe after they were published.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuState {
    pub nof_cpu: usize,
    pub nof_proc: usize,
}

pub struct CpuSensor {
    events: broadcast::Sender<CpuEvent>,
    state: watch::Sender<CpuState>,
    nof_cpu: Option<usize>,
    nof_proc: Option<usize>,
}

impl CpuSensor {
    pub fn new(events: broadcast::Sender<CpuEvent>, state: watch::Sender<CpuState>) -> Self {
        Self {
            events,
            state,
            nof_cpu: None,
            nof_proc: None,
        }
    }

    fn set_nof_cpu(&mut self, nof_cpu: usize) {
        if self.nof_cpu != Some(nof_cpu) {
            self.nof_cpu = Some(nof_cpu);
            info!("CpuSensor: {nof_cpu} CPUs");
            self.state.send_modify(|state| state.nof_cpu = nof_cpu);
            publish(&self.events, CpuEvent::NofCpuChanged(nof_cpu));
        }
    }

    fn set_nof_proc(&mut self, nof_proc: usize) {
        if self.nof_proc != Some(nof_proc) {
            self.nof_proc = Some(nof_proc);
            debug!("CpuSensor: {nof_proc} processes");
            self.state.send_modify(|state| state.nof_proc = nof_proc);
            publish(&self.events, CpuEvent::NofProcChanged(nof_proc));
        }
    }

    fn publish_loads(&self, loads: &[CpuLoad]) {
        let Some(mean) = CpuLoad::mean(loads) else {
            return;
        };

        for (cpu, load) in std::iter::once(&mean).chain(loads).enumerate() {
            debug!(
                "CpuSensor: [{cpu}] {:5.1}% {:5.1}%",
                load.user, load.system
            );
            publish(
                &self.events,
                CpuEvent::LoadChanged {
                    cpu,
                    user: load.user,
                    system: load.system,
                },
            );
        }
    }

    fn poll(&mut self, source: &mut dyn SystemSource) {
        match source.cpu_utilization() {
            Ok(loads) => {
                self.set_nof_cpu(loads.len());
                self.publish_loads(&loads);
            }
            Err(err) => warn!("CpuSensor: failed to read cpu load: {err}"),
        }

        match source.process_ids() {
            Ok(pids) => self.set_nof_proc(pids.len()),
            Err(err) => warn!("CpuSensor: failed to list processes: {err}"),
        }

        publish(&self.events, CpuEvent::Updated);
    }
}

impl Sensor for CpuSensor {
    fn triggered(&mut self, cadence: Cadence, source: &mut dyn SystemSource) {
        if cadence == Cadence::Fast {
            self.poll(source);
        }
    }

    fn reset(&mut self) {
        self.nof_cpu = None;
        self.nof_proc = None;
    }
}
