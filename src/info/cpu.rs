use tokio::sync::broadcast;

use super::{pending, record};
use crate::{SensorHub, event::CpuEvent, history::HistoryBuffer, observable::Observable};

/// Load of one selected core, plus the core and process counts.
pub struct CpuInfo {
    events: broadcast::Receiver<CpuEvent>,
    /// 0 is the mean of all cores, N is the Nth core.
    pub cpu: Observable<usize>,
    pub percent: Observable<f64>,
    pub percent_sys: Observable<f64>,
    pub nof_cpu: Observable<usize>,
    pub nof_proc: Observable<usize>,
    /// Two columns: user percent, system percent.
    pub cpu_history: HistoryBuffer,
    /// One column: process count, pushed whenever it changes.
    pub proc_history: HistoryBuffer,
}

impl CpuInfo {
    pub fn new(hub: &SensorHub) -> Self {
        let state = hub.cpu_state();

        Self {
            events: hub.subscribe_cpu(),
            cpu: Observable::new(0),
            percent: Observable::new(0.0),
            percent_sys: Observable::new(0.0),
            nof_cpu: Observable::new(state.nof_cpu),
            nof_proc: Observable::new(state.nof_proc),
            cpu_history: HistoryBuffer::new(hub.history_duration(), 2),
            proc_history: HistoryBuffer::new(hub.history_duration(), 1),
        }
    }

    /// Selects the core to follow. Returns whether it changed.
    pub fn set_cpu(&mut self, cpu: usize) -> bool {
        self.cpu.set(cpu)
    }

    fn apply(&mut self, event: CpuEvent) -> bool {
        match event {
            CpuEvent::LoadChanged { cpu, user, system } => {
                if cpu != self.cpu.value() {
                    return false;
                }

                record(&mut self.cpu_history, "CpuInfo", &[user, system]);
                let percent = self.percent.set(user);
                let percent_sys = self.percent_sys.set(system);
                percent || percent_sys
            }
            CpuEvent::NofCpuChanged(nof_cpu) => self.nof_cpu.set(nof_cpu),
            CpuEvent::NofProcChanged(nof_proc) => {
                record(&mut self.proc_history, "CpuInfo", &[nof_proc as f64]);
                self.nof_proc.set(nof_proc)
            }
            CpuEvent::Updated => false,
        }
    }

    /// Applies pending events. Returns whether any property changed.
    pub fn sync(&mut self) -> bool {
        let mut changed = false;
        for event in pending(&mut self.events, "CpuInfo") {
            changed |= self.apply(event);
        }
        changed
    }
}
