//! Prints one line per slow tick instead of drawing the dashboard.

use std::{
    io::Write,
    sync::atomic::{AtomicBool, Ordering},
};

use anyhow::Result;
use log::{info, warn};
use tokio::sync::broadcast::error::RecvError;

use crate::{
    SensorHub,
    info::{CpuInfo, DiskInfo, MemInfo, NetworkInterfaceInfo, PartitionInfo},
    options::ViewSelection,
};

/// The views behind one output line.
pub struct Headless {
    cpu: CpuInfo,
    mem: MemInfo,
    disk: DiskInfo,
    partition: PartitionInfo,
    network: NetworkInterfaceInfo,
}

impl Headless {
    pub fn new(hub: &SensorHub, view: &ViewSelection) -> Self {
        let mut cpu = CpuInfo::new(hub);
        cpu.set_cpu(view.core);

        let mut disk = DiskInfo::new(hub);
        disk.set_disk(view.disk.as_str());

        let mut partition = PartitionInfo::new(hub);
        partition.set_path(view.partition.as_str());

        let mut network = NetworkInterfaceInfo::new(hub);
        network.set_name(view.interface.as_str());

        Self {
            cpu,
            mem: MemInfo::new(hub),
            disk,
            partition,
            network,
        }
    }

    pub fn sync(&mut self) {
        self.cpu.sync();
        self.mem.sync();
        self.disk.sync();
        self.partition.sync();
        self.network.sync();
    }

    /// Formats the current values.
    pub fn line(&self) -> String {
        let partition = if self.partition.avail.value() {
            format!(
                "{} {:.1}% free {}",
                self.partition.path().get(),
                self.partition.percent.value(),
                self.partition.free_text.get()
            )
        } else {
            format!("{} unavailable", self.partition.path().get())
        };

        let name = self.network.name.get();
        let interface = match (name.is_empty(), self.network.is_up.value()) {
            (true, _) => "all".to_string(),
            (false, true) => format!("{name} up"),
            (false, false) => format!("{name} down"),
        };

        format!(
            "cpu {:.1}% sys {:.1}% procs {} | mem {:.1}% avail {} swap {:.1}% | disk {} read {} write {} | part {} | net {} recv {} sent {}",
            self.cpu.percent.value(),
            self.cpu.percent_sys.value(),
            self.cpu.nof_proc.value(),
            self.mem.vmem_percent.value(),
            self.mem.vmem_avail_text.get(),
            self.mem.swapmem_percent.value(),
            if self.disk.disk.get().is_empty() { "all" } else { self.disk.disk.get().as_str() },
            self.disk.read_text.get(),
            self.disk.write_text.get(),
            partition,
            interface,
            self.network.recv_text.get(),
            self.network.sent_text.get(),
        )
    }
}

/// Writes a line to `out` after every memory sample, which arrives once per slow
/// tick. Stops after `count` lines, when `is_terminated` is set, or when the
/// sampler goes away. Returns how many lines were written.
pub fn run_headless<W: Write>(
    hub: &SensorHub, view: &ViewSelection, count: Option<u64>, is_terminated: &AtomicBool,
    out: &mut W,
) -> Result<u64> {
    let mut headless = Headless::new(hub, view);
    let mut samples = hub.subscribe_memory();
    let mut written = 0;

    info!("Headless: started");

    while count.map_or(true, |count| written < count) && !is_terminated.load(Ordering::SeqCst) {
        match samples.blocking_recv() {
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!("Headless: skipped {skipped} samples");
                continue;
            }
            Err(RecvError::Closed) => break,
        }

        headless.sync();
        writeln!(out, "{}", headless.line())?;
        out.flush()?;
        written += 1;
    }

    info!("Headless: wrote {written} lines");

    Ok(written)
}
