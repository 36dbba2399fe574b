//! Everything that talks to the operating system.
//!
//! Sensors never query the OS directly; they go through [`SystemSource`], which
//! [`SysinfoSource`] implements for real and [`fake::FakeSource`] implements for tests.

pub mod cpu;
pub mod disks;
pub mod error;
pub mod fake;
pub mod memory;
pub mod network;

#[cfg(target_os = "linux")]
mod linux {
    pub mod utils;
}

use std::{path::Path, time::Instant};

use hashbrown::HashMap;

pub use self::{
    cpu::CpuLoad,
    disks::{DiskUsage, IoCounters, Partition},
    error::{CollectionError, CollectionResult},
    memory::VirtualMemory,
    network::NetCounters,
};

pub type Pid = u32;

/// The OS queries the sensors are built on. These are synchronous and are
/// expected to return promptly; callers never retry them.
pub trait SystemSource {
    /// The capture time for counter snapshots.
    fn now(&self) -> Instant {
        Instant::now()
    }

    /// Utilization of every logical core, in core order.
    fn cpu_utilization(&mut self) -> CollectionResult<Vec<CpuLoad>>;

    /// Ids of every running process.
    fn process_ids(&mut self) -> CollectionResult<Vec<Pid>>;

    /// Mounted partitions.
    fn partitions(&mut self) -> CollectionResult<Vec<Partition>>;

    /// Whether `path` currently exists and is a directory. This must never block
    /// on a user prompt, even for an ejected drive.
    fn path_is_dir(&self, path: &Path) -> bool {
        disks::is_dir_quietly(path)
    }

    /// Usage of the filesystem holding `path`. A missing path is
    /// [`CollectionError::NotFound`].
    fn disk_usage(&mut self, path: &Path) -> CollectionResult<DiskUsage>;

    /// Cumulative read/write byte counters per disk device.
    fn disk_io_counters(&mut self) -> CollectionResult<HashMap<String, IoCounters>>;

    fn virtual_memory(&mut self) -> CollectionResult<VirtualMemory>;

    /// Swap usage in percent.
    fn swap_memory(&mut self) -> CollectionResult<f64>;

    /// Cumulative receive/send byte counters per network interface.
    fn net_io_counters(&mut self) -> CollectionResult<HashMap<String, NetCounters>>;

    /// Whether each network interface is up.
    fn net_interface_status(&mut self) -> CollectionResult<HashMap<String, bool>>;
}

/// A wrapper around the sysinfo data source. We use sysinfo for the following
/// data:
/// - CPU usage (non-Linux)
/// - Process ids
/// - Memory usage
/// - Network usage
/// - Disk partitions, usage and I/O (non-Linux)
#[derive(Debug)]
pub struct SysinfoSource {
    pub(crate) system: sysinfo::System,
    pub(crate) networks: sysinfo::Networks,
    #[cfg(not(target_os = "linux"))]
    pub(crate) disks: sysinfo::Disks,
    #[cfg(target_os = "linux")]
    pub(crate) prev_cpu_times: Vec<(usize, cpu::CpuTimes)>,
}

impl Default for SysinfoSource {
    fn default() -> Self {
        use sysinfo::*;

        Self {
            system: System::new(),
            networks: Networks::new_with_refreshed_list(),
            #[cfg(not(target_os = "linux"))]
            disks: Disks::new_with_refreshed_list(),
            #[cfg(target_os = "linux")]
            prev_cpu_times: Vec::new(),
        }
    }
}

impl SystemSource for SysinfoSource {
    fn cpu_utilization(&mut self) -> CollectionResult<Vec<CpuLoad>> {
        cpu::get_cpu_loads(self)
    }

    fn process_ids(&mut self) -> CollectionResult<Vec<Pid>> {
        use sysinfo::{ProcessRefreshKind, ProcessesToUpdate};

        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing(),
        );

        Ok(self
            .system
            .processes()
            .keys()
            .map(|pid| pid.as_u32())
            .collect())
    }

    fn partitions(&mut self) -> CollectionResult<Vec<Partition>> {
        disks::get_partitions(self)
    }

    fn disk_usage(&mut self, path: &Path) -> CollectionResult<DiskUsage> {
        disks::get_disk_usage(self, path)
    }

    fn disk_io_counters(&mut self) -> CollectionResult<HashMap<String, IoCounters>> {
        disks::get_io_counters(self)
    }

    fn virtual_memory(&mut self) -> CollectionResult<VirtualMemory> {
        self.system.refresh_memory();
        memory::get_virtual_memory(&self.system)
    }

    fn swap_memory(&mut self) -> CollectionResult<f64> {
        self.system.refresh_memory();
        Ok(memory::get_swap_percent(&self.system))
    }

    fn net_io_counters(&mut self) -> CollectionResult<HashMap<String, NetCounters>> {
        self.networks.refresh(true);
        Ok(network::get_net_counters(&self.networks))
    }

    fn net_interface_status(&mut self) -> CollectionResult<HashMap<String, bool>> {
        self.networks.refresh(true);
        network::get_interface_status(&self.networks)
    }
}

/// Rounds a percentage to one decimal, which keeps the last digit from flickering
/// and making every poll look like a change.
#[inline]
pub(crate) fn round_percent(percent: f64) -> f64 {
    (percent * 10.0).round() / 10.0
}

/// Returns `part` as a percentage of `total`, or 0 for an empty total.
#[inline]
pub(crate) fn percent_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        round_percent(part as f64 / total as f64 * 100.0)
    }
}
