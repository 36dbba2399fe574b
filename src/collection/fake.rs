//! A scripted [`SystemSource`] for driving sensors in tests.

use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use hashbrown::{HashMap, HashSet};

use super::{
    CollectionError, CollectionResult, CpuLoad, DiskUsage, IoCounters, NetCounters, Partition,
    Pid, SystemSource, VirtualMemory,
};

/// Returns whatever its fields currently hold. The clock only moves when
/// [`FakeSource::advance`] is called, so rates come out exact.
#[derive(Clone, Debug)]
pub struct FakeSource {
    pub start: Instant,
    /// How far [`SystemSource::now`] is past `start`.
    pub elapsed: Duration,

    pub cpu_loads: Vec<CpuLoad>,
    pub process_count: usize,
    pub partitions: Vec<Partition>,
    /// Paths that [`SystemSource::path_is_dir`] accepts.
    pub dirs: HashSet<PathBuf>,
    pub usage: HashMap<PathBuf, DiskUsage>,
    pub disk_io: HashMap<String, IoCounters>,
    pub memory: VirtualMemory,
    pub swap_percent: f64,
    pub net_io: HashMap<String, NetCounters>,
    pub net_up: HashMap<String, bool>,
    /// When set, every query fails like a broken platform call would.
    pub failing: bool,
}

impl Default for FakeSource {
    fn default() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Duration::ZERO,
            cpu_loads: Vec::new(),
            process_count: 0,
            partitions: Vec::new(),
            dirs: HashSet::new(),
            usage: HashMap::new(),
            disk_io: HashMap::new(),
            memory: VirtualMemory::default(),
            swap_percent: 0.0,
            net_io: HashMap::new(),
            net_up: HashMap::new(),
            failing: false,
        }
    }
}

impl FakeSource {
    /// Moves the clock forward.
    pub fn advance(&mut self, by: Duration) {
        self.elapsed += by;
    }

    /// Adds a partition that is a valid directory with the given usage.
    pub fn add_partition(&mut self, mount_point: &str, device: &str, usage: DiskUsage) {
        self.partitions.push(Partition::new(mount_point, device));
        self.dirs.insert(PathBuf::from(mount_point));
        self.usage.insert(PathBuf::from(mount_point), usage);
    }

    pub fn set_disk_io(&mut self, disk: &str, read_bytes: u64, write_bytes: u64) {
        self.disk_io
            .insert(disk.to_string(), IoCounters::new(read_bytes, write_bytes));
    }

    pub fn set_net_io(&mut self, interface: &str, recv_bytes: u64, sent_bytes: u64) {
        self.net_io
            .insert(interface.to_string(), NetCounters::new(recv_bytes, sent_bytes));
    }

    fn check(&self) -> CollectionResult<()> {
        if self.failing {
            Err(CollectionError::from_str("scripted failure"))
        } else {
            Ok(())
        }
    }
}

impl SystemSource for FakeSource {
    fn now(&self) -> Instant {
        self.start + self.elapsed
    }

    fn cpu_utilization(&mut self) -> CollectionResult<Vec<CpuLoad>> {
        self.check()?;
        Ok(self.cpu_loads.clone())
    }

    fn process_ids(&mut self) -> CollectionResult<Vec<Pid>> {
        self.check()?;
        Ok((1..=self.process_count as Pid).collect())
    }

    fn partitions(&mut self) -> CollectionResult<Vec<Partition>> {
        self.check()?;
        Ok(self.partitions.clone())
    }

    fn path_is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    fn disk_usage(&mut self, path: &Path) -> CollectionResult<DiskUsage> {
        self.check()?;
        self.usage
            .get(path)
            .copied()
            .ok_or_else(|| CollectionError::NotFound(path.display().to_string()))
    }

    fn disk_io_counters(&mut self) -> CollectionResult<HashMap<String, IoCounters>> {
        self.check()?;
        Ok(self.disk_io.clone())
    }

    fn virtual_memory(&mut self) -> CollectionResult<VirtualMemory> {
        self.check()?;
        Ok(self.memory)
    }

    fn swap_memory(&mut self) -> CollectionResult<f64> {
        self.check()?;
        Ok(self.swap_percent)
    }

    fn net_io_counters(&mut self) -> CollectionResult<HashMap<String, NetCounters>> {
        self.check()?;
        Ok(self.net_io.clone())
    }

    fn net_interface_status(&mut self) -> CollectionResult<HashMap<String, bool>> {
        self.check()?;
        Ok(self.net_up.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builds_with_struct_update() {
        let mut source = FakeSource {
            process_count: 2,
            ..Default::default()
        };
        let start = source.now();

        source.advance(Duration::from_secs(3));
        assert_eq!(source.now() - start, Duration::from_secs(3));
        assert_eq!(source.process_ids().unwrap(), vec![1, 2]);

        source.failing = true;
        assert!(source.process_ids().is_err());
    }
}
