use tokio::sync::broadcast;

use super::{pending, record};
use crate::{
    SensorHub,
    event::{DiskEvent, SamplerCommand},
    history::HistoryBuffer,
    observable::Observable,
    utils::data_units::rate_to_text,
};

/// I/O rates of one disk, or of all of them.
pub struct DiskInfo {
    events: broadcast::Receiver<DiskEvent>,
    /// The disk to follow. An empty name is the sum of all disks.
    pub disk: Observable<String>,
    pub is_busy: Observable<bool>,
    pub read_bytes: Observable<u64>,
    pub read_text: Observable<String>,
    pub write_bytes: Observable<u64>,
    pub write_text: Observable<String>,
    /// Two columns: read rate, write rate.
    pub history: HistoryBuffer,
}

impl DiskInfo {
    pub fn new(hub: &SensorHub) -> Self {
        Self {
            events: hub.subscribe_disk(),
            disk: Observable::default(),
            is_busy: Observable::new(false),
            read_bytes: Observable::new(0),
            read_text: Observable::default(),
            write_bytes: Observable::new(0),
            write_text: Observable::default(),
            history: HistoryBuffer::new(hub.history_duration(), 2),
        }
    }

    pub fn set_disk(&mut self, disk: impl Into<String>) -> bool {
        self.disk.set(disk.into())
    }

    fn apply(&mut self, event: DiskEvent) -> bool {
        let DiskEvent::IoChanged { disk, read, write } = event else {
            return false;
        };

        if disk != *self.disk.get() {
            return false;
        }

        record(&mut self.history, "DiskInfo", &[read as f64, write as f64]);

        let changes = [
            self.read_bytes.set(read),
            self.read_text.set(rate_to_text(read)),
            self.write_bytes.set(write),
            self.write_text.set(rate_to_text(write)),
            self.is_busy.set(read + write != 0),
        ];
        changes.contains(&true)
    }

    /// Applies pending events. Returns whether any property changed.
    pub fn sync(&mut self) -> bool {
        let mut changed = false;
        for event in pending(&mut self.events, "DiskInfo") {
            changed |= self.apply(event);
        }
        changed
    }
}

/// The list of disk devices.
pub struct DisksInfo {
    events: broadcast::Receiver<DiskEvent>,
    pub disks: Observable<Vec<String>>,
    pub nof_disks: Observable<usize>,
}

impl DisksInfo {
    pub fn new(hub: &SensorHub) -> Self {
        let disks = hub.disk_state().disks;

        Self {
            events: hub.subscribe_disk(),
            nof_disks: Observable::new(disks.len()),
            disks: Observable::new(disks),
        }
    }

    /// Applies pending events. Returns whether any property changed.
    pub fn sync(&mut self) -> bool {
        let mut changed = false;
        for event in pending(&mut self.events, "DisksInfo") {
            if let DiskEvent::DisksChanged(disks) = event {
                changed |= self.nof_disks.set(disks.len());
                changed |= self.disks.set(disks);
            }
        }
        changed
    }
}

/// The list of mount points.
pub struct PartitionsInfo {
    events: broadcast::Receiver<DiskEvent>,
    pub paths: Observable<Vec<String>>,
}

impl PartitionsInfo {
    pub fn new(hub: &SensorHub) -> Self {
        let paths = hub
            .disk_state()
            .partitions
            .into_iter()
            .map(|partition| partition.mount_point)
            .collect();

        Self {
            events: hub.subscribe_disk(),
            paths: Observable::new(paths),
        }
    }

    /// Applies pending events. Returns whether any property changed.
    pub fn sync(&mut self) -> bool {
        let mut changed = false;
        for event in pending(&mut self.events, "PartitionsInfo") {
            if let DiskEvent::PartitionsChanged(paths) = event {
                changed |= self.paths.set(paths);
            }
        }
        changed
    }
}

/// Usage of one mount point.
///
/// The disk sensor only queries partitions somebody is looking at, so selecting a
/// path registers it with the sampler, and dropping the view unregisters it.
pub struct PartitionInfo {
    hub: SensorHub,
    events: broadcast::Receiver<DiskEvent>,
    path: Observable<String>,
    /// The device mounted at `path`, or empty if it isn't known.
    pub disk: Observable<String>,
    pub percent: Observable<f64>,
    pub avail: Observable<bool>,
    pub free_bytes: Observable<u64>,
    pub free_text: Observable<String>,
}

impl PartitionInfo {
    pub fn new(hub: &SensorHub) -> Self {
        Self {
            hub: hub.clone(),
            events: hub.subscribe_disk(),
            path: Observable::default(),
            disk: Observable::default(),
            percent: Observable::new(0.0),
            avail: Observable::new(false),
            free_bytes: Observable::new(0),
            free_text: Observable::default(),
        }
    }

    pub fn path(&self) -> &Observable<String> {
        &self.path
    }

    /// Selects the mount point to follow. Returns whether it changed.
    pub fn set_path(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        let old = self.path.get().clone();

        if !self.path.set(path.clone()) {
            return false;
        }

        if !old.is_empty() {
            self.hub.send(SamplerCommand::UnwatchPartition(old));
        }
        if !path.is_empty() {
            self.hub.send(SamplerCommand::WatchPartition(path));
        }
        self.resolve_disk();

        true
    }

    fn resolve_disk(&mut self) -> bool {
        let state = self.hub.disk_state();
        let disk = state.device_of(self.path.get()).unwrap_or_default();
        self.disk.set(disk.to_string())
    }

    fn apply(&mut self, event: DiskEvent) -> bool {
        match event {
            DiskEvent::UsageChanged { path, usage } if path == *self.path.get() => {
                if usage.avail {
                    let changes = [
                        self.percent.set(usage.percent),
                        self.free_bytes.set(usage.free_bytes),
                        self.avail.set(true),
                        self.free_text.set(usage.free_text),
                    ];
                    changes.contains(&true)
                } else {
                    // Free space is left as it was last seen.
                    let percent = self.percent.set(0.0);
                    let avail = self.avail.set(false);
                    percent || avail
                }
            }
            DiskEvent::PartitionsChanged(_) => self.resolve_disk(),
            _ => false,
        }
    }

    /// Applies pending events. Returns whether any property changed.
    pub fn sync(&mut self) -> bool {
        let mut changed = false;
        for event in pending(&mut self.events, "PartitionInfo") {
            changed |= self.apply(event);
        }
        changed
    }
}

impl Drop for PartitionInfo {
    fn drop(&mut self) {
        let path = self.path.get();
        if !path.is_empty() {
            self.hub
                .send(SamplerCommand::UnwatchPartition(path.clone()));
        }
    }
}
