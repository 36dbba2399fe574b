//! Partitions, partition usage, disk devices and disk I/O, on every slow tick.

use std::{collections::BTreeMap, path::Path};

use log::{debug, info, warn};
use tokio::sync::{broadcast, watch};

use super::{CounterSnapshot, LastPublished, Sensor, compare_names, publish, sort_names};
use crate::{
    collection::{IoCounters, Partition, SystemSource},
    event::{DiskEvent, PartitionUsage},
    trigger::Cadence,
    utils::data_units::bytes_to_text,
};

/// The latest listings, for views that subscribe after they were published.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiskState {
    /// Disk devices, sorted case-insensitively.
    pub disks: Vec<String>,
    /// Partitions, sorted case-insensitively by mount point.
    pub partitions: Vec<Partition>,
}

impl DiskState {
    /// Returns the device mounted at `path`, if any.
    pub fn device_of(&self, path: &str) -> Option<&str> {
        self.partitions
            .iter()
            .find(|partition| partition.mount_point == path)
            .map(|partition| partition.device.as_str())
    }
}

pub struct DiskSensor {
    events: broadcast::Sender<DiskEvent>,
    state: watch::Sender<DiskState>,
    partitions: Option<Vec<String>>,
    disks: Option<Vec<String>>,
    last_counters: Option<CounterSnapshot<IoCounters>>,
    /// Watched mount points and how many views watch each.
    watched: BTreeMap<String, usize>,
    usage: LastPublished<PartitionUsage>,
}

impl DiskSensor {
    pub fn new(events: broadcast::Sender<DiskEvent>, state: watch::Sender<DiskState>) -> Self {
        Self {
            events,
            state,
            partitions: None,
            disks: None,
            last_counters: None,
            watched: BTreeMap::new(),
            usage: LastPublished::default(),
        }
    }

    /// Starts reporting usage for `path` on slow ticks.
    pub fn watch_partition(&mut self, path: String) {
        // A new watcher needs a value even if nothing changed since the last one.
        self.usage.remove(&path);
        *self.watched.entry(path).or_default() += 1;
    }

    pub fn unwatch_partition(&mut self, path: &str) {
        if let Some(count) = self.watched.get_mut(path) {
            *count -= 1;
            if *count == 0 {
                self.watched.remove(path);
                self.usage.remove(path);
            }
        }
    }

    /// The mount points currently watched.
    pub fn watched(&self) -> impl Iterator<Item = &str> {
        self.watched.keys().map(String::as_str)
    }

    fn update_partitions(&mut self, source: &mut dyn SystemSource) {
        let mut partitions = match source.partitions() {
            Ok(partitions) => partitions,
            Err(err) => {
                warn!("DiskSensor: failed to list partitions: {err}");
                return;
            }
        };

        partitions.sort_by(|a, b| compare_names(&a.mount_point, &b.mount_point));
        let paths: Vec<String> = partitions
            .iter()
            .map(|partition| partition.mount_point.clone())
            .collect();

        if self.partitions.as_ref() != Some(&paths) {
            info!("DiskSensor: partitions {}", paths.join(", "));
            self.partitions = Some(paths.clone());
            self.state.send_modify(|state| state.partitions = partitions);
            publish(&self.events, DiskEvent::PartitionsChanged(paths));
        }
    }

    fn query_usage(source: &mut dyn SystemSource, path: &str) -> PartitionUsage {
        if path.is_empty() || !source.path_is_dir(Path::new(path)) {
            return PartitionUsage::unavailable();
        }

        match source.disk_usage(Path::new(path)) {
            Ok(usage) => {
                debug!("DiskSensor: [{path}] {:5.1}%", usage.percent);
                PartitionUsage {
                    percent: usage.percent,
                    free_bytes: usage.free_bytes,
                    free_text: bytes_to_text(usage.free_bytes),
                    avail: true,
                }
            }
            Err(err) => {
                // Ejected between the check and the query.
                if !err.is_not_found() {
                    warn!("DiskSensor: failed to get usage of '{path}': {err}");
                }
                PartitionUsage::unavailable()
            }
        }
    }

    fn update_usage(&mut self, source: &mut dyn SystemSource) {
        for path in self.watched.keys() {
            let usage = Self::query_usage(source, path);
            if self.usage.update(path, usage.clone()) {
                publish(
                    &self.events,
                    DiskEvent::UsageChanged {
                        path: path.clone(),
                        usage,
                    },
                );
            }
        }
    }

    fn update_io(&mut self, source: &mut dyn SystemSource) {
        let counters = match source.disk_io_counters() {
            Ok(counters) => counters,
            Err(err) => {
                warn!("DiskSensor: failed to read I/O counters: {err}");
                return;
            }
        };

        let mut disks: Vec<String> = counters.keys().cloned().collect();
        sort_names(&mut disks);
        if self.disks.as_ref() != Some(&disks) {
            info!("DiskSensor: disks {}", disks.join(", "));
            self.disks = Some(disks.clone());
            self.state.send_modify(|state| state.disks = disks.clone());
            publish(&self.events, DiskEvent::DisksChanged(disks));
        }

        let snapshot = CounterSnapshot::new(counters, source.now());

        if let Some(prev) = &self.last_counters {
            let Some(rates) =
                snapshot.rates_since(prev, |io| (io.read_bytes, io.write_bytes))
            else {
                return;
            };

            for rate in rates {
                debug!(
                    "DiskSensor: {:9} read, {:9} write for '{}'",
                    rate.first, rate.second, rate.identity
                );
                publish(
                    &self.events,
                    DiskEvent::IoChanged {
                        disk: rate.identity,
                        read: rate.first,
                        write: rate.second,
                    },
                );
            }
            publish(&self.events, DiskEvent::Updated);
        }

        self.last_counters = Some(snapshot);
    }
}

impl Sensor for DiskSensor {
    fn triggered(&mut self, cadence: Cadence, source: &mut dyn SystemSource) {
        if cadence == Cadence::Slow {
            self.update_partitions(source);
            self.update_usage(source);
            self.update_io(source);
        }
    }

    fn reset(&mut self) {
        self.partitions = None;
        self.disks = None;
        self.last_counters = None;
        self.usage.clear();
    }
}
