//! Fallback disk info using sysinfo.

use hashbrown::HashMap;

use super::{IoCounters, Partition};
use crate::collection::{CollectionResult, SysinfoSource};

fn device_name(disk: &sysinfo::Disk) -> String {
    disk.name().to_string_lossy().into_owned()
}

pub(crate) fn get_partitions(source: &mut SysinfoSource) -> CollectionResult<Vec<Partition>> {
    source.disks.refresh(true);

    Ok(source
        .disks
        .iter()
        .map(|disk| {
            Partition::new(
                disk.mount_point().to_string_lossy().into_owned(),
                device_name(disk),
            )
        })
        .collect())
}

/// Returns cumulative I/O per disk. Disks sysinfo can't name are skipped.
pub(crate) fn get_io_counters(
    source: &mut SysinfoSource,
) -> CollectionResult<HashMap<String, IoCounters>> {
    source.disks.refresh(true);

    let mut counters: HashMap<String, IoCounters> = HashMap::new();
    for disk in source.disks.iter() {
        let name = device_name(disk);
        if name.is_empty() {
            continue;
        }

        // The same device can show up once per mount point.
        let usage = disk.usage();
        counters.insert(
            name,
            IoCounters::new(usage.total_read_bytes, usage.total_written_bytes),
        );
    }

    Ok(counters)
}

/// Returns usage for the disk with the longest mount point that contains `path`.
#[cfg(not(unix))]
pub(crate) fn get_disk_usage(
    source: &mut SysinfoSource,
    path: &std::path::Path,
) -> CollectionResult<super::DiskUsage> {
    use crate::collection::CollectionError;

    if !path.exists() {
        return Err(CollectionError::NotFound(path.display().to_string()));
    }

    source.disks.refresh(true);

    let disk = source
        .disks
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .ok_or_else(|| CollectionError::NotFound(path.display().to_string()))?;

    let free = disk.available_space();
    let used = disk.total_space().saturating_sub(free);

    Ok(super::usage_from(used, free))
}
