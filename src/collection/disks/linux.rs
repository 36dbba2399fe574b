//! Partitions and disk I/O from procfs. Based on
//! [heim's implementation](https://github.com/heim-rs/heim/blob/master/heim-disk/src/sys/linux).

use std::{io, num::ParseIntError, str::FromStr};

use anyhow::bail;
use hashbrown::HashMap;

use super::{IoCounters, Partition, file_systems::is_physical};
use crate::collection::{CollectionResult, SysinfoSource, linux::utils::for_each_line};

const PROC_MOUNTS: &str = "/proc/mounts";
const PROC_DISKSTATS: &str = "/proc/diskstats";

/// Copied from the `psutil` sources:
///
/// "man iostat" states that sectors are equivalent with blocks and have
/// a size of 512 bytes. Despite this value can be queried at runtime
/// via /sys/block/{DISK}/queue/hw_sector_size and results may vary
/// between 1k, 2k, or 4k... 512 appears to be a magic constant used
/// throughout Linux source code:
/// * <https://stackoverflow.com/a/38136179/376587>
/// * <https://lists.gt.net/linux/kernel/2241060>
/// * <https://github.com/giampaolo/psutil/issues/1305>
/// * <https://lkml.org/lkml/2015/8/17/234>
const DISK_SECTOR_SIZE: u64 = 512;

/// A `/proc/mounts` entry.
struct MountEntry {
    device: String,
    mount_point: String,
    fs_type: String,
}

/// `/proc/mounts` escapes whitespace and backslashes in mount points as octal.
fn fix_mount_point(s: &str) -> String {
    const ESCAPED_BACKSLASH: &str = "\\134";
    const ESCAPED_SPACE: &str = "\\040";
    const ESCAPED_TAB: &str = "\\011";
    const ESCAPED_NEWLINE: &str = "\\012";

    s.replace(ESCAPED_BACKSLASH, "\\")
        .replace(ESCAPED_SPACE, " ")
        .replace(ESCAPED_TAB, "\t")
        .replace(ESCAPED_NEWLINE, "\n")
}

impl FromStr for MountEntry {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<MountEntry> {
        // Example: `/dev/sda3 /home ext4 rw,relatime,data=ordered 0 0`
        let mut parts = line.trim_start().splitn(5, ' ');

        let device = match parts.next() {
            Some("none") => String::new(),
            Some(device) => device.to_string(),
            None => bail!("missing device"),
        };

        let Some(mount_point) = parts.next() else {
            bail!("missing mount point");
        };

        let Some(fs_type) = parts.next() else {
            bail!("missing filesystem type");
        };

        Ok(MountEntry {
            device,
            mount_point: fix_mount_point(mount_point),
            fs_type: fs_type.to_string(),
        })
    }
}

/// Returns the partitions on physical filesystems, in `/proc/mounts` order.
pub(crate) fn get_partitions(_source: &mut SysinfoSource) -> CollectionResult<Vec<Partition>> {
    let mut partitions = Vec::new();

    for_each_line(PROC_MOUNTS, |line| {
        if let Ok(entry) = line.parse::<MountEntry>() {
            if is_physical(&entry.fs_type) {
                partitions.push(Partition::new(entry.mount_point, entry.device));
            }
        }
    })?;

    Ok(partitions)
}

/// Parses one `/proc/diskstats` line into a device name and its counters.
///
/// Follows the format used in Linux 2.6+. Note that this completely ignores
/// the discard (4.18+) and flush (5.5+) stats.
///
/// <https://www.kernel.org/doc/Documentation/ABI/testing/procfs-diskstats>
fn parse_diskstats_line(line: &str) -> anyhow::Result<(String, IoCounters)> {
    fn next_part<'a>(iter: &mut impl Iterator<Item = &'a str>) -> Result<&'a str, io::Error> {
        iter.next()
            .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidData))
    }

    fn next_part_to_u64<'a>(iter: &mut impl Iterator<Item = &'a str>) -> anyhow::Result<u64> {
        next_part(iter)?
            .parse()
            .map_err(|err: ParseIntError| err.into())
    }

    // Skip the major and minor numbers.
    let mut parts = line.split_whitespace().skip(2);

    let name = next_part(&mut parts)?.to_string();

    // Skip read count, read merged count.
    let mut parts = parts.skip(2);
    let read_bytes = next_part_to_u64(&mut parts)? * DISK_SECTOR_SIZE;

    // Skip read time, write count, and write merged count.
    let mut parts = parts.skip(3);
    let write_bytes = next_part_to_u64(&mut parts)? * DISK_SECTOR_SIZE;

    Ok((name, IoCounters::new(read_bytes, write_bytes)))
}

/// Returns the I/O counters of every device in `/proc/diskstats`.
pub(crate) fn get_io_counters(
    _source: &mut SysinfoSource,
) -> CollectionResult<HashMap<String, IoCounters>> {
    let mut counters = HashMap::new();

    for_each_line(PROC_DISKSTATS, |line| {
        if let Ok((name, io)) = parse_diskstats_line(line) {
            counters.insert(name, io);
        }
    })?;

    Ok(counters)
}
