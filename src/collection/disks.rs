//! Data collection for disk partitions, usage and I/O.

#[cfg(unix)]
mod unix;

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        mod file_systems;
        mod linux;
        pub(crate) use self::linux::{get_io_counters, get_partitions};
    } else {
        mod sysinfo;
        pub(crate) use self::sysinfo::{get_io_counters, get_partitions};
    }
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        pub(crate) use self::unix::get_disk_usage;
    } else {
        pub(crate) use self::sysinfo::get_disk_usage;
    }
}

use std::path::Path;

/// A mounted partition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Partition {
    pub mount_point: String,
    /// The device backing the mount, or an empty string if there is none.
    pub device: String,
}

impl Partition {
    pub fn new(mount_point: impl Into<String>, device: impl Into<String>) -> Self {
        Self {
            mount_point: mount_point.into(),
            device: device.into(),
        }
    }
}

/// Usage of the filesystem a path lives on.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DiskUsage {
    /// Used space in percent, rounded to one decimal.
    pub percent: f64,
    /// Space available to unprivileged users, in bytes.
    pub free_bytes: u64,
}

/// Cumulative I/O of one disk device since boot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IoCounters {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

impl IoCounters {
    pub fn new(read_bytes: u64, write_bytes: u64) -> Self {
        Self {
            read_bytes,
            write_bytes,
        }
    }
}

/// Returns whether `path` is an existing directory.
///
/// On Windows, looking at a removable drive that has been ejected would normally pop
/// up a "no disk in drive" dialog. The check briefly turns off critical error
/// dialogs for the whole process so it just fails instead.
pub fn is_dir_quietly(path: &Path) -> bool {
    cfg_if::cfg_if! {
        if #[cfg(target_os = "windows")] {
            use windows::Win32::System::Diagnostics::Debug::{
                SEM_FAILCRITICALERRORS, SetErrorMode, THREAD_ERROR_MODE,
            };

            // SAFETY: SetErrorMode only swaps a per-process flag, and the previous mode
            // is restored right after.
            let previous = unsafe { SetErrorMode(SEM_FAILCRITICALERRORS) };
            let is_dir = path.is_dir();
            unsafe {
                SetErrorMode(THREAD_ERROR_MODE(previous));
            }

            is_dir
        } else {
            path.is_dir()
        }
    }
}

/// Turns a used/free byte pair into a usage percentage the way `df` does, which
/// ignores the space reserved for root.
pub(crate) fn usage_from(used_bytes: u64, free_bytes: u64) -> DiskUsage {
    DiskUsage {
        percent: super::percent_of(used_bytes, used_bytes.saturating_add(free_bytes)),
        free_bytes,
    }
}
