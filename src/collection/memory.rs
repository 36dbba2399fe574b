//! Memory data collection using sysinfo.

use sysinfo::System;

use super::{CollectionResult, percent_of};

/// RAM usage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VirtualMemory {
    /// Used memory in percent, rounded to one decimal. Memory that is only holding
    /// reclaimable caches counts as free.
    pub percent: f64,
    pub available_bytes: u64,
}

/// Returns RAM usage. `sys` must have had its memory refreshed.
pub(crate) fn get_virtual_memory(sys: &System) -> CollectionResult<VirtualMemory> {
    let total = sys.total_memory();
    let available = sys.available_memory();

    Ok(VirtualMemory {
        percent: percent_of(total.saturating_sub(available), total),
        available_bytes: available,
    })
}

/// Returns swap usage in percent, or 0 if there is no swap.
pub(crate) fn get_swap_percent(sys: &System) -> f64 {
    percent_of(sys.used_swap(), sys.total_swap())
}
