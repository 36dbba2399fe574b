//! CPU stats through sysinfo, for everything but Linux.
//!
//! sysinfo has no per-core system time, so that part is reported as 0.

use super::CpuLoad;
use crate::collection::{CollectionResult, SysinfoSource};

pub(crate) fn get_cpu_loads(source: &mut SysinfoSource) -> CollectionResult<Vec<CpuLoad>> {
    source.system.refresh_cpu_usage();

    Ok(source
        .system
        .cpus()
        .iter()
        .map(|cpu| CpuLoad::new(f64::from(cpu.cpu_usage()), 0.0))
        .collect())
}
