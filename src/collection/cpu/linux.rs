//! Per-core CPU utilization from `/proc/stat`.
//!
//! sysinfo only reports a single usage number per core, but we also want the
//! share spent in the kernel, so we diff the raw jiffy counters ourselves.

use std::{num::ParseIntError, str::FromStr};

use anyhow::{anyhow, bail};

use super::CpuLoad;
use crate::collection::{
    CollectionError, CollectionResult, SysinfoSource, linux::utils::for_each_line,
};

const PROC_STAT: &str = "/proc/stat";

/// Time a core has spent in each state since boot, in `USER_HZ` ticks.
///
/// See `proc_stat(5)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct CpuTimes {
    user: u64,
    nice: u64,
    system: u64,
    idle: u64,
    iowait: u64,
    irq: u64,
    softirq: u64,
    steal: u64,
}

impl CpuTimes {
    /// Guest time is already counted in user and nice, so it is left out.
    fn total(&self) -> u64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
    }

    /// Returns the load over the interval between `prev` and `self`.
    ///
    /// The "user" figure is everything but idle, the same way a load graph shows it.
    fn load_since(&self, prev: &CpuTimes) -> CpuLoad {
        let total = self.total().saturating_sub(prev.total());
        if total == 0 {
            return CpuLoad::default();
        }

        let total = total as f64;
        let idle = self.idle.saturating_sub(prev.idle) as f64 * 100.0 / total;
        let system = self.system.saturating_sub(prev.system) as f64 * 100.0 / total;

        // Some counters (iowait in particular) can go backwards between reads.
        CpuLoad {
            user: (100.0 - idle).clamp(0.0, 100.0),
            system: system.clamp(0.0, 100.0),
        }
    }
}

impl FromStr for CpuTimes {
    type Err = anyhow::Error;

    /// Parses the numbers that follow a `cpuN` label. Older kernels report fewer
    /// columns, so missing trailing ones count as zero.
    fn from_str(s: &str) -> anyhow::Result<CpuTimes> {
        let values = s
            .split_whitespace()
            .map(str::parse::<u64>)
            .collect::<Result<Vec<_>, ParseIntError>>()?;

        if values.len() < 4 {
            bail!("expected at least 4 cpu time columns, got {}", values.len());
        }

        let get = |index: usize| values.get(index).copied().unwrap_or(0);

        Ok(CpuTimes {
            user: get(0),
            nice: get(1),
            system: get(2),
            idle: get(3),
            iowait: get(4),
            irq: get(5),
            softirq: get(6),
            steal: get(7),
        })
    }
}

/// Parses one `/proc/stat` line. Returns `None` for anything that isn't a
/// per-core `cpuN` line, including the all-cores `cpu` line.
fn parse_core_line(line: &str) -> Option<anyhow::Result<(usize, CpuTimes)>> {
    let (label, rest) = line.split_once(char::is_whitespace)?;
    let id = label.strip_prefix("cpu")?;

    if id.is_empty() {
        return None;
    }

    Some(
        id.parse::<usize>()
            .map_err(|err| anyhow!("bad cpu id '{id}': {err}"))
            .and_then(|id| Ok((id, rest.parse::<CpuTimes>()?))),
    )
}

/// Reads the per-core counters with their ids, ordered by core id.
fn read_core_times() -> CollectionResult<Vec<(usize, CpuTimes)>> {
    let mut cores = Vec::new();
    let mut error = None;

    for_each_line(PROC_STAT, |line| match parse_core_line(line) {
        Some(Ok(core)) => cores.push(core),
        Some(Err(err)) => {
            error.get_or_insert(err);
        }
        None => {}
    })?;

    if let Some(err) = error {
        return Err(CollectionError::General(err));
    }

    cores.sort_unstable_by_key(|(id, _)| *id);
    Ok(cores)
}

/// Returns per-core loads since the last call. The first call measures since boot.
pub(crate) fn get_cpu_loads(source: &mut SysinfoSource) -> CollectionResult<Vec<CpuLoad>> {
    let times = read_core_times()?;
    let loads = compute_loads(&source.prev_cpu_times, &times);
    source.prev_cpu_times = times;

    Ok(loads)
}

/// Both slices are sorted by core id. Cores can go offline and come back, so the
/// baseline is looked up by id rather than by position.
fn compute_loads(prev: &[(usize, CpuTimes)], curr: &[(usize, CpuTimes)]) -> Vec<CpuLoad> {
    let zero = CpuTimes::default();

    curr.iter()
        .map(|(id, times)| {
            let baseline = prev
                .binary_search_by_key(id, |(prev_id, _)| *prev_id)
                .map_or(&zero, |index| &prev[index].1);

            times.load_since(baseline)
        })
        .collect()
}
