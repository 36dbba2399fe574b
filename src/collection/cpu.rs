//! Data collection for per-core CPU utilization.

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        mod linux;
        pub(crate) use self::linux::CpuTimes;
        pub(crate) use self::linux::get_cpu_loads;
    } else {
        mod sysinfo;
        pub(crate) use self::sysinfo::get_cpu_loads;
    }
}

/// Utilization of one core (or the average of all of them) over the last interval.
///
/// `user` is everything that is not idle, so it already includes `system`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CpuLoad {
    pub user: f64,
    pub system: f64,
}

impl CpuLoad {
    pub fn new(user: f64, system: f64) -> Self {
        Self { user, system }
    }

    /// The arithmetic mean of every core's user and system percentages. Returns
    /// `None` for an empty slice.
    pub fn mean(loads: &[CpuLoad]) -> Option<CpuLoad> {
        if loads.is_empty() {
            return None;
        }

        let count = loads.len() as f64;
        let (user, system) = loads
            .iter()
            .fold((0.0, 0.0), |(user, system), load| {
                (user + load.user, system + load.system)
            });

        Some(CpuLoad {
            user: user / count,
            system: system / count,
        })
    }
}
