//! Data collection for network interfaces.

use hashbrown::HashMap;
use sysinfo::Networks;

use super::CollectionResult;

/// Cumulative traffic of one interface since it came up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NetCounters {
    pub recv_bytes: u64,
    pub sent_bytes: u64,
}

impl NetCounters {
    pub fn new(recv_bytes: u64, sent_bytes: u64) -> Self {
        Self {
            recv_bytes,
            sent_bytes,
        }
    }
}

/// Returns the byte counters of every interface. `networks` must be refreshed.
pub(crate) fn get_net_counters(networks: &Networks) -> HashMap<String, NetCounters> {
    networks
        .list()
        .iter()
        .map(|(name, data)| {
            (
                name.clone(),
                NetCounters::new(data.total_received(), data.total_transmitted()),
            )
        })
        .collect()
}

/// Returns whether each interface known to `networks` is administratively up.
pub(crate) fn get_interface_status(networks: &Networks) -> CollectionResult<HashMap<String, bool>> {
    Ok(networks
        .list()
        .keys()
        .map(|name| (name.clone(), is_up(name)))
        .collect())
}

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        /// Reads the `IFF_UP` bit from sysfs. An interface we can't read is treated as down.
        fn is_up(name: &str) -> bool {
            std::fs::read_to_string(format!("/sys/class/net/{name}/flags"))
                .ok()
                .and_then(|flags| parse_flags(&flags))
                .is_some_and(|flags| flags & libc::IFF_UP as u32 != 0)
        }

        /// Flags are written as hex, e.g. `0x1003`.
        fn parse_flags(s: &str) -> Option<u32> {
            let s = s.trim();
            u32::from_str_radix(s.strip_prefix("0x").unwrap_or(s), 16).ok()
        }
    } else {
        /// sysinfo only lists interfaces that exist, and has no flags to go by.
        fn is_up(_name: &str) -> bool {
            true
        }
    }
}
