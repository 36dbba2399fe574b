//! The four sensors. Each one polls a [`SystemSource`] on its cadence, derives
//! values, drops repeats and publishes events.
//!
//! Sensors live on the sampler thread and are never shared; views reach them
//! through the channels in [`SensorHub`](crate::SensorHub).

pub mod cpu;
pub mod disk;
pub mod memory;
pub mod network;

use std::{cmp::Ordering, time::Instant};

use hashbrown::HashMap;
use tokio::sync::broadcast;

pub use self::{
    cpu::{CpuSensor, CpuState},
    disk::{DiskSensor, DiskState},
    memory::MemorySensor,
    network::{NetworkSensor, NetworkState},
};
use crate::{collection::SystemSource, constants::AGGREGATE_IDENTITY, trigger::Cadence};

/// A metric family's poller.
pub trait Sensor {
    /// Called once for every cadence that fired on a tick.
    fn triggered(&mut self, cadence: Cadence, source: &mut dyn SystemSource);

    /// Forgets counter baselines and last-published values.
    fn reset(&mut self);
}

/// Sends an event to whoever is listening. Nobody listening is fine.
pub(crate) fn publish<T>(sender: &broadcast::Sender<T>, event: T) {
    let _ = sender.send(event);
}

/// Orders names case-insensitively. Names that only differ by case are ordered by
/// their bytes so the result is stable.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Sorts names with [`compare_names`].
pub fn sort_names(names: &mut [String]) {
    names.sort_by(|a, b| compare_names(a, b));
}

/// Cumulative counters per unit, and when they were read.
#[derive(Clone, Debug)]
pub(crate) struct CounterSnapshot<C> {
    pub counters: HashMap<String, C>,
    pub at: Instant,
}

/// A per-second rate of a pair of counters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Rate {
    pub identity: String,
    pub first: u64,
    pub second: u64,
}

impl<C> CounterSnapshot<C> {
    pub fn new(counters: HashMap<String, C>, at: Instant) -> Self {
        Self { counters, at }
    }

    /// Returns the rates since `prev`, one per unit present in both snapshots in name
    /// order, followed by the aggregate of those units.
    ///
    /// `pair` picks the two counters to track. Returns `None` if no time has passed.
    pub fn rates_since(
        &self, prev: &CounterSnapshot<C>, pair: impl Fn(&C) -> (u64, u64),
    ) -> Option<Vec<Rate>> {
        let elapsed = self.at.saturating_duration_since(prev.at).as_secs_f64();
        if elapsed == 0.0 {
            return None;
        }

        let mut names: Vec<&String> = self.counters.keys().collect();
        names.sort_by(|a, b| compare_names(a, b));

        let mut rates = Vec::with_capacity(names.len() + 1);
        let (mut total_first, mut total_second) = (0u64, 0u64);

        for name in names {
            let Some(old) = prev.counters.get(name) else {
                continue;
            };

            let (new_first, new_second) = pair(&self.counters[name]);
            let (old_first, old_second) = pair(old);

            let first = (new_first.saturating_sub(old_first) as f64 / elapsed) as u64;
            let second = (new_second.saturating_sub(old_second) as f64 / elapsed) as u64;

            total_first = total_first.saturating_add(first);
            total_second = total_second.saturating_add(second);

            rates.push(Rate {
                identity: name.clone(),
                first,
                second,
            });
        }

        rates.push(Rate {
            identity: AGGREGATE_IDENTITY.to_string(),
            first: total_first,
            second: total_second,
        });

        Some(rates)
    }
}

/// Remembers the last value published per identity, so repeats can be dropped.
#[derive(Clone, Debug)]
pub(crate) struct LastPublished<T>(HashMap<String, T>);

impl<T> Default for LastPublished<T> {
    fn default() -> Self {
        Self(HashMap::new())
    }
}

impl<T: PartialEq> LastPublished<T> {
    /// Records `value` for `identity`. Returns whether it differs from what was
    /// recorded before (or nothing was).
    pub fn update(&mut self, identity: &str, value: T) -> bool {
        match self.0.get_mut(identity) {
            Some(old) if *old == value => false,
            Some(old) => {
                *old = value;
                true
            }
            None => {
                self.0.insert(identity.to_string(), value);
                true
            }
        }
    }

    pub fn remove(&mut self, identity: &str) {
        self.0.remove(identity);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;

    fn snapshot(at: Instant, entries: &[(&str, (u64, u64))]) -> CounterSnapshot<(u64, u64)> {
        CounterSnapshot::new(
            entries
                .iter()
                .map(|(name, counters)| (name.to_string(), *counters))
                .collect(),
            at,
        )
    }

    #[test]
    fn rate_over_two_seconds() {
        let start = Instant::now();
        let prev = snapshot(start, &[("eth0", (100, 200))]);
        let curr = snapshot(start + Duration::from_secs(2), &[("eth0", (150, 260))]);

        let rates = curr.rates_since(&prev, |c| *c).unwrap();
        assert_eq!(
            rates,
            vec![
                Rate {
                    identity: "eth0".into(),
                    first: 25,
                    second: 30
                },
                Rate {
                    identity: "".into(),
                    first: 25,
                    second: 30
                },
            ]
        );
    }

    #[test]
    fn new_units_are_skipped() {
        let start = Instant::now();
        let prev = snapshot(start, &[("sda", (0, 0))]);
        let curr = snapshot(
            start + Duration::from_secs(1),
            &[("sda", (10, 20)), ("sdb", (1000, 1000))],
        );

        let rates = curr.rates_since(&prev, |c| *c).unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].identity, "sda");
        assert_eq!((rates[1].first, rates[1].second), (10, 20));
    }

    #[test]
    fn aggregate_sums_truncated_rates() {
        let start = Instant::now();
        let prev = snapshot(start, &[("a", (0, 0)), ("b", (0, 0))]);
        let curr = snapshot(start + Duration::from_secs(2), &[("a", (3, 0)), ("b", (3, 0))]);

        let rates = curr.rates_since(&prev, |c| *c).unwrap();
        // 1.5 truncates to 1 per unit.
        assert_eq!(rates[2].first, 2);
    }

    #[test]
    fn counters_going_backwards_are_zero() {
        let start = Instant::now();
        let prev = snapshot(start, &[("wlan0", (500, 500))]);
        let curr = snapshot(start + Duration::from_secs(1), &[("wlan0", (10, 10))]);

        let rates = curr.rates_since(&prev, |c| *c).unwrap();
        assert_eq!((rates[0].first, rates[0].second), (0, 0));
    }

    #[test]
    fn no_elapsed_time_means_no_rates() {
        let start = Instant::now();
        let prev = snapshot(start, &[("sda", (0, 0))]);
        let curr = snapshot(start, &[("sda", (10, 10))]);

        assert!(curr.rates_since(&prev, |c| *c).is_none());
    }

    #[test]
    fn case_insensitive_sort() {
        let mut names = vec![
            "sdb".to_string(),
            "Loop0".to_string(),
            "sda".to_string(),
            "loop0".to_string(),
        ];
        sort_names(&mut names);
        assert_eq!(names, vec!["Loop0", "loop0", "sda", "sdb"]);
    }

    #[test]
    fn last_published_dedupes() {
        let mut last = LastPublished::default();
        assert!(last.update("sda", 1));
        assert!(!last.update("sda", 1));
        assert!(last.update("sda", 2));
        last.clear();
        assert!(last.update("sda", 2));
    }
}
