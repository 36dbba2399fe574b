//! Events published by the sensors, commands sent to the sampler, and the
//! dashboard's own input events.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Events from the CPU sensor, published every fast tick.
#[derive(Clone, Debug, PartialEq)]
pub enum CpuEvent {
    /// Load of one core. Core 0 is the mean of all cores, core N is the Nth core.
    LoadChanged { cpu: usize, user: f64, system: f64 },
    /// The number of logical cores changed.
    NofCpuChanged(usize),
    /// The number of running processes changed.
    NofProcChanged(usize),
    /// Sent after every poll.
    Updated,
}

/// Usage of a watched partition.
#[derive(Clone, Debug, PartialEq)]
pub struct PartitionUsage {
    pub percent: f64,
    pub free_bytes: u64,
    pub free_text: String,
    /// False if the mount point is gone or could not be queried.
    pub avail: bool,
}

impl PartitionUsage {
    /// What a partition reports when it can't be queried.
    pub fn unavailable() -> Self {
        Self {
            percent: 0.0,
            free_bytes: 0,
            free_text: String::new(),
            avail: false,
        }
    }
}

/// Events from the disk sensor, published every slow tick.
#[derive(Clone, Debug, PartialEq)]
pub enum DiskEvent {
    /// The sorted list of disk devices changed.
    DisksChanged(Vec<String>),
    /// Read/write rate of one disk in bytes per second. An empty name is all disks.
    IoChanged { disk: String, read: u64, write: u64 },
    /// The sorted list of mount points changed.
    PartitionsChanged(Vec<String>),
    /// Usage of a watched mount point.
    UsageChanged { path: String, usage: PartitionUsage },
    /// Sent after every rate publication.
    Updated,
}

/// A memory reading.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemorySample {
    pub vmem_percent: f64,
    pub vmem_avail_bytes: u64,
    pub vmem_avail_text: String,
    pub swapmem_percent: f64,
}

/// Events from the memory sensor, published every slow tick whether or not anything
/// changed.
#[derive(Clone, Debug, PartialEq)]
pub enum MemoryEvent {
    Updated(MemorySample),
}

/// Events from the network sensor, published every slow tick.
#[derive(Clone, Debug, PartialEq)]
pub enum NetworkEvent {
    /// The sorted list of interfaces changed.
    InterfacesChanged(Vec<String>),
    /// Receive/send rate of one interface in bytes per second. An empty name is all
    /// interfaces.
    IoChanged {
        interface: String,
        recv: u64,
        sent: u64,
    },
    /// Whether an interface is up. Sent for every interface on every slow tick.
    IsUpChanged { interface: String, is_up: bool },
    /// Sent after every rate publication.
    Updated,
}

/// Commands sent to the sampler thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SamplerCommand {
    /// Start reporting usage for a mount point. Watches are counted, so two views on
    /// the same path need two unwatches.
    WatchPartition(String),
    UnwatchPartition(String),
    /// Forget all baselines and last-published values, so the next ticks republish
    /// everything.
    Reset,
}

/// Events sent to the dashboard's main loop.
#[derive(Debug)]
pub enum DashboardEvent {
    Resize,
    KeyInput(KeyEvent),
    Terminate,
}

/// What the dashboard should do after a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Reset,
    Ignore,
}

/// Maps a [`KeyEvent`] to a dashboard action.
pub fn handle_key_event(event: KeyEvent) -> KeyAction {
    if event.modifiers.is_empty() {
        match event.code {
            KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char('r') => KeyAction::Reset,
            _ => KeyAction::Ignore,
        }
    } else if let KeyModifiers::CONTROL = event.modifiers {
        match event.code {
            KeyCode::Char('c') => KeyAction::Quit,
            KeyCode::Char('r') => KeyAction::Reset,
            _ => KeyAction::Ignore,
        }
    } else {
        KeyAction::Ignore
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn quit_keys() {
        assert_eq!(
            handle_key_event(key(KeyCode::Char('q'), KeyModifiers::NONE)),
            KeyAction::Quit
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Esc, KeyModifiers::NONE)),
            KeyAction::Quit
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Quit
        );
    }

    #[test]
    fn reset_and_other_keys() {
        assert_eq!(
            handle_key_event(key(KeyCode::Char('r'), KeyModifiers::NONE)),
            KeyAction::Reset
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('x'), KeyModifiers::NONE)),
            KeyAction::Ignore
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('q'), KeyModifiers::ALT)),
            KeyAction::Ignore
        );
    }

    #[test]
    fn unavailable_partition() {
        let usage = PartitionUsage::unavailable();
        assert!(!usage.avail);
        assert_eq!(usage.percent, 0.0);
    }
}
