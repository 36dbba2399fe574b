//! Per-view adapters.
//!
//! Each adapter follows one sensor, keeps only what concerns its selected unit
//! (one core, disk, partition or interface) and exposes it as [`Observable`]
//! properties. Nothing happens in the background: a view calls `sync` when it
//! wants to catch up, and that never blocks.
//!
//! [`Observable`]: crate::observable::Observable

mod cpu;
mod disk;
mod memory;
mod network;

use log::warn;
use tokio::sync::broadcast::{self, error::TryRecvError};

pub use self::{
    cpu::CpuInfo,
    disk::{DiskInfo, DisksInfo, PartitionInfo, PartitionsInfo},
    memory::MemInfo,
    network::{NetworkInterfaceInfo, NetworkInterfacesInfo},
};
use crate::history::HistoryBuffer;

/// Takes every event a view hasn't seen yet.
///
/// A view that fell too far behind skips the events it missed.
fn pending<T: Clone>(events: &mut broadcast::Receiver<T>, view: &str) -> Vec<T> {
    let mut pending = Vec::new();

    loop {
        match events.try_recv() {
            Ok(event) => pending.push(event),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!("{view}: fell behind, skipped {skipped} events");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }

    pending
}

/// Pushes a row into a view-owned history.
fn record(history: &mut HistoryBuffer, view: &str, values: &[f64]) {
    if let Err(err) = history.push(values) {
        warn!("{view}: {err}");
    }
}
