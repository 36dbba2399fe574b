use tokio::sync::broadcast;

use super::{pending, record};
use crate::{
    SensorHub, event::NetworkEvent, history::HistoryBuffer, observable::Observable,
    utils::data_units::rate_to_text,
};

/// The list of network interfaces.
pub struct NetworkInterfacesInfo {
    events: broadcast::Receiver<NetworkEvent>,
    pub interfaces: Observable<Vec<String>>,
}

impl NetworkInterfacesInfo {
    pub fn new(hub: &SensorHub) -> Self {
        Self {
            events: hub.subscribe_network(),
            interfaces: Observable::new(hub.network_state().interfaces),
        }
    }

    /// Applies pending events. Returns whether any property changed.
    pub fn sync(&mut self) -> bool {
        let mut changed = false;
        for event in pending(&mut self.events, "NetworkInterfacesInfo") {
            if let NetworkEvent::InterfacesChanged(interfaces) = event {
                changed |= self.interfaces.set(interfaces);
            }
        }
        changed
    }
}

/// State and traffic of one interface, or of all of them.
pub struct NetworkInterfaceInfo {
    events: broadcast::Receiver<NetworkEvent>,
    /// The interface to follow. An empty name is the sum of all interfaces.
    pub name: Observable<String>,
    pub is_up: Observable<bool>,
    pub is_busy: Observable<bool>,
    pub recv_bytes: Observable<u64>,
    pub recv_text: Observable<String>,
    pub sent_bytes: Observable<u64>,
    pub sent_text: Observable<String>,
    /// Two columns: receive rate, send rate.
    pub history: HistoryBuffer,
}

impl NetworkInterfaceInfo {
    pub fn new(hub: &SensorHub) -> Self {
        Self {
            events: hub.subscribe_network(),
            name: Observable::default(),
            is_up: Observable::new(false),
            is_busy: Observable::new(false),
            recv_bytes: Observable::new(0),
            recv_text: Observable::default(),
            sent_bytes: Observable::new(0),
            sent_text: Observable::default(),
            history: HistoryBuffer::new(hub.history_duration(), 2),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        self.name.set(name.into())
    }

    fn apply(&mut self, event: NetworkEvent) -> bool {
        match event {
            NetworkEvent::IoChanged {
                interface,
                recv,
                sent,
            } if interface == *self.name.get() => {
                record(
                    &mut self.history,
                    "NetworkInterfaceInfo",
                    &[recv as f64, sent as f64],
                );

                let changes = [
                    self.recv_bytes.set(recv),
                    self.recv_text.set(rate_to_text(recv)),
                    self.sent_bytes.set(sent),
                    self.sent_text.set(rate_to_text(sent)),
                    self.is_busy.set(recv + sent != 0),
                ];
                changes.contains(&true)
            }
            NetworkEvent::IsUpChanged { interface, is_up } if interface == *self.name.get() => {
                self.is_up.set(is_up)
            }
            _ => false,
        }
    }

    /// Applies pending events. Returns whether any property changed.
    pub fn sync(&mut self) -> bool {
        let mut changed = false;
        for event in pending(&mut self.events, "NetworkInterfaceInfo") {
            changed |= self.apply(event);
        }
        changed
    }
}
