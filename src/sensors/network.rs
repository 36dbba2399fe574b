//! Interface state and traffic, on every slow tick.

use log::{debug, info, warn};
use tokio::sync::{broadcast, watch};

use super::{CounterSnapshot, Sensor, publish, sort_names};
use crate::{
    collection::{NetCounters, SystemSource},
    event::NetworkEvent,
    trigger::Cadence,
};

/// The latest interface list, for views that subscribe after it was published.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkState {
    /// Interface names, sorted case-insensitively.
    pub interfaces: Vec<String>,
}

pub struct NetworkSensor {
    events: broadcast::Sender<NetworkEvent>,
    state: watch::Sender<NetworkState>,
    interfaces: Option<Vec<String>>,
    last_counters: Option<CounterSnapshot<NetCounters>>,
}

impl NetworkSensor {
    pub fn new(events: broadcast::Sender<NetworkEvent>, state: watch::Sender<NetworkState>) -> Self {
        Self {
            events,
            state,
            interfaces: None,
            last_counters: None,
        }
    }

    /// Returns the interface names, sorted.
    fn update_status(&mut self, source: &mut dyn SystemSource) -> Option<Vec<String>> {
        let status = match source.net_interface_status() {
            Ok(status) => status,
            Err(err) => {
                warn!("NetworkSensor: failed to read interface status: {err}");
                return None;
            }
        };

        let mut names: Vec<String> = status.keys().cloned().collect();
        sort_names(&mut names);

        for name in &names {
            publish(
                &self.events,
                NetworkEvent::IsUpChanged {
                    interface: name.clone(),
                    is_up: status[name],
                },
            );
        }

        Some(names)
    }

    fn update_io(&mut self, source: &mut dyn SystemSource) {
        let counters = match source.net_io_counters() {
            Ok(counters) => counters,
            Err(err) => {
                warn!("NetworkSensor: failed to read I/O counters: {err}");
                return;
            }
        };

        let snapshot = CounterSnapshot::new(counters, source.now());

        if let Some(prev) = &self.last_counters {
            let Some(rates) =
                snapshot.rates_since(prev, |io| (io.recv_bytes, io.sent_bytes))
            else {
                return;
            };

            for rate in rates {
                debug!(
                    "NetworkSensor: {:9} recv, {:9} sent for '{}'",
                    rate.first, rate.second, rate.identity
                );
                publish(
                    &self.events,
                    NetworkEvent::IoChanged {
                        interface: rate.identity,
                        recv: rate.first,
                        sent: rate.second,
                    },
                );
            }
            publish(&self.events, NetworkEvent::Updated);
        }

        self.last_counters = Some(snapshot);
    }

    fn set_interfaces(&mut self, interfaces: Vec<String>) {
        if self.interfaces.as_ref() != Some(&interfaces) {
            info!("NetworkSensor: interfaces {}", interfaces.join(", "));
            self.interfaces = Some(interfaces.clone());
            self.state
                .send_modify(|state| state.interfaces = interfaces.clone());
            publish(&self.events, NetworkEvent::InterfacesChanged(interfaces));
        }
    }
}

impl Sensor for NetworkSensor {
    fn triggered(&mut self, cadence: Cadence, source: &mut dyn SystemSource) {
        if cadence == Cadence::Slow {
            let interfaces = self.update_status(source);
            self.update_io(source);
            if let Some(interfaces) = interfaces {
                self.set_interfaces(interfaces);
            }
        }
    }

    fn reset(&mut self) {
        self.interfaces = None;
        self.last_counters = None;
    }
}
