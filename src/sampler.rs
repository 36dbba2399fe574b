//! The sampler thread and the hub that views use to reach it.

use std::{
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{debug, info};
use tokio::sync::{broadcast, watch};

use crate::{
    collection::SystemSource,
    constants::{DEFAULT_HISTORY_SECONDS, EVENT_CHANNEL_CAPACITY, TICK_INTERVAL},
    event::{CpuEvent, DiskEvent, MemoryEvent, NetworkEvent, SamplerCommand},
    history::{HistoryBuffer, SharedHistory},
    sensors::{
        CpuSensor, CpuState, DiskSensor, DiskState, MemorySensor, NetworkSensor, NetworkState,
        Sensor,
    },
    trigger::{Fired, Trigger},
    utils::cancellation_token::CancellationToken,
};

/// Settings for the sampler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerConfig {
    /// The base tick. Cadences are multiples of this.
    pub tick: Duration,
    /// How far back history buffers reach.
    pub history: Duration,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            tick: TICK_INTERVAL,
            history: Duration::from_secs(DEFAULT_HISTORY_SECONDS),
        }
    }
}

/// Everything a view needs to follow the sensors. Cheap to clone; every view gets
/// its own copy.
#[derive(Clone, Debug)]
pub struct SensorHub {
    cpu: broadcast::Sender<CpuEvent>,
    disk: broadcast::Sender<DiskEvent>,
    memory: broadcast::Sender<MemoryEvent>,
    network: broadcast::Sender<NetworkEvent>,
    cpu_state: watch::Receiver<CpuState>,
    disk_state: watch::Receiver<DiskState>,
    network_state: watch::Receiver<NetworkState>,
    memory_history: SharedHistory,
    commands: Sender<SamplerCommand>,
    history_duration: Duration,
}

impl SensorHub {
    pub fn subscribe_cpu(&self) -> broadcast::Receiver<CpuEvent> {
        self.cpu.subscribe()
    }

    pub fn subscribe_disk(&self) -> broadcast::Receiver<DiskEvent> {
        self.disk.subscribe()
    }

    pub fn subscribe_memory(&self) -> broadcast::Receiver<MemoryEvent> {
        self.memory.subscribe()
    }

    pub fn subscribe_network(&self) -> broadcast::Receiver<NetworkEvent> {
        self.network.subscribe()
    }

    /// The latest CPU and process counts.
    pub fn cpu_state(&self) -> CpuState {
        *self.cpu_state.borrow()
    }

    /// The latest disk and partition listings.
    pub fn disk_state(&self) -> DiskState {
        self.disk_state.borrow().clone()
    }

    /// The latest interface listing.
    pub fn network_state(&self) -> NetworkState {
        self.network_state.borrow().clone()
    }

    /// The memory sensor's history: memory percent, swap percent.
    pub fn memory_history(&self) -> SharedHistory {
        self.memory_history.clone()
    }

    /// How far back history buffers should reach.
    pub fn history_duration(&self) -> Duration {
        self.history_duration
    }

    /// Sends a command to the sampler. Returns false if the sampler is gone.
    pub fn send(&self, command: SamplerCommand) -> bool {
        self.commands.send(command).is_ok()
    }
}

/// The four sensors, dispatched to in a fixed order.
struct Sensors {
    cpu: CpuSensor,
    disk: DiskSensor,
    memory: MemorySensor,
    network: NetworkSensor,
}

impl Sensors {
    fn all(&mut self) -> [&mut dyn Sensor; 4] {
        [
            &mut self.cpu,
            &mut self.disk,
            &mut self.memory,
            &mut self.network,
        ]
    }

    fn dispatch(&mut self, fired: Fired, source: &mut dyn SystemSource) {
        for cadence in fired.cadences() {
            for sensor in self.all() {
                sensor.triggered(cadence, source);
            }
        }
    }

    fn handle(&mut self, command: SamplerCommand) {
        debug!("Sampler: {command:?}");

        match command {
            SamplerCommand::WatchPartition(path) => self.disk.watch_partition(path),
            SamplerCommand::UnwatchPartition(path) => self.disk.unwatch_partition(&path),
            SamplerCommand::Reset => {
                info!("Sampler: reset");
                for sensor in self.all() {
                    sensor.reset();
                }
            }
        }
    }
}

/// Owns the trigger, the sensors and the OS source. Runs on its own thread.
pub struct Sampler<S> {
    source: S,
    trigger: Trigger,
    sensors: Sensors,
    commands: Receiver<SamplerCommand>,
}

impl<S: SystemSource> Sampler<S> {
    /// Builds a sampler and the hub connected to it.
    pub fn new(source: S, config: SamplerConfig) -> (Self, SensorHub) {
        let (cpu, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (disk, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (memory, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (network, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let (cpu_state_tx, cpu_state) = watch::channel(CpuState::default());
        let (disk_state_tx, disk_state) = watch::channel(DiskState::default());
        let (network_state_tx, network_state) = watch::channel(NetworkState::default());

        let memory_history =
            HistoryBuffer::new(config.history, MemorySensor::HISTORY_COLUMNS).shared();

        let (commands_tx, commands) = mpsc::channel();

        let sensors = Sensors {
            cpu: CpuSensor::new(cpu.clone(), cpu_state_tx),
            disk: DiskSensor::new(disk.clone(), disk_state_tx),
            memory: MemorySensor::new(memory.clone(), memory_history.clone()),
            network: NetworkSensor::new(network.clone(), network_state_tx),
        };

        let hub = SensorHub {
            cpu,
            disk,
            memory,
            network,
            cpu_state,
            disk_state,
            network_state,
            memory_history,
            commands: commands_tx,
            history_duration: config.history,
        };

        let sampler = Sampler {
            source,
            trigger: Trigger::new(config.tick),
            sensors,
            commands,
        };

        (sampler, hub)
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Applies pending commands, then runs one tick without waiting.
    pub fn step(&mut self) -> Fired {
        drain_commands(&self.commands, &mut self.sensors);

        let fired = self.trigger.advance();
        self.sensors.dispatch(fired, &mut self.source);
        fired
    }

    /// Ticks until `token` is cancelled.
    pub fn run(&mut self, token: &CancellationToken) {
        let Sampler {
            source,
            trigger,
            sensors,
            commands,
        } = self;

        info!("Sampler: started with a {:?} tick", trigger.interval());

        trigger.run(token, |fired| {
            drain_commands(commands, sensors);
            sensors.dispatch(fired, &mut *source);
        });

        info!("Sampler: stopped");
    }
}

fn drain_commands(commands: &Receiver<SamplerCommand>, sensors: &mut Sensors) {
    while let Ok(command) = commands.try_recv() {
        sensors.handle(command);
    }
}

/// Stops the sampler thread when told to or when dropped.
#[derive(Debug)]
pub struct SamplerHandle {
    token: Arc<CancellationToken>,
    thread: Option<JoinHandle<()>>,
}

impl SamplerHandle {
    /// Cancels the sampler and waits for its thread to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    fn shutdown(&mut self) {
        self.token.cancel();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Starts sampling `source` on a background thread.
pub fn spawn_sampler<S>(source: S, config: SamplerConfig) -> (SensorHub, SamplerHandle)
where
    S: SystemSource + Send + 'static,
{
    let (mut sampler, hub) = Sampler::new(source, config);
    let token = Arc::new(CancellationToken::default());

    let thread = {
        let token = token.clone();
        thread::spawn(move || sampler.run(&token))
    };

    (
        hub,
        SamplerHandle {
            token,
            thread: Some(thread),
        },
    )
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;
    use crate::collection::{CpuLoad, DiskUsage, fake::FakeSource};

    fn fake() -> FakeSource {
        let mut source = FakeSource {
            cpu_loads: vec![CpuLoad::new(50.0, 10.0), CpuLoad::new(30.0, 10.0)],
            process_count: 10,
            ..Default::default()
        };
        source.add_partition(
            "/",
            "/dev/sda1",
            DiskUsage {
                percent: 10.0,
                free_bytes: 1024,
            },
        );
        source.set_disk_io("sda", 0, 0);
        source.set_net_io("eth0", 0, 0);
        source.net_up.insert("eth0".into(), true);
        source
    }

    #[test]
    fn first_step_fires_every_sensor() {
        let (mut sampler, hub) = Sampler::new(fake(), SamplerConfig::default());
        let mut cpu = hub.subscribe_cpu();
        let mut memory = hub.subscribe_memory();

        let fired = sampler.step();
        assert_eq!(fired.tick, 0);

        assert!(cpu.try_recv().is_ok());
        assert!(memory.try_recv().is_ok());
        assert_eq!(hub.cpu_state().nof_cpu, 2);
        assert_eq!(hub.disk_state().disks, vec!["sda"]);
        assert_eq!(hub.network_state().interfaces, vec!["eth0"]);
        assert_eq!(hub.memory_history().read().unwrap().row_count(), 1);
    }

    #[test]
    fn slow_sensors_wait_eight_ticks() {
        let (mut sampler, hub) = Sampler::new(fake(), SamplerConfig::default());
        let mut memory = hub.subscribe_memory();

        for _ in 0..8 {
            sampler.step();
        }
        assert!(memory.try_recv().is_ok());
        assert!(memory.try_recv().is_err());

        sampler.step();
        assert!(memory.try_recv().is_ok());
    }

    #[test]
    fn commands_apply_before_the_next_tick() {
        let (mut sampler, hub) = Sampler::new(fake(), SamplerConfig::default());
        let mut disk = hub.subscribe_disk();

        assert!(hub.send(SamplerCommand::WatchPartition("/".into())));
        sampler.step();

        let usage = std::iter::from_fn(|| disk.try_recv().ok())
            .find(|event| matches!(event, DiskEvent::UsageChanged { .. }));
        assert!(usage.is_some());
    }

    #[test]
    fn reset_republishes_listings() {
        let (mut sampler, hub) = Sampler::new(fake(), SamplerConfig::default());
        let mut network = hub.subscribe_network();

        sampler.step();
        for _ in 0..7 {
            sampler.step();
        }
        std::iter::from_fn(|| network.try_recv().ok()).for_each(drop);

        hub.send(SamplerCommand::Reset);
        sampler.step();

        let relisted = std::iter::from_fn(|| network.try_recv().ok())
            .any(|event| matches!(event, NetworkEvent::InterfacesChanged(_)));
        assert!(relisted);
    }

    #[test]
    fn spawned_sampler_stops() {
        let config = SamplerConfig {
            tick: Duration::from_millis(5),
            ..Default::default()
        };
        let (hub, handle) = spawn_sampler(fake(), config);
        let mut memory = hub.subscribe_memory();

        // Tick 0 may have fired before subscribing, but tick 8 is 40ms later.
        assert!(memory.blocking_recv().is_ok());
        assert!(handle.is_running());

        handle.stop();
        assert!(!hub.send(SamplerCommand::Reset));
    }
}
