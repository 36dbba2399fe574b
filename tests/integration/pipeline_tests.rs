//! End-to-end runs of the sampler against a fake system, observed through the
//! same views a presentation layer would use.

use std::time::Duration;

use sysgauge::{
    Sampler, SamplerConfig,
    collection::{CpuLoad, DiskUsage, fake::FakeSource},
    event::{CpuEvent, DiskEvent, SamplerCommand},
    info::{CpuInfo, DiskInfo, DisksInfo, NetworkInterfaceInfo, PartitionInfo},
    spawn_sampler,
    utils::data_units::bytes_to_text,
};

fn drain<T: Clone>(rx: &mut tokio::sync::broadcast::Receiver<T>) -> Vec<T> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

/// Steps through one full slow period.
fn slow_period(sampler: &mut Sampler<FakeSource>) {
    for _ in 0..8 {
        sampler.step();
    }
}

#[test]
fn four_core_aggregate() {
    let source = FakeSource {
        cpu_loads: vec![
            CpuLoad::new(10.0, 5.0),
            CpuLoad::new(20.0, 10.0),
            CpuLoad::new(30.0, 15.0),
            CpuLoad::new(40.0, 20.0),
        ],
        ..Default::default()
    };
    let (mut sampler, hub) = Sampler::new(source, SamplerConfig::default());
    let mut mean = CpuInfo::new(&hub);
    let mut third = CpuInfo::new(&hub);
    third.set_cpu(3);

    sampler.step();
    mean.sync();
    third.sync();

    assert_eq!(mean.percent.value(), 25.0);
    assert_eq!(mean.percent_sys.value(), 12.5);
    assert_eq!(mean.nof_cpu.value(), 4);
    assert_eq!(third.percent.value(), 30.0);
    assert_eq!(third.percent_sys.value(), 15.0);
}

#[test]
fn core_count_is_published_once() {
    let source = FakeSource {
        cpu_loads: vec![CpuLoad::new(1.0, 1.0); 2],
        ..Default::default()
    };
    let (mut sampler, hub) = Sampler::new(source, SamplerConfig::default());
    let mut events = hub.subscribe_cpu();

    sampler.step();
    sampler.step();
    let count = |events: &[CpuEvent]| {
        events
            .iter()
            .filter(|event| matches!(event, CpuEvent::NofCpuChanged(_)))
            .count()
    };
    assert_eq!(count(&drain(&mut events)), 1);

    sampler.source_mut().cpu_loads.push(CpuLoad::new(1.0, 1.0));
    sampler.step();
    let events = drain(&mut events);
    assert_eq!(count(&events), 1);
    assert!(events.contains(&CpuEvent::NofCpuChanged(3)));
}

#[test]
fn counter_rates_over_two_seconds() {
    let mut source = FakeSource::default();
    source.set_disk_io("sda", 100, 200);
    let (mut sampler, hub) = Sampler::new(source, SamplerConfig::default());
    let mut info = DiskInfo::new(&hub);
    info.set_disk("sda");

    sampler.step();
    sampler.source_mut().advance(Duration::from_secs(2));
    sampler.source_mut().set_disk_io("sda", 150, 260);
    slow_period(&mut sampler);

    assert!(info.sync());
    assert_eq!(info.read_bytes.value(), 25);
    assert_eq!(info.write_bytes.value(), 30);
}

#[test]
fn per_disk_and_aggregate_rates() {
    let mut source = FakeSource::default();
    source.set_disk_io("d1", 1000, 500);
    let (mut sampler, hub) = Sampler::new(source, SamplerConfig::default());
    let mut events = hub.subscribe_disk();

    sampler.step();
    assert!(
        !drain(&mut events)
            .iter()
            .any(|event| matches!(event, DiskEvent::IoChanged { .. })),
        "the first poll has no baseline"
    );

    sampler.source_mut().advance(Duration::from_secs(1));
    sampler.source_mut().set_disk_io("d1", 1100, 620);
    slow_period(&mut sampler);

    let rates: Vec<_> = drain(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            DiskEvent::IoChanged { disk, read, write } => Some((disk, read, write)),
            _ => None,
        })
        .collect();
    assert_eq!(
        rates,
        vec![("d1".to_string(), 100, 120), (String::new(), 100, 120)]
    );
}

#[test]
fn reset_republishes_listings() {
    let mut source = FakeSource::default();
    source.set_disk_io("sda", 0, 0);
    let (mut sampler, hub) = Sampler::new(source, SamplerConfig::default());
    let mut disks = DisksInfo::new(&hub);

    sampler.step();
    assert!(disks.sync());
    slow_period(&mut sampler);
    assert!(!disks.sync());

    let mut events = hub.subscribe_disk();
    hub.send(SamplerCommand::Reset);
    slow_period(&mut sampler);
    assert!(
        drain(&mut events)
            .iter()
            .any(|event| matches!(event, DiskEvent::DisksChanged(_)))
    );
}

#[test]
fn partitions_are_only_queried_while_watched() {
    let mut source = FakeSource::default();
    source.add_partition(
        "/data",
        "/dev/sdb1",
        DiskUsage {
            percent: 33.3,
            free_bytes: 1073741824,
        },
    );
    let (mut sampler, hub) = Sampler::new(source, SamplerConfig::default());
    let mut events = hub.subscribe_disk();

    sampler.step();
    assert!(
        !drain(&mut events)
            .iter()
            .any(|event| matches!(event, DiskEvent::UsageChanged { .. }))
    );

    let mut info = PartitionInfo::new(&hub);
    info.set_path("/data");
    slow_period(&mut sampler);
    info.sync();
    assert_eq!(info.percent.value(), 33.3);
    assert_eq!(info.free_text.get(), "1.00 GB");
    assert_eq!(info.disk.get(), "/dev/sdb1");
}

#[test]
fn failing_source_degrades_quietly() {
    let mut source = FakeSource::default();
    source.set_net_io("eth0", 0, 0);
    source.failing = true;
    let (mut sampler, hub) = Sampler::new(source, SamplerConfig::default());
    let mut info = NetworkInterfaceInfo::new(&hub);
    info.set_name("eth0");

    slow_period(&mut sampler);
    slow_period(&mut sampler);
    assert!(!info.sync());
    assert!(!info.is_up.value());
}

#[test]
fn spawned_sampler_feeds_views() {
    let source = FakeSource {
        cpu_loads: vec![CpuLoad::new(50.0, 25.0)],
        process_count: 9,
        ..Default::default()
    };
    let config = SamplerConfig {
        tick: Duration::from_millis(2),
        ..Default::default()
    };
    let (hub, handle) = spawn_sampler(source, config);
    let mut info = CpuInfo::new(&hub);

    // Memory samples are slow, so a CPU poll happened before this one arrives.
    let mut memory = hub.subscribe_memory();
    memory.blocking_recv().unwrap();
    memory.blocking_recv().unwrap();
    info.sync();
    handle.stop();

    assert_eq!(info.percent.value(), 50.0);
    assert_eq!(info.nof_proc.value(), 9);
}

#[test]
fn byte_text() {
    assert_eq!(bytes_to_text(0), "0.00 B");
    assert_eq!(bytes_to_text(1536), "1.50 KB");
    assert_eq!(bytes_to_text(1073741824), "1.00 GB");
}
