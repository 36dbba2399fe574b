//! A sensor sampling pipeline.
//!
//! A [`Trigger`](trigger::Trigger) ticks every 200ms and classifies each tick into
//! fast, medium and slow cadences. The sensors in [`sensors`] poll the operating
//! system through a [`SystemSource`](collection::SystemSource) on their cadence,
//! derive rates and percentages, drop unchanged values and publish typed events.
//! The per-view adapters in [`info`] narrow those events down to one core, disk,
//! partition or interface for a presentation layer.

#![warn(rust_2018_idioms)]

pub mod canvas;
pub mod collection;
pub mod constants;
pub mod event;
pub mod headless;
pub mod history;
pub mod info;
pub mod observable;
pub mod options;
pub mod sampler;
pub mod sensors;
pub mod trigger;

pub mod utils {
    pub mod cancellation_token;
    pub mod data_units;
    pub mod logging;
}

pub use sampler::{Sampler, SamplerConfig, SamplerHandle, SensorHub, spawn_sampler};
