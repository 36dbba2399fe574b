//! The config file layout.

use serde::Deserialize;

/// The whole config file. Every section and every key is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[cfg_attr(test, serde(deny_unknown_fields))]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub cpu: CpuConfig,
    #[serde(default)]
    pub disk: DiskConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[cfg_attr(test, serde(deny_unknown_fields))]
pub struct GeneralConfig {
    /// The base tick in milliseconds.
    pub tick: Option<u64>,
    /// History length in seconds.
    pub history: Option<u64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[cfg_attr(test, serde(deny_unknown_fields))]
pub struct CpuConfig {
    pub core: Option<usize>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[cfg_attr(test, serde(deny_unknown_fields))]
pub struct DiskConfig {
    pub device: Option<String>,
    pub partition: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[cfg_attr(test, serde(deny_unknown_fields))]
pub struct NetworkConfig {
    pub interface: Option<String>,
}
