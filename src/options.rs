//! How to create config and argument settings for sysgauge.

pub mod args;
pub mod config;
mod error;

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

pub use args::{SysgaugeArgs, get_args};
pub use config::Config;
pub use error::{OptionError, OptionResult};

use crate::{
    constants::{
        CONFIG_TEXT, DEFAULT_CONFIG_FILE_PATH, DEFAULT_HISTORY_SECONDS, MIN_TICK_MILLISECONDS,
        TICK_INTERVAL,
    },
    sampler::SamplerConfig,
};

/// Which unit each view starts on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewSelection {
    /// 0 is the mean of all cores.
    pub core: usize,
    /// Empty sums all disks.
    pub disk: String,
    pub partition: String,
    /// Empty sums all interfaces.
    pub interface: String,
}

impl Default for ViewSelection {
    fn default() -> Self {
        Self {
            core: 0,
            disk: String::new(),
            partition: default_partition().to_string(),
            interface: String::new(),
        }
    }
}

fn default_partition() -> &'static str {
    if cfg!(windows) { "C:\\" } else { "/" }
}

/// Everything the binary needs, merged from the config file and the arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub sampler: SamplerConfig,
    pub view: ViewSelection,
    pub headless: bool,
    pub count: Option<u64>,
}

/// Returns the config path to use. If `override_config_path` is specified, then
/// we will use that. If not, then return `<CONFIG DIR>/sysgauge/sysgauge.toml`.
///
/// Returns `None` if the platform has no config directory.
pub fn get_config_path(override_config_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_config_path {
        return Some(path.to_path_buf());
    }

    dirs::config_dir().map(|path| path.join(DEFAULT_CONFIG_FILE_PATH))
}

/// Reads the config file at `config_path`, creating a default one if nothing is
/// there yet. Without a path, the defaults are used.
pub fn get_or_create_config(config_path: Option<&Path>) -> OptionResult<Config> {
    let Some(path) = config_path else {
        return Ok(Config::default());
    };

    match fs::read_to_string(path) {
        Ok(text) => Ok(toml_edit::de::from_str(&text)?),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, CONFIG_TEXT)?;
            Ok(Config::default())
        }
        Err(err) => Err(OptionError::other(format!(
            "could not read '{}': {err}",
            path.display()
        ))),
    }
}

/// Merges the arguments over the config file, validating the result.
pub fn init_settings(args: &SysgaugeArgs, config: &Config) -> OptionResult<Settings> {
    let tick = get_tick(args.general.tick, config.general.tick)?;
    let history = get_history(args.general.history, config.general.history)?;

    let defaults = ViewSelection::default();
    let view = ViewSelection {
        core: args.view.core.or(config.cpu.core).unwrap_or(defaults.core),
        disk: pick(&args.view.disk, &config.disk.device).unwrap_or(defaults.disk),
        partition: pick(&args.view.partition, &config.disk.partition)
            .unwrap_or(defaults.partition),
        interface: pick(&args.view.interface, &config.network.interface)
            .unwrap_or(defaults.interface),
    };

    Ok(Settings {
        sampler: SamplerConfig { tick, history },
        view,
        headless: args.output.headless,
        count: args.output.count,
    })
}

fn pick(arg: &Option<String>, config: &Option<String>) -> Option<String> {
    arg.as_ref().or(config.as_ref()).cloned()
}

fn get_tick(arg: Option<u64>, config: Option<u64>) -> OptionResult<Duration> {
    let valid = |ms: u64| ms >= MIN_TICK_MILLISECONDS;

    match (arg, config) {
        (Some(ms), _) if !valid(ms) => Err(OptionError::invalid_arg_value("tick")),
        (None, Some(ms)) if !valid(ms) => Err(OptionError::invalid_config_value("tick")),
        (Some(ms), _) | (None, Some(ms)) => Ok(Duration::from_millis(ms)),
        (None, None) => Ok(TICK_INTERVAL),
    }
}

fn get_history(arg: Option<u64>, config: Option<u64>) -> OptionResult<Duration> {
    match (arg, config) {
        (Some(0), _) => Err(OptionError::invalid_arg_value("history")),
        (None, Some(0)) => Err(OptionError::invalid_config_value("history")),
        (Some(secs), _) | (None, Some(secs)) => Ok(Duration::from_secs(secs)),
        (None, None) => Ok(Duration::from_secs(DEFAULT_HISTORY_SECONDS)),
    }
}
