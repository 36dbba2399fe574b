use std::time::Duration;

/// The base interval of the trigger. Every cadence is a multiple of this.
pub const TICK_INTERVAL: Duration = Duration::from_millis(200);

/// The smallest base interval we accept from the config file or arguments.
pub const MIN_TICK_MILLISECONDS: u64 = 50;

/// How many seconds of samples a history buffer keeps by default.
pub const DEFAULT_HISTORY_SECONDS: u64 = 60;

/// How many events a sensor channel buffers for a slow subscriber before it lags.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The identity used for the aggregate of all units (all disks, all interfaces).
pub const AGGREGATE_IDENTITY: &str = "";

/// Config file name, relative to the platform config directory.
pub const DEFAULT_CONFIG_FILE_PATH: &str = "sysgauge/sysgauge.toml";

/// The text written to a freshly created config file.
pub const CONFIG_TEXT: &str = r#"# This is a default config file for sysgauge. All of the settings are commented
# out by default; if you wish to change them uncomment and modify as you see
# fit.

[general]
# The base tick of the sampler in milliseconds. Fast sensors poll every tick,
# medium ones every 4th and slow ones every 8th.
#tick = 200
# How many seconds of history each graph keeps.
#history = 60

[cpu]
# Which core to show. 0 is the average of all cores.
#core = 0

[disk]
# The disk to show I/O for. An empty string sums all disks.
#device = ""
# The mount point to show usage for.
#partition = "/"

[network]
# The interface to show I/O for. An empty string sums all interfaces.
#interface = ""
"#;
