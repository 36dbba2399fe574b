//! Argument parsing via clap.

use std::path::PathBuf;

use clap::*;
use indoc::indoc;

const TEMPLATE: &str = indoc! {
    "{name} {version}
    {author}

    {about}

    {usage-heading} {usage}

    {all-args}"
};

const USAGE: &str = "sysgauge [OPTIONS]";

/// The arguments for sysgauge.
#[derive(Parser, Debug)]
#[command(
    name = crate_name!(),
    version = crate_version!(),
    author = crate_authors!(),
    about = crate_description!(),
    disable_help_flag = true,
    disable_version_flag = true,
    color = ColorChoice::Auto,
    help_template = TEMPLATE,
    override_usage = USAGE,
)]
pub struct SysgaugeArgs {
    #[command(flatten)]
    pub general: GeneralArgs,

    #[command(flatten)]
    pub view: ViewArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    #[command(flatten)]
    pub other: OtherArgs,
}

/// Parses the process arguments, exiting with clap's message on failure.
pub fn get_args() -> SysgaugeArgs {
    SysgaugeArgs::parse()
}

#[derive(Args, Clone, Debug, Default)]
#[command(next_help_heading = "General Options")]
pub struct GeneralArgs {
    #[arg(
        short = 'C',
        long,
        value_name = "PATH",
        help = "Sets the location of the config file.",
        long_help = "Sets the location of the config file. If it doesn't exist, a default config \
                    file is created there."
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short = 't',
        long,
        value_name = "MS",
        help = "Sets the base tick in milliseconds.",
        long_help = indoc! {
            "Sets the base tick in milliseconds. The CPU is polled every tick, memory, disks
            and interfaces every 8th tick. The minimum is 50ms, and defaults to 200ms."
        }
    )]
    pub tick: Option<u64>,

    #[arg(
        long,
        value_name = "SECONDS",
        help = "How many seconds of history graphs keep.",
        long_help = "How many seconds of history graphs keep. Must be positive, and defaults to 60."
    )]
    pub history: Option<u64>,
}

#[derive(Args, Clone, Debug, Default)]
#[command(next_help_heading = "View Options")]
pub struct ViewArgs {
    #[arg(
        long,
        value_name = "N",
        help = "Selects the core to show. 0 is the average of all cores."
    )]
    pub core: Option<usize>,

    #[arg(
        long,
        value_name = "DEVICE",
        help = "Selects the disk to show I/O for. Leave empty to sum all disks."
    )]
    pub disk: Option<String>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Selects the mount point to show usage for."
    )]
    pub partition: Option<String>,

    #[arg(
        long,
        value_name = "NAME",
        help = "Selects the interface to show I/O for. Leave empty to sum all interfaces."
    )]
    pub interface: Option<String>,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Output Options")]
pub struct OutputArgs {
    #[arg(
        long,
        help = "Prints one line per slow tick instead of drawing the dashboard.",
        long_help = "Prints one line per slow tick to stdout instead of drawing the dashboard. \
                    Useful for piping into other programs."
    )]
    pub headless: bool,

    #[arg(
        short = 'n',
        long,
        value_name = "N",
        requires = "headless",
        help = "Stops after printing N lines. Requires --headless."
    )]
    pub count: Option<u64>,

    #[cfg(feature = "logging")]
    #[arg(long, value_name = "FILE", help = "Writes a log to FILE.")]
    pub log: Option<PathBuf>,

    #[cfg(feature = "logging")]
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        help = "The minimum level to log, one of off, error, warn, info, debug or trace."
    )]
    pub log_level: log::LevelFilter,
}

#[derive(Args, Clone, Debug, Default)]
#[command(next_help_heading = "Other Options")]
pub struct OtherArgs {
    #[arg(short='h', long, action=ArgAction::Help, help="Prints help info (for more details use `--help`.)")]
    help: (),

    #[arg(short='V', long, action=ArgAction::Version, help="Prints version information.")]
    version: (),
}
