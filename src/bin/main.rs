use std::{
    io::stdout,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::{Context, Result};
use log::info;
use sysgauge::{
    canvas::run_dashboard,
    collection::SysinfoSource,
    headless::run_headless,
    options::{get_args, get_config_path, get_or_create_config, init_settings},
    spawn_sampler,
};

fn main() -> Result<()> {
    let args = get_args();

    #[cfg(feature = "logging")]
    if let Some(log_file) = &args.output.log {
        sysgauge::utils::logging::init_logger(args.output.log_level, log_file.as_os_str())
            .context("Unable to open the log file.")?;
    }

    let config_path = get_config_path(args.general.config.as_deref());
    let config = get_or_create_config(config_path.as_deref())
        .context("Unable to properly parse or create the config file.")?;
    let settings = init_settings(&args, &config)?;

    info!("Main: starting with {settings:?}");

    let (hub, sampler) = spawn_sampler(SysinfoSource::default(), settings.sampler);

    if settings.headless {
        let is_terminated = Arc::new(AtomicBool::new(false));
        {
            let is_terminated = is_terminated.clone();
            ctrlc::set_handler(move || {
                is_terminated.store(true, Ordering::SeqCst);
            })?;
        }

        run_headless(
            &hub,
            &settings.view,
            settings.count,
            &is_terminated,
            &mut stdout().lock(),
        )?;
    } else {
        run_dashboard(&hub, &settings.view, settings.sampler.tick)?;
    }

    sampler.stop();

    Ok(())
}
