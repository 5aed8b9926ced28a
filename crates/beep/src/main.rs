use std::process::ExitCode;

use anyhow::Context as _;
use beep_core::DriverRegistry;

use crate::cli::Config;
use crate::playback::Outcome;

mod cli;
mod logger;
mod playback;
mod signal;

fn main() -> anyhow::Result<ExitCode> {
    let config = Config::from_args(std::env::args_os()).unwrap_or_else(|err| err.exit());
    logger::init(config.log_level);
    let interrupted = signal::install().context("failed to install signal handlers")?;

    let mut registry = DriverRegistry::with_default_drivers();
    let mut driver = registry
        .select(config.device.as_deref())
        .context("cannot find a device to beep with")?;

    let outcome = playback::play(&mut driver, &config.notes, &interrupted);
    driver.fini();

    match outcome {
        Outcome::Finished => Ok(ExitCode::SUCCESS),
        Outcome::Interrupted => {
            log::warn!("interrupted, speaker silenced");
            Ok(ExitCode::FAILURE)
        }
    }
}
