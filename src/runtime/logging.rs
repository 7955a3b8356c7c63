use std::error::Error;
use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingSettings;

/// Install the file subscriber. Returns false when no log file is configured,
/// since stderr belongs to the terminal UI.
pub fn init(settings: &LoggingSettings) -> Result<bool, Box<dyn Error>> {
    let Some(path) = &settings.file else {
        return Ok(false);
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter =
        EnvFilter::try_from_env("EIGHTD_LOG").unwrap_or_else(|_| EnvFilter::new(&settings.filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()?;
    Ok(true)
}
