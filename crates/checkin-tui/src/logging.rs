use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::Result;
use checkin_core::Config;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE: &str = "checkin.log";

/// Send `tracing` output to a file in the config directory. The terminal is
/// owned by the UI, so nothing goes to stdout or stderr.
pub fn init() -> Result<()> {
    let dir = Config::config_dir()?;
    fs::create_dir_all(&dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "checkin_core=info,checkin_tui=info".into()),
        )
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .try_init()?;

    Ok(())
}
