use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::Result;

/// Environment variable holding the log filter directives
pub const LOG_ENV: &str = "DEVDASH_LOG";

/// Install the global subscriber.
///
/// Without a log file, output goes to stderr and is off unless `DEVDASH_LOG`
/// asks for it, since anything on the terminal would tear the dashboard.
/// With a log file, the default level is `info`.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let default_level = if log_file.is_some() { "info" } else { "off" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    if let Err(err) = installed {
        // Already installed; the first subscriber stays
        tracing::debug!(error = %err, "log subscriber not replaced");
    }
    Ok(())
}
