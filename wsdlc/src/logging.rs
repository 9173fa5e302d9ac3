use tracing_subscriber::EnvFilter;

use super::Error;

/// Installs the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init(level: &str) -> Result<(), Error> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(Error::Logger)
}
