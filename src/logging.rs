use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

/// Initialise `env_logger` with a `warn` default that `RUST_LOG` overrides.
/// While the terminal UI owns the screen, output goes to `file` instead of
/// stderr.
pub fn init(file: Option<&Path>) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));

    if let Some(path) = file {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Opening log file {:?}", path))?;
        builder.target(Target::Pipe(Box::new(log_file)));
    }

    builder.try_init().context("Initialising logger")?;
    Ok(())
}
