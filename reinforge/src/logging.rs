//! Logger setup.
use crate::cli::LogLevel;
use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use log::LevelFilter;
use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::Path,
};

/// Writes everything to a log file and to stderr.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        io::stderr().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        io::stderr().flush()
    }
}

/// Initializes the global logger.
///
/// Without `level`, the filter is taken from `RUST_LOG`, defaulting to `info`.
pub fn init(level: Option<LogLevel>, logfile: Option<&Path>) -> Result<()> {
    let mut builder = match level {
        Some(level) => {
            let mut builder = Builder::new();
            builder.filter_level(LevelFilter::from(level));
            builder
        }
        None => Builder::from_env(Env::default().default_filter_or("info")),
    };

    if let Some(path) = logfile {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {:?}", dir))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {:?}", path))?;
        builder.target(Target::Pipe(Box::new(Tee { file })));
    }

    builder.try_init()?;
    Ok(())
}
