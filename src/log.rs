// Copyright (C) 2025-2026 Daniel Mueller <deso@posteo.net>
// SPDX-License-Identifier: GPL-3.0-or-later


#[cfg(feature = "log")]
#[expect(unused_imports, clippy::module_inception)]
mod log {
  use std::env::temp_dir;
  use std::env::var_os;
  use std::fs::File;
  use std::panic::set_hook;
  use std::panic::take_hook;
  use std::path::Path;
  use std::path::PathBuf;
  use std::str::FromStr as _;

  use anyhow::anyhow;
  use anyhow::Context as _;
  use anyhow::Result;

  use tracing::subscriber::set_global_default as set_global_subscriber;
  use tracing::Level;
  use tracing::Subscriber;
  use tracing_subscriber::fmt::time::SystemTime;
  use tracing_subscriber::FmtSubscriber;

  pub(crate) use tracing::debug;
  pub(crate) use tracing::error;
  pub(crate) use tracing::info;
  pub(crate) use tracing::trace;
  pub(crate) use tracing::warn;

  /// The environment variable specifying the maximum level to log at.
  const LOG_LEVEL_VAR: &str = "TRAILMARK_LOG";
  /// The environment variable overriding the path of the log file.
  const LOG_FILE_VAR: &str = "TRAILMARK_LOG_FILE";


  /// Determine the maximum level to log at, as configured by the user.
  fn max_level() -> Result<Level> {
    match var_os(LOG_LEVEL_VAR) {
      Some(level) => {
        let level = level
          .to_str()
          .ok_or_else(|| anyhow!("{LOG_LEVEL_VAR} value is not valid UTF-8"))?;
        Level::from_str(level).with_context(|| format!("invalid {LOG_LEVEL_VAR} value: {level}"))
      },
      None => Ok(Level::INFO),
    }
  }

  /// Create a `Subscriber` that logs events up to `level` to a file at
  /// the given path.
  fn make_subscriber(
    log_path: &Path,
    level: Level,
  ) -> Result<impl Subscriber + Send + Sync + 'static> {
    let log_file = File::options()
      .create(true)
      .truncate(true)
      .read(false)
      .write(true)
      .open(log_path)
      .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let subscriber = FmtSubscriber::builder()
      .with_ansi(true)
      .with_level(true)
      .with_target(false)
      .with_max_level(level)
      .with_timer(SystemTime)
      .with_writer(log_file)
      .finish();

    Ok(subscriber)
  }

  pub(crate) fn init() -> Result<()> {
    let log_file = var_os(LOG_FILE_VAR)
      .map(PathBuf::from)
      .unwrap_or_else(|| temp_dir().join("trailmark.log"));
    let level = max_level()?;
    let subscriber =
      make_subscriber(&log_file, level).context("failed to create tracing subscriber")?;
    let () = set_global_subscriber(subscriber).context("failed to set tracing subscriber")?;

    let default_panic = take_hook();
    let () = set_hook(Box::new(move |panic_info| {
      error!("Panic: {panic_info}");
      default_panic(panic_info);
    }));
    Ok(())
  }
}

#[cfg(not(feature = "log"))]
#[expect(unused_imports, clippy::module_inception)]
mod log {
  use anyhow::Result;

  macro_rules! debug {
    ($($args:tt)*) => {};
  }
  pub(crate) use debug;
  pub(crate) use debug as error;
  pub(crate) use debug as info;
  pub(crate) use debug as trace;
  pub(crate) use debug as warn;

  pub(crate) fn init() -> Result<()> {
    Ok(())
  }
}

pub(crate) use log::*;
