// Copyright (C) 2024-2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;
use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Result;

use dirs::data_dir;


/// A type taking care of the program's path handling needs.
#[derive(Debug)]
pub struct Paths {
  /// The path to the data file storing all records.
  data_file: PathBuf,
}

impl Paths {
  /// Instantiate a new `Paths` object, optionally using `data_file` as
  /// the file storing all records.
  pub fn new(data_file: Option<PathBuf>) -> Result<Self> {
    let data_file = if let Some(data_file) = data_file {
      data_file
    } else {
      data_dir()
        .ok_or_else(|| anyhow!("unable to determine data directory"))?
        .join("trailmark")
        .join("store.json")
    };

    let slf = Self { data_file };
    Ok(slf)
  }

  /// Retrieve the path to the program's data file.
  pub fn data_file(&self) -> &Path {
    &self.data_file
  }

  /// Retrieve the path to the program's lock file.
  ///
  /// The lock file lives next to the data file it protects.
  pub(crate) fn lock_file(&self) -> PathBuf {
    let mut lock_file = self.data_file.clone().into_os_string();
    let () = lock_file.push(".lock");
    PathBuf::from(lock_file)
  }
}
