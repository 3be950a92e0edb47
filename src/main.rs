// Copyright (C) 2017-2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

//! Inspect and modify the records of a trip journal.

use std::process::exit;

use trailmark::run;


fn main() {
  exit(run())
}
