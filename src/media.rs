// Copyright (C) 2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

/// The public base URL used when none is configured.
pub const DEFAULT_PUBLIC_URL: &str = "http://127.0.0.1:8000";


/// Maps stored file references to publicly reachable URLs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MediaResolver {
  /// The sanitized base URL, without trailing slashes.
  base_url: String,
}

impl MediaResolver {
  /// Create a resolver for the given public base URL.
  ///
  /// Trailing slashes and any single quote characters are removed from
  /// `base_url`. No further validation happens: a malformed URL is
  /// used as is.
  pub fn new(base_url: &str) -> Self {
    let base_url = base_url.trim_end_matches('/').replace('\'', "");
    Self { base_url }
  }

  /// Retrieve the sanitized base URL.
  #[inline]
  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Resolve the file stored at `path` (relative to the media root)
  /// to its public URL.
  ///
  /// `None` is returned for an empty path, as it does not refer to a
  /// file.
  pub fn resolve(&self, path: &str) -> Option<String> {
    if path.is_empty() {
      None
    } else {
      Some(format!("{}/media/{path}", self.base_url))
    }
  }
}

impl Default for MediaResolver {
  fn default() -> Self {
    Self::new(DEFAULT_PUBLIC_URL)
  }
}
