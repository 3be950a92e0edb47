// Copyright (C) 2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error types surfaced to callers of the create and update
//! operations.
//!
//! All operations return [`anyhow::Result`]. Callers interested in the
//! reason for a failure can recover the errors defined here by means
//! of [`anyhow::Error::downcast_ref`].

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use serde::Serialize;

use crate::id::Id;
use crate::store::Record;


/// The message reported for a required field that was not supplied.
pub const REQUIRED: &str = "this field is required";
/// The message reported for a non-nullable field set to `null`.
pub const NOT_NULL: &str = "this field may not be null";
/// The message reported for a field that may not be written.
pub const READ_ONLY: &str = "this field is read-only";
/// The message reported for a field that is not known.
pub const UNKNOWN: &str = "unknown field";


/// A collection of validation failures for a single payload.
///
/// Failures are either attributed to a field, or they are "global",
/// i.e., they concern the payload as a whole. When serialized, the
/// object maps field names to lists of messages and reports global
/// failures under the `non_field_errors` key.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ValidationErrors {
  #[serde(flatten)]
  fields: BTreeMap<String, Vec<String>>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  non_field_errors: Vec<String>,
}

impl ValidationErrors {
  /// Create a `ValidationErrors` object containing a single non-field
  /// error.
  pub fn non_field<M>(message: M) -> Self
  where
    M: Into<String>,
  {
    let mut errors = Self::default();
    let () = errors.add_non_field(message);
    errors
  }

  /// Record a failure for the given field.
  pub fn add<F, M>(&mut self, field: F, message: M)
  where
    F: Into<String>,
    M: Into<String>,
  {
    self
      .fields
      .entry(field.into())
      .or_default()
      .push(message.into())
  }

  /// Record a failure not attributable to a single field.
  pub fn add_non_field<M>(&mut self, message: M)
  where
    M: Into<String>,
  {
    self.non_field_errors.push(message.into())
  }

  /// Check that a required value was supplied, recording a failure for
  /// `field` if it was not.
  pub fn require<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
      let () = self.add(field, REQUIRED);
    }
    value
  }

  /// Merge the failures of a nested payload, prefixing each of its
  /// field names with `prefix`.
  ///
  /// Non-field failures of the nested payload are attributed to
  /// `prefix` itself.
  pub fn merge_nested(&mut self, prefix: &str, nested: ValidationErrors) {
    let Self {
      fields,
      non_field_errors,
    } = nested;

    for (field, messages) in fields {
      let () = self
        .fields
        .entry(format!("{prefix}.{field}"))
        .or_default()
        .extend(messages);
    }
    for message in non_field_errors {
      let () = self.add(prefix, message);
    }
  }

  /// Retrieve the failures recorded for `field`.
  pub fn field(&self, field: &str) -> Option<&[String]> {
    self.fields.get(field).map(Vec::as_slice)
  }

  /// Retrieve the failures not attributed to any field.
  pub fn non_field_errors(&self) -> &[String] {
    &self.non_field_errors
  }

  /// Check whether no failure has been recorded.
  pub fn is_empty(&self) -> bool {
    self.fields.is_empty() && self.non_field_errors.is_empty()
  }

  /// Convert the object into a `Result`, which is an error if any
  /// failure has been recorded.
  pub fn into_result(self) -> Result<(), Self> {
    if self.is_empty() {
      Ok(())
    } else {
      Err(self)
    }
  }
}

impl Display for ValidationErrors {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    write!(f, "validation failed")?;

    let mut sep = ": ";
    for message in &self.non_field_errors {
      write!(f, "{sep}{message}")?;
      sep = "; ";
    }
    for (field, messages) in &self.fields {
      for message in messages {
        write!(f, "{sep}{field}: {message}")?;
        sep = "; ";
      }
    }
    Ok(())
  }
}

impl Error for ValidationErrors {}


/// An error indicating that a record does not exist.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NotFound {
  /// The kind of record that was looked up.
  pub kind: &'static str,
  /// The ID that was looked up.
  pub id: usize,
}

impl NotFound {
  /// Create a `NotFound` error for the given record ID.
  pub fn new<R>(id: Id<R>) -> Self
  where
    R: Record,
  {
    Self {
      kind: R::KIND,
      id: id.get().get(),
    }
  }
}

impl Display for NotFound {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    write!(f, "{} {} does not exist", self.kind, self.id)
  }
}

impl Error for NotFound {}
