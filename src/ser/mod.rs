// Copyright (C) 2018-2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

//! A module housing the wire representations of records as well as
//! the typed patches parsed from write payloads.

#[allow(missing_docs)]
pub mod adventures;
#[allow(missing_docs)]
pub mod checklists;
#[allow(missing_docs)]
pub mod collections;
pub mod fields;
#[allow(missing_docs)]
pub mod notes;
#[allow(missing_docs)]
pub mod transportations;


/// A trait for types that can be converted into a serializable representation.
pub trait ToSerde {
  /// The result being produced.
  type Output;

  /// Create a serializable representation of `Self`.
  fn to_serde(&self) -> Self::Output;
}
