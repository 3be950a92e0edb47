// Copyright (C) 2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;

use serde::Serialize;
use serde_json::Value;

use uuid::Uuid;

use crate::collections::Collection as CollectionRecord;
use crate::error::ValidationErrors;
use crate::id::Id;
use crate::ser::adventures::Adventure;
use crate::ser::checklists::Checklist;
use crate::ser::fields::Fields;
use crate::ser::notes::Note;
use crate::ser::transportations::Transportation;
use crate::users::User;


/// Fields of a collection that may not be written.
pub const READ_ONLY: &[&str] = &[
  "id",
  "user_id",
  "created_at",
  "updated_at",
  "adventures",
  "transportations",
  "notes",
  "checklists",
];


/// The wire representation of a collection, embedding everything
/// associated with it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Collection {
  pub id: Id<CollectionRecord>,
  pub description: Option<String>,
  pub user_id: Id<User>,
  pub name: String,
  pub is_public: bool,
  pub adventures: Vec<Adventure>,
  pub created_at: DateTime<Utc>,
  pub start_date: Option<NaiveDate>,
  pub end_date: Option<NaiveDate>,
  pub transportations: Vec<Transportation>,
  pub notes: Vec<Note>,
  pub updated_at: DateTime<Utc>,
  pub checklists: Vec<Checklist>,
  pub is_archived: bool,
  /// The UUIDs of the users the collection is shared with.
  pub shared_with: Vec<Uuid>,
}


/// The writable fields of a collection present in a payload.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CollectionPatch {
  pub description: Option<Option<String>>,
  pub name: Option<String>,
  pub is_public: Option<bool>,
  pub start_date: Option<Option<NaiveDate>>,
  pub end_date: Option<Option<NaiveDate>>,
  pub is_archived: Option<bool>,
  /// The UUIDs of the users to share the collection with.
  pub shared_with: Option<Vec<Uuid>>,
}

impl CollectionPatch {
  /// Parse a write payload.
  pub fn from_json(payload: Value) -> Result<Self, ValidationErrors> {
    let mut fields = Fields::new(payload, READ_ONLY)?;
    let patch = Self {
      description: fields.take_nullable("description"),
      name: fields.take("name"),
      is_public: fields.take("is_public"),
      start_date: fields.take_nullable("start_date"),
      end_date: fields.take_nullable("end_date"),
      is_archived: fields.take("is_archived"),
      shared_with: fields.take("shared_with"),
    };
    fields.finish(patch)
  }
}
