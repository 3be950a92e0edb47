// Copyright (C) 2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;

use serde::Serialize;
use serde_json::Value;

use crate::collections::Collection;
use crate::error::ValidationErrors;
use crate::id::Id;
use crate::notes::Note as NoteRecord;
use crate::ser::fields::Fields;
use crate::ser::ToSerde;
use crate::users::User;


/// Fields of a note that may not be written.
pub const READ_ONLY: &[&str] = &["id", "user_id", "created_at", "updated_at"];


/// The wire representation of a note.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Note {
  pub id: Id<NoteRecord>,
  pub user_id: Id<User>,
  pub name: String,
  pub content: Option<String>,
  pub date: Option<NaiveDate>,
  pub links: Vec<String>,
  pub is_public: bool,
  pub collection: Option<Id<Collection>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl ToSerde for NoteRecord {
  type Output = Note;

  fn to_serde(&self) -> Self::Output {
    Note {
      id: self.id,
      user_id: self.user_id,
      name: self.name.clone(),
      content: self.content.clone(),
      date: self.date,
      links: self.links.clone(),
      is_public: self.is_public,
      collection: self.collection,
      created_at: self.created_at,
      updated_at: self.updated_at,
    }
  }
}


/// The writable fields of a note present in a payload.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NotePatch {
  pub name: Option<String>,
  pub content: Option<Option<String>>,
  pub date: Option<Option<NaiveDate>>,
  pub links: Option<Vec<String>>,
  pub is_public: Option<bool>,
  pub collection: Option<Option<Id<Collection>>>,
}

impl NotePatch {
  /// Parse a write payload.
  pub fn from_json(payload: Value) -> Result<Self, ValidationErrors> {
    let mut fields = Fields::new(payload, READ_ONLY)?;
    let patch = Self {
      name: fields.take("name"),
      content: fields.take_nullable("content"),
      date: fields.take_nullable("date"),
      links: fields.take("links"),
      is_public: fields.take("is_public"),
      collection: fields.take_nullable("collection"),
    };
    fields.finish(patch)
  }
}
