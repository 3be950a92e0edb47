// Copyright (C) 2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;

use serde::Serialize;
use serde_json::Value;

use crate::checklists::Checklist as ChecklistRecord;
use crate::checklists::ChecklistItem as ChecklistItemRecord;
use crate::collections::Collection;
use crate::error::ValidationErrors;
use crate::id::Id;
use crate::ser::fields::Fields;
use crate::ser::ToSerde;
use crate::users::User;


/// Fields of a checklist that may not be written.
pub const CHECKLIST_READ_ONLY: &[&str] = &["id", "user_id", "created_at", "updated_at"];
/// Fields of a checklist item that may not be written.
pub const ITEM_READ_ONLY: &[&str] = &["id", "user_id", "created_at", "updated_at", "checklist"];
/// Fields of an item nested in a checklist payload that may not be
/// written. The item's `id` is used for matching it against existing
/// items instead.
const ENTRY_READ_ONLY: &[&str] = &["user_id", "created_at", "updated_at", "checklist"];


/// The wire representation of a checklist item.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ChecklistItem {
  pub id: Id<ChecklistItemRecord>,
  pub user_id: Id<User>,
  pub name: String,
  pub is_checked: bool,
  pub checklist: Id<ChecklistRecord>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl ToSerde for ChecklistItemRecord {
  type Output = ChecklistItem;

  fn to_serde(&self) -> Self::Output {
    ChecklistItem {
      id: self.id,
      user_id: self.user_id,
      name: self.name.clone(),
      is_checked: self.is_checked,
      checklist: self.checklist,
      created_at: self.created_at,
      updated_at: self.updated_at,
    }
  }
}


/// The wire representation of a checklist, including its items.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Checklist {
  pub id: Id<ChecklistRecord>,
  pub user_id: Id<User>,
  pub name: String,
  pub date: Option<NaiveDate>,
  pub is_public: bool,
  pub collection: Option<Id<Collection>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub items: Vec<ChecklistItem>,
}


/// The writable fields of a checklist item present in a payload.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChecklistItemPatch {
  pub name: Option<String>,
  pub is_checked: Option<bool>,
}

impl ChecklistItemPatch {
  fn take(fields: &mut Fields) -> Self {
    Self {
      name: fields.take("name"),
      is_checked: fields.take("is_checked"),
    }
  }

  /// Parse a write payload for a stand-alone item.
  pub fn from_json(payload: Value) -> Result<Self, ValidationErrors> {
    let mut fields = Fields::new(payload, ITEM_READ_ONLY)?;
    let patch = Self::take(&mut fields);
    fields.finish(patch)
  }
}


/// An item entry of a checklist payload.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ItemEntry {
  /// The ID of the existing item the entry refers to, if any.
  pub id: Option<Id<ChecklistItemRecord>>,
  /// The item's writable fields.
  pub patch: ChecklistItemPatch,
}

impl ItemEntry {
  /// Parse an item entry nested in a checklist payload.
  pub fn from_json(payload: Value) -> Result<Self, ValidationErrors> {
    let mut fields = Fields::new(payload, ENTRY_READ_ONLY)?;
    let entry = Self {
      id: fields.take_nullable("id").flatten(),
      patch: ChecklistItemPatch::take(&mut fields),
    };
    fields.finish(entry)
  }
}


/// The writable fields of a checklist present in a payload.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChecklistPatch {
  pub name: Option<String>,
  pub date: Option<Option<NaiveDate>>,
  pub is_public: Option<bool>,
  pub collection: Option<Option<Id<Collection>>>,
  /// The complete list of items the checklist should end up with, if
  /// supplied.
  pub items: Option<Vec<ItemEntry>>,
}

impl ChecklistPatch {
  /// Parse a write payload.
  pub fn from_json(payload: Value) -> Result<Self, ValidationErrors> {
    let mut fields = Fields::new(payload, CHECKLIST_READ_ONLY)?;
    let patch = Self {
      name: fields.take("name"),
      date: fields.take_nullable("date"),
      is_public: fields.take("is_public"),
      collection: fields.take_nullable("collection"),
      items: fields.take_nested("items", ItemEntry::from_json),
    };
    fields.finish(patch)
  }
}
