// Copyright (C) 2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

//! Free form notes.

use anyhow::Result;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::collections::Collection;
use crate::db::Table;
use crate::error::ValidationErrors;
use crate::id::Id;
use crate::ser::fields::assign;
use crate::ser::notes::NotePatch;
use crate::store::resolve_reference;
use crate::store::Record;
use crate::store::Store;
use crate::store::Tables;
use crate::users::User;


/// A free form note.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Note {
  pub id: Id<Note>,
  pub user_id: Id<User>,
  pub name: String,
  pub content: Option<String>,
  pub links: Vec<String>,
  pub date: Option<NaiveDate>,
  pub is_public: bool,
  pub collection: Option<Id<Collection>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Note {
  fn apply(&mut self, patch: NotePatch) -> bool {
    let NotePatch {
      name,
      content,
      date,
      links,
      is_public,
      collection,
    } = patch;

    [
      assign(&mut self.name, name),
      assign(&mut self.content, content),
      assign(&mut self.date, date),
      assign(&mut self.links, links),
      assign(&mut self.is_public, is_public),
      assign(&mut self.collection, collection),
    ]
    .contains(&true)
  }
}

impl Record for Note {
  const KIND: &'static str = "note";

  #[inline]
  fn id(&self) -> Id<Self> {
    self.id
  }

  fn touch(&mut self, now: DateTime<Utc>) {
    self.updated_at = now
  }

  fn table(tables: &Tables) -> &Table<Self> {
    &tables.notes
  }

  fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
    &mut tables.notes
  }
}


/// Create a note owned by `user` from a write payload.
pub fn create<S>(store: &mut S, user: Id<User>, payload: Value) -> Result<Note>
where
  S: Store,
{
  let _user = store.fetch(user)?;
  let patch = NotePatch::from_json(payload)?;

  let mut errors = ValidationErrors::default();
  let _collection = resolve_reference(store, "collection", patch.collection.flatten(), &mut errors)?;
  let name = errors.require("name", patch.name.clone());
  let (Some(name), true) = (name, errors.is_empty()) else {
    return Err(errors.into())
  };

  store.create(|id, now| {
    let mut note = Note {
      id,
      user_id: user,
      name,
      content: None,
      links: Vec::new(),
      date: None,
      is_public: false,
      collection: None,
      created_at: now,
      updated_at: now,
    };
    let _changed = note.apply(patch);
    note
  })
}

/// Update a note from a (partial) write payload.
pub fn update<S>(store: &mut S, id: Id<Note>, payload: Value) -> Result<Note>
where
  S: Store,
{
  let patch = NotePatch::from_json(payload)?;
  let mut note = store.fetch(id)?;

  let mut errors = ValidationErrors::default();
  let _collection = resolve_reference(store, "collection", patch.collection.flatten(), &mut errors)?;
  let () = errors.into_result()?;

  if note.apply(patch) {
    note = store.update(note)?;
  }
  Ok(note)
}

/// Delete a note.
pub fn delete<S>(store: &mut S, id: Id<Note>) -> Result<()>
where
  S: Store,
{
  let _note = store.fetch(id)?;
  let _deleted = store.delete(id)?;
  Ok(())
}
