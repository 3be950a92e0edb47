// Copyright (C) 2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

//! The persistence interface the serialization layer works against,
//! along with an in-memory implementation of it.

use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::Context as _;
use anyhow::Result;

use chrono::DateTime;
use chrono::Utc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::from_slice as from_json;
use serde_json::to_vec_pretty as to_json;

use tokio::fs::create_dir_all;
use tokio::fs::read;
use tokio::fs::write;

use crate::adventures::Adventure;
use crate::adventures::AdventureImage;
use crate::checklists::Checklist;
use crate::checklists::ChecklistItem;
use crate::collections::Collection;
use crate::db::Table;
use crate::error::NotFound;
use crate::error::ValidationErrors;
use crate::id::Id;
use crate::log::debug;
use crate::log::trace;
use crate::notes::Note;
use crate::transportations::Transportation;
use crate::users::User;


/// A trait for types that can be persisted in a [`Store`].
pub trait Record: Clone + Debug + Sized {
  /// A human readable name of the kind of record.
  const KIND: &'static str;

  /// Retrieve the record's ID.
  fn id(&self) -> Id<Self>;

  /// Mark the record as modified at `now`.
  fn touch(&mut self, _now: DateTime<Utc>) {}

  /// Retrieve the table storing records of this type.
  fn table(tables: &Tables) -> &Table<Self>;

  /// Retrieve the table storing records of this type, mutably.
  fn table_mut(tables: &mut Tables) -> &mut Table<Self>;
}


/// The persistence interface.
///
/// A store supports creation, retrieval, update, and deletion of
/// records by ID, traversal of relationships by filtering on foreign
/// keys, as well as transactional scoping of a sequence of operations.
pub trait Store {
  /// Retrieve the current time, as used for record timestamps.
  fn now(&self) -> DateTime<Utc>;

  /// Create a new record.
  ///
  /// `make` receives the ID allocated for the record as well as the
  /// creation time and constructs the record to persist.
  fn create<R, F>(&mut self, make: F) -> Result<R>
  where
    R: Record,
    F: FnOnce(Id<R>, DateTime<Utc>) -> R;

  /// Retrieve the record with the given ID, if it exists.
  fn get<R>(&self, id: Id<R>) -> Result<Option<R>>
  where
    R: Record;

  /// Persist a modified version of an existing record.
  ///
  /// The record is touched before it is stored and the stored version
  /// is returned.
  fn update<R>(&mut self, record: R) -> Result<R>
  where
    R: Record;

  /// Delete the record with the given ID, reporting whether it existed.
  fn delete<R>(&mut self, id: Id<R>) -> Result<bool>
  where
    R: Record;

  /// Retrieve all records matching `pred`, in ID order.
  fn filter<R, P>(&self, pred: P) -> Result<Vec<R>>
  where
    R: Record,
    P: FnMut(&R) -> bool;

  /// Run `f` as a single all-or-nothing unit.
  ///
  /// If `f` fails, none of the changes it made are retained.
  fn transaction<T, F>(&mut self, f: F) -> Result<T>
  where
    Self: Sized,
    F: FnOnce(&mut Self) -> Result<T>;

  /// Retrieve the record with the given ID, failing with [`NotFound`]
  /// if it does not exist.
  fn fetch<R>(&self, id: Id<R>) -> Result<R>
  where
    R: Record,
  {
    self.get(id)?.ok_or_else(|| NotFound::new(id).into())
  }
}


/// Resolve a relationship field of a payload.
///
/// A dangling reference is recorded as a failure for `field` in
/// `errors`.
pub(crate) fn resolve_reference<S, R>(
  store: &S,
  field: &str,
  id: Option<Id<R>>,
  errors: &mut ValidationErrors,
) -> Result<Option<R>>
where
  S: Store,
  R: Record,
{
  let Some(id) = id else { return Ok(None) };

  let record = store.get(id)?;
  if record.is_none() {
    let () = errors.add(
      field,
      format!("invalid pk \"{id}\": {} does not exist", R::KIND),
    );
  }
  Ok(record)
}


/// The tables making up a [`MemStore`].
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Tables {
  #[serde(default)]
  pub(crate) users: Table<User>,
  #[serde(default)]
  pub(crate) adventures: Table<Adventure>,
  #[serde(default)]
  pub(crate) adventure_images: Table<AdventureImage>,
  #[serde(default)]
  pub(crate) transportations: Table<Transportation>,
  #[serde(default)]
  pub(crate) notes: Table<Note>,
  #[serde(default)]
  pub(crate) checklists: Table<Checklist>,
  #[serde(default)]
  pub(crate) checklist_items: Table<ChecklistItem>,
  #[serde(default)]
  pub(crate) collections: Table<Collection>,
}


/// An in-memory [`Store`], optionally persisted as a JSON file.
///
/// Transactions are implemented by taking a snapshot of all tables
/// before running the transaction and restoring it on failure.
#[derive(Debug, Default)]
pub struct MemStore {
  tables: Tables,
}

impl MemStore {
  /// Load a store from the JSON file at `path`.
  ///
  /// A missing file results in an empty store.
  pub async fn load(path: &Path) -> Result<Self> {
    let data = match read(path).await {
      Ok(data) => data,
      Err(err) if err.kind() == ErrorKind::NotFound => {
        debug!("data file {} not found; starting empty", path.display());
        return Ok(Self::default())
      },
      Err(err) => {
        return Err(err).with_context(|| format!("failed to read {}", path.display()))
      },
    };

    let tables = from_json::<Tables>(&data)
      .with_context(|| format!("failed to parse data file {}", path.display()))?;
    Ok(Self { tables })
  }

  /// Persist the store into the JSON file at `path`.
  pub async fn save(&self, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
      let () = create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }

    let data = to_json(&self.tables).context("failed to serialize data")?;
    let () = write(path, data)
      .await
      .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
  }
}

impl Store for MemStore {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }

  fn create<R, F>(&mut self, make: F) -> Result<R>
  where
    R: Record,
    F: FnOnce(Id<R>, DateTime<Utc>) -> R,
  {
    let now = self.now();
    let record = R::table_mut(&mut self.tables).insert_with(|id| make(id, now));
    trace!("created {} {}", R::KIND, record.id());
    Ok(record.clone())
  }

  fn get<R>(&self, id: Id<R>) -> Result<Option<R>>
  where
    R: Record,
  {
    Ok(R::table(&self.tables).get(id).cloned())
  }

  fn update<R>(&mut self, mut record: R) -> Result<R>
  where
    R: Record,
  {
    let () = record.touch(self.now());
    let id = record.id();
    let _old = R::table_mut(&mut self.tables)
      .replace(record.clone())
      .ok_or_else(|| NotFound::new(id))?;
    Ok(record)
  }

  fn delete<R>(&mut self, id: Id<R>) -> Result<bool>
  where
    R: Record,
  {
    let removed = R::table_mut(&mut self.tables).remove(id).is_some();
    trace!("deleting {} {id}: existed={removed}", R::KIND);
    Ok(removed)
  }

  fn filter<R, P>(&self, mut pred: P) -> Result<Vec<R>>
  where
    R: Record,
    P: FnMut(&R) -> bool,
  {
    let records = R::table(&self.tables)
      .iter()
      .filter(|record| pred(record))
      .cloned()
      .collect();
    Ok(records)
  }

  fn transaction<T, F>(&mut self, f: F) -> Result<T>
  where
    F: FnOnce(&mut Self) -> Result<T>,
  {
    let snapshot = self.tables.clone();
    match f(self) {
      Ok(value) => Ok(value),
      Err(err) => {
        debug!("rolling back transaction: {err}");
        self.tables = snapshot;
        Err(err)
      },
    }
  }
}
