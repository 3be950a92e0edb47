// Copyright (C) 2022-2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::BTreeSet;
use std::mem::replace;
use std::slice;

use serde::de::Error as _;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use crate::id::AllocId;
use crate::id::Id;
use crate::store::Record;


/// An iterator over the rows of a `Table`.
pub type Iter<'table, T> = slice::Iter<'table, T>;


/// A table storing records of a single type.
///
/// Rows are kept ordered by their ID. The table keeps track of every ID
/// it ever handed out, so that the ID of a removed row is never
/// allocated again.
#[derive(Clone, Debug)]
pub struct Table<T> {
  /// All IDs allocated so far, including those of removed rows.
  allocated: BTreeSet<usize>,
  /// The rows this table manages, sorted by ID.
  rows: Vec<T>,
}

impl<T> Default for Table<T> {
  fn default() -> Self {
    Self {
      allocated: BTreeSet::new(),
      rows: Vec::new(),
    }
  }
}

impl<T> Table<T>
where
  T: Record,
{
  /// Create a table from a set of rows, checking that IDs are unique.
  fn try_from_rows(mut rows: Vec<T>, retired: BTreeSet<usize>) -> Result<Self, String> {
    let () = rows.sort_by_key(T::id);

    let mut allocated = BTreeSet::new();
    for row in &rows {
      let id = row.id().get().get();
      if AllocId::<T>::try_reserve_id(&mut allocated, id).is_none() {
        return Err(format!("{} ID {id} is used more than once", T::KIND))
      }
    }
    let () = allocated.extend(retired);

    Ok(Self { allocated, rows })
  }

  /// Look up the index of the row with the given ID.
  #[inline]
  fn position(&self, id: Id<T>) -> Result<usize, usize> {
    self.rows.binary_search_by_key(&id, T::id)
  }

  /// Allocate a fresh ID and insert the row created for it by `make`.
  pub fn insert_with<F>(&mut self, make: F) -> &T
  where
    F: FnOnce(Id<T>) -> T,
  {
    let id = AllocId::<T>::allocate_id(&mut self.allocated);
    let row = make(id);
    debug_assert_eq!(row.id(), id);

    let index = match self.position(id) {
      Ok(index) | Err(index) => index,
    };
    let () = self.rows.insert(index, row);
    &self.rows[index]
  }

  /// Retrieve the row with the given ID.
  #[inline]
  pub fn get(&self, id: Id<T>) -> Option<&T> {
    self.position(id).ok().map(|index| &self.rows[index])
  }

  /// Replace an existing row with `row`, returning the previous
  /// version.
  ///
  /// `None` is returned, and nothing changed, if no row with the
  /// same ID exists.
  pub fn replace(&mut self, row: T) -> Option<T> {
    let index = self.position(row.id()).ok()?;
    Some(replace(&mut self.rows[index], row))
  }

  /// Remove the row with the given ID.
  #[inline]
  pub fn remove(&mut self, id: Id<T>) -> Option<T> {
    let index = self.position(id).ok()?;
    Some(self.rows.remove(index))
  }

  /// Retrieve an iterator over the rows of the table, in ID order.
  #[inline]
  pub fn iter(&self) -> Iter<'_, T> {
    self.rows.iter()
  }
}

impl<T> Serialize for Table<T>
where
  T: Serialize,
{
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    #[derive(Serialize)]
    struct SerTable<'table, T> {
      allocated: &'table BTreeSet<usize>,
      rows: &'table [T],
    }

    let table = SerTable {
      allocated: &self.allocated,
      rows: &self.rows,
    };
    table.serialize(serializer)
  }
}

impl<'de, T> Deserialize<'de> for Table<T>
where
  T: Record + Deserialize<'de>,
{
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    #[derive(Deserialize)]
    struct SerTable<T> {
      #[serde(default)]
      allocated: BTreeSet<usize>,
      rows: Vec<T>,
    }

    let SerTable { allocated, rows } = SerTable::<T>::deserialize(deserializer)?;
    Self::try_from_rows(rows, allocated).map_err(D::Error::custom)
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  use serde_json::from_str as from_json;
  use serde_json::to_string as to_json;

  use crate::test::user;
  use crate::users::User;


  fn make_table(names: &[&str]) -> Table<User> {
    let mut table = Table::default();
    for name in names {
      let _user = table.insert_with(|id| user(id, name));
    }
    table
  }


  /// Check that we can insert rows and retrieve them by ID.
  #[test]
  fn insert_and_get() {
    let table = make_table(&["foo", "bar", "baz"]);
    let ids = table.iter().map(|user| user.id.get().get()).collect::<Vec<_>>();
    assert_eq!(ids, vec![1, 2, 3]);

    let bar = table.get(Id::try_from(2).unwrap()).unwrap();
    assert_eq!(bar.username, "bar");
    assert!(table.get(Id::try_from(4).unwrap()).is_none());
  }

  /// Make sure that IDs of removed rows are not handed out again.
  #[test]
  fn removed_ids_are_retired() {
    let mut table = make_table(&["foo", "bar", "baz"]);
    let baz = table.remove(Id::try_from(3).unwrap()).unwrap();
    assert_eq!(baz.username, "baz");
    assert!(table.remove(Id::try_from(3).unwrap()).is_none());

    let id = table.insert_with(|id| user(id, "foobar")).id;
    assert_eq!(id.get().get(), 4);
  }

  /// Check that we can replace an existing row, but not a missing one.
  #[test]
  fn replace_row() {
    let mut table = make_table(&["foo", "bar"]);
    let mut foo = table.get(Id::try_from(1).unwrap()).unwrap().clone();
    foo.username = "oof".to_string();

    let old = table.replace(foo.clone()).unwrap();
    assert_eq!(old.username, "foo");
    assert_eq!(table.get(foo.id).unwrap().username, "oof");

    let ghost = user(Id::try_from(42).unwrap(), "ghost");
    assert!(table.replace(ghost).is_none());
  }

  /// Check that allocation state survives serialization.
  #[test]
  fn serialize_deserialize_table() {
    let mut table = make_table(&["foo", "bar", "baz"]);
    let _removed = table.remove(Id::try_from(3).unwrap()).unwrap();

    let serialized = to_json(&table).unwrap();
    let mut deserialized = from_json::<Table<User>>(&serialized).unwrap();
    assert_eq!(deserialized.iter().count(), 2);

    let id = deserialized.insert_with(|id| user(id, "new")).id;
    assert_eq!(id.get().get(), 4);
  }

  /// Make sure that deserialization fails if an ID is used twice.
  #[test]
  fn deserialize_duplicate_ids() {
    let foo = user(Id::try_from(1).unwrap(), "foo");
    let bar = user(Id::try_from(1).unwrap(), "bar");
    let json = format!(
      r#"{{"rows": [{}, {}]}}"#,
      to_json(&foo).unwrap(),
      to_json(&bar).unwrap()
    );

    let err = from_json::<Table<User>>(&json).unwrap_err();
    assert!(err.to_string().contains("used more than once"), "{err}");
  }
}
