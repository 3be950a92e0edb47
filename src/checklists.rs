// Copyright (C) 2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

//! Checklists and their items, created and updated as one unit.
//!
//! On update, the item entries of a payload are reconciled against the
//! items currently stored for the checklist: entries referring to one
//! of these items update it in place, all other entries create fresh
//! items, and stored items not referred to by any entry are deleted.

use std::collections::BTreeSet;

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
use crate::error::REQUIRED;
use crate::id::Id;
use crate::log::debug;
use crate::ser::checklists::Checklist as SerChecklist;
use crate::ser::checklists::ChecklistItemPatch;
use crate::ser::checklists::ChecklistPatch;
use crate::ser::checklists::ItemEntry;
use crate::ser::fields::assign;
use crate::ser::ToSerde as _;
use crate::store::resolve_reference;
use crate::store::Record;
use crate::store::Store;
use crate::store::Tables;
use crate::users::User;


/// The failure reported for a private checklist in a public
/// collection.
pub const PRIVATE_IN_PUBLIC: &str =
  "Checklists associated with a public collection must be public.";


/// A checklist.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Checklist {
  pub id: Id<Checklist>,
  pub user_id: Id<User>,
  pub name: String,
  pub date: Option<NaiveDate>,
  pub is_public: bool,
  pub collection: Option<Id<Collection>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Record for Checklist {
  const KIND: &'static str = "checklist";

  #[inline]
  fn id(&self) -> Id<Self> {
    self.id
  }

  fn touch(&mut self, now: DateTime<Utc>) {
    self.updated_at = now
  }

  fn table(tables: &Tables) -> &Table<Self> {
    &tables.checklists
  }

  fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
    &mut tables.checklists
  }
}


/// An item of a checklist.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct ChecklistItem {
  pub id: Id<ChecklistItem>,
  pub user_id: Id<User>,
  pub name: String,
  pub is_checked: bool,
  /// The checklist the item belongs to. Never changes once the item
  /// got created.
  pub checklist: Id<Checklist>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl ChecklistItem {
  fn apply(&mut self, patch: ChecklistItemPatch) -> bool {
    let ChecklistItemPatch { name, is_checked } = patch;

    [
      assign(&mut self.name, name),
      assign(&mut self.is_checked, is_checked),
    ]
    .contains(&true)
  }
}

impl Record for ChecklistItem {
  const KIND: &'static str = "checklist item";

  #[inline]
  fn id(&self) -> Id<Self> {
    self.id
  }

  fn touch(&mut self, now: DateTime<Utc>) {
    self.updated_at = now
  }

  fn table(tables: &Tables) -> &Table<Self> {
    &tables.checklist_items
  }

  fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
    &mut tables.checklist_items
  }
}


/// What to do for an item entry of a checklist payload.
#[derive(Debug)]
enum ItemPlan {
  /// Update an item of the checklist in place.
  Update(Id<ChecklistItem>, ChecklistItemPatch),
  /// Create a new item.
  Create { name: String, is_checked: bool },
}


/// Validate the collection a checklist is (to be) associated with.
///
/// A checklist in a public collection has to be public as well.
fn check_collection<S>(
  store: &S,
  collection: Option<Id<Collection>>,
  is_public: bool,
  errors: &mut ValidationErrors,
) -> Result<()>
where
  S: Store,
{
  let collection = resolve_reference(store, "collection", collection, errors)?;
  if let Some(collection) = collection {
    if collection.is_public && !is_public {
      let () = errors.add_non_field(PRIVATE_IN_PUBLIC);
    }
  }
  Ok(())
}

/// Match item entries against the IDs of the items currently
/// belonging to a checklist.
fn plan_items(
  entries: Vec<ItemEntry>,
  current: &BTreeSet<Id<ChecklistItem>>,
  errors: &mut ValidationErrors,
) -> Vec<ItemPlan> {
  entries
    .into_iter()
    .enumerate()
    .filter_map(|(index, entry)| {
      let ItemEntry { id, patch } = entry;
      if let Some(id) = id.filter(|id| current.contains(id)) {
        return Some(ItemPlan::Update(id, patch))
      }

      debug!("creating new item for entry {index} (supplied ID: {id:?})");
      let ChecklistItemPatch { name, is_checked } = patch;
      if name.is_none() {
        let () = errors.add(format!("items.{index}.name"), REQUIRED);
      }
      name.map(|name| ItemPlan::Create {
        name,
        is_checked: is_checked.unwrap_or(false),
      })
    })
    .collect()
}

/// Execute item plans for `checklist`, deleting all items in `current`
/// that are not updated.
fn reconcile<S>(
  store: &mut S,
  checklist: &Checklist,
  plans: Vec<ItemPlan>,
  current: BTreeSet<Id<ChecklistItem>>,
) -> Result<()>
where
  S: Store,
{
  let mut updated = BTreeSet::new();

  for plan in plans {
    match plan {
      ItemPlan::Update(id, patch) => {
        let mut item = store.fetch(id)?;
        if item.apply(patch) {
          let _item = store.update(item)?;
        }
        let _inserted = updated.insert(id);
      },
      ItemPlan::Create { name, is_checked } => {
        let _item = store.create(|id, now| ChecklistItem {
          id,
          user_id: checklist.user_id,
          name,
          is_checked,
          checklist: checklist.id,
          created_at: now,
          updated_at: now,
        })?;
      },
    }
  }

  for id in current.difference(&updated) {
    let _deleted = store.delete(*id)?;
  }
  Ok(())
}


/// Retrieve the items of a checklist, in the order they were created.
pub fn items_of<S>(store: &S, checklist: Id<Checklist>) -> Result<Vec<ChecklistItem>>
where
  S: Store,
{
  store.filter(|item: &ChecklistItem| item.checklist == checklist)
}

fn item_ids<S>(store: &S, checklist: Id<Checklist>) -> Result<BTreeSet<Id<ChecklistItem>>>
where
  S: Store,
{
  let ids = items_of(store, checklist)?
    .into_iter()
    .map(|item| item.id)
    .collect();
  Ok(ids)
}

/// Create the wire representation of a checklist, including its
/// items.
pub fn represent<S>(store: &S, checklist: &Checklist) -> Result<SerChecklist>
where
  S: Store,
{
  let items = items_of(store, checklist.id)?
    .iter()
    .map(ChecklistItem::to_serde)
    .collect();

  let checklist = SerChecklist {
    id: checklist.id,
    user_id: checklist.user_id,
    name: checklist.name.clone(),
    date: checklist.date,
    is_public: checklist.is_public,
    collection: checklist.collection,
    created_at: checklist.created_at,
    updated_at: checklist.updated_at,
    items,
  };
  Ok(checklist)
}

/// Create a checklist owned by `user`, along with its items, from a
/// write payload.
///
/// IDs supplied for items are ignored.
pub fn create<S>(store: &mut S, user: Id<User>, payload: Value) -> Result<Checklist>
where
  S: Store,
{
  let ChecklistPatch {
    name,
    date,
    is_public,
    collection,
    items,
  } = ChecklistPatch::from_json(payload)?;

  store.transaction(|store| {
    let _user = store.fetch(user)?;

    let is_public = is_public.unwrap_or(false);
    let collection = collection.flatten();

    let mut errors = ValidationErrors::default();
    let () = check_collection(store, collection, is_public, &mut errors)?;
    let name = errors.require("name", name);
    let plans = plan_items(items.unwrap_or_default(), &BTreeSet::new(), &mut errors);
    let (Some(name), true) = (name, errors.is_empty()) else {
      return Err(errors.into())
    };

    let checklist = store.create(|id, now| Checklist {
      id,
      user_id: user,
      name,
      date: date.flatten(),
      is_public,
      collection,
      created_at: now,
      updated_at: now,
    })?;
    let () = reconcile(store, &checklist, plans, BTreeSet::new())?;
    Ok(checklist)
  })
}

/// Update a checklist from a (partial) write payload.
///
/// If the payload contains `items`, the checklist's items are
/// reconciled against them. Otherwise items are left alone.
pub fn update<S>(store: &mut S, id: Id<Checklist>, payload: Value) -> Result<Checklist>
where
  S: Store,
{
  let ChecklistPatch {
    name,
    date,
    is_public,
    collection,
    items,
  } = ChecklistPatch::from_json(payload)?;

  store.transaction(|store| {
    let mut checklist = store.fetch(id)?;
    let current = item_ids(store, id)?;

    let mut errors = ValidationErrors::default();
    let () = check_collection(
      store,
      collection.unwrap_or(checklist.collection),
      is_public.unwrap_or(checklist.is_public),
      &mut errors,
    )?;
    let plans = items.map(|entries| plan_items(entries, &current, &mut errors));
    let () = errors.into_result()?;

    let changed = [
      assign(&mut checklist.name, name),
      assign(&mut checklist.date, date),
      assign(&mut checklist.is_public, is_public),
      assign(&mut checklist.collection, collection),
    ]
    .contains(&true);

    if changed {
      checklist = store.update(checklist)?;
    }

    if let Some(plans) = plans {
      let () = reconcile(store, &checklist, plans, current)?;
    }
    Ok(checklist)
  })
}

/// Delete a checklist along with its items.
pub fn delete<S>(store: &mut S, id: Id<Checklist>) -> Result<()>
where
  S: Store,
{
  store.transaction(|store| {
    let _checklist = store.fetch(id)?;
    for item in item_ids(store, id)? {
      let _deleted = store.delete(item)?;
    }
    let _deleted = store.delete(id)?;
    Ok(())
  })
}


/// Add an item to an existing checklist from a write payload.
pub fn create_item<S>(store: &mut S, checklist: Id<Checklist>, payload: Value) -> Result<ChecklistItem>
where
  S: Store,
{
  let checklist = store.fetch(checklist)?;
  let ChecklistItemPatch { name, is_checked } = ChecklistItemPatch::from_json(payload)?;

  let mut errors = ValidationErrors::default();
  let (Some(name), true) = (errors.require("name", name), errors.is_empty()) else {
    return Err(errors.into())
  };

  store.create(|id, now| ChecklistItem {
    id,
    user_id: checklist.user_id,
    name,
    is_checked: is_checked.unwrap_or(false),
    checklist: checklist.id,
    created_at: now,
    updated_at: now,
  })
}

/// Update a single checklist item from a (partial) write payload.
pub fn update_item<S>(store: &mut S, id: Id<ChecklistItem>, payload: Value) -> Result<ChecklistItem>
where
  S: Store,
{
  let patch = ChecklistItemPatch::from_json(payload)?;
  let mut item = store.fetch(id)?;
  if item.apply(patch) {
    item = store.update(item)?;
  }
  Ok(item)
}

/// Delete a single checklist item.
pub fn delete_item<S>(store: &mut S, id: Id<ChecklistItem>) -> Result<()>
where
  S: Store,
{
  let _item = store.fetch(id)?;
  let _deleted = store.delete(id)?;
  Ok(())
}


#[cfg(test)]
mod tests {
  use super::*;

  use serde_json::json;

  use crate::collections;
  use crate::error::NotFound;
  use crate::store::MemStore;
  use crate::test::store_with_user;


  fn item_names(store: &MemStore, checklist: Id<Checklist>) -> Vec<String> {
    items_of(store, checklist)
      .unwrap()
      .into_iter()
      .map(|item| item.name)
      .collect()
  }


  /// Check that a checklist is created along with its items.
  #[test]
  fn create_with_items() {
    let (mut store, alice) = store_with_user("alice");
    let payload = json!({
      "name": "Gear",
      "date": "2024-08-01",
      "items": [
        {"name": "Tent", "is_checked": true},
        {"id": 17, "name": "Stove"},
      ],
    });
    let checklist = create(&mut store, alice.id, payload).unwrap();
    assert_eq!(checklist.name, "Gear");
    assert!(!checklist.is_public);

    let repr = represent(&store, &checklist).unwrap();
    assert_eq!(repr.items.len(), 2);
    assert_eq!(repr.items[0].name, "Tent");
    assert!(repr.items[0].is_checked);
    assert_eq!(repr.items[1].name, "Stove");
    assert!(!repr.items[1].is_checked);
    // The supplied ID is not honored.
    assert_ne!(repr.items[1].id, Id::try_from(17).unwrap());
    assert!(repr
      .items
      .iter()
      .all(|item| item.checklist == checklist.id && item.user_id == alice.id));
  }

  /// Make sure that a private checklist cannot be placed in a public
  /// collection, neither on creation nor on update.
  #[test]
  fn visibility_invariant() {
    let (mut store, alice) = store_with_user("alice");
    let public = collections::create(&mut store, alice.id, json!({"name": "Alps", "is_public": true})).unwrap();
    let private = collections::create(&mut store, alice.id, json!({"name": "Home"})).unwrap();

    let payload = json!({"name": "Gear", "collection": public.id});
    let err = create(&mut store, alice.id, payload).unwrap_err();
    let errors = err.downcast_ref::<ValidationErrors>().unwrap();
    assert_eq!(errors.non_field_errors(), [PRIVATE_IN_PUBLIC]);

    let payload = json!({"name": "Gear", "collection": public.id, "is_public": false});
    assert!(create(&mut store, alice.id, payload).is_err());
    assert!(store.filter(|_: &Checklist| true).unwrap().is_empty());

    let payload = json!({"name": "Gear", "collection": private.id});
    let checklist = create(&mut store, alice.id, payload).unwrap();

    let payload = json!({"collection": public.id});
    let err = update(&mut store, checklist.id, payload).unwrap_err();
    let errors = err.downcast_ref::<ValidationErrors>().unwrap();
    assert_eq!(errors.non_field_errors(), [PRIVATE_IN_PUBLIC]);
    assert_eq!(store.fetch(checklist.id).unwrap(), checklist);

    let payload = json!({"collection": public.id, "is_public": true});
    let checklist = update(&mut store, checklist.id, payload).unwrap();
    assert_eq!(checklist.collection, Some(public.id));
    assert!(checklist.is_public);

    let err = update(&mut store, checklist.id, json!({"is_public": false})).unwrap_err();
    assert!(err.downcast_ref::<ValidationErrors>().is_some());
  }

  /// Check that reconciliation updates matched items, creates new ones,
  /// and deletes the rest.
  #[test]
  fn reconcile_items() {
    let (mut store, alice) = store_with_user("alice");
    let payload = json!({
      "name": "Gear",
      "items": [{"name": "Tent"}, {"name": "Stove"}, {"name": "Fuel"}],
    });
    let checklist = create(&mut store, alice.id, payload).unwrap();
    let items = items_of(&store, checklist.id).unwrap();
    let (tent, stove, fuel) = (&items[0], &items[1], &items[2]);

    let payload = json!({
      "items": [
        {"id": fuel.id, "name": "Fuel", "is_checked": true},
        {"name": "Lighter"},
        {"id": tent.id},
      ],
    });
    let _checklist = update(&mut store, checklist.id, payload).unwrap();

    let items = items_of(&store, checklist.id).unwrap();
    let ids = items.iter().map(|item| item.id).collect::<BTreeSet<_>>();
    assert_eq!(ids.len(), 3);
    assert!(ids.contains(&tent.id));
    assert!(ids.contains(&fuel.id));
    assert!(!ids.contains(&stove.id));
    assert_eq!(store.get(stove.id).unwrap(), None);
    assert_eq!(item_names(&store, checklist.id), ["Tent", "Fuel", "Lighter"]);
    assert!(store.fetch(fuel.id).unwrap().is_checked);
    assert_eq!(store.fetch(tent.id).unwrap(), *tent);
  }

  /// Make sure that resubmitting the same items changes nothing.
  #[test]
  fn reconcile_idempotent() {
    let (mut store, alice) = store_with_user("alice");
    let payload = json!({"name": "Gear", "items": [{"name": "Tent"}, {"name": "Stove"}]});
    let checklist = create(&mut store, alice.id, payload).unwrap();
    let items = items_of(&store, checklist.id).unwrap();

    let payload = json!({
      "name": "Gear",
      "items": [
        {"id": items[0].id, "name": "Tent", "is_checked": false},
        {"id": items[1].id, "name": "Stove"},
      ],
    });
    let first = update(&mut store, checklist.id, payload.clone()).unwrap();
    let first_items = items_of(&store, checklist.id).unwrap();
    let second = update(&mut store, checklist.id, payload).unwrap();
    let second_items = items_of(&store, checklist.id).unwrap();

    assert_eq!(first, checklist);
    assert_eq!(second, first);
    assert_eq!(first_items, items);
    assert_eq!(second_items, first_items);
  }

  /// Check that an empty item list removes all items, while an absent
  /// one leaves them alone.
  #[test]
  fn reconcile_empty() {
    let (mut store, alice) = store_with_user("alice");
    let payload = json!({"name": "Gear", "items": [{"name": "Tent"}, {"name": "Stove"}]});
    let checklist = create(&mut store, alice.id, payload).unwrap();

    let _checklist = update(&mut store, checklist.id, json!({"name": "Kit"})).unwrap();
    assert_eq!(item_names(&store, checklist.id).len(), 2);

    let checklist = update(&mut store, checklist.id, json!({"items": []})).unwrap();
    assert_eq!(checklist.name, "Kit");
    assert!(items_of(&store, checklist.id).unwrap().is_empty());
    assert!(store.filter(|_: &ChecklistItem| true).unwrap().is_empty());
  }

  /// Make sure that an item of another checklist is left untouched when
  /// referenced.
  #[test]
  fn reconcile_foreign_item() {
    let (mut store, alice) = store_with_user("alice");
    let payload = json!({"name": "Gear", "items": [{"name": "Tent"}]});
    let gear = create(&mut store, alice.id, payload).unwrap();
    let payload = json!({"name": "Food", "items": [{"name": "Pasta"}]});
    let food = create(&mut store, alice.id, payload).unwrap();
    let pasta = items_of(&store, food.id).unwrap().remove(0);

    let payload = json!({"items": [{"id": pasta.id, "name": "Rice"}]});
    let _gear = update(&mut store, gear.id, payload).unwrap();

    assert_eq!(items_of(&store, food.id).unwrap(), vec![pasta.clone()]);
    let items = items_of(&store, gear.id).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Rice");
    assert_ne!(items[0].id, pasta.id);
    assert_eq!(items[0].checklist, gear.id);
  }

  /// Check that an item ID not belonging to any checklist results in a
  /// new item being created.
  #[test]
  fn reconcile_unknown_item() {
    let (mut store, alice) = store_with_user("alice");
    let payload = json!({"name": "Gear", "items": [{"name": "Tent"}]});
    let gear = create(&mut store, alice.id, payload).unwrap();
    let tent = items_of(&store, gear.id).unwrap().remove(0);

    let payload = json!({"items": [{"id": 999, "name": "Stove", "is_checked": true}]});
    let _gear = update(&mut store, gear.id, payload).unwrap();

    let items = items_of(&store, gear.id).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Stove");
    assert!(items[0].is_checked);
    assert_ne!(items[0].id, tent.id);
    assert_ne!(items[0].id.get().get(), 999);
    assert_eq!(store.get(tent.id).unwrap(), None);
  }

  /// Check that a failing update does not leave partial changes
  /// behind.
  #[test]
  fn update_all_or_nothing() {
    let (mut store, alice) = store_with_user("alice");
    let payload = json!({"name": "Gear", "items": [{"name": "Tent"}]});
    let checklist = create(&mut store, alice.id, payload).unwrap();
    let items = items_of(&store, checklist.id).unwrap();

    let payload = json!({
      "name": "Kit",
      "items": [{"name": "Stove"}, {"is_checked": true}],
    });
    let err = update(&mut store, checklist.id, payload).unwrap_err();
    let errors = err.downcast_ref::<ValidationErrors>().unwrap();
    assert_eq!(errors.field("items.1.name").unwrap(), [REQUIRED]);

    assert_eq!(store.fetch(checklist.id).unwrap(), checklist);
    assert_eq!(items_of(&store, checklist.id).unwrap(), items);
  }

  /// Check that deleting a checklist removes its items.
  #[test]
  fn delete_cascades() {
    let (mut store, alice) = store_with_user("alice");
    let payload = json!({"name": "Gear", "items": [{"name": "Tent"}]});
    let checklist = create(&mut store, alice.id, payload).unwrap();

    let () = delete(&mut store, checklist.id).unwrap();
    assert!(store.filter(|_: &ChecklistItem| true).unwrap().is_empty());
    let err = delete(&mut store, checklist.id).unwrap_err();
    assert!(err.downcast_ref::<NotFound>().is_some());
  }

  /// Check that single items can be added, updated, and deleted.
  #[test]
  fn single_items() {
    let (mut store, alice) = store_with_user("alice");
    let checklist = create(&mut store, alice.id, json!({"name": "Gear"})).unwrap();

    let item = create_item(&mut store, checklist.id, json!({"name": "Tent"})).unwrap();
    assert_eq!(item.checklist, checklist.id);
    assert_eq!(item.user_id, alice.id);

    let item = update_item(&mut store, item.id, json!({"is_checked": true})).unwrap();
    assert!(item.is_checked);

    let err = update_item(&mut store, item.id, json!({"checklist": 5})).unwrap_err();
    assert!(err.downcast_ref::<ValidationErrors>().is_some());

    let () = delete_item(&mut store, item.id).unwrap();
    assert!(items_of(&store, checklist.id).unwrap().is_empty());
  }
}
