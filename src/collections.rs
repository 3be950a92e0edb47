// Copyright (C) 2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

//! Collections, grouping adventures, transportations, notes, and
//! checklists of a trip.

use std::collections::BTreeSet;

use anyhow::Result;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use uuid::Uuid;

use crate::adventures;
use crate::adventures::Adventure;
use crate::checklists;
use crate::checklists::Checklist;
use crate::db::Table;
use crate::error::ValidationErrors;
use crate::id::Id;
use crate::media::MediaResolver;
use crate::notes::Note;
use crate::ser::collections::Collection as SerCollection;
use crate::ser::collections::CollectionPatch;
use crate::ser::fields::assign;
use crate::ser::ToSerde as _;
use crate::store::Record;
use crate::store::Store;
use crate::store::Tables;
use crate::transportations::Transportation;
use crate::users::find_by_uuid;
use crate::users::User;


/// The failure reported when making a collection holding private
/// checklists public.
pub const HOLDS_PRIVATE: &str =
  "Collections containing private checklists cannot be made public.";


/// A collection of records belonging to a trip.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Collection {
  pub id: Id<Collection>,
  pub user_id: Id<User>,
  pub name: String,
  pub description: Option<String>,
  pub is_public: bool,
  pub is_archived: bool,
  pub start_date: Option<NaiveDate>,
  pub end_date: Option<NaiveDate>,
  /// The users, other than the owner, that have access.
  pub shared_with: BTreeSet<Id<User>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Record for Collection {
  const KIND: &'static str = "collection";

  #[inline]
  fn id(&self) -> Id<Self> {
    self.id
  }

  fn touch(&mut self, now: DateTime<Utc>) {
    self.updated_at = now
  }

  fn table(tables: &Tables) -> &Table<Self> {
    &tables.collections
  }

  fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
    &mut tables.collections
  }
}


/// Map user UUIDs to the users' IDs.
///
/// Unknown UUIDs are reported as failures of the `shared_with` field.
fn resolve_users<S>(
  store: &S,
  uuids: Vec<Uuid>,
  errors: &mut ValidationErrors,
) -> Result<BTreeSet<Id<User>>>
where
  S: Store,
{
  let mut users = BTreeSet::new();
  for uuid in uuids {
    match find_by_uuid(store, uuid)? {
      Some(user) => {
        let _inserted = users.insert(user.id);
      },
      None => {
        let () = errors.add("shared_with", format!("user {uuid} does not exist"));
      },
    }
  }
  Ok(users)
}

/// Parse a write payload, resolving the users to share with.
fn parse<S>(
  store: &S,
  payload: Value,
) -> Result<(CollectionPatch, Option<BTreeSet<Id<User>>>)>
where
  S: Store,
{
  let mut patch = CollectionPatch::from_json(payload)?;

  let mut errors = ValidationErrors::default();
  let shared_with = patch
    .shared_with
    .take()
    .map(|uuids| resolve_users(store, uuids, &mut errors))
    .transpose()?;
  let () = errors.into_result()?;
  Ok((patch, shared_with))
}


/// Create the nested wire representation of a collection.
///
/// All associated records are embedded in the order they were created
/// in, and the users the collection is shared with are listed by UUID.
pub fn represent<S>(store: &S, media: &MediaResolver, collection: &Collection) -> Result<SerCollection>
where
  S: Store,
{
  let id = Some(collection.id);

  let adventures = store
    .filter(|adventure: &Adventure| adventure.collection == id)?
    .iter()
    .map(|adventure| adventures::represent(store, media, adventure))
    .collect::<Result<Vec<_>>>()?;
  let transportations = store
    .filter(|transportation: &Transportation| transportation.collection == id)?
    .iter()
    .map(Transportation::to_serde)
    .collect();
  let notes = store
    .filter(|note: &Note| note.collection == id)?
    .iter()
    .map(Note::to_serde)
    .collect();
  let checklists = store
    .filter(|checklist: &Checklist| checklist.collection == id)?
    .iter()
    .map(|checklist| checklists::represent(store, checklist))
    .collect::<Result<Vec<_>>>()?;
  let shared_with = collection
    .shared_with
    .iter()
    .map(|user| store.fetch(*user).map(|user| user.uuid))
    .collect::<Result<Vec<_>>>()?;

  let collection = SerCollection {
    id: collection.id,
    description: collection.description.clone(),
    user_id: collection.user_id,
    name: collection.name.clone(),
    is_public: collection.is_public,
    adventures,
    created_at: collection.created_at,
    start_date: collection.start_date,
    end_date: collection.end_date,
    transportations,
    notes,
    updated_at: collection.updated_at,
    checklists,
    is_archived: collection.is_archived,
    shared_with,
  };
  Ok(collection)
}

/// Create a collection owned by `user` from a write payload.
pub fn create<S>(store: &mut S, user: Id<User>, payload: Value) -> Result<Collection>
where
  S: Store,
{
  let _user = store.fetch(user)?;
  let (patch, shared_with) = parse(store, payload)?;
  let CollectionPatch {
    description,
    name,
    is_public,
    start_date,
    end_date,
    is_archived,
    shared_with: _,
  } = patch;

  let mut errors = ValidationErrors::default();
  let (Some(name), true) = (errors.require("name", name), errors.is_empty()) else {
    return Err(errors.into())
  };

  store.create(|id, now| Collection {
    id,
    user_id: user,
    name,
    description: description.flatten(),
    is_public: is_public.unwrap_or(false),
    is_archived: is_archived.unwrap_or(false),
    start_date: start_date.flatten(),
    end_date: end_date.flatten(),
    shared_with: shared_with.unwrap_or_default(),
    created_at: now,
    updated_at: now,
  })
}

/// Update a collection from a (partial) write payload.
///
/// A collection can only be made public if all of its checklists are
/// public.
pub fn update<S>(store: &mut S, id: Id<Collection>, payload: Value) -> Result<Collection>
where
  S: Store,
{
  let mut collection = store.fetch(id)?;
  let (patch, shared_with) = parse(store, payload)?;

  if patch.is_public == Some(true) {
    let private = store.filter(|checklist: &Checklist| {
      checklist.collection == Some(id) && !checklist.is_public
    })?;
    if !private.is_empty() {
      return Err(ValidationErrors::non_field(HOLDS_PRIVATE).into())
    }
  }

  let changed = [
    assign(&mut collection.description, patch.description),
    assign(&mut collection.name, patch.name),
    assign(&mut collection.is_public, patch.is_public),
    assign(&mut collection.start_date, patch.start_date),
    assign(&mut collection.end_date, patch.end_date),
    assign(&mut collection.is_archived, patch.is_archived),
    assign(&mut collection.shared_with, shared_with),
  ]
  .contains(&true);

  if changed {
    collection = store.update(collection)?;
  }
  Ok(collection)
}

/// Detach all records of type `R` from a collection.
fn detach<S, R>(
  store: &mut S,
  collection: Id<Collection>,
  parent: fn(&mut R) -> &mut Option<Id<Collection>>,
) -> Result<()>
where
  S: Store,
  R: Record,
{
  for mut record in store.filter(|_: &R| true)? {
    let slot = parent(&mut record);
    if *slot == Some(collection) {
      *slot = None;
      let _record = store.update(record)?;
    }
  }
  Ok(())
}

/// Delete a collection.
///
/// Records associated with the collection are kept, but no longer
/// refer to it.
pub fn delete<S>(store: &mut S, id: Id<Collection>) -> Result<()>
where
  S: Store,
{
  store.transaction(|store| {
    let _collection = store.fetch(id)?;
    let () = detach::<_, Adventure>(store, id, |adventure| &mut adventure.collection)?;
    let () = detach::<_, Transportation>(store, id, |transportation| &mut transportation.collection)?;
    let () = detach::<_, Note>(store, id, |note| &mut note.collection)?;
    let () = detach::<_, Checklist>(store, id, |checklist| &mut checklist.collection)?;
    let _deleted = store.delete(id)?;
    Ok(())
  })
}


#[cfg(test)]
mod tests {
  use super::*;

  use serde_json::json;
  use serde_json::to_string as to_json;
  use serde_json::to_value;

  use crate::notes;
  use crate::test::media;
  use crate::test::store_with_user;
  use crate::transportations;
  use crate::users;


  /// Check that a collection is represented with everything that
  /// belongs to it.
  #[test]
  fn assemble() {
    let (mut store, alice) = store_with_user("alice");
    let alps = create(&mut store, alice.id, json!({"name": "Alps", "is_public": true})).unwrap();
    let other = create(&mut store, alice.id, json!({"name": "Other"})).unwrap();

    let payload = json!({"name": "Matterhorn", "type": "planned", "collection": alps.id});
    let matterhorn = adventures::create(&mut store, alice.id, payload).unwrap();
    let payload = json!({"image": "matterhorn.jpg", "adventure": matterhorn.id});
    let _image = adventures::create_image(&mut store, payload).unwrap();
    let payload = json!({"name": "Eiger", "type": "visited", "collection": other.id});
    let _eiger = adventures::create(&mut store, alice.id, payload).unwrap();
    let payload = json!({"name": "Zermatt", "type": "visited", "collection": alps.id});
    let zermatt = adventures::create(&mut store, alice.id, payload).unwrap();

    let payload = json!({"type": "train", "name": "Glacier Express", "collection": alps.id});
    let train = transportations::create(&mut store, alice.id, payload).unwrap();
    let payload = json!({"name": "Huts", "collection": alps.id});
    let note = notes::create(&mut store, alice.id, payload).unwrap();
    let payload = json!({
      "name": "Gear",
      "is_public": true,
      "collection": alps.id,
      "items": [{"name": "Crampons"}],
    });
    let gear = checklists::create(&mut store, alice.id, payload).unwrap();

    let repr = represent(&store, &media(), &alps).unwrap();
    let adventure_ids = repr.adventures.iter().map(|a| a.id).collect::<Vec<_>>();
    assert_eq!(adventure_ids, vec![matterhorn.id, zermatt.id]);
    assert_eq!(
      repr.adventures[0].images[0].image.as_deref(),
      Some("http://localhost:8000/media/matterhorn.jpg")
    );
    assert_eq!(repr.transportations.len(), 1);
    assert_eq!(repr.transportations[0].id, train.id);
    assert_eq!(repr.notes.len(), 1);
    assert_eq!(repr.notes[0].id, note.id);
    assert_eq!(repr.checklists.len(), 1);
    assert_eq!(repr.checklists[0].id, gear.id);
    assert_eq!(repr.checklists[0].items[0].name, "Crampons");
    assert!(repr.shared_with.is_empty());

    let empty = represent(&store, &media(), &other).unwrap();
    assert_eq!(empty.adventures.len(), 1);
    assert!(empty.checklists.is_empty());
  }

  /// Check that a collection holding private checklists cannot be made
  /// public.
  #[test]
  fn publish_with_private_checklist() {
    let (mut store, alice) = store_with_user("alice");
    let alps = create(&mut store, alice.id, json!({"name": "Alps"})).unwrap();
    let payload = json!({"name": "Gear", "collection": alps.id});
    let gear = checklists::create(&mut store, alice.id, payload).unwrap();

    let err = update(&mut store, alps.id, json!({"is_public": true})).unwrap_err();
    let errors = err.downcast_ref::<ValidationErrors>().unwrap();
    assert_eq!(errors.non_field_errors(), [HOLDS_PRIVATE]);
    assert_eq!(store.fetch(alps.id).unwrap(), alps);

    let gear = checklists::update(&mut store, gear.id, json!({"name": "Kit"})).unwrap();
    assert_eq!(gear.name, "Kit");

    let payload = json!({"is_public": true});
    let _gear = checklists::update(&mut store, gear.id, payload.clone()).unwrap();
    let alps = update(&mut store, alps.id, payload).unwrap();
    assert!(alps.is_public);
  }

  /// Check that users are shared with by UUID and listed by UUID.
  #[test]
  fn share_by_uuid() {
    let (mut store, alice) = store_with_user("alice");
    let bob = users::create(&mut store, "bob").unwrap();
    let carol = users::create(&mut store, "carol").unwrap();

    let payload = json!({"name": "Alps", "shared_with": [carol.uuid, bob.uuid, bob.uuid]});
    let alps = create(&mut store, alice.id, payload).unwrap();
    assert_eq!(alps.shared_with, BTreeSet::from([bob.id, carol.id]));

    let repr = represent(&store, &media(), &alps).unwrap();
    assert_eq!(repr.shared_with, vec![bob.uuid, carol.uuid]);

    let value = to_value(&repr).unwrap();
    assert_eq!(value["shared_with"], json!([bob.uuid, carol.uuid]));

    let unknown = Uuid::new_v4();
    let payload = json!({"shared_with": [bob.uuid, unknown]});
    let err = update(&mut store, alps.id, payload).unwrap_err();
    let errors = err.downcast_ref::<ValidationErrors>().unwrap();
    assert_eq!(
      errors.field("shared_with").unwrap(),
      [format!("user {unknown} does not exist")]
    );

    let alps = update(&mut store, alps.id, json!({"shared_with": [bob.uuid]})).unwrap();
    assert_eq!(alps.shared_with, BTreeSet::from([bob.id]));
  }

  /// Check the field order of a collection's representation.
  #[test]
  fn field_order() {
    let (mut store, alice) = store_with_user("alice");
    let alps = create(&mut store, alice.id, json!({"name": "Alps"})).unwrap();

    let repr = represent(&store, &media(), &alps).unwrap();
    let json = to_json(&repr).unwrap();
    let keys = [
      "id",
      "description",
      "user_id",
      "name",
      "is_public",
      "adventures",
      "created_at",
      "start_date",
      "end_date",
      "transportations",
      "notes",
      "updated_at",
      "checklists",
      "is_archived",
      "shared_with",
    ];
    let positions = keys
      .iter()
      .map(|key| json.find(&format!("\"{key}\":")).unwrap())
      .collect::<Vec<_>>();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{json}");
  }

  /// Make sure that deleting a collection detaches its records.
  #[test]
  fn delete_detaches() {
    let (mut store, alice) = store_with_user("alice");
    let alps = create(&mut store, alice.id, json!({"name": "Alps"})).unwrap();
    let payload = json!({"name": "Huts", "collection": alps.id});
    let note = notes::create(&mut store, alice.id, payload).unwrap();
    let payload = json!({"name": "Gear", "collection": alps.id});
    let gear = checklists::create(&mut store, alice.id, payload).unwrap();

    let () = delete(&mut store, alps.id).unwrap();
    assert_eq!(store.get(alps.id).unwrap(), None);
    assert_eq!(store.fetch(note.id).unwrap().collection, None);
    assert_eq!(store.fetch(gear.id).unwrap().collection, None);
  }
}
