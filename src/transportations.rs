// Copyright (C) 2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transportation legs of a trip.

use anyhow::Result;

use chrono::DateTime;
use chrono::Utc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::collections::Collection;
use crate::db::Table;
use crate::error::ValidationErrors;
use crate::id::Id;
use crate::ser::fields::assign;
use crate::ser::transportations::TransportationPatch;
use crate::store::resolve_reference;
use crate::store::Record;
use crate::store::Store;
use crate::store::Tables;
use crate::users::User;


/// The means of a transportation.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum TransportationType {
  Car,
  Plane,
  Train,
  Bus,
  Boat,
  Bike,
  Walking,
  Other,
}


/// A single leg of a trip.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Transportation {
  pub id: Id<Transportation>,
  pub user_id: Id<User>,
  #[serde(rename = "type")]
  pub kind: TransportationType,
  pub name: String,
  pub description: Option<String>,
  pub rating: Option<f64>,
  pub link: Option<String>,
  /// The time of departure.
  pub date: Option<DateTime<Utc>>,
  /// The time of arrival.
  pub end_date: Option<DateTime<Utc>>,
  pub flight_number: Option<String>,
  pub from_location: Option<String>,
  pub to_location: Option<String>,
  pub is_public: bool,
  pub collection: Option<Id<Collection>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Transportation {
  fn apply(&mut self, patch: TransportationPatch) -> bool {
    let TransportationPatch {
      kind,
      name,
      description,
      rating,
      link,
      date,
      flight_number,
      from_location,
      to_location,
      is_public,
      collection,
      end_date,
    } = patch;

    [
      assign(&mut self.kind, kind),
      assign(&mut self.name, name),
      assign(&mut self.description, description),
      assign(&mut self.rating, rating),
      assign(&mut self.link, link),
      assign(&mut self.date, date),
      assign(&mut self.flight_number, flight_number),
      assign(&mut self.from_location, from_location),
      assign(&mut self.to_location, to_location),
      assign(&mut self.is_public, is_public),
      assign(&mut self.collection, collection),
      assign(&mut self.end_date, end_date),
    ]
    .contains(&true)
  }
}

impl Record for Transportation {
  const KIND: &'static str = "transportation";

  #[inline]
  fn id(&self) -> Id<Self> {
    self.id
  }

  fn touch(&mut self, now: DateTime<Utc>) {
    self.updated_at = now
  }

  fn table(tables: &Tables) -> &Table<Self> {
    &tables.transportations
  }

  fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
    &mut tables.transportations
  }
}


/// Create a transportation owned by `user` from a write payload.
pub fn create<S>(store: &mut S, user: Id<User>, payload: Value) -> Result<Transportation>
where
  S: Store,
{
  let _user = store.fetch(user)?;
  let patch = TransportationPatch::from_json(payload)?;

  let mut errors = ValidationErrors::default();
  let _collection = resolve_reference(store, "collection", patch.collection.flatten(), &mut errors)?;
  let kind = errors.require("type", patch.kind);
  let name = errors.require("name", patch.name.clone());
  let (Some(kind), Some(name), true) = (kind, name, errors.is_empty()) else {
    return Err(errors.into())
  };

  store.create(|id, now| {
    let mut transportation = Transportation {
      id,
      user_id: user,
      kind,
      name,
      description: None,
      rating: None,
      link: None,
      date: None,
      end_date: None,
      flight_number: None,
      from_location: None,
      to_location: None,
      is_public: false,
      collection: None,
      created_at: now,
      updated_at: now,
    };
    let _changed = transportation.apply(patch);
    transportation
  })
}

/// Update a transportation from a (partial) write payload.
pub fn update<S>(store: &mut S, id: Id<Transportation>, payload: Value) -> Result<Transportation>
where
  S: Store,
{
  let patch = TransportationPatch::from_json(payload)?;
  let mut transportation = store.fetch(id)?;

  let mut errors = ValidationErrors::default();
  let _collection = resolve_reference(store, "collection", patch.collection.flatten(), &mut errors)?;
  let () = errors.into_result()?;

  if transportation.apply(patch) {
    transportation = store.update(transportation)?;
  }
  Ok(transportation)
}

/// Delete a transportation.
pub fn delete<S>(store: &mut S, id: Id<Transportation>) -> Result<()>
where
  S: Store,
{
  let _transportation = store.fetch(id)?;
  let _deleted = store.delete(id)?;
  Ok(())
}
