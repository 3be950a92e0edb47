// Copyright (C) 2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

//! Adventures and the images attached to them.

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
use crate::media::MediaResolver;
use crate::ser::adventures::Adventure as SerAdventure;
use crate::ser::adventures::AdventureImage as SerAdventureImage;
use crate::ser::adventures::AdventureImagePatch;
use crate::ser::adventures::AdventurePatch;
use crate::ser::fields::assign;
use crate::store::resolve_reference;
use crate::store::Record;
use crate::store::Store;
use crate::store::Tables;
use crate::users::User;


/// The kind of an adventure.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdventureType {
  /// A place that has been visited.
  Visited,
  /// A place that is planned to be visited.
  Planned,
  /// A place to stay.
  Lodging,
  /// A place to eat.
  Dining,
}


/// An adventure, i.e., a place visited or to be visited.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct Adventure {
  pub id: Id<Adventure>,
  pub user_id: Id<User>,
  #[serde(rename = "type")]
  pub kind: AdventureType,
  pub name: String,
  pub description: Option<String>,
  pub rating: Option<f64>,
  pub activity_types: Vec<String>,
  pub location: Option<String>,
  pub longitude: Option<f64>,
  pub latitude: Option<f64>,
  pub date: Option<NaiveDate>,
  pub end_date: Option<NaiveDate>,
  pub link: Option<String>,
  pub is_public: bool,
  pub collection: Option<Id<Collection>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Adventure {
  /// Apply the writable fields of a patch, reporting whether anything
  /// changed.
  fn apply(&mut self, patch: AdventurePatch) -> bool {
    let AdventurePatch {
      name,
      description,
      rating,
      activity_types,
      location,
      date,
      is_public,
      collection,
      link,
      kind,
      longitude,
      latitude,
      end_date,
    } = patch;

    [
      assign(&mut self.name, name),
      assign(&mut self.description, description),
      assign(&mut self.rating, rating),
      assign(&mut self.activity_types, activity_types),
      assign(&mut self.location, location),
      assign(&mut self.date, date),
      assign(&mut self.is_public, is_public),
      assign(&mut self.collection, collection),
      assign(&mut self.link, link),
      assign(&mut self.kind, kind),
      assign(&mut self.longitude, longitude),
      assign(&mut self.latitude, latitude),
      assign(&mut self.end_date, end_date),
    ]
    .contains(&true)
  }
}

impl Record for Adventure {
  const KIND: &'static str = "adventure";

  #[inline]
  fn id(&self) -> Id<Self> {
    self.id
  }

  fn touch(&mut self, now: DateTime<Utc>) {
    self.updated_at = now
  }

  fn table(tables: &Tables) -> &Table<Self> {
    &tables.adventures
  }

  fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
    &mut tables.adventures
  }
}


/// An image belonging to an adventure.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AdventureImage {
  /// The image's ID.
  pub id: Id<AdventureImage>,
  /// The path of the stored file, relative to the media root. May be
  /// empty if no file is associated.
  pub image: String,
  /// The adventure the image belongs to.
  pub adventure: Id<Adventure>,
}

impl AdventureImage {
  /// Convert the image into its wire representation, resolving the
  /// stored file to a public URL.
  pub fn to_serde(&self, media: &MediaResolver) -> SerAdventureImage {
    SerAdventureImage {
      id: self.id,
      image: media.resolve(&self.image),
      adventure: self.adventure,
    }
  }
}

impl Record for AdventureImage {
  const KIND: &'static str = "adventure image";

  #[inline]
  fn id(&self) -> Id<Self> {
    self.id
  }

  fn table(tables: &Tables) -> &Table<Self> {
    &tables.adventure_images
  }

  fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
    &mut tables.adventure_images
  }
}


/// Retrieve the images of an adventure, in the order they were added.
pub fn images_of<S>(store: &S, adventure: Id<Adventure>) -> Result<Vec<AdventureImage>>
where
  S: Store,
{
  store.filter(|image: &AdventureImage| image.adventure == adventure)
}

/// Create the wire representation of an adventure, including its
/// images.
pub fn represent<S>(store: &S, media: &MediaResolver, adventure: &Adventure) -> Result<SerAdventure>
where
  S: Store,
{
  let images = images_of(store, adventure.id)?
    .iter()
    .map(|image| image.to_serde(media))
    .collect();

  let adventure = SerAdventure {
    id: adventure.id,
    user_id: adventure.user_id,
    name: adventure.name.clone(),
    description: adventure.description.clone(),
    rating: adventure.rating,
    activity_types: adventure.activity_types.clone(),
    location: adventure.location.clone(),
    date: adventure.date,
    is_public: adventure.is_public,
    collection: adventure.collection,
    created_at: adventure.created_at,
    updated_at: adventure.updated_at,
    images,
    link: adventure.link.clone(),
    kind: adventure.kind,
    longitude: adventure.longitude,
    latitude: adventure.latitude,
    end_date: adventure.end_date,
  };
  Ok(adventure)
}

/// Create an adventure owned by `user` from a write payload.
pub fn create<S>(store: &mut S, user: Id<User>, payload: Value) -> Result<Adventure>
where
  S: Store,
{
  let _user = store.fetch(user)?;
  let patch = AdventurePatch::from_json(payload)?;

  let mut errors = ValidationErrors::default();
  let _collection = resolve_reference(store, "collection", patch.collection.flatten(), &mut errors)?;
  let name = errors.require("name", patch.name.clone());
  let kind = errors.require("type", patch.kind);
  let (Some(name), Some(kind), true) = (name, kind, errors.is_empty()) else {
    return Err(errors.into())
  };

  store.create(|id, now| {
    let mut adventure = Adventure {
      id,
      user_id: user,
      kind,
      name,
      description: None,
      rating: None,
      activity_types: Vec::new(),
      location: None,
      longitude: None,
      latitude: None,
      date: None,
      end_date: None,
      link: None,
      is_public: false,
      collection: None,
      created_at: now,
      updated_at: now,
    };
    let _changed = adventure.apply(patch);
    adventure
  })
}

/// Update an existing adventure from a (partial) write payload.
pub fn update<S>(store: &mut S, id: Id<Adventure>, payload: Value) -> Result<Adventure>
where
  S: Store,
{
  let patch = AdventurePatch::from_json(payload)?;

  store.transaction(|store| {
    let mut adventure = store.fetch(id)?;

    let mut errors = ValidationErrors::default();
    let _collection = resolve_reference(store, "collection", patch.collection.flatten(), &mut errors)?;
    let () = errors.into_result()?;

    if adventure.apply(patch) {
      adventure = store.update(adventure)?;
    }
    Ok(adventure)
  })
}

/// Delete an adventure along with its images.
pub fn delete<S>(store: &mut S, id: Id<Adventure>) -> Result<()>
where
  S: Store,
{
  store.transaction(|store| {
    let _adventure = store.fetch(id)?;
    for image in images_of(store, id)? {
      let _deleted = store.delete(image.id)?;
    }
    let _deleted = store.delete(id)?;
    Ok(())
  })
}


/// Attach an image to an adventure from a write payload.
pub fn create_image<S>(store: &mut S, payload: Value) -> Result<AdventureImage>
where
  S: Store,
{
  let patch = AdventureImagePatch::from_json(payload)?;

  let mut errors = ValidationErrors::default();
  let image = errors.require("image", patch.image);
  let adventure = errors.require("adventure", patch.adventure);
  let _adventure = resolve_reference::<_, Adventure>(store, "adventure", adventure, &mut errors)?;
  let (Some(image), Some(adventure), true) = (image, adventure, errors.is_empty()) else {
    return Err(errors.into())
  };

  store.create(|id, _now| AdventureImage {
    id,
    image,
    adventure,
  })
}

/// Update an adventure image from a (partial) write payload.
pub fn update_image<S>(store: &mut S, id: Id<AdventureImage>, payload: Value) -> Result<AdventureImage>
where
  S: Store,
{
  let patch = AdventureImagePatch::from_json(payload)?;
  let mut image = store.fetch(id)?;

  let mut errors = ValidationErrors::default();
  let _adventure = resolve_reference::<_, Adventure>(store, "adventure", patch.adventure, &mut errors)?;
  let () = errors.into_result()?;

  let changed = [
    assign(&mut image.image, patch.image),
    assign(&mut image.adventure, patch.adventure),
  ]
  .contains(&true);

  if changed {
    image = store.update(image)?;
  }
  Ok(image)
}

/// Delete an adventure image.
pub fn delete_image<S>(store: &mut S, id: Id<AdventureImage>) -> Result<()>
where
  S: Store,
{
  let _image = store.fetch(id)?;
  let _deleted = store.delete(id)?;
  Ok(())
}
