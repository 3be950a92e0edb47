// Copyright (C) 2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;

use serde::Serialize;
use serde_json::Value;

use crate::adventures::Adventure as AdventureRecord;
use crate::adventures::AdventureImage as AdventureImageRecord;
use crate::adventures::AdventureType;
use crate::collections::Collection;
use crate::error::ValidationErrors;
use crate::id::Id;
use crate::ser::fields::Fields;
use crate::users::User;


/// Fields of an adventure that are part of its representation but may
/// not be written.
pub const ADVENTURE_READ_ONLY: &[&str] = &["id", "user_id", "created_at", "updated_at", "images"];
/// Fields of an adventure image that may not be written.
pub const IMAGE_READ_ONLY: &[&str] = &["id"];


/// The wire representation of an adventure image.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AdventureImage {
  pub id: Id<AdventureImageRecord>,
  /// The public URL of the image, if a file is associated.
  pub image: Option<String>,
  pub adventure: Id<AdventureRecord>,
}


/// The wire representation of an adventure.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Adventure {
  pub id: Id<AdventureRecord>,
  pub user_id: Id<User>,
  pub name: String,
  pub description: Option<String>,
  pub rating: Option<f64>,
  pub activity_types: Vec<String>,
  pub location: Option<String>,
  pub date: Option<NaiveDate>,
  pub is_public: bool,
  pub collection: Option<Id<Collection>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub images: Vec<AdventureImage>,
  pub link: Option<String>,
  #[serde(rename = "type")]
  pub kind: AdventureType,
  pub longitude: Option<f64>,
  pub latitude: Option<f64>,
  pub end_date: Option<NaiveDate>,
}


/// The writable fields of an adventure present in a payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdventurePatch {
  pub name: Option<String>,
  pub description: Option<Option<String>>,
  pub rating: Option<Option<f64>>,
  pub activity_types: Option<Vec<String>>,
  pub location: Option<Option<String>>,
  pub date: Option<Option<NaiveDate>>,
  pub is_public: Option<bool>,
  pub collection: Option<Option<Id<Collection>>>,
  pub link: Option<Option<String>>,
  pub kind: Option<AdventureType>,
  pub longitude: Option<Option<f64>>,
  pub latitude: Option<Option<f64>>,
  pub end_date: Option<Option<NaiveDate>>,
}

impl AdventurePatch {
  /// Parse a write payload.
  pub fn from_json(payload: Value) -> Result<Self, ValidationErrors> {
    let mut fields = Fields::new(payload, ADVENTURE_READ_ONLY)?;
    let patch = Self {
      name: fields.take("name"),
      description: fields.take_nullable("description"),
      rating: fields.take_nullable("rating"),
      activity_types: fields.take("activity_types"),
      location: fields.take_nullable("location"),
      date: fields.take_nullable("date"),
      is_public: fields.take("is_public"),
      collection: fields.take_nullable("collection"),
      link: fields.take_nullable("link"),
      kind: fields.take("type"),
      longitude: fields.take_nullable("longitude"),
      latitude: fields.take_nullable("latitude"),
      end_date: fields.take_nullable("end_date"),
    };
    fields.finish(patch)
  }
}


/// The writable fields of an adventure image present in a payload.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AdventureImagePatch {
  /// The stored path of the image file, relative to the media root.
  pub image: Option<String>,
  pub adventure: Option<Id<AdventureRecord>>,
}

impl AdventureImagePatch {
  /// Parse a write payload.
  pub fn from_json(payload: Value) -> Result<Self, ValidationErrors> {
    let mut fields = Fields::new(payload, IMAGE_READ_ONLY)?;
    let patch = Self {
      image: fields.take("image"),
      adventure: fields.take("adventure"),
    };
    fields.finish(patch)
  }
}
