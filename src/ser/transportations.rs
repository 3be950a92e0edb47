// Copyright (C) 2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

use chrono::DateTime;
use chrono::Utc;

use serde::Serialize;
use serde_json::Value;

use crate::collections::Collection;
use crate::error::ValidationErrors;
use crate::id::Id;
use crate::ser::fields::Fields;
use crate::ser::ToSerde;
use crate::transportations::Transportation as TransportationRecord;
use crate::transportations::TransportationType;
use crate::users::User;


/// Fields of a transportation that may not be written.
pub const READ_ONLY: &[&str] = &["id", "user_id", "created_at", "updated_at"];


/// The wire representation of a transportation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transportation {
  pub id: Id<TransportationRecord>,
  pub user_id: Id<User>,
  #[serde(rename = "type")]
  pub kind: TransportationType,
  pub name: String,
  pub description: Option<String>,
  pub rating: Option<f64>,
  pub link: Option<String>,
  pub date: Option<DateTime<Utc>>,
  pub flight_number: Option<String>,
  pub from_location: Option<String>,
  pub to_location: Option<String>,
  pub is_public: bool,
  pub collection: Option<Id<Collection>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub end_date: Option<DateTime<Utc>>,
}

impl ToSerde for TransportationRecord {
  type Output = Transportation;

  fn to_serde(&self) -> Self::Output {
    Transportation {
      id: self.id,
      user_id: self.user_id,
      kind: self.kind,
      name: self.name.clone(),
      description: self.description.clone(),
      rating: self.rating,
      link: self.link.clone(),
      date: self.date,
      flight_number: self.flight_number.clone(),
      from_location: self.from_location.clone(),
      to_location: self.to_location.clone(),
      is_public: self.is_public,
      collection: self.collection,
      created_at: self.created_at,
      updated_at: self.updated_at,
      end_date: self.end_date,
    }
  }
}


/// The writable fields of a transportation present in a payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransportationPatch {
  pub kind: Option<TransportationType>,
  pub name: Option<String>,
  pub description: Option<Option<String>>,
  pub rating: Option<Option<f64>>,
  pub link: Option<Option<String>>,
  pub date: Option<Option<DateTime<Utc>>>,
  pub flight_number: Option<Option<String>>,
  pub from_location: Option<Option<String>>,
  pub to_location: Option<Option<String>>,
  pub is_public: Option<bool>,
  pub collection: Option<Option<Id<Collection>>>,
  pub end_date: Option<Option<DateTime<Utc>>>,
}

impl TransportationPatch {
  /// Parse a write payload.
  pub fn from_json(payload: Value) -> Result<Self, ValidationErrors> {
    let mut fields = Fields::new(payload, READ_ONLY)?;
    let patch = Self {
      kind: fields.take("type"),
      name: fields.take("name"),
      description: fields.take_nullable("description"),
      rating: fields.take_nullable("rating"),
      link: fields.take_nullable("link"),
      date: fields.take_nullable("date"),
      flight_number: fields.take_nullable("flight_number"),
      from_location: fields.take_nullable("from_location"),
      to_location: fields.take_nullable("to_location"),
      is_public: fields.take("is_public"),
      collection: fields.take_nullable("collection"),
      end_date: fields.take_nullable("end_date"),
    };
    fields.finish(patch)
  }
}
