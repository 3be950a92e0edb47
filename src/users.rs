// Copyright (C) 2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

//! Users owning records.

use anyhow::Result;

use serde::Deserialize;
use serde::Serialize;

use uuid::Uuid;

use crate::db::Table;
use crate::id::Id;
use crate::store::Record;
use crate::store::Store;
use crate::store::Tables;


/// A user owning records or having collections shared with them.
///
/// Besides its internal ID, each user carries a UUID that is stable
/// across storage changes and that is the only identifier under which
/// a user is referenced by other users.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct User {
  /// The internal ID.
  pub id: Id<User>,
  /// The externally stable identifier.
  pub uuid: Uuid,
  /// The user's login name.
  pub username: String,
}

impl Record for User {
  const KIND: &'static str = "user";

  #[inline]
  fn id(&self) -> Id<Self> {
    self.id
  }

  fn table(tables: &Tables) -> &Table<Self> {
    &tables.users
  }

  fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
    &mut tables.users
  }
}


/// Register a new user with a freshly generated UUID.
pub fn create<S>(store: &mut S, username: &str) -> Result<User>
where
  S: Store,
{
  store.create(|id, _now| User {
    id,
    uuid: Uuid::new_v4(),
    username: username.to_string(),
  })
}

/// Look up a user by their UUID.
pub fn find_by_uuid<S>(store: &S, uuid: Uuid) -> Result<Option<User>>
where
  S: Store,
{
  let user = store
    .filter(|user: &User| user.uuid == uuid)?
    .into_iter()
    .next();
  Ok(user)
}
