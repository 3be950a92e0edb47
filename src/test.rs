// Copyright (C) 2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

use uuid::Uuid;

use crate::id::Id;
use crate::media::MediaResolver;
use crate::store::MemStore;
use crate::users;
use crate::users::User;


/// Create a `User` object with the given ID and name.
pub fn user(id: Id<User>, name: &str) -> User {
  User {
    id,
    uuid: Uuid::new_v4(),
    username: name.to_string(),
  }
}


/// Create an empty store containing a single user with the given name.
pub fn store_with_user(name: &str) -> (MemStore, User) {
  let mut store = MemStore::default();
  let user = users::create(&mut store, name).unwrap();
  (store, user)
}


/// Create the `MediaResolver` used throughout tests.
pub fn media() -> MediaResolver {
  MediaResolver::new("http://localhost:8000/")
}
