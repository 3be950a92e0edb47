// Copyright (C) 2024-2026 Daniel Mueller <deso@posteo.net>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt::Debug;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Args as Arguments;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

use crate::media::DEFAULT_PUBLIC_URL;


/// Inspect and modify the records of a trip journal.
#[derive(Debug, Parser)]
#[clap(version = env!("VERSION"))]
pub struct Args {
  /// The JSON file storing all records.
  ///
  /// Defaults to `trailmark/store.json` in the user's data directory.
  #[clap(short, long, global = true)]
  pub data_file: Option<PathBuf>,
  /// The public base URL that media files are served from.
  #[clap(long, env = "PUBLIC_URL", default_value = DEFAULT_PUBLIC_URL, global = true)]
  pub public_url: String,
  /// Force reclamation of stale lock files in case a previous program
  /// instance terminated improperly.
  #[clap(short, long, global = true)]
  pub force: bool,
  #[clap(subcommand)]
  pub command: Command,
}


/// The kind of record to operate on.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Kind {
  /// An adventure.
  Adventure,
  /// An image attached to an adventure.
  Image,
  /// A transportation.
  Transportation,
  /// A note.
  Note,
  /// A checklist, along with its items.
  Checklist,
  /// A single checklist item.
  ChecklistItem,
  /// A collection, along with everything associated with it.
  Collection,
}


#[derive(Debug, Subcommand)]
pub enum Command {
  /// Register a new user.
  AddUser(AddUser),
  /// Print the representation of a record.
  Show(Show),
  /// Create a record from a JSON payload.
  Create(Create),
  /// Update a record from a JSON payload.
  ///
  /// Only the fields present in the payload are changed.
  Update(Update),
  /// Delete a record.
  Delete(Delete),
}


#[derive(Debug, Arguments)]
pub struct AddUser {
  /// The name of the user.
  pub username: String,
}


#[derive(Debug, Arguments)]
pub struct Show {
  /// The kind of record to show.
  #[clap(value_enum)]
  pub kind: Kind,
  /// The ID of the record.
  pub id: NonZeroUsize,
}


#[derive(Debug, Arguments)]
pub struct Create {
  /// The kind of record to create.
  #[clap(value_enum)]
  pub kind: Kind,
  /// The ID of the user owning the record.
  ///
  /// Required for all kinds except images and checklist items.
  #[clap(short, long)]
  pub user: Option<NonZeroUsize>,
  /// The ID of the checklist to add an item to.
  #[clap(short, long)]
  pub checklist: Option<NonZeroUsize>,
  /// The file to read the JSON payload from. Standard input is used
  /// if not provided.
  #[clap(short, long)]
  pub payload: Option<PathBuf>,
}


#[derive(Debug, Arguments)]
pub struct Update {
  /// The kind of record to update.
  #[clap(value_enum)]
  pub kind: Kind,
  /// The ID of the record.
  pub id: NonZeroUsize,
  /// The file to read the JSON payload from. Standard input is used
  /// if not provided.
  #[clap(short, long)]
  pub payload: Option<PathBuf>,
}


#[derive(Debug, Arguments)]
pub struct Delete {
  /// The kind of record to delete.
  #[clap(value_enum)]
  pub kind: Kind,
  /// The ID of the record.
  pub id: NonZeroUsize,
}
