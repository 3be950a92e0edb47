// Copyright (C) 2017-2026 Daniel Mueller <deso@posteo.net>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Wire representations of the records of a trip journal.
//!
//! Records (adventures, transportations, notes, checklists, and
//! collections, among others) are converted to and from JSON, with
//! write payloads being validated field by field. Checklists are
//! created and updated along with their items as a single unit and
//! collections are represented with everything associated with them.
//! All operations work against the [`Store`] persistence interface,
//! for which [`MemStore`] provides an in-memory implementation.

mod args;
mod db;
mod error;
mod id;
mod log;
mod media;
mod paths;
mod store;
#[cfg(test)]
mod test;

pub mod adventures;
pub mod checklists;
pub mod collections;
pub mod notes;
pub mod ser;
pub mod transportations;
pub mod users;

pub use crate::db::Table;
pub use crate::error::NotFound;
pub use crate::error::ValidationErrors;
pub use crate::error::NOT_NULL;
pub use crate::error::READ_ONLY;
pub use crate::error::REQUIRED;
pub use crate::error::UNKNOWN;
pub use crate::id::Id;
pub use crate::media::MediaResolver;
pub use crate::media::DEFAULT_PUBLIC_URL;
pub use crate::paths::Paths;
pub use crate::store::MemStore;
pub use crate::store::Record;
pub use crate::store::Store;
pub use crate::store::Tables;

use std::env::args_os;
use std::ffi::OsString;
use std::fs::create_dir_all;
use std::fs::remove_file;
use std::fs::File;
use std::io::stdin;
use std::io::stdout;
use std::io::ErrorKind;
use std::io::Read;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;

use anyhow::anyhow;
use anyhow::Context as _;
use anyhow::Result;

use clap::error::ErrorKind as ClapError;
use clap::Parser as _;

use serde::Serialize;
use serde_json::from_slice as from_json;
use serde_json::to_writer_pretty;
use serde_json::Value;

use tokio::fs::read;
use tokio::runtime::Builder;

use crate::adventures::Adventure;
use crate::adventures::AdventureImage;
use crate::args::AddUser;
use crate::args::Args;
use crate::args::Command;
use crate::args::Create;
use crate::args::Delete;
use crate::args::Kind;
use crate::args::Show;
use crate::args::Update;
use crate::checklists::Checklist;
use crate::checklists::ChecklistItem;
use crate::collections::Collection;
use crate::log::info;
use crate::notes::Note;
use crate::ser::ToSerde as _;
use crate::transportations::Transportation;


/// Convert a command line supplied ID into an `Id`.
#[inline]
fn id<T>(id: NonZeroUsize) -> Id<T> {
  Id::from_unique_id(id)
}


/// Write the JSON representation of `value` to `out`.
fn print<W, T>(out: &mut W, value: &T) -> Result<()>
where
  W: Write,
  T: Serialize,
{
  let () = to_writer_pretty(&mut *out, value).context("failed to write JSON")?;
  let () = writeln!(out).context("failed to write JSON")?;
  Ok(())
}


/// Read a JSON payload from the file at `path` or, if not provided,
/// from `in_`.
async fn read_payload<R>(mut in_: R, path: Option<&Path>) -> Result<Value>
where
  R: Read,
{
  let data = if let Some(path) = path {
    read(path)
      .await
      .with_context(|| format!("failed to read payload file {}", path.display()))?
  } else {
    let mut data = Vec::new();
    let _count = in_
      .read_to_end(&mut data)
      .context("failed to read payload from standard input")?;
    data
  };

  from_json(&data).context("failed to parse JSON payload")
}


/// Print the representation of the record of the given kind.
fn show<W>(
  store: &MemStore,
  media: &MediaResolver,
  kind: Kind,
  record: NonZeroUsize,
  out: &mut W,
) -> Result<()>
where
  W: Write,
{
  match kind {
    Kind::Adventure => {
      let adventure = store.fetch::<Adventure>(id(record))?;
      print(out, &adventures::represent(store, media, &adventure)?)
    },
    Kind::Image => {
      let image = store.fetch::<AdventureImage>(id(record))?;
      print(out, &image.to_serde(media))
    },
    Kind::Transportation => print(out, &store.fetch::<Transportation>(id(record))?.to_serde()),
    Kind::Note => print(out, &store.fetch::<Note>(id(record))?.to_serde()),
    Kind::Checklist => {
      let checklist = store.fetch::<Checklist>(id(record))?;
      print(out, &checklists::represent(store, &checklist)?)
    },
    Kind::ChecklistItem => print(out, &store.fetch::<ChecklistItem>(id(record))?.to_serde()),
    Kind::Collection => {
      let collection = store.fetch::<Collection>(id(record))?;
      print(out, &collections::represent(store, media, &collection)?)
    },
  }
}


/// Create a record, returning its ID.
fn create(store: &mut MemStore, create: Create, payload: Value) -> Result<NonZeroUsize> {
  let Create {
    kind,
    user,
    checklist,
    payload: _,
  } = create;

  let owner = || {
    user
      .map(id)
      .ok_or_else(|| anyhow!("--user is required to create a record of this kind"))
  };

  let record = match kind {
    Kind::Adventure => adventures::create(store, owner()?, payload)?.id.get(),
    Kind::Image => adventures::create_image(store, payload)?.id.get(),
    Kind::Transportation => transportations::create(store, owner()?, payload)?.id.get(),
    Kind::Note => notes::create(store, owner()?, payload)?.id.get(),
    Kind::Checklist => checklists::create(store, owner()?, payload)?.id.get(),
    Kind::ChecklistItem => {
      let checklist = checklist
        .ok_or_else(|| anyhow!("--checklist is required to create a checklist item"))?;
      checklists::create_item(store, id(checklist), payload)?
        .id
        .get()
    },
    Kind::Collection => collections::create(store, owner()?, payload)?.id.get(),
  };
  Ok(record)
}


/// Update a record.
fn update(store: &mut MemStore, update: Update, payload: Value) -> Result<()> {
  let Update {
    kind,
    id: record,
    payload: _,
  } = update;

  match kind {
    Kind::Adventure => adventures::update(store, id(record), payload).map(|_| ()),
    Kind::Image => adventures::update_image(store, id(record), payload).map(|_| ()),
    Kind::Transportation => transportations::update(store, id(record), payload).map(|_| ()),
    Kind::Note => notes::update(store, id(record), payload).map(|_| ()),
    Kind::Checklist => checklists::update(store, id(record), payload).map(|_| ()),
    Kind::ChecklistItem => checklists::update_item(store, id(record), payload).map(|_| ()),
    Kind::Collection => collections::update(store, id(record), payload).map(|_| ()),
  }
}


/// Delete a record.
fn delete(store: &mut MemStore, kind: Kind, record: NonZeroUsize) -> Result<()> {
  match kind {
    Kind::Adventure => adventures::delete(store, id(record)),
    Kind::Image => adventures::delete_image(store, id(record)),
    Kind::Transportation => transportations::delete(store, id(record)),
    Kind::Note => notes::delete(store, id(record)),
    Kind::Checklist => checklists::delete(store, id(record)),
    Kind::ChecklistItem => checklists::delete_item(store, id(record)),
    Kind::Collection => collections::delete(store, id(record)),
  }
}


/// Run the program.
async fn run_prog<R, W>(
  in_: R,
  mut out: W,
  paths: &Paths,
  media: &MediaResolver,
  command: Command,
) -> Result<()>
where
  R: Read,
  W: Write,
{
  let data_file = paths.data_file();
  let mut store = MemStore::load(data_file)
    .await
    .context("failed to load records")?;

  let modified = match command {
    Command::AddUser(AddUser { username }) => {
      let user = users::create(&mut store, &username)?;
      let () = print(&mut out, &user)?;
      true
    },
    Command::Show(Show { kind, id: record }) => {
      let () = show(&store, media, kind, record, &mut out)?;
      false
    },
    Command::Create(args) => {
      let payload = read_payload(in_, args.payload.as_deref()).await?;
      let kind = args.kind;
      let record = create(&mut store, args, payload)?;
      let () = show(&store, media, kind, record, &mut out)?;
      true
    },
    Command::Update(args) => {
      let payload = read_payload(in_, args.payload.as_deref()).await?;
      let (kind, record) = (args.kind, args.id);
      let () = update(&mut store, args, payload)?;
      let () = show(&store, media, kind, record, &mut out)?;
      true
    },
    Command::Delete(Delete { kind, id: record }) => {
      let () = delete(&mut store, kind, record)?;
      true
    },
  };

  if modified {
    info!("saving records to {}", data_file.display());
    let () = store.save(data_file).await.context("failed to save records")?;
  }
  Ok(())
}


struct LockFile<'path>(&'path Path);

impl Drop for LockFile<'_> {
  fn drop(&mut self) {
    if let Err(err) = remove_file(self.0) {
      eprintln!("failed to remove lock file {}: {err}", self.0.display());
    }
  }
}


/// Run a function after attempting to create a lock file and remove it
/// once the function has returned.
fn with_lockfile<F>(lock_file: &Path, force: bool, f: F) -> Result<()>
where
  F: FnOnce() -> Result<()>,
{
  if let Some(dir) = lock_file.parent() {
    let () = create_dir_all(dir)
      .with_context(|| format!("failed to create directory {}", dir.display()))?;
  }

  let result = if force {
    File::options()
      .create(true)
      .truncate(true)
      .write(true)
      .open(lock_file)
  } else {
    File::options().create_new(true).write(true).open(lock_file)
  };

  if matches!(&result, Err(err) if err.kind() == ErrorKind::AlreadyExists) {
    eprintln!(
      "lock file {} already present; is another program instance running?",
      lock_file.display()
    );
    eprintln!("re-run with --force/-f if you are sure that the file is stale");
  }
  let _file =
    result.with_context(|| format!("failed to create lock file {}", lock_file.display()))?;

  let _guard = LockFile(lock_file);
  f()
}

/// Run an instance of the program on a current-thread runtime.
fn run_now<R, W>(in_: R, out: W, paths: &Paths, media: &MediaResolver, command: Command) -> Result<()>
where
  R: Read,
  W: Write,
{
  let rt = Builder::new_current_thread()
    .build()
    .context("failed to instantiate async runtime")?;

  let future = run_prog(in_, out, paths, media, command);
  rt.block_on(future)
}

/// Parse the provided arguments and run the program, reading payloads
/// from `in_` (unless a payload file is given) and writing output to
/// `out`.
pub fn run_with_args<A, T, R, W>(args: A, in_: R, mut out: W) -> Result<()>
where
  A: IntoIterator<Item = T>,
  T: Into<OsString> + Clone,
  R: Read,
  W: Write,
{
  let args = match Args::try_parse_from(args) {
    Ok(args) => args,
    Err(err) => match err.kind() {
      ClapError::DisplayHelp | ClapError::DisplayVersion => {
        let () = write!(out, "{err}").context("failed to write help text")?;
        return Ok(())
      },
      _ => return Err(err.into()),
    },
  };

  let Args {
    data_file,
    public_url,
    force,
    command,
  } = args;

  let paths = Paths::new(data_file)?;
  let media = MediaResolver::new(&public_url);
  with_lockfile(&paths.lock_file(), force, || {
    run_now(in_, out, &paths, &media, command)
  })
}

fn run_with_result() -> Result<()> {
  let () = log::init()?;
  run_with_args(args_os(), stdin().lock(), stdout().lock())
}

/// Run the program and handle errors.
pub fn run() -> i32 {
  match run_with_result() {
    Ok(()) => 0,
    Err(err) => {
      eprintln!("{err:?}");
      1
    },
  }
}
