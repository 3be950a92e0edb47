// Copyright (C) 2022-2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs::write;
use std::io::empty;

use serde_json::from_slice as from_json;
use serde_json::json;
use serde_json::to_value;
use serde_json::Value;

use tempfile::NamedTempFile;
use tempfile::TempDir;

use trailmark::checklists;
use trailmark::collections;
use trailmark::run_with_args;
use trailmark::users;
use trailmark::MediaResolver;
use trailmark::MemStore;
use trailmark::Store as _;
use trailmark::ValidationErrors;


/// Run the program with the given arguments against the data file in
/// `dir`, returning the parsed output.
fn run(dir: &TempDir, args: &[&str], payload: &str) -> Value {
  let data_file = dir.path().join("store.json");
  let mut argv = vec![
    "trailmark".to_string(),
    "--data-file".to_string(),
    data_file.display().to_string(),
  ];
  argv.extend(args.iter().map(|arg| arg.to_string()));

  let mut output = Vec::new();
  let () = run_with_args(argv, payload.as_bytes(), &mut output).unwrap();
  from_json(&output).unwrap()
}


/// Check that a checklist shared through a public collection can be
/// edited and is represented as part of the collection.
#[test]
fn checklist_in_collection() {
  let mut store = MemStore::default();
  let media = MediaResolver::new("https://example.com/");
  let alice = users::create(&mut store, "alice").unwrap();
  let bob = users::create(&mut store, "bob").unwrap();

  let payload = json!({"name": "Dolomites", "is_public": true, "shared_with": [bob.uuid]});
  let trip = collections::create(&mut store, alice.id, payload).unwrap();

  let payload = json!({
    "name": "Gear",
    "collection": trip.id,
    "items": [{"name": "Helmet"}, {"name": "Harness"}],
  });
  let err = checklists::create(&mut store, alice.id, payload.clone()).unwrap_err();
  let errors = err.downcast_ref::<ValidationErrors>().unwrap();
  let errors = to_value(errors).unwrap();
  assert_eq!(
    errors,
    json!({"non_field_errors": [checklists::PRIVATE_IN_PUBLIC]})
  );

  let mut payload = payload;
  payload["is_public"] = json!(true);
  let gear = checklists::create(&mut store, alice.id, payload).unwrap();
  let items = checklists::items_of(&store, gear.id).unwrap();

  let payload = json!({
    "items": [
      {"id": items[1].id, "name": "Harness", "is_checked": true},
      {"name": "Rope"},
    ],
  });
  let _gear = checklists::update(&mut store, gear.id, payload).unwrap();

  let trip = store.fetch(trip.id).unwrap();
  let repr = to_value(collections::represent(&store, &media, &trip).unwrap()).unwrap();
  assert_eq!(repr["shared_with"], json!([bob.uuid]));
  assert_eq!(repr["user_id"], json!(alice.id));

  let lists = repr["checklists"].as_array().unwrap();
  assert_eq!(lists.len(), 1);
  let items = lists[0]["items"].as_array().unwrap();
  let names = items
    .iter()
    .map(|item| item["name"].as_str().unwrap())
    .collect::<Vec<_>>();
  assert_eq!(names, ["Harness", "Rope"]);
  assert_eq!(items[0]["is_checked"], json!(true));
  assert_eq!(items[1]["is_checked"], json!(false));
}


/// Check that we can run the program to create, show, update, and
/// delete records.
#[test]
fn prog_running() {
  let dir = TempDir::new().unwrap();

  let alice = run(&dir, &["add-user", "alice"], "");
  assert_eq!(alice["username"], "alice");
  assert_eq!(alice["id"], 1);

  let payload = r#"{"name": "Yosemite", "type": "visited"}"#;
  let adventure = run(&dir, &["create", "adventure", "--user", "1"], payload);
  assert_eq!(adventure["name"], "Yosemite");
  assert_eq!(adventure["images"], json!([]));

  let payload_file = NamedTempFile::new().unwrap();
  let () = write(payload_file.path(), r#"{"image": "yosemite.jpg", "adventure": 1}"#).unwrap();
  let path = payload_file.path().display().to_string();
  let _image = run(&dir, &["create", "image", "--payload", &path], "");

  let adventure = run(&dir, &["show", "adventure", "1"], "");
  assert_eq!(
    adventure["images"][0]["image"],
    "http://127.0.0.1:8000/media/yosemite.jpg"
  );

  let adventure = run(&dir, &["update", "adventure", "1"], r#"{"rating": 5}"#);
  assert_eq!(adventure["rating"], 5.0);
  assert_eq!(adventure["type"], "visited");

  let data_file = dir.path().join("store.json");
  let mut output = Vec::new();
  let args = [
    "trailmark",
    "--data-file",
    data_file.to_str().unwrap(),
    "delete",
    "adventure",
    "1",
  ];
  let () = run_with_args(args, empty(), &mut output).unwrap();
  assert!(output.is_empty());

  let args = [
    "trailmark",
    "--data-file",
    data_file.to_str().unwrap(),
    "show",
    "image",
    "1",
  ];
  let err = run_with_args(args, empty(), &mut output).unwrap_err();
  assert!(err.to_string().contains("does not exist"), "{err}");
}
