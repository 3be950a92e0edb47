// Copyright (C) 2026 Daniel Mueller (deso@posteo.net)
// SPDX-License-Identifier: GPL-3.0-or-later

//! Field-by-field parsing of write payloads.

use serde::de::DeserializeOwned;
use serde_json::from_value;
use serde_json::Map;
use serde_json::Value;

use crate::error::ValidationErrors;
use crate::error::NOT_NULL;
use crate::error::READ_ONLY;
use crate::error::UNKNOWN;


/// Describe the JSON type of `value` for use in error messages.
fn describe(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(..) => "a boolean",
    Value::Number(..) => "a number",
    Value::String(..) => "a string",
    Value::Array(..) => "a list",
    Value::Object(..) => "an object",
  }
}


/// The fields of a write payload, consumed one by one.
///
/// Each writable field is taken out of the payload by name and
/// converted into its typed representation, with failures being
/// recorded against the field. Whatever is left over once all writable
/// fields have been taken is rejected as either read-only or unknown.
#[derive(Debug)]
pub struct Fields {
  map: Map<String, Value>,
  read_only: &'static [&'static str],
  errors: ValidationErrors,
}

impl Fields {
  /// Prepare a payload for parsing.
  ///
  /// `read_only` lists the fields that are part of the record's
  /// representation but that may not be written.
  pub fn new(payload: Value, read_only: &'static [&'static str]) -> Result<Self, ValidationErrors> {
    match payload {
      Value::Object(map) => Ok(Self {
        map,
        read_only,
        errors: ValidationErrors::default(),
      }),
      other => Err(ValidationErrors::non_field(format!(
        "expected an object but got {}",
        describe(&other)
      ))),
    }
  }

  /// Take a non-nullable field.
  pub fn take<T>(&mut self, name: &str) -> Option<T>
  where
    T: DeserializeOwned,
  {
    let value = self.map.remove(name)?;
    if value.is_null() {
      let () = self.errors.add(name, NOT_NULL);
      return None
    }

    match from_value::<T>(value) {
      Ok(value) => Some(value),
      Err(err) => {
        let () = self.errors.add(name, err.to_string());
        None
      },
    }
  }

  /// Take a nullable field.
  ///
  /// The outer `Option` reflects whether the field was present, the
  /// inner one whether it was `null`.
  pub fn take_nullable<T>(&mut self, name: &str) -> Option<Option<T>>
  where
    T: DeserializeOwned,
  {
    let value = self.map.remove(name)?;
    match from_value::<Option<T>>(value) {
      Ok(value) => Some(value),
      Err(err) => {
        let () = self.errors.add(name, err.to_string());
        None
      },
    }
  }

  /// Take a list of nested payloads, parsing each element with `parse`.
  ///
  /// Failures of an element are recorded under `<name>.<index>`.
  pub fn take_nested<T, F>(&mut self, name: &str, mut parse: F) -> Option<Vec<T>>
  where
    F: FnMut(Value) -> Result<T, ValidationErrors>,
  {
    let values = self.take::<Vec<Value>>(name)?;
    let mut parsed = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
      match parse(value) {
        Ok(value) => parsed.push(value),
        Err(errors) => self.errors.merge_nested(&format!("{name}.{index}"), errors),
      }
    }
    Some(parsed)
  }

  /// Finish parsing, rejecting all fields that have not been taken.
  pub fn finish<T>(self, parsed: T) -> Result<T, ValidationErrors> {
    let Self {
      map,
      read_only,
      mut errors,
    } = self;

    for (name, _value) in map {
      let message = if read_only.contains(&name.as_str()) {
        READ_ONLY
      } else {
        UNKNOWN
      };
      let () = errors.add(name, message);
    }

    let () = errors.into_result()?;
    Ok(parsed)
  }
}


/// Assign `value` to `slot` if present, reporting whether anything
/// changed.
pub fn assign<T>(slot: &mut T, value: Option<T>) -> bool
where
  T: PartialEq,
{
  match value {
    Some(value) if *slot != value => {
      *slot = value;
      true
    },
    _ => false,
  }
}
