// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-visitor session data.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Key/value data held for one browser session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionData {
    values: Map<String, Value>,
}

impl SessionData {
    /// Creates empty session data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Stores a raw value under `key`, replacing any previous value.
    pub fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    /// Removes and returns the value under `key`.
    pub fn clear(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Keys that start with `prefix`.
    pub fn keys_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> {
        self.values
            .keys()
            .map(String::as_str)
            .filter(move |key| key.starts_with(prefix))
    }

    /// Returns true if a value is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Reads a typed value.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if the stored value does not decode as `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ApiError> {
        self.values
            .get(key)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| ApiError::Internal {
                    message: format!("Failed to decode session value '{key}': {e}"),
                })
            })
            .transpose()
    }

    /// Stores a typed value.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if the value cannot be encoded.
    pub fn set_as<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), ApiError> {
        let encoded: Value = serde_json::to_value(value).map_err(|e| ApiError::Internal {
            message: format!("Failed to encode session value '{key}': {e}"),
        })?;
        self.set(key, encoded);
        Ok(())
    }
}
