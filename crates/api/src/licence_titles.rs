// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Display titles for licence conditions.
//!
//! The titles are read from a CSV file with `code`, `subcode` and
//! `display_title` columns once, when the cache is built. Lookups never
//! touch the file again.

use csv::StringRecord;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::error::ApiError;

const REQUIRED_HEADERS: &[&str] = &["code", "subcode", "display_title"];

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

/// Cache of licence condition display titles keyed by code and subcode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LicenceTitles {
    titles: HashMap<(String, String), String>,
}

impl LicenceTitles {
    /// An empty cache.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the cache from CSV content.
    ///
    /// Codes and subcodes are matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` if the CSV cannot be read or a
    /// required column is missing.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ApiError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: StringRecord = reader.headers().map_err(|e| csv_error(&e))?.clone();
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
        let mut positions: Vec<usize> = Vec::with_capacity(REQUIRED_HEADERS.len());
        for required in REQUIRED_HEADERS {
            let position: usize = normalized
                .iter()
                .position(|h| h == required)
                .ok_or_else(|| ApiError::InvalidInput {
                    field: String::from("licence_titles"),
                    message: format!("Missing required column '{required}'"),
                })?;
            positions.push(position);
        }

        let mut titles: HashMap<(String, String), String> = HashMap::new();
        for result in reader.records() {
            let record: StringRecord = result.map_err(|e| csv_error(&e))?;
            let field = |i: usize| record.get(positions[i]).unwrap_or_default().to_string();
            titles.insert(
                (field(0).to_lowercase(), field(1).to_lowercase()),
                field(2),
            );
        }

        info!(count = titles.len(), "Loaded licence condition titles");
        Ok(Self { titles })
    }

    /// Builds the cache from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsed.
    pub fn from_path(path: &Path) -> Result<Self, ApiError> {
        let file: std::fs::File = std::fs::File::open(path).map_err(|e| ApiError::Internal {
            message: format!("Failed to open {}: {e}", path.display()),
        })?;
        Self::from_reader(file)
    }

    /// Looks up a display title.
    #[must_use]
    pub fn get(&self, code: &str, subcode: &str) -> Option<&str> {
        self.titles
            .get(&(code.trim().to_lowercase(), subcode.trim().to_lowercase()))
            .map(String::as_str)
    }

    /// Number of titles held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    /// Returns true if no titles are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

fn csv_error(e: &csv::Error) -> ApiError {
    ApiError::InvalidInput {
        field: String::from("licence_titles"),
        message: format!("Failed to read licence titles CSV: {e}"),
    }
}
