// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Optional reference dataset
//!
//! The original deployment ships a reviews CSV next to the feedback store.
//! It is loaded once at startup and surfaced on the settings page, but the
//! classifier and ledger never consult it. Kept as an explicit value in
//! application state rather than module-global state.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Row count of the reference dataset, if one was found
#[derive(Debug, Clone, Default)]
pub struct ReferenceDataset {
    pub path: Option<PathBuf>,
    pub rows: usize,
}

impl ReferenceDataset {
    /// Load the dataset at `path`; absence or a parse failure reads as empty
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!("Reference dataset not found at {:?}", path);
            return Self::default();
        }

        let mut reader = match csv::Reader::from_path(path) {
            Ok(reader) => reader,
            Err(e) => {
                warn!("Failed to open reference dataset: {}", e);
                return Self::default();
            }
        };

        let rows = reader.records().filter(|row| row.is_ok()).count();
        debug!("Loaded reference dataset: {} rows", rows);
        Self {
            path: Some(path.to_path_buf()),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let dataset = ReferenceDataset::load(&dir.path().join("nope.csv"));
        assert!(dataset.is_empty());
        assert!(dataset.path.is_none());
    }

    #[test]
    fn counts_data_rows_excluding_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reviews.csv");
        std::fs::write(&path, "review,sentiment\nloved it,positive\nhated it,negative\n").unwrap();

        let dataset = ReferenceDataset::load(&path);
        assert_eq!(dataset.rows, 2);
        assert_eq!(dataset.path.as_deref(), Some(path.as_path()));
    }
}
