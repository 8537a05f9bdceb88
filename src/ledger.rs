// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Feedback ledger backed by a flat CSV store
//!
//! Every read materializes the whole file; every mutation rewrites it
//! wholesale. A single internal mutex serializes the read-modify-write
//! cycles so concurrent sessions cannot lose updates to each other.

use chrono::Local;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

use crate::classifier::{Sentiment, Verdict};
use crate::{Result, SentiError};

/// Timestamp format used in the store, local clock
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Canonical column set, in file order
pub const STORE_HEADERS: [&str; 7] = [
    "Timestamp",
    "Feedback",
    "Sentiment",
    "Positive(%)",
    "Negative(%)",
    "Neutral(%)",
    "Rating",
];

/// A single feedback submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Feedback")]
    pub feedback: String,
    #[serde(rename = "Sentiment")]
    pub sentiment: Sentiment,
    #[serde(rename = "Positive(%)")]
    pub positive_pct: f64,
    #[serde(rename = "Negative(%)")]
    pub negative_pct: f64,
    #[serde(rename = "Neutral(%)")]
    pub neutral_pct: f64,
    #[serde(rename = "Rating", deserialize_with = "lenient_rating")]
    pub rating: i64,
}

/// Parse a rating cell, coercing anything non-numeric to 0
fn lenient_rating<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    let value = trimmed
        .parse::<i64>()
        .or_else(|_| trimmed.parse::<f64>().map(|f| f as i64))
        .unwrap_or(0);
    Ok(value)
}

impl FeedbackRecord {
    /// Build a record from a classifier verdict, stamped with the local clock
    pub fn new(feedback: impl Into<String>, verdict: &Verdict, rating: i64) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            feedback: feedback.into(),
            sentiment: verdict.sentiment,
            positive_pct: verdict.positive_pct,
            negative_pct: verdict.negative_pct,
            neutral_pct: verdict.neutral_pct,
            rating,
        }
    }
}

/// Aggregate view over a set of records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    /// None when there are no records; rendered as "no feedback", never NaN
    pub average_rating: Option<f64>,
}

/// Compute counts and mean rating over a record slice
pub fn summarize(records: &[FeedbackRecord]) -> Summary {
    let total = records.len();
    let positive = records.iter().filter(|r| r.sentiment == Sentiment::Positive).count();
    let negative = records.iter().filter(|r| r.sentiment == Sentiment::Negative).count();
    let neutral = records.iter().filter(|r| r.sentiment == Sentiment::Neutral).count();

    let average_rating = if total == 0 {
        None
    } else {
        let sum: i64 = records.iter().map(|r| r.rating).sum();
        Some(sum as f64 / total as f64)
    };

    Summary { total, positive, negative, neutral, average_rating }
}

/// Durable feedback store (thread-safe wrapper around one CSV file)
#[derive(Clone)]
pub struct Ledger {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl Ledger {
    /// Create a ledger over the given store path
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Arc::new(Mutex::new(())),
        }
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| SentiError::Config("Ledger lock poisoned".to_string()))
    }

    /// Create an empty store with the canonical header if none exists
    pub fn ensure_store(&self) -> Result<()> {
        let _guard = self.guard()?;
        if self.path.exists() {
            return Ok(());
        }
        write_records(&self.path, &[])
    }

    /// Read all records in insertion order.
    ///
    /// A missing or fully unreadable file reads as empty; individually
    /// malformed rows are skipped with a warning.
    pub fn read_all(&self) -> Result<Vec<FeedbackRecord>> {
        let _guard = self.guard()?;
        Ok(read_records(&self.path))
    }

    /// Read all records paired with their physical index.
    ///
    /// Indices are stable only until the next append or delete.
    pub fn list_all(&self) -> Result<Vec<(usize, FeedbackRecord)>> {
        Ok(self.read_all()?.into_iter().enumerate().collect())
    }

    /// Records paired with their physical index, newest timestamp first.
    ///
    /// Timestamps can collide within a second; the sort is stable, and the
    /// physical index stays authoritative for deletion.
    pub fn list_newest_first(&self) -> Result<Vec<(usize, FeedbackRecord)>> {
        let mut rows = self.list_all()?;
        rows.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp));
        Ok(rows)
    }

    /// Append a record, preserving prior insertion order
    pub fn append(&self, record: &FeedbackRecord) -> Result<()> {
        let _guard = self.guard()?;
        let mut records = read_records(&self.path);
        records.push(record.clone());
        write_records(&self.path, &records)
    }

    /// Remove the record at the given physical index
    pub fn delete_at(&self, index: usize) -> Result<FeedbackRecord> {
        let _guard = self.guard()?;
        let mut records = read_records(&self.path);
        if index >= records.len() {
            return Err(SentiError::NotFound(index));
        }
        let removed = records.remove(index);
        write_records(&self.path, &records)?;
        Ok(removed)
    }

    /// Get store file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_records(path: &Path) -> Vec<FeedbackRecord> {
    if !path.exists() {
        return Vec::new();
    }

    let mut reader = match csv::Reader::from_path(path) {
        Ok(reader) => reader,
        Err(e) => {
            warn!("Failed to open feedback store: {}", e);
            return Vec::new();
        }
    };

    let mut records = Vec::new();
    for row in reader.deserialize() {
        match row {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping malformed feedback row: {}", e),
        }
    }
    records
}

fn write_records(path: &Path, records: &[FeedbackRecord]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));

    writer.write_record(STORE_HEADERS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Sentiment;
    use tempfile::TempDir;

    fn record(timestamp: &str, feedback: &str, sentiment: Sentiment, rating: i64) -> FeedbackRecord {
        FeedbackRecord {
            timestamp: timestamp.to_string(),
            feedback: feedback.to_string(),
            sentiment,
            positive_pct: 40.0,
            negative_pct: 20.0,
            neutral_pct: 40.0,
            rating,
        }
    }

    fn temp_ledger() -> (TempDir, Ledger) {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::new(dir.path().join("feedback_data.csv"));
        (dir, ledger)
    }

    #[test]
    fn ensure_store_is_idempotent() {
        let (_dir, ledger) = temp_ledger();
        ledger.ensure_store().unwrap();
        let first = std::fs::read_to_string(ledger.path()).unwrap();
        ledger.ensure_store().unwrap();
        let second = std::fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("Timestamp,Feedback,Sentiment"));
        assert!(ledger.read_all().unwrap().is_empty());
    }

    #[test]
    fn ensure_store_keeps_existing_data() {
        let (_dir, ledger) = temp_ledger();
        ledger.append(&record("2024-01-01 10:00:00", "fine", Sentiment::Neutral, 3)).unwrap();
        ledger.ensure_store().unwrap();
        assert_eq!(ledger.read_all().unwrap().len(), 1);
    }

    #[test]
    fn round_trips_hostile_feedback_text() {
        let (_dir, ledger) = temp_ledger();
        let hostile = "She said \"great!\", then left.\nSecond line, with commas, and \u{1F600}";
        let original = record("2024-03-05 09:30:00", hostile, Sentiment::Positive, 5);

        ledger.append(&original).unwrap();
        let rows = ledger.list_all().unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, 0);
        assert_eq!(rows[0].1, original);
    }

    #[test]
    fn append_preserves_insertion_order() {
        let (_dir, ledger) = temp_ledger();
        let first = record("2024-01-02 10:00:00", "later day", Sentiment::Neutral, 3);
        let second = record("2024-01-01 10:00:00", "earlier day", Sentiment::Neutral, 4);

        ledger.append(&first).unwrap();
        ledger.append(&second).unwrap();

        let rows = ledger.read_all().unwrap();
        assert_eq!(rows[0].feedback, "later day");
        assert_eq!(rows[1].feedback, "earlier day");
    }

    #[test]
    fn list_newest_first_sorts_by_timestamp_keeping_indices() {
        let (_dir, ledger) = temp_ledger();
        ledger.append(&record("2024-01-02 10:00:00", "b", Sentiment::Neutral, 3)).unwrap();
        ledger.append(&record("2024-01-01 10:00:00", "a", Sentiment::Neutral, 3)).unwrap();
        ledger.append(&record("2024-01-03 10:00:00", "c", Sentiment::Neutral, 3)).unwrap();

        let rows = ledger.list_newest_first().unwrap();
        let order: Vec<(usize, &str)> = rows.iter().map(|(i, r)| (*i, r.feedback.as_str())).collect();
        assert_eq!(order, vec![(2, "c"), (0, "b"), (1, "a")]);
    }

    #[test]
    fn delete_at_removes_exactly_the_indexed_record() {
        let (_dir, ledger) = temp_ledger();
        for (ts, text) in [
            ("2024-01-01 10:00:00", "keep one"),
            ("2024-01-01 10:00:01", "drop me"),
            ("2024-01-01 10:00:02", "keep two"),
        ] {
            ledger.append(&record(ts, text, Sentiment::Neutral, 3)).unwrap();
        }

        let removed = ledger.delete_at(1).unwrap();
        assert_eq!(removed.feedback, "drop me");

        let remaining: Vec<String> = ledger
            .read_all()
            .unwrap()
            .into_iter()
            .map(|r| r.feedback)
            .collect();
        assert_eq!(remaining, vec!["keep one", "keep two"]);
    }

    #[test]
    fn delete_at_out_of_range_is_not_found() {
        let (_dir, ledger) = temp_ledger();
        ledger.ensure_store().unwrap();
        assert!(matches!(ledger.delete_at(0), Err(SentiError::NotFound(0))));

        ledger.append(&record("2024-01-01 10:00:00", "only", Sentiment::Neutral, 3)).unwrap();
        assert!(matches!(ledger.delete_at(5), Err(SentiError::NotFound(5))));
        assert_eq!(ledger.read_all().unwrap().len(), 1);
    }

    #[test]
    fn missing_store_reads_empty() {
        let (_dir, ledger) = temp_ledger();
        assert!(ledger.read_all().unwrap().is_empty());
        assert!(ledger.list_newest_first().unwrap().is_empty());
    }

    #[test]
    fn corrupt_store_reads_empty_and_recovers_on_write() {
        let (_dir, ledger) = temp_ledger();
        std::fs::write(ledger.path(), "this is not, a valid\nstore").unwrap();
        assert!(ledger.read_all().unwrap().is_empty());

        ledger.append(&record("2024-01-01 10:00:00", "fresh start", Sentiment::Neutral, 3)).unwrap();
        let content = std::fs::read_to_string(ledger.path()).unwrap();
        assert!(content.starts_with("Timestamp,Feedback,Sentiment"));
        assert_eq!(ledger.read_all().unwrap().len(), 1);
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let (_dir, ledger) = temp_ledger();
        let raw = "Timestamp,Feedback,Sentiment,Positive(%),Negative(%),Neutral(%),Rating\n\
                   2024-01-01 10:00:00,fine,Neutral,40.0,20.0,40.0,3\n\
                   short,row\n\
                   2024-01-02 10:00:00,also fine,Positive,88.0,4.0,8.0,5\n";
        std::fs::write(ledger.path(), raw).unwrap();

        let rows = ledger.read_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].sentiment, Sentiment::Positive);
    }

    #[test]
    fn non_numeric_rating_coerces_to_zero() {
        let (_dir, ledger) = temp_ledger();
        let raw = "Timestamp,Feedback,Sentiment,Positive(%),Negative(%),Neutral(%),Rating\n\
                   2024-01-01 10:00:00,hand edited,Neutral,40.0,20.0,40.0,N/A\n\
                   2024-01-02 10:00:00,decimal,Positive,88.0,4.0,8.0,4.0\n";
        std::fs::write(ledger.path(), raw).unwrap();

        let rows = ledger.read_all().unwrap();
        assert_eq!(rows[0].rating, 0);
        assert_eq!(rows[1].rating, 4);

        // The zero drags the mean down instead of raising
        let summary = summarize(&rows);
        assert_eq!(summary.average_rating, Some(2.0));
    }

    #[test]
    fn summarize_empty_has_no_average() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.positive, 0);
        assert_eq!(summary.negative, 0);
        assert_eq!(summary.neutral, 0);
        assert_eq!(summary.average_rating, None);
    }

    #[test]
    fn summarize_counts_labels_and_averages_ratings() {
        let records = vec![
            record("2024-01-01 10:00:00", "a", Sentiment::Positive, 5),
            record("2024-01-01 10:00:01", "b", Sentiment::Positive, 4),
            record("2024-01-01 10:00:02", "c", Sentiment::Negative, 1),
            record("2024-01-01 10:00:03", "d", Sentiment::Neutral, 3),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.positive, 2);
        assert_eq!(summary.negative, 1);
        assert_eq!(summary.neutral, 1);
        assert_eq!(summary.average_rating, Some(3.25));
    }

    #[test]
    fn timestamp_collisions_delete_by_index_not_time() {
        let (_dir, ledger) = temp_ledger();
        ledger.append(&record("2024-01-01 10:00:00", "first", Sentiment::Neutral, 3)).unwrap();
        ledger.append(&record("2024-01-01 10:00:00", "second", Sentiment::Neutral, 3)).unwrap();

        let removed = ledger.delete_at(0).unwrap();
        assert_eq!(removed.feedback, "first");
        assert_eq!(ledger.read_all().unwrap()[0].feedback, "second");
    }
}
