// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for SentiSense

use thiserror::Error;

/// Result type alias for SentiSense operations
pub type Result<T> = std::result::Result<T, SentiError>;

/// SentiSense error types
#[derive(Error, Debug)]
pub enum SentiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Store format error: {0}")]
    Store(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No feedback record at index {0}")]
    NotFound(usize),

    #[error("Feedback text must not be empty")]
    EmptyFeedback,

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(i64),
}
