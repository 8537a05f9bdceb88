// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! SentiSense: Feedback Sentiment Dashboard
//!
//! Collects free-text feedback with a 1-5 rating, labels it with a
//! keyword-driven sentiment classifier, and keeps every submission in a
//! flat CSV ledger rendered as a web dashboard.

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod ledger;
pub mod web;

pub use config::AppConfig;
pub use error::{Result, SentiError};
