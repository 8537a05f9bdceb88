// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Keyword-driven sentiment classifier
//!
//! Labels feedback text by matching it against two fixed lexicons and
//! attaches a synthetic confidence breakdown drawn from the caller's
//! random source. The percentages are decorative: only the label is
//! derived from the text.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terms whose presence votes for a Positive label
pub const POSITIVE_LEXICON: [&str; 12] = [
    "love", "great", "amazing", "excellent", "perfect", "happy",
    "satisfied", "recommend", "best", "awesome", "wonderful", "good",
];

/// Terms whose presence votes for a Negative label
pub const NEGATIVE_LEXICON: [&str; 9] = [
    "bad", "worst", "awful", "terrible", "hate", "disappointed",
    "poor", "broken", "disappointing",
];

/// Sentiment label assigned to a feedback record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn emoji(&self) -> &'static str {
        match self {
            Sentiment::Positive => "\u{1F600}",
            Sentiment::Negative => "\u{1F61E}",
            Sentiment::Neutral => "\u{1F610}",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        };
        write!(f, "{}", label)
    }
}

/// Classifier output: label plus synthetic percentage breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub sentiment: Sentiment,
    pub positive_pct: f64,
    pub negative_pct: f64,
    pub neutral_pct: f64,
}

impl Verdict {
    pub fn emoji(&self) -> &'static str {
        self.sentiment.emoji()
    }
}

/// Count lexicon matches in the lowered text.
///
/// Matching is substring containment ("badly" contains "bad") and each
/// lexicon term contributes at most one to its count, however often it
/// occurs.
pub fn lexicon_counts(text: &str) -> (usize, usize) {
    let lowered = text.to_lowercase();
    let positive = POSITIVE_LEXICON
        .iter()
        .filter(|term| lowered.contains(*term))
        .count();
    let negative = NEGATIVE_LEXICON
        .iter()
        .filter(|term| lowered.contains(*term))
        .count();
    (positive, negative)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Classify feedback text.
///
/// Total over all inputs; empty text falls through to Neutral. Neutral is
/// always the remainder to 100, so the three parts sum to 100 before the
/// independent rounding of the other two (re-summing the displayed values
/// can drift by up to 0.1).
pub fn classify(text: &str, rng: &mut impl Rng) -> Verdict {
    let (pos_count, neg_count) = lexicon_counts(text);

    if pos_count > neg_count && pos_count >= 1 {
        let positive = round1(rng.gen_range(75.0..=98.0));
        let negative = round1(rng.gen_range(1.0..=12.0));
        return Verdict {
            sentiment: Sentiment::Positive,
            positive_pct: positive,
            negative_pct: negative,
            neutral_pct: round1(100.0 - positive - negative),
        };
    }

    if neg_count > pos_count && neg_count >= 1 {
        let negative = round1(rng.gen_range(70.0..=96.0));
        let positive = round1(rng.gen_range(1.0..=12.0));
        return Verdict {
            sentiment: Sentiment::Negative,
            positive_pct: positive,
            negative_pct: negative,
            neutral_pct: round1(100.0 - positive - negative),
        };
    }

    let positive = round1(rng.gen_range(30.0..=55.0));
    let negative = round1(rng.gen_range(10.0..=35.0));
    Verdict {
        sentiment: Sentiment::Neutral,
        positive_pct: positive,
        negative_pct: negative,
        neutral_pct: round1(100.0 - positive - negative),
    }
}
