//! Intent classification for production-plan queries.
//!
//! A single linear pass: for each intent, count how many of its trigger words
//! occur as substrings of the lowercased sentence. Highest count wins, ties
//! go to the intent defined first, and a zero score everywhere falls back to
//! `Summary`.

use crate::lexicon::{product_phrase_matches, INTENT_KEYWORDS, PRODUCT_TYPE_MAP};
use serde::{Deserialize, Serialize};

/// The coarse category of question a query is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Summary,
    Client,
    Product,
    Production,
    MachineType,
    Planning,
    Date,
    Quantity,
    Color,
    Type,
    Factory,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Summary => "summary",
            Intent::Client => "client",
            Intent::Product => "product",
            Intent::Production => "production",
            Intent::MachineType => "machine_type",
            Intent::Planning => "planning",
            Intent::Date => "date",
            Intent::Quantity => "quantity",
            Intent::Color => "color",
            Intent::Type => "type",
            Intent::Factory => "factory",
        }
    }

    /// Classify a raw sentence. The input is lowercased internally. A
    /// concrete product name ("жилетка", "пуловер", ...) is a stronger
    /// signal than a generic trigger word, so it counts double toward the
    /// product intent.
    pub fn classify(message: &str) -> Intent {
        let message = message.to_lowercase();

        let mut best = Intent::Summary;
        let mut best_score = 0usize;

        for (intent, keywords) in INTENT_KEYWORDS {
            let mut score = keywords.iter().filter(|kw| message.contains(*kw)).count();
            if *intent == Intent::Product
                && PRODUCT_TYPE_MAP
                    .iter()
                    .any(|(phrase, _)| product_phrase_matches(&message, phrase))
            {
                score += 2;
            }
            if score > best_score {
                best = *intent;
                best_score = score;
            }
        }

        best
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
