//! Entity extraction: structured parameters out of a raw Bulgarian sentence.
//!
//! An ordered sequence of independent rules; each rule may populate one
//! `QueryParams` field and none of them short-circuits the others. A rule
//! that finds nothing leaves its field unset.

use crate::lexicon::{
    product_phrase_matches, COMMON_CLIENTS, MONTH_NAMES, ORDINAL_DAY_WORDS_BY_LENGTH,
    PRODUCT_TYPE_MAP, PUNCT_CHARS,
};
use chrono::{Datelike, Duration, Local, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

lazy_static! {
    static ref CLIENT_RE: Regex = Regex::new(r"(?:клиент|фирма|марка)\s+(\w+)").unwrap();
    static ref ALL_PRODUCTS_RE: Regex = Regex::new(r"(?:всички)\s+(\w+)").unwrap();
    static ref SPECIFIC_PRODUCTS_RE: Regex =
        Regex::new(r"(?:номер|модел|модели|поръчка|поръчки)\s+(.*)").unwrap();
    static ref THIS_MONTH_RE: Regex =
        Regex::new(r"(?:този|текущия|настоящия|сегашния)\s+месец").unwrap();
    static ref FACTORY_RE: Regex = Regex::new(r"(?:цех|етаж)\s+(\w+|\d+(?:-ти)?)").unwrap();
}

/// Structured output of extraction. Fields are independent and optional;
/// several can be populated by one sentence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub all_products: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific_products: Option<Vec<String>>,
    /// ISO `%Y-%m-%d`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory: Option<String>,
}

/// Runs the extraction rules against a sentence. The reference date is
/// injectable so relative-date rules stay deterministic under test.
pub struct Extractor {
    today: NaiveDate,
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            today: Local::now().date_naive(),
        }
    }
}

impl Extractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_today(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn extract(&self, message: &str) -> QueryParams {
        let message = message.to_lowercase();
        let mut params = QueryParams::default();

        // 1. Client: marker word followed by a name, else known fragments.
        let client_match = CLIENT_RE.captures(&message);
        if let Some(caps) = &client_match {
            params.client = Some(caps[1].to_string());
        } else if ["клиент", "фирма", "марка"]
            .iter()
            .any(|marker| message.contains(marker))
        {
            params.client = COMMON_CLIENTS
                .iter()
                .find(|c| message.contains(*c))
                .map(|c| c.to_string());
        }

        // 2. Product type: first phrase contained in the sentence wins.
        for (phrase, code) in PRODUCT_TYPE_MAP {
            if product_phrase_matches(&message, phrase) {
                params.product_type = Some(code.to_string());
                break;
            }
        }

        // 3. "All products" flag.
        let all_products_match = ALL_PRODUCTS_RE.is_match(&message);
        if all_products_match {
            params.all_products = true;
        }

        // 4. Specific products: only with an explicitly named client and
        //    without the all-products flag.
        if let Some(caps) = SPECIFIC_PRODUCTS_RE.captures(&message) {
            if client_match.is_some() && !all_products_match {
                let products: Vec<String> = caps[1]
                    .split_whitespace()
                    .map(|token| token.chars().filter(|c| !PUNCT_CHARS.contains(c)).collect())
                    .filter(|token: &String| !token.is_empty())
                    .collect();
                if !products.is_empty() {
                    params.specific_products = Some(products);
                }
            }
        }

        // 5. Month: "this month" phrase first, then literal month names.
        if THIS_MONTH_RE.is_match(&message) {
            params.month = Some(self.today.month());
            params.month_name = crate::lexicon::month_name(self.today.month()).map(String::from);
        } else {
            for (name, num) in MONTH_NAMES {
                if message.contains(name) {
                    params.month = Some(*num);
                    params.month_name = Some(name.to_string());
                    break;
                }
            }
        }

        // 6. Relative dates, fixed order. "вчера" is a substring of
        //    "завчера", so the latter is effectively shadowed; the order is
        //    pinned behavior, not an accident to fix here.
        if message.contains("днес") {
            params.date = Some(self.today.format("%Y-%m-%d").to_string());
        } else if message.contains("утре") {
            params.date = Some((self.today + Duration::days(1)).format("%Y-%m-%d").to_string());
        } else if message.contains("вчера") {
            params.date = Some((self.today - Duration::days(1)).format("%Y-%m-%d").to_string());
        } else if message.contains("завчера") {
            params.date = Some((self.today - Duration::days(2)).format("%Y-%m-%d").to_string());
        }

        // 7. Ordinal day words, longest spelling first. Invalid day/month
        //    combinations are dropped silently.
        let day_num = ORDINAL_DAY_WORDS_BY_LENGTH
            .iter()
            .find(|(word, _)| message.contains(word))
            .map(|(_, num)| *num);
        if let Some(day) = day_num {
            let month = params.month.unwrap_or_else(|| self.today.month());
            params.month.get_or_insert(month);
            if let Some(date) = NaiveDate::from_ymd_opt(self.today.year(), month, day) {
                params.date = Some(date.format("%Y-%m-%d").to_string());
            }
        }

        // 8. Factory / workshop.
        if let Some(caps) = FACTORY_RE.captures(&message) {
            params.factory = Some(caps[1].to_string());
        }

        debug!(?params, "extracted query parameters");
        params
    }
}
