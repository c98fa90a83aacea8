//! Fuzzy resolution of free-text entity mentions against the names actually
//! present in the sheets.
//!
//! One algorithm, three call sites: exact case-insensitive match first, then
//! substring containment in either direction, scored by a length ratio and
//! ranked by closeness of that ratio to 1.0. Client/product-type resolution
//! scores `candidate_len / query_len` and returns the single best candidate;
//! product-model resolution scores `query_len / candidate_len` and keeps
//! every candidate above a fixed threshold, because one query can name many
//! models. The inverted formulas are deliberate, preserved per call site
//! until the intended ranking is confirmed.

use crate::columns;
use crate::error::Result;
use crate::lexicon::{clean_for_match, HEADER_MARKERS};
use crate::sheet_store::{SheetStore, SHEET_CONFECTION, SHEET_KNITTING, SHEET_SUMMARY};
use polars::prelude::DataFrame;
use std::collections::BTreeSet;
use tracing::debug;

/// Minimum length-ratio score for a product-model candidate to be kept.
const MODEL_SCORE_THRESHOLD: f64 = 0.1;

pub struct Resolver<'a> {
    store: &'a SheetStore,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a SheetStore) -> Self {
        Self { store }
    }

    /// All client names known to the summary sheet, sorted, header noise
    /// excluded. Sorted order is load-bearing: it is the tie-break when two
    /// candidates score the same ratio distance.
    pub fn client_list(&self) -> Result<Vec<String>> {
        let summary = self.store.get_sheet(SHEET_SUMMARY)?;
        let Some(client_col) = columns::first_column(&summary) else {
            return Ok(Vec::new());
        };
        Ok(columns::distinct_strings(&summary, &client_col)
            .into_iter()
            .filter(|c| !HEADER_MARKERS.contains(&c.to_lowercase().as_str()))
            .collect())
    }

    /// All product types across the knitting and confection sheets.
    pub fn product_types(&self) -> Result<Vec<String>> {
        let mut types = BTreeSet::new();
        for sheet in [SHEET_KNITTING, SHEET_CONFECTION] {
            let df = self.store.get_sheet(sheet)?;
            if let Some(col) = columns::PRODUCT_KIND.resolve(&df) {
                types.extend(columns::distinct_strings(&df, &col));
            }
        }
        Ok(types.into_iter().collect())
    }

    /// All factories/workshops across the knitting and confection sheets.
    pub fn factory_list(&self) -> Result<Vec<String>> {
        let mut factories = BTreeSet::new();
        for sheet in [SHEET_KNITTING, SHEET_CONFECTION] {
            let df = self.store.get_sheet(sheet)?;
            if let Some(col) = columns::FACTORY.resolve(&df) {
                factories.extend(columns::distinct_strings(&df, &col));
            }
        }
        Ok(factories.into_iter().collect())
    }

    /// Best-matching real client name for a query, `None` when nothing
    /// matches. Absence is a user-facing "no match", not an error.
    pub fn match_client(&self, query: &str) -> Result<Option<String>> {
        Ok(best_ratio_match(query, &self.client_list()?))
    }

    /// Best-matching product type for a query.
    pub fn match_product_type(&self, query: &str) -> Result<Option<String>> {
        Ok(best_ratio_match(query, &self.product_types()?))
    }

    /// Product models from the client's own rows matching any of the query
    /// tokens. Returns every candidate above the threshold, not just the
    /// best, since a query can reference several models.
    pub fn match_product_models(&self, queries: &[String], client_rows: &DataFrame) -> Vec<String> {
        let Some(model_col) = columns::MODEL_NAME.resolve(client_rows) else {
            return Vec::new();
        };

        let candidates: Vec<String> = (0..client_rows.height())
            .filter_map(|row| columns::cell_str(client_rows, &model_col, row))
            .collect();

        let mut selected = Vec::new();
        for query in queries {
            let query = query.to_lowercase();
            if query.is_empty() {
                continue;
            }

            for candidate in &candidates {
                let cleaned = clean_for_match(candidate);
                if cleaned == query {
                    push_unique(&mut selected, candidate);
                    continue;
                }
                if cleaned.is_empty() {
                    continue;
                }
                if cleaned.contains(&query) || query.contains(&cleaned) {
                    let score = query.chars().count() as f64 / cleaned.chars().count() as f64;
                    debug!(%candidate, score, "model candidate");
                    if score > MODEL_SCORE_THRESHOLD {
                        push_unique(&mut selected, candidate);
                    }
                }
            }
        }

        selected
    }
}

/// Shared client/product-type match: exact case-insensitive first, then
/// containment either way scored by `candidate_len / query_len`, ranked by
/// distance of the score from 1.0.
fn best_ratio_match(query: &str, candidates: &[String]) -> Option<String> {
    let query = query.to_lowercase();
    if query.is_empty() {
        return None;
    }

    for candidate in candidates {
        if candidate.to_lowercase() == query {
            return Some(candidate.clone());
        }
    }

    let query_len = query.chars().count() as f64;
    let mut matches: Vec<(&String, f64)> = candidates
        .iter()
        .filter(|candidate| {
            let lower = candidate.to_lowercase();
            lower.contains(&query) || query.contains(&lower)
        })
        .map(|candidate| {
            let score = candidate.chars().count() as f64 / query_len;
            (candidate, score)
        })
        .collect();

    matches.sort_by(|a, b| {
        (a.1 - 1.0)
            .abs()
            .partial_cmp(&(b.1 - 1.0).abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    matches.first().map(|(candidate, _)| (*candidate).clone())
}

fn push_unique(selected: &mut Vec<String>, value: &str) {
    if !selected.iter().any(|v| v == value) {
        selected.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use std::collections::HashMap;

    fn candidates(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn seeded_store() -> SheetStore {
        let plan = df![
            "Фирма" => ["Zerbi", "Lebek", "Zerbi"],
            "цех" => ["3", "1", "3"],
            "поръчка" => [80.0, 100.0, 20.0],
            "друга" => ["x", "y", "z"],
            "пета" => ["a", "b", "c"],
            "вид" => ["шал", "пуловер", "шал"]
        ]
        .unwrap();
        // A stray header row sits mid-data, as happens in real exports.
        let summary = df![
            "Фирма" => ["Zerbi", "Фирма", "Lebek", "Zerbi"],
            "поръчки в бр." => [80.0, 0.0, 100.0, 20.0]
        ]
        .unwrap();

        let mut sheets = HashMap::new();
        sheets.insert(SHEET_KNITTING.to_string(), plan.clone());
        sheets.insert(SHEET_CONFECTION.to_string(), plan);
        sheets.insert(SHEET_SUMMARY.to_string(), summary);
        SheetStore::with_sheets(sheets)
    }

    #[test]
    fn client_list_is_sorted_and_drops_header_noise() {
        let store = seeded_store();
        let resolver = Resolver::new(&store);
        // Zerbi appears first in the sheet but sorts after Lebek.
        assert_eq!(
            resolver.client_list().unwrap(),
            vec!["Lebek".to_string(), "Zerbi".to_string()]
        );
    }

    #[test]
    fn product_types_and_factories_from_both_sheets() {
        let store = seeded_store();
        let resolver = Resolver::new(&store);
        assert_eq!(
            resolver.product_types().unwrap(),
            vec!["пуловер".to_string(), "шал".to_string()]
        );
        assert_eq!(
            resolver.factory_list().unwrap(),
            vec!["1".to_string(), "3".to_string()]
        );
    }

    #[test]
    fn exact_match_is_idempotent() {
        // An exact candidate wins no matter what near-names sit beside it.
        let list = candidates(&["Lebek", "Lebek GmbH", "Lebek International"]);
        assert_eq!(best_ratio_match("lebek", &list).as_deref(), Some("Lebek"));
        assert_eq!(best_ratio_match("Lebek", &list).as_deref(), Some("Lebek"));
    }

    #[test]
    fn containment_ranked_by_length_ratio() {
        let list = candidates(&["Matinique Denmark", "Matinique"]);
        // "matiniq" is contained in both; the shorter candidate's ratio is
        // closer to 1.0.
        assert_eq!(
            best_ratio_match("matiniq", &list).as_deref(),
            Some("Matinique")
        );
    }

    #[test]
    fn no_candidate_no_match() {
        let list = candidates(&["Lebek", "Matinique"]);
        assert_eq!(best_ratio_match("Unknownimque", &list), None);
        assert_eq!(best_ratio_match("", &list), None);
        assert_eq!(best_ratio_match("lebek", &[]), None);
    }

    #[test]
    fn model_matching_keeps_all_above_threshold() {
        let rows = df![
            "Модел" => ["AB-123", "AB-124", "XY-900"],
            "Поръчка" => [10.0, 20.0, 30.0]
        ]
        .unwrap();
        let store = SheetStore::with_sheets(Default::default());
        let resolver = Resolver::new(&store);

        // "ab12" is contained in both cleaned AB models; both survive.
        let found = resolver.match_product_models(&["ab12".to_string()], &rows);
        assert_eq!(found, vec!["AB-123".to_string(), "AB-124".to_string()]);
    }

    #[test]
    fn model_exact_match_after_cleaning() {
        let rows = df!["Модел" => ["AB-123", "XY-900"]].unwrap();
        let store = SheetStore::with_sheets(Default::default());
        let resolver = Resolver::new(&store);

        let found = resolver.match_product_models(&["ab123".to_string()], &rows);
        assert_eq!(found, vec!["AB-123".to_string()]);
    }

    #[test]
    fn model_matching_without_model_column_is_empty() {
        let rows = df!["друго" => ["x"]].unwrap();
        let store = SheetStore::with_sheets(Default::default());
        let resolver = Resolver::new(&store);
        assert!(resolver
            .match_product_models(&["ab".to_string()], &rows)
            .is_empty());
    }
}
