//! Query execution: dispatch on intent, filter and aggregate the plan sheets
//! into a structured result.
//!
//! Missing values sum as zero, rows without the grouping key stay out of
//! breakdowns, and an unresolvable column degrades its aggregate to zero
//! instead of failing the query.

use crate::columns;
use crate::error::Result;
use crate::extract::QueryParams;
use crate::intent::Intent;
use crate::lexicon::{self, MONTH_NAMES};
use crate::resolver::Resolver;
use crate::sheet_store::{SheetStore, SHEET_CONFECTION, SHEET_KNITTING, SHEET_SUMMARY};
use chrono::{Datelike, Local, NaiveDate};
use itertools::Itertools;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Per-month production split by stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRow {
    pub month: String,
    pub knitting: f64,
    pub confection: f64,
}

/// One production-plan row, keyed by model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRow {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub ordered: f64,
    pub knitted: f64,
    pub for_knitting: f64,
    pub confectioned: f64,
    pub for_confection: f64,
}

/// Aggregates for one product type within a client report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTypeRow {
    pub kind: String,
    pub ordered: f64,
    pub knitted: f64,
    pub confectioned: f64,
    pub monthly: Vec<MonthRow>,
}

/// Aggregates for one client within a product report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRow {
    pub name: String,
    pub ordered: f64,
    pub knitted: f64,
    pub confectioned: f64,
    pub monthly: Vec<MonthRow>,
}

/// Name + stage totals for the monthly summary breakdowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedStage {
    pub name: String,
    pub knitting: f64,
    pub confection: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientReport {
    pub client: String,
    pub total_ordered: f64,
    pub total_knitted: f64,
    pub total_confectioned: f64,
    pub for_knitting: f64,
    pub for_confection: f64,
    pub product_types: Vec<String>,
    pub monthly: Vec<MonthRow>,
    pub by_product_type: Vec<ProductTypeRow>,
    /// Populated when the query asked for all products.
    pub all_products: Vec<ModelRow>,
    /// Populated when the query named specific models.
    pub selected_products: Vec<ModelRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReport {
    pub product_type: String,
    pub total_ordered: f64,
    pub total_knitted: f64,
    pub total_confectioned: f64,
    pub clients: Vec<String>,
    pub monthly: Vec<MonthRow>,
    /// Sorted by knitted + confectioned, descending.
    pub by_client: Vec<ClientRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub month: u32,
    pub month_name: String,
    pub date_display: String,
    pub knitting_total: f64,
    pub confection_total: f64,
    /// Sorted by total, descending.
    pub clients: Vec<NamedStage>,
    /// Sorted by total, descending.
    pub product_types: Vec<NamedStage>,
}

/// Structured result of one query. `NotFound` is a normal outcome carrying a
/// user-facing explanation; source faults travel as `Err(AssistError)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum QueryOutcome {
    Client(ClientReport),
    Product(ProductReport),
    Monthly(MonthlyReport),
    NotFound { message: String },
}

pub struct Executor<'a> {
    store: &'a SheetStore,
    today: NaiveDate,
}

impl<'a> Executor<'a> {
    pub fn new(store: &'a SheetStore) -> Self {
        Self {
            store,
            today: Local::now().date_naive(),
        }
    }

    pub fn with_today(store: &'a SheetStore, today: NaiveDate) -> Self {
        Self { store, today }
    }

    pub fn execute(&self, intent: Intent, params: &QueryParams) -> Result<QueryOutcome> {
        debug!(%intent, "executing query");
        match intent {
            Intent::Client => match &params.client {
                Some(query) => self.client_report(
                    query,
                    params.all_products,
                    params.specific_products.as_deref(),
                ),
                None => Ok(QueryOutcome::NotFound {
                    message: "Не разпознах за кой клиент искате информация. Моля уточнете."
                        .to_string(),
                }),
            },
            Intent::Product => match &params.product_type {
                Some(query) => self.product_report(query),
                None => Ok(QueryOutcome::NotFound {
                    message: "Не разпознах за кой продукт искате информация. Моля уточнете."
                        .to_string(),
                }),
            },
            // Summary, planning and everything else fall back to the
            // month-scoped aggregate view.
            _ => self.monthly_report(params),
        }
    }

    fn client_report(
        &self,
        query: &str,
        all_products: bool,
        specific_products: Option<&[String]>,
    ) -> Result<QueryOutcome> {
        let resolver = Resolver::new(self.store);
        let Some(client) = resolver.match_client(query)? else {
            return Ok(QueryOutcome::NotFound {
                message: format!(
                    "Не намерих клиент, съответстващ на '{query}'. Опитайте с друго име."
                ),
            });
        };

        let knitting = self.store.get_sheet(SHEET_KNITTING)?;
        let confection = self.store.get_sheet(SHEET_CONFECTION)?;
        let summary = self.store.get_sheet(SHEET_SUMMARY)?;

        let client_knitting = filter_client_rows(&knitting, &client)?;
        let client_confection = filter_client_rows(&confection, &client)?;
        let client_summary = match columns::first_column(&summary) {
            Some(col) => columns::filter_eq(&summary, &col, &client)?,
            None => summary.head(Some(0)),
        };

        if client_knitting.height() == 0 && client_confection.height() == 0 {
            return Ok(QueryOutcome::NotFound {
                message: format!("Намерих клиент '{client}', но нямам данни за него."),
            });
        }

        let total_ordered = columns::SUMMARY_ORDERED
            .resolve(&summary)
            .map(|col| columns::sum_column(&client_summary, &col))
            .unwrap_or(0.0);

        let sum_confection = |spec: &columns::ColumnSpec| {
            spec.resolve(&confection)
                .map(|col| columns::sum_column(&client_confection, &col))
                .unwrap_or(0.0)
        };
        let total_knitted = sum_confection(&columns::KNITTED);
        let total_confectioned = sum_confection(&columns::CONFECTIONED);
        let for_knitting = sum_confection(&columns::FOR_KNITTING);
        let for_confection = sum_confection(&columns::FOR_CONFECTION);

        let kind_col_knitting = columns::PRODUCT_KIND.resolve(&knitting);
        let kind_col_confection = columns::PRODUCT_KIND.resolve(&confection);

        let mut kinds = BTreeSet::new();
        if let Some(col) = &kind_col_knitting {
            kinds.extend(columns::distinct_strings(&client_knitting, col));
        }
        if let Some(col) = &kind_col_confection {
            kinds.extend(columns::distinct_strings(&client_confection, col));
        }
        let product_types: Vec<String> = kinds.into_iter().collect();

        let mut by_product_type = Vec::new();
        for kind in &product_types {
            let rows_knitting = match &kind_col_knitting {
                Some(col) => columns::filter_eq(&client_knitting, col, kind)?,
                None => client_knitting.head(Some(0)),
            };
            let rows_confection = match &kind_col_confection {
                Some(col) => columns::filter_eq(&client_confection, col, kind)?,
                None => client_confection.head(Some(0)),
            };

            by_product_type.push(ProductTypeRow {
                kind: kind.clone(),
                ordered: columns::MODEL_ORDERED
                    .resolve(&confection)
                    .map(|col| columns::sum_column(&rows_confection, &col))
                    .unwrap_or(0.0),
                knitted: columns::KNITTED
                    .resolve(&confection)
                    .map(|col| columns::sum_column(&rows_confection, &col))
                    .unwrap_or(0.0),
                confectioned: columns::CONFECTIONED
                    .resolve(&confection)
                    .map(|col| columns::sum_column(&rows_confection, &col))
                    .unwrap_or(0.0),
                monthly: month_breakdown(&rows_knitting, &rows_confection),
            });
        }

        let all_rows = if all_products {
            model_rows(&client_confection, None)
        } else {
            Vec::new()
        };

        let selected_rows = match specific_products {
            Some(queries) if !all_products => {
                let models = resolver.match_product_models(queries, &client_confection);
                if models.is_empty() {
                    Vec::new()
                } else {
                    model_rows(&client_confection, Some(&models))
                }
            }
            _ => Vec::new(),
        };

        Ok(QueryOutcome::Client(ClientReport {
            client,
            total_ordered,
            total_knitted,
            total_confectioned,
            for_knitting,
            for_confection,
            product_types,
            monthly: month_breakdown(&client_knitting, &client_confection),
            by_product_type,
            all_products: all_rows,
            selected_products: selected_rows,
        }))
    }

    fn product_report(&self, query: &str) -> Result<QueryOutcome> {
        let resolver = Resolver::new(self.store);
        let Some(product_type) = resolver.match_product_type(query)? else {
            return Ok(QueryOutcome::NotFound {
                message: format!(
                    "Не намерих продукт, съответстващ на '{query}'. Опитайте с друг тип продукт."
                ),
            });
        };

        let knitting = self.store.get_sheet(SHEET_KNITTING)?;
        let confection = self.store.get_sheet(SHEET_CONFECTION)?;

        let rows_knitting = match columns::PRODUCT_KIND.resolve(&knitting) {
            Some(col) => columns::filter_eq(&knitting, &col, &product_type)?,
            None => knitting.head(Some(0)),
        };
        let rows_confection = match columns::PRODUCT_KIND.resolve(&confection) {
            Some(col) => columns::filter_eq(&confection, &col, &product_type)?,
            None => confection.head(Some(0)),
        };

        if rows_knitting.height() == 0 && rows_confection.height() == 0 {
            return Ok(QueryOutcome::NotFound {
                message: format!("Намерих продукт '{product_type}', но нямам данни за него."),
            });
        }

        let ordered_col = columns::KNITTING_ORDERED.resolve(&knitting);
        let knitted_col = columns::KNITTED.resolve(&knitting);
        let confectioned_col = columns::CONFECTIONED.resolve(&confection);

        let total_ordered = ordered_col
            .as_deref()
            .map(|col| columns::sum_column(&rows_knitting, col))
            .unwrap_or(0.0);
        let total_knitted = knitted_col
            .as_deref()
            .map(|col| columns::sum_column(&rows_knitting, col))
            .unwrap_or(0.0);
        let total_confectioned = confectioned_col
            .as_deref()
            .map(|col| columns::sum_column(&rows_confection, col))
            .unwrap_or(0.0);

        let mut client_names = BTreeSet::new();
        for df in [&rows_knitting, &rows_confection] {
            if let Some(col) = columns::first_column(df) {
                client_names.extend(columns::distinct_strings(df, &col));
            }
        }
        let clients: Vec<String> = client_names.into_iter().collect();

        let mut by_client = Vec::new();
        for client in &clients {
            let ck = match columns::first_column(&rows_knitting) {
                Some(col) => columns::filter_eq(&rows_knitting, &col, client)?,
                None => rows_knitting.head(Some(0)),
            };
            let cc = match columns::first_column(&rows_confection) {
                Some(col) => columns::filter_eq(&rows_confection, &col, client)?,
                None => rows_confection.head(Some(0)),
            };

            by_client.push(ClientRow {
                name: client.clone(),
                ordered: ordered_col
                    .as_deref()
                    .map(|col| columns::sum_column(&ck, col))
                    .unwrap_or(0.0),
                knitted: knitted_col
                    .as_deref()
                    .map(|col| columns::sum_column(&ck, col))
                    .unwrap_or(0.0),
                confectioned: confectioned_col
                    .as_deref()
                    .map(|col| columns::sum_column(&cc, col))
                    .unwrap_or(0.0),
                monthly: month_breakdown(&ck, &cc),
            });
        }
        let by_client: Vec<ClientRow> = by_client
            .into_iter()
            .sorted_by(|a, b| {
                (b.knitted + b.confectioned)
                    .partial_cmp(&(a.knitted + a.confectioned))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .collect();

        Ok(QueryOutcome::Product(ProductReport {
            product_type,
            total_ordered,
            total_knitted,
            total_confectioned,
            clients,
            monthly: month_breakdown(&rows_knitting, &rows_confection),
            by_client,
        }))
    }

    fn monthly_report(&self, params: &QueryParams) -> Result<QueryOutcome> {
        let month = params.month.unwrap_or_else(|| self.today.month());
        let month_name = lexicon::month_name(month).unwrap_or("неизвестен").to_string();

        let today_iso = self.today.format("%Y-%m-%d").to_string();
        let date_display = match &params.date {
            Some(date) if *date == today_iso => "днес".to_string(),
            Some(date) => date.clone(),
            None => month_name.clone(),
        };

        let knitting = self.store.get_sheet(SHEET_KNITTING)?;
        let confection = self.store.get_sheet(SHEET_CONFECTION)?;

        let month_col_knitting = columns::resolve_column(&knitting, &[&month_name], None);
        let month_col_confection = columns::resolve_column(&confection, &[&month_name], None);

        if month_col_knitting.is_none() && month_col_confection.is_none() {
            warn!(month = %month_name, "no month column in either sheet");
            return Ok(QueryOutcome::Monthly(MonthlyReport {
                month,
                month_name,
                date_display,
                knitting_total: 0.0,
                confection_total: 0.0,
                clients: Vec::new(),
                product_types: Vec::new(),
            }));
        }

        let knitting_total = month_col_knitting
            .as_deref()
            .map(|col| columns::sum_column(&knitting, col))
            .unwrap_or(0.0);
        let confection_total = month_col_confection
            .as_deref()
            .map(|col| columns::sum_column(&confection, col))
            .unwrap_or(0.0);

        let clients = self.named_stage_breakdown(
            &knitting,
            &confection,
            columns::first_column(&knitting),
            columns::first_column(&confection),
            month_col_knitting.as_deref(),
            month_col_confection.as_deref(),
        )?;

        let product_types = self.named_stage_breakdown(
            &knitting,
            &confection,
            columns::PRODUCT_KIND.resolve(&knitting),
            columns::PRODUCT_KIND.resolve(&confection),
            month_col_knitting.as_deref(),
            month_col_confection.as_deref(),
        )?;

        Ok(QueryOutcome::Monthly(MonthlyReport {
            month,
            month_name,
            date_display,
            knitting_total,
            confection_total,
            clients,
            product_types,
        }))
    }

    /// Group both sheets' month columns by a key column and sum per key,
    /// descending by combined total. Rows without the key are excluded.
    fn named_stage_breakdown(
        &self,
        knitting: &DataFrame,
        confection: &DataFrame,
        key_col_knitting: Option<String>,
        key_col_confection: Option<String>,
        month_col_knitting: Option<&str>,
        month_col_confection: Option<&str>,
    ) -> Result<Vec<NamedStage>> {
        let mut keys = BTreeSet::new();
        if let Some(col) = &key_col_knitting {
            keys.extend(
                columns::distinct_strings(knitting, col)
                    .into_iter()
                    .filter(|k| !lexicon::HEADER_MARKERS.contains(&k.to_lowercase().as_str())),
            );
        }
        if let Some(col) = &key_col_confection {
            keys.extend(
                columns::distinct_strings(confection, col)
                    .into_iter()
                    .filter(|k| !lexicon::HEADER_MARKERS.contains(&k.to_lowercase().as_str())),
            );
        }

        let mut rows = Vec::new();
        for key in keys {
            let knitting_qty = match (&key_col_knitting, month_col_knitting) {
                (Some(key_col), Some(month_col)) => {
                    let filtered = columns::filter_eq(knitting, key_col, &key)?;
                    columns::sum_column(&filtered, month_col)
                }
                _ => 0.0,
            };
            let confection_qty = match (&key_col_confection, month_col_confection) {
                (Some(key_col), Some(month_col)) => {
                    let filtered = columns::filter_eq(confection, key_col, &key)?;
                    columns::sum_column(&filtered, month_col)
                }
                _ => 0.0,
            };

            rows.push(NamedStage {
                name: key,
                knitting: knitting_qty,
                confection: confection_qty,
                total: knitting_qty + confection_qty,
            });
        }

        Ok(rows
            .into_iter()
            .sorted_by(|a, b| {
                b.total
                    .partial_cmp(&a.total)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .collect())
    }
}

/// Rows for a client: first column equals the client name and the second
/// column is truthy (blank or zero second cells mark spacer/summary rows).
fn filter_client_rows(df: &DataFrame, client: &str) -> Result<DataFrame> {
    let Some(col) = columns::first_column(df) else {
        return Ok(df.head(Some(0)));
    };
    let by_client = columns::filter_eq(df, &col, client)?;
    Ok(columns::filter_present_at(&by_client, 1)?)
}

/// Per-month stage sums over a pair of already-filtered sheets, months in
/// calendar order, zero months omitted.
fn month_breakdown(knitting: &DataFrame, confection: &DataFrame) -> Vec<MonthRow> {
    let mut rows = Vec::new();
    for (name, _) in MONTH_NAMES {
        let knitting_qty = columns::resolve_column(knitting, &[name], None)
            .map(|col| columns::sum_column(knitting, &col))
            .unwrap_or(0.0);
        let confection_qty = columns::resolve_column(confection, &[name], None)
            .map(|col| columns::sum_column(confection, &col))
            .unwrap_or(0.0);
        if knitting_qty > 0.0 || confection_qty > 0.0 {
            rows.push(MonthRow {
                month: name.to_string(),
                knitting: knitting_qty,
                confection: confection_qty,
            });
        }
    }
    rows
}

/// Flat per-model rows from (filtered) confection-sheet rows. With `only`,
/// keeps just the named models.
fn model_rows(df: &DataFrame, only: Option<&[String]>) -> Vec<ModelRow> {
    let Some(model_col) = columns::MODEL_NAME.resolve(df) else {
        return Vec::new();
    };
    let fain_col = columns::MODEL_FAIN.resolve(df);
    let kind_col = columns::PRODUCT_KIND.resolve(df);
    let ordered_col = columns::MODEL_ORDERED.resolve(df);
    let knitted_col = columns::KNITTED.resolve(df);
    let for_knitting_col = columns::FOR_KNITTING.resolve(df);
    let confectioned_col = columns::CONFECTIONED.resolve(df);
    let for_confection_col = columns::FOR_CONFECTION.resolve(df);

    let cell = |col: &Option<String>, row: usize| {
        col.as_deref()
            .map(|c| columns::cell_f64(df, c, row))
            .unwrap_or(0.0)
    };

    let mut rows = Vec::new();
    for row in 0..df.height() {
        let Some(model) = columns::cell_str(df, &model_col, row) else {
            continue;
        };
        if let Some(only) = only {
            if !only.iter().any(|m| *m == model) {
                continue;
            }
        }
        rows.push(ModelRow {
            model,
            fain: fain_col.as_deref().and_then(|c| columns::cell_str(df, c, row)),
            kind: kind_col.as_deref().and_then(|c| columns::cell_str(df, c, row)),
            ordered: cell(&ordered_col, row),
            knitted: cell(&knitted_col, row),
            for_knitting: cell(&for_knitting_col, row),
            confectioned: cell(&confectioned_col, row),
            for_confection: cell(&for_confection_col, row),
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use std::collections::HashMap;

    fn fixture_store() -> SheetStore {
        let knitting = df![
            "Фирма" => ["Lebek", "Lebek", "Matinique", "Zerbi"],
            "цех" => ["1", "1", "2", "3"],
            "поръчка" => [100.0, 50.0, 200.0, 80.0],
            "изплетено до момента в бр." => [60.0, 30.0, 150.0, 40.0],
            "друга" => ["", "", "", ""],
            "вид" => ["пуловер", "жилетка", "пуловер", "шал"],
            "март" => [20.0, 10.0, 70.0, 5.0],
            "април" => [40.0, 20.0, 80.0, 35.0]
        ]
        .unwrap();

        let confection = df![
            "Фирма" => ["Lebek", "Lebek", "Matinique", "Zerbi"],
            "Модел" => ["AB-123", "AB-124", "CD-55", "EF-9"],
            "файн" => ["12", "12", "7", "5"],
            "Поръчка" => [100.0, 50.0, 200.0, 80.0],
            "изплетено до момента в бр." => [60.0, 30.0, 150.0, 40.0],
            "остава за плетене в бр" => [40.0, 20.0, 50.0, 40.0],
            "конфекционирано до момента в бр." => [55.0, 25.0, 120.0, 30.0],
            "остава за конфекция в бр" => [45.0, 25.0, 80.0, 50.0],
            "вид" => ["пуловер", "жилетка", "пуловер", "шал"],
            "март" => [15.0, 5.0, 60.0, 4.0],
            "април" => [30.0, 15.0, 70.0, 20.0]
        ]
        .unwrap();

        let summary = df![
            "Фирма" => ["Lebek", "Matinique", "Zerbi"],
            "поръчки в бр." => [150.0, 200.0, 80.0]
        ]
        .unwrap();

        let mut sheets = HashMap::new();
        sheets.insert(SHEET_KNITTING.to_string(), knitting);
        sheets.insert(SHEET_CONFECTION.to_string(), confection);
        sheets.insert(SHEET_SUMMARY.to_string(), summary);
        SheetStore::with_sheets(sheets)
    }

    fn executor(store: &SheetStore) -> Executor<'_> {
        Executor::with_today(store, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap())
    }

    #[test]
    fn client_report_totals() {
        let store = fixture_store();
        let outcome = executor(&store)
            .execute(Intent::Client, &QueryParams {
                client: Some("lebek".to_string()),
                ..Default::default()
            })
            .unwrap();

        let QueryOutcome::Client(report) = outcome else {
            panic!("expected client report");
        };
        assert_eq!(report.client, "Lebek");
        assert_eq!(report.total_ordered, 150.0);
        assert_eq!(report.total_knitted, 90.0);
        assert_eq!(report.total_confectioned, 80.0);
        assert_eq!(report.for_knitting, 60.0);
        assert_eq!(report.for_confection, 70.0);
        assert_eq!(
            report.product_types,
            vec!["жилетка".to_string(), "пуловер".to_string()]
        );
        // March: knitting 20+10, confection 15+5.
        let march = report.monthly.iter().find(|m| m.month == "март").unwrap();
        assert_eq!(march.knitting, 30.0);
        assert_eq!(march.confection, 20.0);
    }

    #[test]
    fn unknown_client_is_not_found_outcome() {
        let store = fixture_store();
        let outcome = executor(&store)
            .execute(Intent::Client, &QueryParams {
                client: Some("Unknownimque".to_string()),
                ..Default::default()
            })
            .unwrap();

        match outcome {
            QueryOutcome::NotFound { message } => {
                assert!(message.contains("Unknownimque"), "{message}");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn client_intent_without_client_asks_for_clarification() {
        let store = fixture_store();
        let outcome = executor(&store)
            .execute(Intent::Client, &QueryParams::default())
            .unwrap();
        assert!(matches!(outcome, QueryOutcome::NotFound { .. }));
    }

    #[test]
    fn all_products_lists_models() {
        let store = fixture_store();
        let outcome = executor(&store)
            .execute(Intent::Client, &QueryParams {
                client: Some("lebek".to_string()),
                all_products: true,
                ..Default::default()
            })
            .unwrap();

        let QueryOutcome::Client(report) = outcome else {
            panic!("expected client report");
        };
        let models: Vec<&str> = report.all_products.iter().map(|m| m.model.as_str()).collect();
        assert_eq!(models, vec!["AB-123", "AB-124"]);
        assert_eq!(report.all_products[0].ordered, 100.0);
        assert_eq!(report.all_products[0].for_confection, 45.0);
    }

    #[test]
    fn specific_products_resolve_against_client_rows() {
        let store = fixture_store();
        let outcome = executor(&store)
            .execute(Intent::Client, &QueryParams {
                client: Some("lebek".to_string()),
                specific_products: Some(vec!["ab123".to_string()]),
                ..Default::default()
            })
            .unwrap();

        let QueryOutcome::Client(report) = outcome else {
            panic!("expected client report");
        };
        assert_eq!(report.selected_products.len(), 1);
        assert_eq!(report.selected_products[0].model, "AB-123");
        assert!(report.all_products.is_empty());
    }

    #[test]
    fn product_report_aggregates_across_clients() {
        let store = fixture_store();
        let outcome = executor(&store)
            .execute(Intent::Product, &QueryParams {
                product_type: Some("пуловер".to_string()),
                ..Default::default()
            })
            .unwrap();

        let QueryOutcome::Product(report) = outcome else {
            panic!("expected product report");
        };
        assert_eq!(report.product_type, "пуловер");
        assert_eq!(report.total_ordered, 300.0);
        assert_eq!(report.total_knitted, 210.0);
        assert_eq!(report.total_confectioned, 175.0);
        assert_eq!(
            report.clients,
            vec!["Lebek".to_string(), "Matinique".to_string()]
        );
        // Matinique produced more; it sorts first.
        assert_eq!(report.by_client[0].name, "Matinique");
        assert_eq!(report.by_client[1].name, "Lebek");
    }

    #[test]
    fn monthly_totals_equal_breakdown_sums() {
        let store = fixture_store();
        let outcome = executor(&store)
            .execute(Intent::Summary, &QueryParams {
                month: Some(3),
                ..Default::default()
            })
            .unwrap();

        let QueryOutcome::Monthly(report) = outcome else {
            panic!("expected monthly report");
        };
        assert_eq!(report.month_name, "март");
        assert_eq!(report.knitting_total, 105.0);
        assert_eq!(report.confection_total, 84.0);

        let client_knitting: f64 = report.clients.iter().map(|c| c.knitting).sum();
        let client_confection: f64 = report.clients.iter().map(|c| c.confection).sum();
        assert_eq!(client_knitting, report.knitting_total);
        assert_eq!(client_confection, report.confection_total);

        let kind_knitting: f64 = report.product_types.iter().map(|p| p.knitting).sum();
        assert_eq!(kind_knitting, report.knitting_total);

        // Sorted descending by total.
        for pair in report.clients.windows(2) {
            assert!(pair[0].total >= pair[1].total);
        }
    }

    #[test]
    fn missing_month_column_degrades_to_zero() {
        let store = fixture_store();
        let outcome = executor(&store)
            .execute(Intent::Summary, &QueryParams {
                month: Some(12),
                ..Default::default()
            })
            .unwrap();

        let QueryOutcome::Monthly(report) = outcome else {
            panic!("expected monthly report");
        };
        assert_eq!(report.knitting_total, 0.0);
        assert_eq!(report.confection_total, 0.0);
        assert!(report.clients.is_empty());
    }

    #[test]
    fn summary_defaults_to_current_month() {
        let store = fixture_store();
        let outcome = executor(&store)
            .execute(Intent::Summary, &QueryParams::default())
            .unwrap();

        let QueryOutcome::Monthly(report) = outcome else {
            panic!("expected monthly report");
        };
        // Executor pinned to 2025-03-15.
        assert_eq!(report.month, 3);
        assert_eq!(report.knitting_total, 105.0);
    }
}
