//! Heuristic column lookup and cell access over sheet DataFrames.
//!
//! The source workbook's headers vary across sheets and exports, so columns
//! are located by a two-stage heuristic instead of a fixed schema: first a
//! case-insensitive substring scan of the column names, then an optional
//! fixed-position guess. Both stages and their order are load-bearing; the
//! heuristic tolerates header renames but not header removal or reordering
//! beyond the fallback guess.

use polars::prelude::*;
use std::collections::BTreeSet;

/// Keywords plus an optional positional fallback for one lookup site.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub keywords: &'static [&'static str],
    pub fallback: Option<usize>,
}

impl ColumnSpec {
    pub fn resolve(&self, df: &DataFrame) -> Option<String> {
        resolve_column(df, self.keywords, self.fallback)
    }
}

/// Product kind column ("вид"), positionally column 5 in both plan sheets.
pub const PRODUCT_KIND: ColumnSpec = ColumnSpec {
    keywords: &["вид"],
    fallback: Some(5),
};

/// Factory/workshop column ("цех"), positionally column 3.
pub const FACTORY: ColumnSpec = ColumnSpec {
    keywords: &["цех"],
    fallback: Some(3),
};

/// Ordered quantity on the per-fain summary sheet, positionally column 1.
pub const SUMMARY_ORDERED: ColumnSpec = ColumnSpec {
    keywords: &["поръчки в бр."],
    fallback: Some(1),
};

/// Ordered quantity on the knitting sheet, positionally column 2.
pub const KNITTING_ORDERED: ColumnSpec = ColumnSpec {
    keywords: &["поръчка"],
    fallback: Some(2),
};

/// Per-model order quantity on the confection sheet. No positional guess:
/// summing an arbitrary column would silently corrupt totals.
pub const MODEL_ORDERED: ColumnSpec = ColumnSpec {
    keywords: &["поръчка"],
    fallback: None,
};

/// Model name column on the confection sheet.
pub const MODEL_NAME: ColumnSpec = ColumnSpec {
    keywords: &["модел"],
    fallback: None,
};

/// Machine fain column on the confection sheet.
pub const MODEL_FAIN: ColumnSpec = ColumnSpec {
    keywords: &["файн"],
    fallback: None,
};

/// Knitted-so-far quantity.
pub const KNITTED: ColumnSpec = ColumnSpec {
    keywords: &["изплетено до момента", "изплетено", "изработено"],
    fallback: None,
};

/// Confectioned-so-far quantity.
pub const CONFECTIONED: ColumnSpec = ColumnSpec {
    keywords: &["конфекционирано до момента", "конфекционирано"],
    fallback: None,
};

/// Remaining-to-knit quantity.
pub const FOR_KNITTING: ColumnSpec = ColumnSpec {
    keywords: &["остава за плетене"],
    fallback: None,
};

/// Remaining-to-confection quantity.
pub const FOR_CONFECTION: ColumnSpec = ColumnSpec {
    keywords: &["остава за конфекция"],
    fallback: None,
};

/// Two-stage column lookup: the first column whose name contains any keyword
/// (case-insensitive), else the column at `fallback`.
pub fn resolve_column(df: &DataFrame, keywords: &[&str], fallback: Option<usize>) -> Option<String> {
    let names = df.get_column_names();

    for name in &names {
        let lower = name.to_lowercase();
        if keywords.iter().any(|kw| lower.contains(&kw.to_lowercase())) {
            return Some(name.to_string());
        }
    }

    fallback
        .and_then(|idx| names.get(idx))
        .map(|name| name.to_string())
}

/// First column of a sheet; by convention the client name.
pub fn first_column(df: &DataFrame) -> Option<String> {
    df.get_column_names().first().map(|name| name.to_string())
}

/// Column name at a fixed position.
pub fn column_at(df: &DataFrame, idx: usize) -> Option<String> {
    df.get_column_names().get(idx).map(|name| name.to_string())
}

/// Sum a column as f64, treating missing values (and a missing column) as
/// zero. String columns are summed over their parseable cells so a sheet
/// that round-tripped through text still aggregates.
pub fn sum_column(df: &DataFrame, name: &str) -> f64 {
    let Ok(series) = df.column(name) else {
        return 0.0;
    };
    match series.dtype() {
        DataType::Float64 => series
            .f64()
            .map(|ca| ca.sum().unwrap_or(0.0))
            .unwrap_or(0.0),
        DataType::Int64 => series
            .i64()
            .map(|ca| ca.sum().unwrap_or(0) as f64)
            .unwrap_or(0.0),
        DataType::String => series
            .str()
            .map(|ca| {
                ca.into_iter()
                    .flatten()
                    .filter_map(|v| v.trim().parse::<f64>().ok())
                    .sum()
            })
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Numeric value of one cell, zero when missing or non-numeric.
pub fn cell_f64(df: &DataFrame, name: &str, row: usize) -> f64 {
    let Ok(series) = df.column(name) else {
        return 0.0;
    };
    match series.dtype() {
        DataType::Float64 => series
            .f64()
            .ok()
            .and_then(|ca| ca.get(row))
            .unwrap_or(0.0),
        DataType::Int64 => series
            .i64()
            .ok()
            .and_then(|ca| ca.get(row))
            .map(|v| v as f64)
            .unwrap_or(0.0),
        DataType::String => series
            .str()
            .ok()
            .and_then(|ca| ca.get(row))
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

/// String value of one cell; numeric cells are rendered, missing cells are
/// `None`.
pub fn cell_str(df: &DataFrame, name: &str, row: usize) -> Option<String> {
    let series = df.column(name).ok()?;
    match series.dtype() {
        DataType::String => series
            .str()
            .ok()
            .and_then(|ca| ca.get(row))
            .map(|v| v.to_string()),
        DataType::Float64 => series
            .f64()
            .ok()
            .and_then(|ca| ca.get(row))
            .map(crate::respond::fmt_qty),
        DataType::Int64 => series
            .i64()
            .ok()
            .and_then(|ca| ca.get(row))
            .map(|v| v.to_string()),
        _ => None,
    }
}

/// Distinct non-empty string values of a column, sorted.
pub fn distinct_strings(df: &DataFrame, name: &str) -> Vec<String> {
    let Ok(series) = df.column(name) else {
        return Vec::new();
    };
    let Ok(ca) = series.str() else {
        return Vec::new();
    };
    let set: BTreeSet<String> = ca
        .into_iter()
        .flatten()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .collect();
    set.into_iter().collect()
}

/// Rows where `name` equals `value`. A missing column yields an empty frame.
pub fn filter_eq(df: &DataFrame, name: &str, value: &str) -> PolarsResult<DataFrame> {
    let Ok(series) = df.column(name) else {
        return Ok(df.head(Some(0)));
    };
    let Ok(ca) = series.str() else {
        return Ok(df.head(Some(0)));
    };
    let mask: Vec<bool> = ca
        .into_iter()
        .map(|v| v.map(|x| x.trim() == value).unwrap_or(false))
        .collect();
    df.filter(&BooleanChunked::from_slice("mask", &mask))
}

/// Rows where the cell at column index `idx` is truthy: non-empty for
/// strings, non-zero for numbers. Spacer rows carry blanks or zeros there.
pub fn filter_present_at(df: &DataFrame, idx: usize) -> PolarsResult<DataFrame> {
    let Some(name) = column_at(df, idx) else {
        return Ok(df.clone());
    };
    let series = df.column(&name)?;
    let mask: Vec<bool> = match series.dtype() {
        DataType::String => series
            .str()?
            .into_iter()
            .map(|v| v.map(|x| !x.trim().is_empty()).unwrap_or(false))
            .collect(),
        DataType::Float64 => series
            .f64()?
            .into_iter()
            .map(|v| v.map(|x| x != 0.0).unwrap_or(false))
            .collect(),
        DataType::Int64 => series
            .i64()?
            .into_iter()
            .map(|v| v.map(|x| x != 0).unwrap_or(false))
            .collect(),
        _ => (0..series.len())
            .map(|i| !matches!(series.get(i), Ok(AnyValue::Null) | Err(_)))
            .collect(),
    };
    df.filter(&BooleanChunked::from_slice("mask", &mask))
}
