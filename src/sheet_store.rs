//! Sheet loading and caching.
//!
//! Named worksheets are read from an xlsx workbook once per store lifetime,
//! converted to polars DataFrames, cleaned, and cached. The store is built
//! explicitly and handed to the pipeline; the operational layer can
//! `invalidate` a sheet or `reload` everything when the workbook changes on
//! disk.

use crate::error::{AssistError, Result};
use crate::lexicon::HEADER_MARKERS;
use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

/// Knitting plan sheet.
pub const SHEET_KNITTING: &str = "pletene";
/// Confection plan sheet.
pub const SHEET_CONFECTION: &str = "confekcia";
/// Per-fain order summary sheet.
pub const SHEET_SUMMARY: &str = "za pletene po fainove";

pub struct SheetStore {
    path: PathBuf,
    cache: RwLock<HashMap<String, DataFrame>>,
}

impl SheetStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Build a store from pre-loaded frames; used by tests and by callers
    /// that source sheets elsewhere. Frames still go through the cleaning
    /// pass on access.
    pub fn with_sheets(sheets: HashMap<String, DataFrame>) -> Self {
        let cleaned = sheets
            .into_iter()
            .map(|(name, df)| (name, clean_dataframe(df)))
            .collect();
        Self {
            path: PathBuf::new(),
            cache: RwLock::new(cleaned),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached sheet by name, loading and cleaning it on first access.
    /// Concurrent first accesses may both load; the duplicate work is
    /// idempotent and last write wins.
    pub fn get_sheet(&self, name: &str) -> Result<DataFrame> {
        if let Some(df) = self
            .cache
            .read()
            .map_err(|e| AssistError::Sheet(format!("sheet cache poisoned: {e}")))?
            .get(name)
        {
            return Ok(df.clone());
        }

        let df = clean_dataframe(self.load_sheet(name)?);
        debug!(sheet = name, rows = df.height(), "loaded sheet");

        let mut cache = self
            .cache
            .write()
            .map_err(|e| AssistError::Sheet(format!("sheet cache poisoned: {e}")))?;
        cache.insert(name.to_string(), df.clone());
        Ok(df)
    }

    /// Names of all sheets in the workbook.
    pub fn sheet_names(&self) -> Result<Vec<String>> {
        let workbook = self.open_workbook()?;
        Ok(workbook.sheet_names().to_owned())
    }

    /// Drop one sheet from the cache; the next access reloads it from disk.
    pub fn invalidate(&self, name: &str) {
        if let Ok(mut cache) = self.cache.write() {
            cache.remove(name);
        }
    }

    /// Drop the whole cache.
    pub fn reload(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    fn open_workbook(&self) -> Result<calamine::Sheets<std::io::BufReader<std::fs::File>>> {
        if !self.path.exists() {
            return Err(AssistError::SourceUnavailable {
                path: self.path.clone(),
            });
        }
        info!(path = %self.path.display(), "opening workbook");
        open_workbook_auto(&self.path)
            .map_err(|e| AssistError::Sheet(format!("cannot open workbook: {e}")))
    }

    fn load_sheet(&self, name: &str) -> Result<DataFrame> {
        let mut workbook = self.open_workbook()?;
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| AssistError::Sheet(format!("cannot read sheet '{name}': {e}")))?;
        range_to_dataframe(&range)
    }
}

/// Convert a worksheet cell range into a DataFrame: first row becomes the
/// column names, each column is sniffed as numeric when every non-empty cell
/// is numeric, string otherwise.
fn range_to_dataframe(range: &calamine::Range<Data>) -> Result<DataFrame> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let data_rows: Vec<&[Data]> = rows.collect();
    let ncols = header.len();

    let mut names: Vec<String> = Vec::with_capacity(ncols);
    for (idx, cell) in header.iter().enumerate() {
        let raw = match cell {
            Data::String(s) => s.trim().to_string(),
            Data::Empty => String::new(),
            other => other.to_string(),
        };
        let mut name = if raw.is_empty() {
            format!("column_{idx}")
        } else {
            raw
        };
        while names.contains(&name) {
            name = format!("{name}_{idx}");
        }
        names.push(name);
    }

    let mut series: Vec<Series> = Vec::with_capacity(ncols);
    for (idx, name) in names.iter().enumerate() {
        let cells: Vec<&Data> = data_rows
            .iter()
            .map(|row| row.get(idx).unwrap_or(&Data::Empty))
            .collect();

        let numeric = cells.iter().all(|cell| {
            matches!(
                cell,
                Data::Empty | Data::Float(_) | Data::Int(_)
            ) || matches!(cell, Data::String(s) if s.trim().is_empty())
        });

        if numeric {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Float(v) => Some(*v),
                    Data::Int(v) => Some(*v as f64),
                    _ => None,
                })
                .collect();
            series.push(Series::new(name, values));
        } else {
            let values: Vec<Option<String>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Empty => None,
                    Data::String(s) if s.trim().is_empty() => None,
                    Data::String(s) => Some(s.trim().to_string()),
                    other => Some(other.to_string()),
                })
                .collect();
            series.push(Series::new(name, values));
        }
    }

    Ok(DataFrame::new(series)?)
}

/// Cleaning pass over a freshly loaded sheet: promote a repeated header row
/// into the column names and normalize empty strings to missing values.
pub fn clean_dataframe(df: DataFrame) -> DataFrame {
    let mut df = normalize_empty_strings(df);

    if df.height() == 0 {
        return df;
    }

    // A header marker word in the first cell of the first data row means the
    // real headers ended up inside the data; promote that row.
    let first_cell = crate::columns::first_column(&df)
        .and_then(|name| crate::columns::cell_str(&df, &name, 0))
        .unwrap_or_default()
        .to_lowercase();

    if HEADER_MARKERS.iter().any(|m| first_cell.contains(m)) {
        let header: Vec<Option<String>> = df
            .get_column_names()
            .iter()
            .map(|name| crate::columns::cell_str(&df, name, 0))
            .collect();

        let old_names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        for (old, new) in old_names.iter().zip(header) {
            if let Some(new) = new {
                let new = new.trim();
                if !new.is_empty() && !df.get_column_names().contains(&new) {
                    let _ = df.rename(old, new);
                }
            }
        }

        df = df.slice(1, df.height().saturating_sub(1));
    }

    df
}

fn normalize_empty_strings(df: DataFrame) -> DataFrame {
    let columns: Vec<Series> = df
        .get_columns()
        .iter()
        .map(|series| {
            if series.dtype() == &DataType::String {
                if let Ok(ca) = series.str() {
                    let values: Vec<Option<String>> = ca
                        .into_iter()
                        .map(|v| {
                            v.and_then(|s| {
                                let s = s.trim();
                                if s.is_empty() {
                                    None
                                } else {
                                    Some(s.to_string())
                                }
                            })
                        })
                        .collect();
                    return Series::new(series.name(), values);
                }
            }
            series.clone()
        })
        .collect();

    DataFrame::new(columns).unwrap_or(df)
}
