use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistError {
    #[error("Workbook not found: {}", .path.display())]
    SourceUnavailable { path: PathBuf },

    #[error("Sheet error: {0}")]
    Sheet(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

pub type Result<T> = std::result::Result<T, AssistError>;
