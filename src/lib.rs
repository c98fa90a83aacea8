//! Natural-language assistant over a knitwear production-plan workbook.
//!
//! The pipeline takes a free-text Bulgarian question, classifies its intent,
//! extracts query parameters (client, product type, dates, models), resolves
//! them fuzzily against the sheet contents, aggregates the plan sheets, and
//! renders a localized answer.

pub mod assistant;
pub mod columns;
pub mod error;
pub mod executor;
pub mod extract;
pub mod intent;
pub mod lexicon;
pub mod resolver;
pub mod respond;
pub mod sheet_store;

pub use assistant::{Assistant, QueryResponse};
pub use error::{AssistError, Result};
pub use executor::QueryOutcome;
pub use extract::QueryParams;
pub use intent::Intent;
pub use sheet_store::SheetStore;
