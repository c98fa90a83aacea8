//! Pipeline facade: one entry point that takes a free-text question and
//! returns a structured, renderable answer.
//!
//! Classification and extraction never fail; execution can. A query that
//! resolves to nothing is still a successful response carrying an
//! explanation, while a broken or missing workbook surfaces as
//! `success: false` with the error folded into the message.

use crate::error::AssistError;
use crate::executor::{Executor, QueryOutcome};
use crate::extract::{Extractor, QueryParams};
use crate::intent::Intent;
use crate::respond;
use crate::sheet_store::SheetStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info};

/// Full answer to one question, including the intermediate pipeline stages
/// for callers that want more than the rendered message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<QueryParams>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<QueryOutcome>,
}

pub struct Assistant {
    store: SheetStore,
    today: Option<NaiveDate>,
}

impl Assistant {
    /// Assistant over a production-plan workbook on disk. The workbook is
    /// not opened here; a missing file shows up on the first query.
    pub fn new<P: AsRef<Path>>(workbook: P) -> Self {
        Self {
            store: SheetStore::new(workbook.as_ref()),
            today: None,
        }
    }

    /// Assistant over an already-built store; lets tests seed sheets
    /// directly.
    pub fn with_store(store: SheetStore) -> Self {
        Self { store, today: None }
    }

    /// Pin "today" for date extraction and month defaults.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn store(&self) -> &SheetStore {
        &self.store
    }

    /// Answer one question: classify, extract, execute, render.
    pub fn resolve_query(&self, text: &str) -> QueryResponse {
        let intent = Intent::classify(text);
        let extractor = match self.today {
            Some(today) => Extractor::with_today(today),
            None => Extractor::new(),
        };
        let params = extractor.extract(text);
        info!(%intent, ?params, "resolving query");

        let executor = match self.today {
            Some(today) => Executor::with_today(&self.store, today),
            None => Executor::new(&self.store),
        };

        match executor.execute(intent, &params) {
            Ok(outcome) => QueryResponse {
                success: true,
                message: respond::render(&outcome),
                intent: Some(intent),
                params: Some(params),
                result: Some(outcome),
            },
            Err(err) => {
                error!(%err, "query execution failed");
                QueryResponse {
                    success: false,
                    message: describe_error(&err),
                    intent: Some(intent),
                    params: Some(params),
                    result: None,
                }
            }
        }
    }
}

fn describe_error(err: &AssistError) -> String {
    match err {
        AssistError::SourceUnavailable { .. } | AssistError::Sheet(_) => {
            format!("Грешка при зареждане на производствения план: {err}")
        }
        _ => format!("Възникна грешка при обработката: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_workbook_fails_gracefully() {
        let assistant = Assistant::new("/no/such/plan.xlsx");
        let response = assistant.resolve_query("колко поръчки има клиент Lebek");

        assert!(!response.success);
        assert_eq!(response.intent, Some(Intent::Client));
        assert!(response
            .message
            .starts_with("Грешка при зареждане на производствения план:"));
        assert!(response.result.is_none());
    }
}
