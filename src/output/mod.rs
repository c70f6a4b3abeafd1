use std::collections::BTreeMap;
use std::path::Path;

use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::history::HistoryEntry;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("failed to read results file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse results file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("results file {path} holds neither a results list nor an array")]
    Shape { path: String },
}

/// Hit counts per status code. Keys are compared as strings, so "30" sorts
/// before "200".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub counts: BTreeMap<String, u64>,
    pub total: u64,
}

impl ResultSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for record in records {
            *counts.entry(record_status(record)).or_insert(0) += 1;
        }
        let total = counts.values().sum();
        Self { counts, total }
    }
}

fn status_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Reads `status`, then `status_code`; anything else tallies under "".
fn record_status(record: &Value) -> String {
    record
        .get("status")
        .or_else(|| record.get("status_code"))
        .and_then(status_text)
        .unwrap_or_default()
}

/// Tallies the records of an ffuf JSON report by status code.
///
/// Accepts `{"results": [...]}` as well as a bare array of records.
pub fn summarize(path: &Path) -> Result<ResultSummary, SummaryError> {
    let shown = path.display().to_string();
    let raw = std::fs::read(path).map_err(|source| SummaryError::Read {
        path: shown.clone(),
        source,
    })?;
    let data: Value = serde_json::from_slice(&raw).map_err(|source| SummaryError::Parse {
        path: shown.clone(),
        source,
    })?;

    let records = match &data {
        Value::Object(map) => match map.get("results") {
            Some(Value::Array(items)) => items,
            _ => return Err(SummaryError::Shape { path: shown }),
        },
        Value::Array(items) => {
            debug!(path = %shown, "results file is a bare array");
            items
        }
        _ => return Err(SummaryError::Shape { path: shown }),
    };

    Ok(ResultSummary::from_records(records))
}

pub fn render_summary(summary: &ResultSummary) -> String {
    let width = summary
        .counts
        .keys()
        .map(|k| k.len())
        .max()
        .unwrap_or(0)
        .max("Status Code".len());
    let mut out = String::new();
    out.push_str(&format!("{}\n", "FFUF Results Summary".bold()));
    out.push_str(&format!("{:<width$}  {:>6}\n", "Status Code", "Hits"));
    for (code, hits) in &summary.counts {
        let label = format!("{code:<width$}");
        let label = match code.chars().next() {
            Some('2') => label.green(),
            Some('3') => label.cyan(),
            Some('4') => label.yellow(),
            Some('5') => label.red(),
            _ => label.normal(),
        };
        out.push_str(&format!("{label}  {hits:>6}\n"));
    }
    out.push_str(&format!("{:<width$}  {:>6}\n", "Total", summary.total));
    out
}

pub fn render_history(entries: &[HistoryEntry]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Scan History".bold()));
    out.push_str(&format!(
        "{:>3}  {:<26}  {:<30}  {:>10}\n",
        "#", "Timestamp", "Scan Type", "Total Hits"
    ));
    for (idx, entry) in entries.iter().enumerate() {
        let total = entry.summary.as_ref().map(|s| s.total).unwrap_or(0);
        out.push_str(&format!(
            "{:>3}  {:<26}  {:<30}  {:>10}\n",
            idx + 1,
            entry.timestamp,
            entry.scan_type,
            total
        ));
    }
    out
}
