use rusqlite::Connection;
use serde::Serialize;

use super::DecisionRecord;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct ExportEntry {
    id: i64,
    timestamp: String,
    url: String,
    decision: String,
    reason: String,
}

impl From<&DecisionRecord> for ExportEntry {
    fn from(record: &DecisionRecord) -> Self {
        ExportEntry {
            id: record.id.unwrap_or(0),
            timestamp: record.timestamp.clone(),
            url: record.url.clone(),
            decision: record.decision.clone(),
            reason: record.reason.clone(),
        }
    }
}

/// Export all decision records as a JSON string.
pub fn export_json(conn: &Connection) -> Result<String> {
    let records = super::query_recent(conn, usize::MAX)?;
    let entries: Vec<ExportEntry> = records.iter().map(ExportEntry::from).collect();
    let json = serde_json::to_string_pretty(&entries)?;
    Ok(json)
}

/// Export all decision records as a CSV string.
pub fn export_csv(conn: &Connection) -> Result<String> {
    let records = super::query_recent(conn, usize::MAX)?;
    let mut output = String::from("id,timestamp,url,decision,reason\n");
    for record in &records {
        output.push_str(&format!(
            "{},{},{},{},{}\n",
            record.id.unwrap_or(0),
            record.timestamp,
            record.url,
            record.decision,
            record.reason,
        ));
    }
    Ok(output)
}
