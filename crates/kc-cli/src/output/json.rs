//! JSON output formatting.

use chrono::SecondsFormat;

use kc_core::{CheckReport, Event};

/// Identifiers as a JSON array of strings.
pub fn ids_json(ids: &[String]) -> serde_json::Value {
    serde_json::json!(ids)
}

/// Timeline of one secret. Encrypted values are never included.
pub fn history_json(events: &[Event]) -> serde_json::Value {
    let items: Vec<serde_json::Value> = events
        .iter()
        .map(|event| {
            serde_json::json!({
                "ts": event.ts.to_rfc3339_opts(SecondsFormat::Millis, true),
                "op": event.op,
                "id": event.id(),
            })
        })
        .collect();
    serde_json::Value::Array(items)
}

/// Check report as a JSON object, with an overall verdict.
pub fn check_json(report: &CheckReport) -> serde_json::Value {
    serde_json::json!({
        "ok": report.is_healthy(),
        "events": report.events,
        "skipped_lines": report.skipped_lines,
        "live": report.live,
        "undecryptable": report.undecryptable,
    })
}
