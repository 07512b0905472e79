//! Text and table output formatting.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{NOTHING, UTF8_FULL};
use comfy_table::{ContentArrangement, Table};

use kc_core::{CheckReport, Event};

/// Render a secret's timeline as a table.
///
/// Borders are drawn only for terminals; piped output gets bare columns.
pub fn history_table(events: &[Event], unicode: bool) -> String {
    let mut table = Table::new();
    if unicode {
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS);
    } else {
        table.load_preset(NOTHING);
    }
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time (UTC)", "Operation"]);

    for event in events {
        table.add_row(vec![
            event.ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            event.op.to_string(),
        ]);
    }
    table.to_string()
}

/// Human-readable lines for a check report.
pub fn check_lines(report: &CheckReport) -> Vec<String> {
    let verdict = if report.is_healthy() { "OK" } else { "FAILED" };
    let mut lines = vec![
        format!("Integrity check: {}", verdict),
        format!("- events: {}", report.events),
        format!("- skipped lines: {}", report.skipped_lines),
        format!("- live secrets: {}", report.live),
    ];
    for id in &report.undecryptable {
        lines.push(format!("- does not decrypt: {}", id));
    }
    lines
}
