pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Columns of a schedule row, in display order. Shared by the table and CSV
/// formatters so the two never drift apart.
pub(crate) const SCHEDULE_COLUMNS: [&str; 6] = [
    "date",
    "borrowerPaymentAmount",
    "initialOutstandingPrincipal",
    "interest",
    "principal",
    "remainingOutstandingPrincipal",
];

/// Render a JSON leaf as plain text.
pub(crate) fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
