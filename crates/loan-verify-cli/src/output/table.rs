use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{text, SCHEDULE_COLUMNS};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    if let Some(report) = value.get("report") {
        print_verification(value, report);
    } else if let Some(entries) = value.get("entries").and_then(Value::as_array) {
        print_schedule(entries);
    } else {
        println!("{}", value);
    }
}

/// One row per installment, columns in wire order.
fn print_schedule(entries: &[Value]) {
    let mut builder = Builder::default();
    let mut header = vec!["#".to_string()];
    header.extend(SCHEDULE_COLUMNS.iter().map(|c| c.to_string()));
    builder.push_record(header);

    for (index, entry) in entries.iter().enumerate() {
        let mut row = vec![index.to_string()];
        row.extend(
            SCHEDULE_COLUMNS
                .iter()
                .map(|column| entry.get(*column).map(text).unwrap_or_default()),
        );
        builder.push_record(row);
    }

    println!("{}", Table::from(builder));
}

fn print_verification(value: &Value, report: &Value) {
    let duration = report.get("duration").map(text).unwrap_or_default();
    let expected_count = report.get("expected_count").map(text).unwrap_or_default();
    let actual_count = report.get("actual_count").map(text).unwrap_or_default();

    if report.get("count_ok").and_then(Value::as_bool) != Some(true) {
        println!(
            "Count check FAILED: computed {} installments for a duration of {} \
             (service sent {}); field checks skipped",
            expected_count, duration, actual_count
        );
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["field", "result", "detail"]);
    if let Some(fields) = report.get("fields").and_then(Value::as_array) {
        for field_report in fields {
            let field = field_report.get("field").map(text).unwrap_or_default();
            let passed = field_report.get("passed").and_then(Value::as_bool) == Some(true);
            let detail = if passed {
                String::new()
            } else {
                first_mismatch(field_report)
            };
            let result = if passed { "pass" } else { "FAIL" };
            builder.push_record([field.as_str(), result, detail.as_str()]);
        }
    }
    println!("{}", Table::from(builder));

    let verdict = if value.get("passed").and_then(Value::as_bool) == Some(true) {
        "PASSED"
    } else {
        "FAILED"
    };
    println!(
        "\nVerification {} ({} installments, annuity {})",
        verdict,
        duration,
        value.get("annuity").map(text).unwrap_or_default()
    );
}

fn first_mismatch(field_report: &Value) -> String {
    let mismatches = match field_report.get("mismatches").and_then(Value::as_array) {
        Some(m) if !m.is_empty() => m,
        _ => return String::new(),
    };
    let first = &mismatches[0];
    let rendered = format!(
        "index {}: expected {}, got {}",
        first.get("index").map(text).unwrap_or_default(),
        first
            .get("expected")
            .map(text)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "(missing)".into()),
        first
            .get("actual")
            .map(text)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "(missing)".into()),
    );
    if mismatches.len() > 1 {
        format!("{} (+{} more)", rendered, mismatches.len() - 1)
    } else {
        rendered
    }
}
