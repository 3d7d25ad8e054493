use serde_json::Value;
use std::io;

use super::{text, SCHEDULE_COLUMNS};

/// Write output as CSV to stdout: schedule entries as installment rows,
/// verification reports as one verdict row per field.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Some(report) = value.get("report") {
        write_report_csv(&mut wtr, report);
    } else if let Some(entries) = value.get("entries").and_then(Value::as_array) {
        write_schedule_csv(&mut wtr, entries);
    } else {
        let _ = wtr.write_record([text(value)]);
    }

    let _ = wtr.flush();
}

fn write_schedule_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, entries: &[Value]) {
    let mut header = vec!["period"];
    header.extend(SCHEDULE_COLUMNS);
    let _ = wtr.write_record(&header);

    for (index, entry) in entries.iter().enumerate() {
        let mut row = vec![index.to_string()];
        row.extend(
            SCHEDULE_COLUMNS
                .iter()
                .map(|column| entry.get(*column).map(text).unwrap_or_default()),
        );
        let _ = wtr.write_record(&row);
    }
}

fn write_report_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, report: &Value) {
    let _ = wtr.write_record(["field", "passed", "mismatches"]);

    let count_ok = report.get("count_ok").and_then(Value::as_bool) == Some(true);
    let _ = wtr.write_record([
        "installmentCount".to_string(),
        count_ok.to_string(),
        String::new(),
    ]);

    if let Some(fields) = report.get("fields").and_then(Value::as_array) {
        for field_report in fields {
            let mismatch_count = field_report
                .get("mismatches")
                .and_then(Value::as_array)
                .map(|m| m.len())
                .unwrap_or(0);
            let _ = wtr.write_record([
                field_report.get("field").map(text).unwrap_or_default(),
                field_report.get("passed").map(text).unwrap_or_default(),
                mismatch_count.to_string(),
            ]);
        }
    }
}
