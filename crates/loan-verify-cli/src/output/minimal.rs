use serde_json::Value;

use super::text;

/// Print just the key answer: the verdict for a verification, the periodic
/// payment for a schedule.
pub fn print_minimal(value: &Value) {
    if let Some(passed) = value.get("passed").and_then(Value::as_bool) {
        if passed {
            println!("passed");
        } else {
            println!("failed: {}", failing_summary(value));
        }
        return;
    }

    if let Some(first) = value
        .get("entries")
        .and_then(Value::as_array)
        .and_then(|entries| entries.first())
    {
        if let Some(payment) = first.get("borrowerPaymentAmount") {
            println!("{}", text(payment));
            return;
        }
    }

    println!("{}", text(value));
}

fn failing_summary(value: &Value) -> String {
    let report = match value.get("report") {
        Some(r) => r,
        None => return "no report".into(),
    };
    if report.get("count_ok").and_then(Value::as_bool) != Some(true) {
        return "installment count".into();
    }

    let failing: Vec<String> = report
        .get("fields")
        .and_then(Value::as_array)
        .map(|fields| {
            fields
                .iter()
                .filter(|f| f.get("passed").and_then(Value::as_bool) != Some(true))
                .map(|f| f.get("field").map(text).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();
    failing.join(", ")
}
