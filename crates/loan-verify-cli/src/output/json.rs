use colored::Colorize;
use serde_json::Value;

/// Pretty-print JSON to stdout.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!(
            "{}: failed to render JSON output: {}",
            "error".red().bold(),
            e
        ),
    }
}
