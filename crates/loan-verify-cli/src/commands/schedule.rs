use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use loan_verify_core::dates::DateRoller;
use loan_verify_core::schedule::ScheduleCalculator;
use loan_verify_core::types::{LoanTerms, Money};

use crate::input;

/// Arguments for local schedule computation
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long)]
    pub loan_amount: Option<String>,

    /// Annual nominal rate as a percentage (12 = 12%)
    #[arg(long)]
    pub nominal_rate: Option<String>,

    /// Number of monthly installments
    #[arg(long)]
    pub duration: Option<String>,

    /// Date of the first installment (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Fixed periodic payment, as computed by the loan service
    #[arg(long)]
    pub annuity: Option<String>,

    /// Roll dates with real February lengths instead of the fixed 28 days
    #[arg(long)]
    pub calendar_february: bool,
}

/// The loan parameters in their externally supplied string form. Parsing
/// happens in one place, in the core, so a bad value fails the same way no
/// matter where the config came from.
#[derive(Debug, Deserialize)]
pub struct ScheduleConfig {
    pub loan_amount: String,
    pub nominal_rate: String,
    pub duration: String,
    pub start_date: String,
    pub annuity: String,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config: ScheduleConfig = if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(config) = input::read_stdin()? {
        config
    } else {
        ScheduleConfig {
            loan_amount: args
                .loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
            nominal_rate: args
                .nominal_rate
                .ok_or("--nominal-rate is required (or provide --input)")?,
            duration: args
                .duration
                .ok_or("--duration is required (or provide --input)")?,
            start_date: args
                .start_date
                .ok_or("--start-date is required (or provide --input)")?,
            annuity: args
                .annuity
                .ok_or("--annuity is required (or provide --input)")?,
        }
    };

    let terms = LoanTerms::parse(
        &config.loan_amount,
        &config.nominal_rate,
        &config.duration,
        &config.start_date,
    )?;
    let annuity: Money = config
        .annuity
        .trim()
        .parse()
        .map_err(|e| format!("Failed to parse annuity '{}': {}", config.annuity, e))?;
    let params = terms.with_annuity(annuity);

    let roller = if args.calendar_february {
        DateRoller::with_calendar_february()
    } else {
        DateRoller::new()
    };
    let entries = ScheduleCalculator::new(roller).compute(&params)?;

    Ok(serde_json::json!({
        "loan": params,
        "entries": entries,
    }))
}
