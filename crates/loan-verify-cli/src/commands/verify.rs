use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use loan_verify_core::dates::DateRoller;
use loan_verify_core::service::verify_plan;
use loan_verify_core::types::LoanTerms;

use crate::http::HttpLoanService;
use crate::input;

/// Arguments for verifying a loan service's generated plan
#[derive(Args)]
pub struct VerifyArgs {
    /// Path to JSON config file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Base URI of the loan service, e.g. http://localhost:8080
    #[arg(long)]
    pub domain: Option<String>,

    /// Endpoint path of the annuity calculation
    #[arg(long, default_value = "/calc-annuity")]
    pub annuity_endpoint: String,

    /// Endpoint path of the plan generation
    #[arg(long, default_value = "/generate-plan")]
    pub plan_endpoint: String,

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

    /// Roll dates with real February lengths instead of the fixed 28 days
    #[arg(long)]
    pub calendar_february: bool,
}

/// Verification config as supplied externally: target service plus the four
/// loan parameters as strings.
#[derive(Debug, Deserialize)]
pub struct VerifyConfig {
    pub domain: String,
    #[serde(default = "default_annuity_endpoint")]
    pub annuity_endpoint: String,
    #[serde(default = "default_plan_endpoint")]
    pub plan_endpoint: String,
    pub loan_amount: String,
    pub nominal_rate: String,
    pub duration: String,
    pub start_date: String,
}

fn default_annuity_endpoint() -> String {
    "/calc-annuity".into()
}

fn default_plan_endpoint() -> String {
    "/generate-plan".into()
}

pub fn run_verify(args: VerifyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config: VerifyConfig = if let Some(ref path) = args.input {
        input::read_json(path)?
    } else if let Some(config) = input::read_stdin()? {
        config
    } else {
        VerifyConfig {
            domain: args.domain.ok_or("--domain is required (or provide --input)")?,
            annuity_endpoint: args.annuity_endpoint,
            plan_endpoint: args.plan_endpoint,
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
        }
    };

    // Parameters must parse before any call goes out.
    let terms = LoanTerms::parse(
        &config.loan_amount,
        &config.nominal_rate,
        &config.duration,
        &config.start_date,
    )?;

    let service = HttpLoanService::new(
        &config.domain,
        &config.annuity_endpoint,
        &config.plan_endpoint,
    );
    let roller = if args.calendar_february {
        DateRoller::with_calendar_february()
    } else {
        DateRoller::new()
    };

    let outcome = verify_plan(&service, &terms, roller)?;
    let passed = outcome.report.passed();

    let mut value = serde_json::to_value(&outcome)?;
    value["passed"] = Value::Bool(passed);
    Ok(value)
}
