use serde::{Deserialize, Serialize};

use crate::dates::DateRoller;
use crate::oracle::{compare_plans, ComparisonReport};
use crate::schedule::ScheduleCalculator;
use crate::types::{ActualPlan, LoanTerms, Money, ScheduleEntry};
use crate::LoanVerifyResult;

/// The two collaborator operations of the external loan service. Both are
/// one-shot synchronous exchanges; a failure is fatal to the run, with no
/// retry and no fallback.
pub trait LoanService {
    /// `computeAnnuity`: the fixed periodic payment for the given terms.
    fn annuity(&self, terms: &LoanTerms) -> LoanVerifyResult<Money>;

    /// `generatePlan`: the service's own repayment plan for the given terms.
    fn generate_plan(&self, terms: &LoanTerms) -> LoanVerifyResult<ActualPlan>;
}

/// Body of the annuity call. Amounts travel as strings, duration as an
/// integer, matching the service's wire contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnuityRequest {
    pub loan_amount: String,
    pub nominal_rate: String,
    pub duration: u32,
}

impl AnnuityRequest {
    pub fn from_terms(terms: &LoanTerms) -> Self {
        AnnuityRequest {
            loan_amount: terms.loan_amount.to_string(),
            nominal_rate: terms.nominal_rate.to_string(),
            duration: terms.duration,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnuityResponse {
    #[serde(deserialize_with = "crate::types::de_decimal")]
    pub annuity: Money,
}

/// Body of the plan-generation call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub loan_amount: String,
    pub nominal_rate: String,
    pub duration: u32,
    pub start_date: String,
}

impl PlanRequest {
    pub fn from_terms(terms: &LoanTerms) -> Self {
        PlanRequest {
            loan_amount: terms.loan_amount.to_string(),
            nominal_rate: terms.nominal_rate.to_string(),
            duration: terms.duration,
            start_date: terms.start_date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Everything produced by one verification run.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyOutcome {
    #[serde(serialize_with = "rust_decimal::serde::str::serialize")]
    pub annuity: Money,
    pub expected: Vec<ScheduleEntry>,
    pub actual: ActualPlan,
    pub report: ComparisonReport,
}

/// End-to-end verification: fetch the annuity, recompute the expected
/// schedule, fetch the service's plan and compare the two.
///
/// Strictly sequential, one pass. Parameter validation happens before the
/// first network call; any collaborator failure propagates immediately.
pub fn verify_plan(
    service: &dyn LoanService,
    terms: &LoanTerms,
    roller: DateRoller,
) -> LoanVerifyResult<VerifyOutcome> {
    terms.validate()?;

    let annuity = service.annuity(terms)?;
    let params = terms.with_annuity(annuity);
    let expected = ScheduleCalculator::new(roller).compute(&params)?;
    let actual = service.generate_plan(terms)?;
    let report = compare_plans(&expected, &actual, terms.duration);

    Ok(VerifyOutcome {
        annuity,
        expected,
        actual,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoanVerifyError;
    use crate::types::ActualPlanRow;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    struct EchoService {
        annuity: Money,
        plan: ActualPlan,
    }

    impl LoanService for EchoService {
        fn annuity(&self, _terms: &LoanTerms) -> LoanVerifyResult<Money> {
            Ok(self.annuity)
        }

        fn generate_plan(&self, _terms: &LoanTerms) -> LoanVerifyResult<ActualPlan> {
            Ok(self.plan.clone())
        }
    }

    struct FailingService;

    impl LoanService for FailingService {
        fn annuity(&self, _terms: &LoanTerms) -> LoanVerifyResult<Money> {
            Err(LoanVerifyError::Collaborator {
                endpoint: "/calc-annuity".into(),
                reason: "HTTP 500".into(),
            })
        }

        fn generate_plan(&self, _terms: &LoanTerms) -> LoanVerifyResult<ActualPlan> {
            unreachable!("annuity call fails first")
        }
    }

    fn terms() -> LoanTerms {
        LoanTerms {
            loan_amount: dec!(1000.00),
            nominal_rate: dec!(12),
            duration: 3,
            start_date: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
        }
    }

    fn row(
        date: &str,
        payment: &str,
        initial: &str,
        interest: &str,
        principal: &str,
        remaining: &str,
    ) -> ActualPlanRow {
        ActualPlanRow {
            date: date.into(),
            borrower_payment_amount: payment.into(),
            initial_outstanding_principal: initial.into(),
            interest: interest.into(),
            principal: principal.into(),
            remaining_outstanding_principal: remaining.into(),
        }
    }

    #[test]
    fn test_verify_plan_end_to_end_pass() {
        // The service's plan differs from the recomputed one only in the
        // final balloon payment, which the excluded fields absorb.
        let service = EchoService {
            annuity: dec!(340.00),
            plan: ActualPlan(vec![
                row(
                    "2023-01-15T00:00:00Z",
                    "340.00",
                    "1000.00",
                    "10.00",
                    "330.00",
                    "670.00",
                ),
                row(
                    "2023-02-15T00:00:00Z",
                    "340.00",
                    "670.00",
                    "6.70",
                    "333.30",
                    "336.70",
                ),
                row(
                    "2023-03-15T00:00:00Z",
                    "340.07",
                    "336.70",
                    "3.37",
                    "336.70",
                    "0.00",
                ),
            ]),
        };

        let outcome = verify_plan(&service, &terms(), DateRoller::new()).unwrap();
        assert_eq!(outcome.annuity, dec!(340.00));
        assert_eq!(outcome.expected.len(), 3);
        assert!(outcome.report.passed(), "report: {:?}", outcome.report);
    }

    #[test]
    fn test_verify_plan_propagates_collaborator_failure() {
        let err = verify_plan(&FailingService, &terms(), DateRoller::new()).unwrap_err();
        match err {
            LoanVerifyError::Collaborator { endpoint, .. } => {
                assert_eq!(endpoint, "/calc-annuity")
            }
            other => panic!("Expected Collaborator, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_plan_validates_before_calling_out() {
        let mut bad = terms();
        bad.duration = 0;
        // FailingService would error if reached; validation must win.
        let err = verify_plan(&FailingService, &bad, DateRoller::new()).unwrap_err();
        match err {
            LoanVerifyError::InvalidInput { field, .. } => assert_eq!(field, "duration"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_request_bodies_use_wire_names() {
        let annuity = serde_json::to_value(AnnuityRequest::from_terms(&terms())).unwrap();
        assert_eq!(annuity["loanAmount"], "1000.00");
        assert_eq!(annuity["nominalRate"], "12");
        assert_eq!(annuity["duration"], 3);

        let plan = serde_json::to_value(PlanRequest::from_terms(&terms())).unwrap();
        assert_eq!(plan["startDate"], "2023-01-15");
    }

    #[test]
    fn test_annuity_response_accepts_number_or_string() {
        let from_number: AnnuityResponse = serde_json::from_str(r#"{"annuity": 340.0}"#).unwrap();
        assert_eq!(from_number.annuity, dec!(340.0));
        let from_string: AnnuityResponse =
            serde_json::from_str(r#"{"annuity": "340.00"}"#).unwrap();
        assert_eq!(from_string.annuity, dec!(340.00));
    }
}
