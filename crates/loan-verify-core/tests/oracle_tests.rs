use chrono::NaiveDate;
use loan_verify_core::dates::DateRoller;
use loan_verify_core::oracle::compare_plans;
use loan_verify_core::schedule::ScheduleCalculator;
use loan_verify_core::service::{verify_plan, LoanService};
use loan_verify_core::types::{ActualPlan, ActualPlanRow, LoanTerms, Money, PlanField};
use loan_verify_core::{LoanVerifyError, LoanVerifyResult};
use rust_decimal_macros::dec;

// ===========================================================================
// Oracle integration — expected schedules recomputed for real, then diffed
// against a scripted loan service.
// ===========================================================================

fn terms_1000_12_3() -> LoanTerms {
    LoanTerms::parse("1000.00", "12", "3", "2023-01-15").unwrap()
}

/// Plays back a canned annuity and plan, recording nothing.
struct ScriptedService {
    annuity: Money,
    plan: ActualPlan,
}

impl LoanService for ScriptedService {
    fn annuity(&self, _terms: &LoanTerms) -> LoanVerifyResult<Money> {
        Ok(self.annuity)
    }

    fn generate_plan(&self, _terms: &LoanTerms) -> LoanVerifyResult<ActualPlan> {
        Ok(self.plan.clone())
    }
}

fn row_from_strings(values: [&str; 6]) -> ActualPlanRow {
    let [date, payment, initial, interest, principal, remaining] = values;
    ActualPlanRow {
        date: date.into(),
        borrower_payment_amount: payment.into(),
        initial_outstanding_principal: initial.into(),
        interest: interest.into(),
        principal: principal.into(),
        remaining_outstanding_principal: remaining.into(),
    }
}

/// The plan a well-behaved service would emit for 1000 at 12% over 3 months,
/// with the usual final-installment balloon adjustment.
fn well_behaved_plan() -> ActualPlan {
    ActualPlan(vec![
        row_from_strings([
            "2023-01-15T00:00:00Z",
            "340.00",
            "1000.00",
            "10.00",
            "330.00",
            "670.00",
        ]),
        row_from_strings([
            "2023-02-15T00:00:00Z",
            "340.00",
            "670.00",
            "6.70",
            "333.30",
            "336.70",
        ]),
        row_from_strings([
            "2023-03-15T00:00:00Z",
            "340.07",
            "336.70",
            "3.37",
            "336.70",
            "0.00",
        ]),
    ])
}

#[test]
fn test_well_behaved_service_verifies_clean() {
    let service = ScriptedService {
        annuity: dec!(340.00),
        plan: well_behaved_plan(),
    };
    let outcome = verify_plan(&service, &terms_1000_12_3(), DateRoller::new()).unwrap();

    assert!(outcome.report.count_ok);
    assert!(outcome.report.passed());
    for field_report in &outcome.report.fields {
        assert!(field_report.passed, "{}", field_report.message());
    }
}

#[test]
fn test_wrong_interest_fails_only_the_interest_field() {
    let mut plan = well_behaved_plan();
    plan.0[1].interest = "6.71".into();
    let service = ScriptedService {
        annuity: dec!(340.00),
        plan,
    };
    let outcome = verify_plan(&service, &terms_1000_12_3(), DateRoller::new()).unwrap();

    assert!(!outcome.report.passed());
    for field_report in &outcome.report.fields {
        let should_pass = field_report.field != PlanField::Interest;
        assert_eq!(field_report.passed, should_pass, "{}", field_report.message());
    }
}

#[test]
fn test_balloon_final_installment_is_tolerated() {
    // Final-row principal, payment and remaining all differ from the
    // recomputed schedule; none of them may fail the verification.
    let mut plan = well_behaved_plan();
    plan.0[2].principal = "999.99".into();
    plan.0[2].borrower_payment_amount = "999.99".into();
    plan.0[2].remaining_outstanding_principal = "999.99".into();
    let service = ScriptedService {
        annuity: dec!(340.00),
        plan,
    };
    let outcome = verify_plan(&service, &terms_1000_12_3(), DateRoller::new()).unwrap();
    assert!(outcome.report.passed());
}

#[test]
fn test_balloon_final_date_is_not_tolerated() {
    let mut plan = well_behaved_plan();
    plan.0[2].date = "2023-03-16T00:00:00Z".into();
    let service = ScriptedService {
        annuity: dec!(340.00),
        plan,
    };
    let outcome = verify_plan(&service, &terms_1000_12_3(), DateRoller::new()).unwrap();

    let dates = outcome
        .report
        .fields
        .iter()
        .find(|f| f.field == PlanField::PaymentDate)
        .unwrap();
    assert!(!dates.passed);
    assert_eq!(dates.mismatches[0].index, 2);
}

#[test]
fn test_count_gate_reports_without_field_checks() {
    let expected = ScheduleCalculator::default()
        .compute(&terms_1000_12_3().with_annuity(dec!(340.00)))
        .unwrap();

    // Configured duration disagrees with the computed length: gate trips.
    let report = compare_plans(&expected, &well_behaved_plan(), 4);
    assert!(!report.count_ok);
    assert_eq!(report.expected_count, 3);
    assert!(report.fields.is_empty());
    assert!(!report.passed());
}

#[test]
fn test_collaborator_failure_aborts_the_run() {
    struct DownService;
    impl LoanService for DownService {
        fn annuity(&self, _terms: &LoanTerms) -> LoanVerifyResult<Money> {
            Err(LoanVerifyError::Collaborator {
                endpoint: "/calc-annuity".into(),
                reason: "HTTP 503 with content type text/html".into(),
            })
        }
        fn generate_plan(&self, _terms: &LoanTerms) -> LoanVerifyResult<ActualPlan> {
            unreachable!()
        }
    }

    let err = verify_plan(&DownService, &terms_1000_12_3(), DateRoller::new()).unwrap_err();
    assert!(matches!(err, LoanVerifyError::Collaborator { .. }));
}

#[test]
fn test_verification_report_serializes_with_wire_field_names() {
    let service = ScriptedService {
        annuity: dec!(340.00),
        plan: well_behaved_plan(),
    };
    let outcome = verify_plan(&service, &terms_1000_12_3(), DateRoller::new()).unwrap();
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["annuity"], "340.00");
    assert_eq!(json["expected"][0]["borrowerPaymentAmount"], "340.00");
    assert_eq!(json["expected"][0]["date"], "2023-01-15T00:00:00Z");
    assert_eq!(json["report"]["count_ok"], true);
}

#[test]
fn test_expected_schedule_matches_itself_when_echoed() {
    // Render the recomputed schedule back through the wire types: the oracle
    // must find nothing to complain about, final row included.
    let expected = ScheduleCalculator::default()
        .compute(&terms_1000_12_3().with_annuity(dec!(340.00)))
        .unwrap();
    let echoed = ActualPlan(
        expected
            .iter()
            .map(|e| {
                row_from_strings([
                    &e.rendered(PlanField::PaymentDate),
                    &e.rendered(PlanField::BorrowerPaymentAmount),
                    &e.rendered(PlanField::InitialOutstandingPrincipal),
                    &e.rendered(PlanField::Interest),
                    &e.rendered(PlanField::Principal),
                    &e.rendered(PlanField::RemainingOutstandingPrincipal),
                ])
            })
            .collect(),
    );

    let report = compare_plans(&expected, &echoed, 3);
    assert!(report.passed());
    assert_eq!(
        NaiveDate::from_ymd_opt(2023, 3, 15).unwrap(),
        expected[2].payment_date
    );
}
