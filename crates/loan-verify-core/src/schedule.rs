use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::dates::DateRoller;
use crate::error::LoanVerifyError;
use crate::rounding::round2;
use crate::types::{LoanParameters, Money, ScheduleEntry};
use crate::LoanVerifyResult;

// 30/360 day count: every month 30 days, every year 360.
const DAYS_PER_MONTH: Decimal = dec!(30);
const DAYS_PER_YEAR: Decimal = dec!(360);
const PERCENT: Decimal = dec!(100);

/// Running state threaded through the schedule fold. One value per
/// computation; nothing is shared between computations, so independent
/// schedules can be produced concurrently without coordination.
#[derive(Debug, Clone, Copy)]
struct ScheduleState {
    cumulative_principal: Money,
    remaining_principal: Money,
    previous_date: NaiveDate,
    /// Interest of period 0, used as a cap on later periods whose interest
    /// exceeds it (see [`ScheduleCalculator::compute`]).
    first_interest: Option<Money>,
}

/// Produces the full ordered expected amortization schedule for a loan.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleCalculator {
    pub roller: DateRoller,
}

impl ScheduleCalculator {
    pub fn new(roller: DateRoller) -> Self {
        ScheduleCalculator { roller }
    }

    /// Compute the expected schedule: exactly `duration` entries, ordered by
    /// period index, immutable once returned.
    ///
    /// Interest uses a 30/360 simple-interest approximation on the balance
    /// outstanding at the start of each period. The principal component is
    /// `annuity − interest`, with one anomaly reproduced from the loan
    /// service's observed behavior: from the third period on, if a period's
    /// interest exceeds the very first period's interest, the first interest
    /// is substituted into the subtraction. The intent behind that cap is an
    /// open product question; it is matched here, not second-guessed.
    pub fn compute(&self, params: &LoanParameters) -> LoanVerifyResult<Vec<ScheduleEntry>> {
        validate_input(params)?;

        let mut state = ScheduleState {
            cumulative_principal: Decimal::ZERO,
            remaining_principal: params.loan_amount,
            previous_date: params.start_date,
            first_interest: None,
        };
        let mut entries = Vec::with_capacity(params.duration as usize);

        for index in 0..params.duration {
            let (entry, next) = self.next_entry(params, index, state)?;
            entries.push(entry);
            state = next;
        }

        Ok(entries)
    }

    fn next_entry(
        &self,
        params: &LoanParameters,
        index: u32,
        state: ScheduleState,
    ) -> LoanVerifyResult<(ScheduleEntry, ScheduleState)> {
        let outstanding = params.loan_amount - state.cumulative_principal;
        let interest =
            round2(params.nominal_rate * DAYS_PER_MONTH * outstanding / (DAYS_PER_YEAR * PERCENT));

        // The cap only arms from the third period onward.
        let principal = match state.first_interest.filter(|_| index >= 2) {
            Some(first) if interest > first => round2(params.annuity - first),
            _ => round2(params.annuity - interest),
        };

        let initial_outstanding_principal = round2(outstanding);
        let borrower_payment_amount = round2(principal + interest);
        let remaining = (state.remaining_principal - principal).max(Decimal::ZERO);
        let payment_date = self
            .roller
            .next_payment_date(state.previous_date, index == 0)?;

        let entry = ScheduleEntry {
            initial_outstanding_principal,
            interest,
            principal,
            borrower_payment_amount,
            remaining_outstanding_principal: remaining,
            payment_date,
        };
        let next = ScheduleState {
            cumulative_principal: state.cumulative_principal + principal,
            remaining_principal: remaining,
            previous_date: payment_date,
            first_interest: state.first_interest.or(Some(interest)),
        };
        Ok((entry, next))
    }
}

fn validate_input(params: &LoanParameters) -> LoanVerifyResult<()> {
    if params.loan_amount <= Decimal::ZERO {
        return Err(LoanVerifyError::InvalidInput {
            field: "loan_amount".into(),
            reason: "Loan amount must be positive.".into(),
        });
    }
    if params.nominal_rate < Decimal::ZERO {
        return Err(LoanVerifyError::InvalidInput {
            field: "nominal_rate".into(),
            reason: "Nominal rate cannot be negative.".into(),
        });
    }
    if params.duration == 0 {
        return Err(LoanVerifyError::InvalidInput {
            field: "duration".into(),
            reason: "Duration must be at least one installment.".into(),
        });
    }
    Ok(())
}
