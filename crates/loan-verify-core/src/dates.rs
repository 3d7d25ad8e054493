use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};

use crate::error::LoanVerifyError;
use crate::LoanVerifyResult;

/// Maximum day-of-month per calendar month, January first. February is held
/// at 28 days; leap years are opted into on the [`DateRoller`].
pub const MONTH_MAX_DAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Payment dates are exchanged as `YYYY-MM-DDTHH:MM:SS` plus a literal `Z`.
/// The suffix is cosmetic wire formatting, not a UTC normalization.
const PAYMENT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Computes the next payment date from the previous one, aware of variable
/// month lengths. Overflow days are carried into the following month rather
/// than clamped: day 31 rolling into a 30-day month lands on day 1 of the
/// month after it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRoller {
    /// Use the real calendar length of February instead of the fixed 28-day
    /// table entry. Off by default: the loan service schedules February as
    /// 28 days even in leap years, and matching it bit-for-bit wins over
    /// calendar correctness.
    pub february_by_calendar: bool,
}

impl DateRoller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calendar_february() -> Self {
        DateRoller {
            february_by_calendar: true,
        }
    }

    /// Day count of `month` (1 = January) in `year` under this roller's rules.
    pub fn max_days(&self, year: i32, month: u32) -> u32 {
        if self.february_by_calendar && month == 2 && is_leap_year(year) {
            29
        } else {
            MONTH_MAX_DAYS[(month - 1) as usize]
        }
    }

    /// Next payment date after `previous`.
    ///
    /// The first installment is due on the start date itself, so `is_first`
    /// returns `previous` unchanged. Otherwise the date advances one calendar
    /// month (day clamped to the target month), and if the original
    /// day-of-month exceeds the new month's day count, the difference is
    /// carried into the month after as the new day-of-month.
    pub fn next_payment_date(
        &self,
        previous: NaiveDate,
        is_first: bool,
    ) -> LoanVerifyResult<NaiveDate> {
        if is_first {
            return Ok(previous);
        }

        let day = previous.day();
        let advanced = add_one_month(previous)?;
        let overflow = day as i64 - self.max_days(advanced.year(), advanced.month()) as i64;
        if overflow > 0 {
            let carried = add_one_month(advanced)?;
            carried.with_day(overflow as u32).ok_or_else(|| {
                LoanVerifyError::DateError(format!(
                    "cannot carry day {overflow} into month {}",
                    carried.month()
                ))
            })
        } else {
            Ok(advanced)
        }
    }
}

fn add_one_month(date: NaiveDate) -> LoanVerifyResult<NaiveDate> {
    date.checked_add_months(Months::new(1)).ok_or_else(|| {
        LoanVerifyError::DateError(format!("payment date overflow advancing {date} by one month"))
    })
}

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Parse a configured start date (`YYYY-MM-DD`). Failures surface as explicit
/// errors; a bad date must abort the run, never flow on as a missing value.
pub fn parse_start_date(s: &str) -> LoanVerifyResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| LoanVerifyError::DateError(format!("invalid start date '{s}': {e}")))
}

/// Parse a wire-formatted payment date back to its calendar date.
pub fn parse_payment_date(s: &str) -> LoanVerifyResult<NaiveDate> {
    NaiveDateTime::parse_from_str(s, PAYMENT_DATE_FORMAT)
        .map(|dt| dt.date())
        .map_err(|e| LoanVerifyError::DateError(format!("invalid payment date '{s}': {e}")))
}

/// Render a payment date in the wire format, midnight with the literal `Z`.
///
/// The time is spelled out rather than formatted: a bare `NaiveDate` has no
/// time-of-day, and chrono refuses `%H:%M:%S` on one.
pub fn format_payment_date(date: NaiveDate) -> String {
    format!("{}T00:00:00Z", date.format("%Y-%m-%d"))
}
