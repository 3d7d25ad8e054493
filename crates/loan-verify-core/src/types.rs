use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::dates::{format_payment_date, parse_start_date};
use crate::error::LoanVerifyError;
use crate::rounding::render2;
use crate::LoanVerifyResult;

/// All monetary values. Decimal throughout; an f64 anywhere in the money
/// path would drift before rounding.
pub type Money = Decimal;

/// Annual nominal rates expressed as percentages (12 = 12%), matching the
/// loan service's wire format. Never as fractions.
pub type Rate = Decimal;

/// The loan parameters supplied by configuration, before the annuity is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    pub loan_amount: Money,
    pub nominal_rate: Rate,
    pub duration: u32,
    pub start_date: NaiveDate,
}

impl LoanTerms {
    /// Parse the four externally supplied loan parameters from their string
    /// form. Any parse failure is a fatal configuration error, raised before
    /// any collaborator call is made.
    pub fn parse(
        loan_amount: &str,
        nominal_rate: &str,
        duration: &str,
        start_date: &str,
    ) -> LoanVerifyResult<Self> {
        let loan_amount = Decimal::from_str(loan_amount.trim()).map_err(|e| {
            LoanVerifyError::Configuration {
                field: "loan_amount".into(),
                reason: e.to_string(),
            }
        })?;
        let nominal_rate = Decimal::from_str(nominal_rate.trim()).map_err(|e| {
            LoanVerifyError::Configuration {
                field: "nominal_rate".into(),
                reason: e.to_string(),
            }
        })?;
        let duration: u32 =
            duration
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| LoanVerifyError::Configuration {
                    field: "duration".into(),
                    reason: e.to_string(),
                })?;
        let start_date =
            parse_start_date(start_date.trim()).map_err(|e| LoanVerifyError::Configuration {
                field: "start_date".into(),
                reason: e.to_string(),
            })?;

        let terms = LoanTerms {
            loan_amount,
            nominal_rate,
            duration,
            start_date,
        };
        terms.validate()?;
        Ok(terms)
    }

    pub fn validate(&self) -> LoanVerifyResult<()> {
        if self.loan_amount <= Decimal::ZERO {
            return Err(LoanVerifyError::InvalidInput {
                field: "loan_amount".into(),
                reason: "Loan amount must be positive.".into(),
            });
        }
        if self.nominal_rate < Decimal::ZERO {
            return Err(LoanVerifyError::InvalidInput {
                field: "nominal_rate".into(),
                reason: "Nominal rate cannot be negative.".into(),
            });
        }
        if self.duration == 0 {
            return Err(LoanVerifyError::InvalidInput {
                field: "duration".into(),
                reason: "Duration must be at least one installment.".into(),
            });
        }
        Ok(())
    }

    /// Attach the externally computed annuity to form a complete parameter set.
    pub fn with_annuity(&self, annuity: Money) -> LoanParameters {
        LoanParameters {
            loan_amount: self.loan_amount,
            nominal_rate: self.nominal_rate,
            duration: self.duration,
            start_date: self.start_date,
            annuity,
        }
    }
}

/// Complete, immutable input to the schedule calculator: the configured loan
/// terms plus the fixed periodic payment computed by the loan service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanParameters {
    pub loan_amount: Money,
    pub nominal_rate: Rate,
    pub duration: u32,
    pub start_date: NaiveDate,
    pub annuity: Money,
}

/// One installment of the expected amortization schedule.
///
/// Monetary fields serialize as fixed two-fractional-digit strings and the
/// payment date as `YYYY-MM-DDT00:00:00Z`, matching the comparison format.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    #[serde(serialize_with = "ser_money2")]
    pub initial_outstanding_principal: Money,
    #[serde(serialize_with = "ser_money2")]
    pub interest: Money,
    #[serde(serialize_with = "ser_money2")]
    pub principal: Money,
    #[serde(serialize_with = "ser_money2")]
    pub borrower_payment_amount: Money,
    #[serde(serialize_with = "ser_money2")]
    pub remaining_outstanding_principal: Money,
    #[serde(rename = "date", serialize_with = "ser_payment_date")]
    pub payment_date: NaiveDate,
}

impl ScheduleEntry {
    /// The comparison string for one field of this entry.
    pub fn rendered(&self, field: PlanField) -> String {
        match field {
            PlanField::InitialOutstandingPrincipal => render2(self.initial_outstanding_principal),
            PlanField::Interest => render2(self.interest),
            PlanField::Principal => render2(self.principal),
            PlanField::BorrowerPaymentAmount => render2(self.borrower_payment_amount),
            PlanField::RemainingOutstandingPrincipal => {
                render2(self.remaining_outstanding_principal)
            }
            PlanField::PaymentDate => format_payment_date(self.payment_date),
        }
    }
}

fn ser_money2<S: Serializer>(value: &Money, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&render2(*value))
}

fn ser_payment_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_payment_date(*date))
}

/// The six compared fields of a repayment plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlanField {
    BorrowerPaymentAmount,
    PaymentDate,
    InitialOutstandingPrincipal,
    Interest,
    Principal,
    RemainingOutstandingPrincipal,
}

impl PlanField {
    pub const ALL: [PlanField; 6] = [
        PlanField::BorrowerPaymentAmount,
        PlanField::PaymentDate,
        PlanField::InitialOutstandingPrincipal,
        PlanField::Interest,
        PlanField::Principal,
        PlanField::RemainingOutstandingPrincipal,
    ];

    /// Key of this field in the loan service's plan JSON.
    pub fn wire_name(&self) -> &'static str {
        match self {
            PlanField::BorrowerPaymentAmount => "borrowerPaymentAmount",
            PlanField::PaymentDate => "date",
            PlanField::InitialOutstandingPrincipal => "initialOutstandingPrincipal",
            PlanField::Interest => "interest",
            PlanField::Principal => "principal",
            PlanField::RemainingOutstandingPrincipal => "remainingOutstandingPrincipal",
        }
    }

    /// Whether the final installment is excluded from this field's check.
    ///
    /// The calculator does not model the balloon/rounding adjustment of the
    /// last payment, so the three fields it distorts skip their last element.
    pub fn excludes_final(&self) -> bool {
        matches!(
            self,
            PlanField::BorrowerPaymentAmount
                | PlanField::RemainingOutstandingPrincipal
                | PlanField::Principal
        )
    }
}

impl std::fmt::Display for PlanField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// One row of the externally generated plan, kept in its wire (string) form.
/// Values arriving as JSON numbers are captured as their textual rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualPlanRow {
    #[serde(deserialize_with = "de_text")]
    pub date: String,
    #[serde(deserialize_with = "de_text")]
    pub borrower_payment_amount: String,
    #[serde(deserialize_with = "de_text")]
    pub initial_outstanding_principal: String,
    #[serde(deserialize_with = "de_text")]
    pub interest: String,
    #[serde(deserialize_with = "de_text")]
    pub principal: String,
    #[serde(deserialize_with = "de_text")]
    pub remaining_outstanding_principal: String,
}

/// The ordered plan fetched from the loan service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActualPlan(pub Vec<ActualPlanRow>);

impl ActualPlan {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The ordered comparison strings of one field across all rows.
    pub fn field_values(&self, field: PlanField) -> Vec<String> {
        self.0
            .iter()
            .map(|row| match field {
                PlanField::BorrowerPaymentAmount => row.borrower_payment_amount.clone(),
                PlanField::PaymentDate => row.date.clone(),
                PlanField::InitialOutstandingPrincipal => {
                    row.initial_outstanding_principal.clone()
                }
                PlanField::Interest => row.interest.clone(),
                PlanField::Principal => row.principal.clone(),
                PlanField::RemainingOutstandingPrincipal => {
                    row.remaining_outstanding_principal.clone()
                }
            })
            .collect()
    }
}

/// Accept a JSON string or number as text, preserving strings verbatim.
pub(crate) fn de_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    struct TextVisitor;

    impl Visitor<'_> for TextVisitor {
        type Value = String;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a string or number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_owned())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(TextVisitor)
}

/// Accept a JSON string or number as an exact Decimal.
pub(crate) fn de_decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let text = de_text(deserializer)?;
    Decimal::from_str(&text).map_err(de::Error::custom)
}
