use serde::Serialize;

use crate::types::{ActualPlan, PlanField, ScheduleEntry};

/// One diverging element of a field comparison. `None` marks an element
/// present on only one side (length mismatch).
#[derive(Debug, Clone, Serialize)]
pub struct Mismatch {
    pub index: usize,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

/// Verdict for a single plan field. Fields are checked independently; one
/// field failing never suppresses the others.
#[derive(Debug, Clone, Serialize)]
pub struct FieldReport {
    pub field: PlanField,
    pub passed: bool,
    pub mismatches: Vec<Mismatch>,
}

impl FieldReport {
    /// Human-readable verdict naming the diverging field.
    pub fn message(&self) -> String {
        if self.passed {
            format!("{} matches", self.field)
        } else {
            match self.mismatches.first() {
                Some(m) => format!(
                    "{} doesn't match: index {} expected {:?}, got {:?}",
                    self.field, m.index, m.expected, m.actual
                ),
                None => format!("{} doesn't match", self.field),
            }
        }
    }
}

/// Result of comparing a computed expected schedule against the plan the
/// loan service generated.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub duration: u32,
    pub expected_count: usize,
    pub actual_count: usize,
    /// Count gate: the expected schedule holds one entry per installment.
    /// When this fails the field checks are meaningless and are not run.
    pub count_ok: bool,
    pub fields: Vec<FieldReport>,
}

impl ComparisonReport {
    pub fn passed(&self) -> bool {
        self.count_ok && self.fields.iter().all(|f| f.passed)
    }
}

/// Align the expected and actual plans and evaluate per-field equality.
///
/// Comparison is exact string equality on the rendered values, never numeric
/// tolerance. For the three fields distorted by the final installment's
/// balloon adjustment ([`PlanField::excludes_final`]), the last element is
/// dropped from both sides before comparing.
pub fn compare_plans(
    expected: &[ScheduleEntry],
    actual: &ActualPlan,
    duration: u32,
) -> ComparisonReport {
    let count_ok = expected.len() == duration as usize;
    let fields = if count_ok {
        PlanField::ALL
            .into_iter()
            .map(|field| compare_field(field, expected, actual))
            .collect()
    } else {
        Vec::new()
    };

    ComparisonReport {
        duration,
        expected_count: expected.len(),
        actual_count: actual.len(),
        count_ok,
        fields,
    }
}

fn compare_field(field: PlanField, expected: &[ScheduleEntry], actual: &ActualPlan) -> FieldReport {
    let mut expected_values: Vec<String> = expected.iter().map(|e| e.rendered(field)).collect();
    let mut actual_values = actual.field_values(field);

    if field.excludes_final() {
        expected_values.pop();
        actual_values.pop();
    }

    let len = expected_values.len().max(actual_values.len());
    let mismatches: Vec<Mismatch> = (0..len)
        .filter_map(|index| {
            let exp = expected_values.get(index);
            let act = actual_values.get(index);
            if exp == act {
                None
            } else {
                Some(Mismatch {
                    index,
                    expected: exp.cloned(),
                    actual: act.cloned(),
                })
            }
        })
        .collect();

    FieldReport {
        field,
        passed: mismatches.is_empty(),
        mismatches,
    }
}
