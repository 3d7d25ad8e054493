use rust_decimal::{Decimal, RoundingStrategy};

/// Round to 2 fractional digits, ties away from zero (half-up).
///
/// Operates on exact decimal values; inputs must never pass through an f64,
/// which would drift the representation before the tie is resolved.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Render with exactly 2 fractional digits, the fixed comparison format for
/// every monetary field.
pub fn render2(value: Decimal) -> String {
    format!("{value:.2}")
}
