//! Percentages reported by statistics.

/// `part / whole * 100`, or zero when `whole` is zero.
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    reason = "counts stay far below 2^52 and rates are display values"
)]
#[expect(clippy::float_arithmetic, reason = "rates are reported as percentages")]
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}
