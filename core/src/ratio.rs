use crate::models::THERAPEUTIC_ZONE_LIMIT;

/// Glucose (mg/dL) divided by ketones (mmol/L), rounded to one decimal.
///
/// Zero or NaN ketones, and any other input whose quotient is not finite,
/// yield `0.0`.
#[must_use]
pub fn calculate_ratio(glucose: f64, ketones: f64) -> f64 {
    if ketones == 0.0 || ketones.is_nan() {
        return 0.0;
    }
    let ratio = glucose / ketones;
    if ratio.is_finite() { round1(ratio) } else { 0.0 }
}

/// Round to one decimal place, half away from zero.
#[must_use]
pub fn round1(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    // -0.04 rounds to -0.0; keep zero unsigned
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Whether a ratio sits in the therapeutic zone. A zero ratio means "unknown".
#[must_use]
pub fn is_therapeutic(ratio: f64) -> bool {
    ratio > 0.0 && ratio < THERAPEUTIC_ZONE_LIMIT
}
