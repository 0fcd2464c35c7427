use anyhow::{bail, Result};
use tracing::info;

/// Checked division, kept from the original tooling demos. Fails instead
/// of returning a non-finite value when the divisor is zero.
#[allow(dead_code)]
pub fn divide(numerator: f64, denominator: f64) -> Result<f64> {
    info!(numerator, denominator, "dividing numbers");
    if denominator == 0.0 {
        bail!("division by zero: {numerator} / {denominator}");
    }
    Ok(numerator / denominator)
}
