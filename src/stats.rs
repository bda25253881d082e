//! Descriptive statistics over a numeric column.
//!
//! [`describe`] follows the usual dataframe conventions: sample standard
//! deviation (`n - 1` denominator) and quantiles by linear interpolation
//! between the two nearest ranks.

use serde::{Deserialize, Serialize};

/// Count, mean, std, min, quartiles and max of a set of values.
///
/// Every field except `count` is `None` when there are no values; `std` is
/// also `None` for a single value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub p25: Option<f64>,
    #[serde(rename = "50%")]
    pub p50: Option<f64>,
    #[serde(rename = "75%")]
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

/// Summarize `values`. Non-finite values are ignored.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn describe(values: &[f64]) -> NumericSummary {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return NumericSummary::default();
    }
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = (n > 1).then(|| {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    });

    NumericSummary {
        count: n,
        mean: Some(mean),
        std,
        min: sorted.first().copied(),
        p25: Some(quantile_sorted(&sorted, 0.25)),
        p50: Some(quantile_sorted(&sorted, 0.50)),
        p75: Some(quantile_sorted(&sorted, 0.75)),
        max: sorted.last().copied(),
    }
}

/// Linear-interpolated quantile of non-empty, ascending `sorted`.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
