// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// Span-parameterised, seeded with the first observation:
//   alpha = 2 / (span + 1)
//   EMA_0 = x_0
//   EMA_t = alpha * x_t + (1 - alpha) * EMA_{t-1}
// =============================================================================

use crate::error::CoreError;

/// Compute the EMA series for `series` with the given `span`.
///
/// The output is aligned one-to-one with the input. The first value is the
/// first input, not an SMA seed.
///
/// # Edge cases
/// - `span == 0` => `InvalidParameter`
/// - Leading non-finite inputs produce NaN until the first finite value.
/// - A non-finite value later on repeats the previous EMA, while the weight
///   of that previous EMA keeps decaying by `1 - alpha` per missing bar. The
///   next finite value is then blended as
///   `(w * prev + alpha * x) / (w + alpha)` with `w = (1 - alpha)^(gap + 1)`.
///   Without gaps this reduces to the plain recurrence.
pub fn ewm_mean(series: &[f64], span: usize) -> Result<Vec<f64>, CoreError> {
    if span == 0 {
        return Err(CoreError::invalid("span", "must be at least 1"));
    }
    let alpha = 2.0 / (span as f64 + 1.0);

    let mut out = Vec::with_capacity(series.len());
    let mut prev: Option<f64> = None;
    let mut old_weight = 1.0;
    for &x in series {
        match prev {
            None if x.is_finite() => prev = Some(x),
            None => {}
            Some(p) => {
                old_weight *= 1.0 - alpha;
                if x.is_finite() {
                    prev = Some((old_weight * p + alpha * x) / (old_weight + alpha));
                    old_weight = 1.0;
                }
            }
        }
        out.push(prev.unwrap_or(f64::NAN));
    }
    Ok(out)
}
