//! NaN-aware scalar helpers.

/// Minimum of `values`, ignoring NaN. `None` if no value is defined.
#[must_use]
pub fn nan_min(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .reduce(f64::min)
}

/// Maximum of `values`, ignoring NaN. `None` if no value is defined.
#[must_use]
pub fn nan_max(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .reduce(f64::max)
}

/// Minimum and maximum of `values`, ignoring NaN.
#[must_use]
pub fn nan_bounds(values: &[f64]) -> Option<(f64, f64)> {
    Some((nan_min(values)?, nan_max(values)?))
}

/// Linearly maps `values` from `source` onto `target`.
///
/// Missing source bounds are taken from the NaN-aware extrema of `values`.
/// NaN stays NaN. A zero-width source range yields NaN (0/0) or infinities,
/// the same as the plain formula.
#[must_use]
pub fn rescale(values: &[f64], target: (f64, f64), source: Option<(f64, f64)>) -> Vec<f64> {
    let Some((smin, smax)) = source.or_else(|| nan_bounds(values)) else {
        return vec![f64::NAN; values.len()];
    };
    values
        .iter()
        .map(|&v| rescale_value(v, target, (smin, smax)))
        .collect()
}

/// Linearly maps a single value from `source` onto `target`.
#[must_use]
pub fn rescale_value(v: f64, target: (f64, f64), source: (f64, f64)) -> f64 {
    let (smin, smax) = source;
    let (tmin, tmax) = target;
    (v - smin) / (smax - smin) * (tmax - tmin) + tmin
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn extrema_skip_nan() {
        let xs = [3.0, f64::NAN, -1.0, 7.5];
        assert_eq!(nan_min(&xs), Some(-1.0));
        assert_eq!(nan_max(&xs), Some(7.5));
    }

    #[test]
    fn extrema_of_all_nan_are_undefined() {
        assert_eq!(nan_min(&[f64::NAN, f64::NAN]), None);
        assert_eq!(nan_max(&[]), None);
        assert_eq!(nan_bounds(&[f64::NAN]), None);
    }

    #[test]
    fn rescale_to_unit_interval() {
        let scaled = rescale(&[2.0, 4.0, f64::NAN, 6.0], (0.0, 1.0), None);
        assert_relative_eq!(scaled[0], 0.0);
        assert_relative_eq!(scaled[1], 0.5);
        assert!(scaled[2].is_nan());
        assert_relative_eq!(scaled[3], 1.0);
    }

    #[test]
    fn rescale_with_explicit_source() {
        let scaled = rescale(&[0.0, 5.0, 20.0], (-1.0, 1.0), Some((0.0, 10.0)));
        assert_relative_eq!(scaled[0], -1.0);
        assert_relative_eq!(scaled[1], 0.0);
        assert_relative_eq!(scaled[2], 3.0);
    }
}
