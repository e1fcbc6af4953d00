//! Frequency sweep builders.

use crate::errors::ConfigurationError;
use crate::math::Scalar;

/// Generates `n` linearly spaced samples in [start, stop].
#[must_use]
pub fn linspace(start: Scalar, stop: Scalar, n: usize) -> Vec<Scalar> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n as Scalar - 1.0);
            (0..n).map(|i| start + step * i as Scalar).collect()
        }
    }
}

/// Generates `n` logarithmically spaced frequencies between `start_hz` and `stop_hz`.
///
/// Both bounds must be strictly positive.
pub fn logspace_hz(start_hz: Scalar, stop_hz: Scalar, n: usize) -> Result<Vec<Scalar>, ConfigurationError> {
    for hz in [start_hz, stop_hz] {
        if !(hz > 0.0 && hz.is_finite()) {
            return Err(ConfigurationError::NonPositiveFrequency(hz));
        }
    }
    Ok(linspace(start_hz.log10(), stop_hz.log10(), n)
        .into_iter()
        .map(|e| 10f64.powf(e))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linspace_basic() {
        let v = linspace(0.0, 1.0, 5);
        assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn logspace_spans_decades() {
        let f = logspace_hz(1.0e-1, 1.0e5, 61).unwrap();
        assert_eq!(f.len(), 61);
        assert_relative_eq!(f[0], 0.1, max_relative = 1.0e-12);
        assert_relative_eq!(f[10], 1.0, max_relative = 1.0e-12);
        assert_relative_eq!(f[60], 1.0e5, max_relative = 1.0e-12);
    }

    #[test]
    fn logspace_rejects_non_positive_bounds() {
        assert!(logspace_hz(0.0, 10.0, 3).is_err());
        assert!(logspace_hz(1.0, -10.0, 3).is_err());
    }
}
