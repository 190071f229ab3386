use serde::Serialize;

use crate::error::{Error, Result};

/// Cosine similarity of two curves and the corresponding spectral angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Similarity {
    /// `Σxy / sqrt(Σx² · Σy²)`, in [-1, 1] up to rounding.
    pub correlation: f64,
    /// `arccos(correlation)` in degrees, in [0, 180].
    pub angle_degrees: f64,
}

/// Normalized cross-correlation of `x` and `y` treated as vectors.
///
/// No mean is removed here; detrend upstream for a Pearson-like score.
pub fn similarity(x: &[f64], y: &[f64]) -> Result<Similarity> {
    if x.len() != y.len() {
        return Err(Error::LengthMismatch {
            stage: "similarity",
            left: x.len(),
            right: y.len(),
        });
    }

    let xx: f64 = x.iter().map(|v| v * v).sum();
    let yy: f64 = y.iter().map(|v| v * v).sum();
    if xx == 0.0 {
        return Err(Error::ZeroNorm { operand: "first curve" });
    }
    if yy == 0.0 {
        return Err(Error::ZeroNorm { operand: "second curve" });
    }

    let xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let correlation = xy / (xx * yy).sqrt();

    Ok(Similarity {
        correlation,
        angle_degrees: spectral_angle(correlation),
    })
}

/// Angle in degrees whose cosine is `correlation`, clamped into the arccos domain.
pub fn spectral_angle(correlation: f64) -> f64 {
    correlation.clamp(-1.0, 1.0).acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_abs_diff_eq;

    fn wiggle(n: usize) -> Vec<f64> {
        (0..n).map(|i| (i as f64 * 0.37).sin() + 0.1 * i as f64).collect()
    }

    #[test]
    fn test_self_similarity() {
        let x = wiggle(200);
        let s = similarity(&x, &x).unwrap();
        assert_abs_diff_eq!(s.correlation, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.angle_degrees, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_orthogonal() {
        let s = similarity(&[1.0, 0.0, 2.0, 0.0], &[0.0, 3.0, 0.0, -1.0]).unwrap();
        assert_eq!(s.correlation, 0.0);
        assert_abs_diff_eq!(s.angle_degrees, 90.0, epsilon = 1e-12);
    }

    #[test]
    fn test_anti_correlated() {
        let x = wiggle(50);
        let neg: Vec<f64> = x.iter().map(|v| -v).collect();
        let s = similarity(&x, &neg).unwrap();
        assert_abs_diff_eq!(s.correlation, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.angle_degrees, 180.0, epsilon = 1e-5);
    }

    #[test]
    fn test_scale_invariant() {
        let x = wiggle(80);
        let y: Vec<f64> = (0..80).map(|i| (i as f64 * 0.11).cos()).collect();
        let base = similarity(&x, &y).unwrap();
        for k in [1e-6, 0.5, 3.0, 1e6] {
            let scaled: Vec<f64> = x.iter().map(|v| k * v).collect();
            let s = similarity(&scaled, &y).unwrap();
            assert_abs_diff_eq!(s.correlation, base.correlation, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_known_angle() {
        let s = similarity(&[1.0, 0.0], &[1.0, 1.0]).unwrap();
        assert_abs_diff_eq!(s.correlation, std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-15);
        assert_abs_diff_eq!(s.angle_degrees, 45.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_vector_rejected() {
        let err = similarity(&[0.0; 5], &[1.0; 5]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateInput);
        assert!(matches!(
            similarity(&[1.0; 5], &[0.0; 5]),
            Err(Error::ZeroNorm { operand: "second curve" })
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let err = similarity(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateInput);
    }

    #[test]
    fn test_angle_clamps_rounding_overshoot() {
        assert_eq!(spectral_angle(1.0 + 1e-15), 0.0);
        assert_abs_diff_eq!(spectral_angle(-1.0 - 1e-15), 180.0, epsilon = 1e-12);
    }
}
