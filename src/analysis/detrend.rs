use std::fmt;
use std::str::FromStr;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// DetrendOrder – the closed set of supported baselines
// ---------------------------------------------------------------------------

/// Degree of the polynomial baseline removed before correlating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum DetrendOrder {
    /// Subtract the mean.
    #[default]
    Mean,
    Linear,
    Quadratic,
    Cubic,
}

impl DetrendOrder {
    pub const ALL: [DetrendOrder; 4] = [
        DetrendOrder::Mean,
        DetrendOrder::Linear,
        DetrendOrder::Quadratic,
        DetrendOrder::Cubic,
    ];

    pub fn degree(self) -> u8 {
        match self {
            DetrendOrder::Mean => 0,
            DetrendOrder::Linear => 1,
            DetrendOrder::Quadratic => 2,
            DetrendOrder::Cubic => 3,
        }
    }
}

impl From<DetrendOrder> for u8 {
    fn from(order: DetrendOrder) -> u8 {
        order.degree()
    }
}

impl TryFrom<u8> for DetrendOrder {
    type Error = Error;

    fn try_from(degree: u8) -> Result<Self> {
        DetrendOrder::ALL
            .get(usize::from(degree))
            .copied()
            .ok_or_else(|| Error::InvalidDetrendOrder(degree.to_string()))
    }
}

impl FromStr for DetrendOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u8>()
            .map_err(|_| Error::InvalidDetrendOrder(s.to_string()))
            .and_then(DetrendOrder::try_from)
    }
}

impl fmt::Display for DetrendOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DetrendOrder::Mean => "mean",
            DetrendOrder::Linear => "linear",
            DetrendOrder::Quadratic => "quadratic",
            DetrendOrder::Cubic => "cubic",
        };
        write!(f, "{label} (order {})", self.degree())
    }
}

// ---------------------------------------------------------------------------
// Polynomial – fitted baseline
// ---------------------------------------------------------------------------

/// Polynomial in the scaled abscissa `t = (x - center) / half_width`.
///
/// Fitting in `t ∈ [-1, 1]` keeps the normal equations well conditioned for
/// wavelengths in the hundreds of nm.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    /// Coefficients in ascending powers of `t`.
    coefficients: Vec<f64>,
    center: f64,
    half_width: f64,
}

impl Polynomial {
    fn constant(value: f64) -> Self {
        Polynomial {
            coefficients: vec![value],
            center: 0.0,
            half_width: 1.0,
        }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    pub fn eval(&self, x: f64) -> f64 {
        let t = (x - self.center) / self.half_width;
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * t + c)
    }
}

// ---------------------------------------------------------------------------
// Detrending
// ---------------------------------------------------------------------------

/// A curve split into fitted baseline and residual.
#[derive(Debug, Clone)]
pub struct Detrended {
    pub order: DetrendOrder,
    /// `curve - trend`.
    pub residual: Vec<f64>,
    /// Baseline evaluated on the grid.
    pub trend: Vec<f64>,
    pub polynomial: Polynomial,
}

/// Remove a polynomial baseline of `order` from `curve` sampled on `grid`.
pub fn detrend(grid: &[f64], curve: &[f64], order: DetrendOrder) -> Result<Detrended> {
    if grid.len() != curve.len() {
        return Err(Error::LengthMismatch {
            stage: "detrend",
            left: grid.len(),
            right: curve.len(),
        });
    }
    let degree = order.degree();
    if grid.len() <= usize::from(degree) {
        return Err(Error::UnderdeterminedFit {
            order: degree,
            points: grid.len(),
        });
    }

    let polynomial = match order {
        DetrendOrder::Mean => {
            Polynomial::constant(curve.iter().sum::<f64>() / curve.len() as f64)
        }
        _ => least_squares(grid, curve, degree)?,
    };
    log::debug!("{order} baseline coefficients: {:?}", polynomial.coefficients());

    let trend: Vec<f64> = grid.iter().map(|&x| polynomial.eval(x)).collect();
    let residual = curve.iter().zip(&trend).map(|(y, t)| y - t).collect();

    Ok(Detrended {
        order,
        residual,
        trend,
        polynomial,
    })
}

/// Ordinary least-squares polynomial fit via the normal equations.
fn least_squares(x: &[f64], y: &[f64], degree: u8) -> Result<Polynomial> {
    let (lo, hi) = x
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let center = (lo + hi) / 2.0;
    let half_width = if hi > lo { (hi - lo) / 2.0 } else { 1.0 };

    let cols = usize::from(degree) + 1;
    let vandermonde = DMatrix::from_fn(x.len(), cols, |i, j| {
        ((x[i] - center) / half_width).powi(j as i32)
    });
    let rhs = vandermonde.transpose() * DVector::from_column_slice(y);
    let normal = vandermonde.transpose() * &vandermonde;

    let coefficients = normal
        .lu()
        .solve(&rhs)
        .filter(|c| c.iter().all(|v| v.is_finite()))
        .ok_or(Error::SingularFit { order: degree })?;

    Ok(Polynomial {
        coefficients: coefficients.iter().copied().collect(),
        center,
        half_width,
    })
}
