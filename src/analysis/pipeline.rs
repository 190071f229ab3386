use serde::{Deserialize, Serialize};

use super::detrend::{detrend, DetrendOrder, Detrended};
use super::resample::{resample, Band, ResampleParams};
use super::similarity::{similarity, Similarity};
use crate::data::model::Spectrum;
use crate::error::Result;

/// Everything needed to compare two spectra.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CompareParams {
    pub resample: ResampleParams,
    /// Baseline removed from both curves; `None` correlates the normalized curves as-is.
    pub detrend: Option<DetrendOrder>,
}

impl CompareParams {
    /// Data-independent checks, cheap enough to run before any file is read.
    pub fn validate(&self) -> Result<()> {
        self.resample.validate()
    }
}

/// Baselines removed from both curves.
#[derive(Debug, Clone)]
pub struct Detrending {
    pub a: Detrended,
    pub b: Detrended,
}

/// Outcome of one comparison, with the arrays needed to plot it.
#[derive(Debug, Clone)]
pub struct SimilarityResult {
    pub band: Band,
    pub grid: Vec<f64>,
    /// Spectrum A normalized at `band.normalize_at`.
    pub curve_a: Vec<f64>,
    pub curve_b: Vec<f64>,
    pub detrending: Option<Detrending>,
    pub similarity: Similarity,
}

impl SimilarityResult {
    pub fn detrend_order(&self) -> Option<DetrendOrder> {
        self.detrending.as_ref().map(|d| d.a.order)
    }

    /// The two arrays that were correlated.
    pub fn residuals(&self) -> (&[f64], &[f64]) {
        match &self.detrending {
            Some(d) => (&d.a.residual, &d.b.residual),
            None => (&self.curve_a, &self.curve_b),
        }
    }
}

/// Resample, optionally detrend, and score two spectra.
pub fn compare(a: &Spectrum, b: &Spectrum, params: &CompareParams) -> Result<SimilarityResult> {
    params.validate()?;
    let resampled = resample(a, b, &params.resample)?;

    let detrending = match params.detrend {
        Some(order) => {
            log::info!("Removing {order} baseline from both curves");
            Some(Detrending {
                a: detrend(&resampled.grid, &resampled.curve_a, order)?,
                b: detrend(&resampled.grid, &resampled.curve_b, order)?,
            })
        }
        None => None,
    };

    let (x, y) = match &detrending {
        Some(d) => (&d.a.residual, &d.b.residual),
        None => (&resampled.curve_a, &resampled.curve_b),
    };
    let similarity = similarity(x, y)?;

    Ok(SimilarityResult {
        band: resampled.band,
        grid: resampled.grid,
        curve_a: resampled.curve_a,
        curve_b: resampled.curve_b,
        detrending,
        similarity,
    })
}
