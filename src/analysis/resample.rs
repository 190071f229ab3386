use serde::{Deserialize, Serialize};

use crate::data::model::Spectrum;
use crate::error::{Error, Result};

/// Sampling step used when the caller does not choose one, in nm.
pub const DEFAULT_STEP: f64 = 0.1;

// ---------------------------------------------------------------------------
// Parameters and resolved band
// ---------------------------------------------------------------------------

/// Caller-chosen band. Unset bounds fall back to the spectra's common domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResampleParams {
    /// Band minimum (lambda_0). Default: the larger of the two domain minima.
    pub from: Option<f64>,
    /// Band maximum (lambda_1), exclusive. Default: the smaller of the two domain maxima.
    pub to: Option<f64>,
    /// Grid step (d_lambda).
    pub step: f64,
    /// Normalization wavelength (lambda_n). Default: middle of the band.
    pub normalize_at: Option<f64>,
}

impl Default for ResampleParams {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            step: DEFAULT_STEP,
            normalize_at: None,
        }
    }
}

impl ResampleParams {
    /// Checks that need no data: finite values, positive step, band order.
    pub fn validate(&self) -> Result<()> {
        validate_step(self.step)?;
        for (name, value) in [
            ("band start", self.from),
            ("band end", self.to),
            ("normalization wavelength", self.normalize_at),
        ] {
            if let Some(value) = value {
                if !value.is_finite() {
                    return Err(Error::NonFiniteParameter { name, value });
                }
            }
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if to <= from {
                return Err(Error::InvertedBand { from, to });
            }
        }
        Ok(())
    }
}

/// The band actually used once defaults are applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub from: f64,
    pub to: f64,
    pub step: f64,
    pub normalize_at: f64,
}

/// Both spectra on a shared grid, each scaled to 1.0 at `band.normalize_at`.
#[derive(Debug, Clone)]
pub struct Resampled {
    pub band: Band,
    pub grid: Vec<f64>,
    pub curve_a: Vec<f64>,
    pub curve_b: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Grid and resampling
// ---------------------------------------------------------------------------

fn validate_step(step: f64) -> Result<()> {
    if step.is_finite() && step > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidStep(step))
    }
}

/// Upper bound on grid length.
pub const MAX_GRID_POINTS: usize = 100_000_000;

/// Half-open grid `[from, to)` with points `from + i * step`.
pub fn grid(from: f64, to: f64, step: f64) -> Result<Vec<f64>> {
    validate_step(step)?;
    if !(to > from) {
        return Err(Error::InvertedBand { from, to });
    }

    let count = ((to - from) / step).ceil();
    if !(count <= MAX_GRID_POINTS as f64) {
        return Err(Error::GridTooDense {
            step,
            points: count,
            limit: MAX_GRID_POINTS,
        });
    }
    Ok((0..count as usize)
        .map(|i| from + i as f64 * step)
        .take_while(|&w| w < to)
        .collect())
}

/// Evaluate both spectra on a common grid and normalize each at `normalize_at`.
pub fn resample(a: &Spectrum, b: &Spectrum, params: &ResampleParams) -> Result<Resampled> {
    params.validate()?;

    let from = params
        .from
        .unwrap_or_else(|| a.min_wavelength().max(b.min_wavelength()));
    let to = params
        .to
        .unwrap_or_else(|| a.max_wavelength().min(b.max_wavelength()));

    for spectrum in [a, b] {
        check_band_edge(spectrum, from, "band start")?;
        check_band_edge(spectrum, to, "band end")?;
    }
    if to <= from {
        return Err(Error::InvertedBand { from, to });
    }

    let band = Band {
        from,
        to,
        step: params.step,
        normalize_at: params.normalize_at.unwrap_or((from + to) / 2.0),
    };
    let grid = grid(band.from, band.to, band.step)?;
    log::info!(
        "Resampling on [{}, {}) nm, step {} nm ({} points), normalized at {} nm",
        band.from,
        band.to,
        band.step,
        grid.len(),
        band.normalize_at
    );

    let curve_a = normalized(a, &grid, band.normalize_at)?;
    let curve_b = normalized(b, &grid, band.normalize_at)?;

    Ok(Resampled {
        band,
        grid,
        curve_a,
        curve_b,
    })
}

fn check_band_edge(spectrum: &Spectrum, wavelength: f64, what: &'static str) -> Result<()> {
    if spectrum.contains(wavelength) {
        return Ok(());
    }
    Err(Error::OutOfDomain {
        what,
        spectrum: spectrum.name().to_string(),
        wavelength,
        min: spectrum.min_wavelength(),
        max: spectrum.max_wavelength(),
    })
}

fn normalized(spectrum: &Spectrum, grid: &[f64], at: f64) -> Result<Vec<f64>> {
    let divisor = spectrum.eval_checked(at, "normalization wavelength")?;
    if divisor == 0.0 {
        return Err(Error::ZeroNormalization {
            spectrum: spectrum.name().to_string(),
            wavelength: at,
        });
    }
    Ok(spectrum
        .eval_many(grid)?
        .into_iter()
        .map(|v| v / divisor)
        .collect())
}
