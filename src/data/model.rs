use std::fmt;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Sample – one measured (wavelength, value) pair
// ---------------------------------------------------------------------------

/// A single measured point: wavelength in nm and the signal at that wavelength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub wavelength: f64,
    pub value: f64,
}

impl Sample {
    pub fn new(wavelength: f64, value: f64) -> Self {
        Sample { wavelength, value }
    }
}

// ---------------------------------------------------------------------------
// Spectrum – a named piecewise-linear function of wavelength
// ---------------------------------------------------------------------------

/// A named spectrum that can be evaluated anywhere inside its sampled range.
///
/// Invariants (enforced by [`Spectrum::new`]):
/// * at least two samples
/// * wavelengths strictly increasing
/// * every wavelength and value finite
#[derive(Debug, Clone)]
pub struct Spectrum {
    name: String,
    /// Wavelength axis, strictly increasing.
    wavelengths: Vec<f64>,
    /// Signal axis – same length as `wavelengths`.
    values: Vec<f64>,
}

impl Spectrum {
    /// Build a spectrum from ordered samples.
    pub fn new(name: impl Into<String>, samples: &[Sample]) -> Result<Self> {
        let (wavelengths, values) = samples.iter().map(|s| (s.wavelength, s.value)).unzip();
        Self::from_columns(name, wavelengths, values)
    }

    /// Build a spectrum from parallel wavelength / value columns.
    pub fn from_columns(
        name: impl Into<String>,
        wavelengths: Vec<f64>,
        values: Vec<f64>,
    ) -> Result<Self> {
        let name = name.into();

        if wavelengths.len() != values.len() {
            return Err(Error::MalformedSpectrum {
                spectrum: name,
                message: format!(
                    "{} wavelengths but {} values",
                    wavelengths.len(),
                    values.len()
                ),
            });
        }
        if wavelengths.len() < 2 {
            return Err(Error::TooFewPoints {
                spectrum: name,
                count: wavelengths.len(),
            });
        }
        if let Some(i) = wavelengths
            .iter()
            .zip(&values)
            .position(|(w, v)| !w.is_finite() || !v.is_finite())
        {
            return Err(Error::MalformedSpectrum {
                spectrum: name,
                message: format!(
                    "sample {i} is not finite ({}, {})",
                    wavelengths[i], values[i]
                ),
            });
        }
        if let Some(i) = wavelengths.windows(2).position(|w| w[1] <= w[0]) {
            return Err(Error::MalformedSpectrum {
                spectrum: name,
                message: format!(
                    "wavelengths must be strictly increasing, sample {} ({} nm) follows {} nm",
                    i + 1,
                    wavelengths[i + 1],
                    wavelengths[i]
                ),
            });
        }

        Ok(Spectrum {
            name,
            wavelengths,
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    /// Always false; a spectrum holds at least two samples.
    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    pub fn min_wavelength(&self) -> f64 {
        self.wavelengths[0]
    }

    pub fn max_wavelength(&self) -> f64 {
        self.wavelengths[self.wavelengths.len() - 1]
    }

    /// Whether `wavelength` lies inside `[min_wavelength, max_wavelength]`.
    pub fn contains(&self, wavelength: f64) -> bool {
        wavelength >= self.min_wavelength() && wavelength <= self.max_wavelength()
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.wavelengths
            .iter()
            .zip(&self.values)
            .map(|(&w, &v)| Sample::new(w, v))
    }

    /// Linear interpolation at `wavelength`. No extrapolation.
    pub fn eval(&self, wavelength: f64) -> Result<f64> {
        self.eval_checked(wavelength, "wavelength")
    }

    /// Evaluate on every point of `grid`, failing on the first point outside the domain.
    pub fn eval_many(&self, grid: &[f64]) -> Result<Vec<f64>> {
        grid.iter().map(|&w| self.eval(w)).collect()
    }

    /// Like [`Spectrum::eval`], with `what` naming the wavelength in the domain error.
    pub(crate) fn eval_checked(&self, wavelength: f64, what: &'static str) -> Result<f64> {
        if !self.contains(wavelength) {
            return Err(Error::OutOfDomain {
                what,
                spectrum: self.name.clone(),
                wavelength,
                min: self.min_wavelength(),
                max: self.max_wavelength(),
            });
        }

        // First index whose wavelength is >= the query.
        let idx = self.wavelengths.partition_point(|&w| w < wavelength);
        if self.wavelengths[idx] == wavelength {
            return Ok(self.values[idx]);
        }

        let lo = idx - 1;
        let (w0, w1) = (self.wavelengths[lo], self.wavelengths[idx]);
        let (v0, v1) = (self.values[lo], self.values[idx]);
        let t = (wavelength - w0) / (w1 - w0);
        Ok(v0 + t * (v1 - v0))
    }
}

impl fmt::Display for Spectrum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} points, {:.1} nm to {:.1} nm)",
            self.name,
            self.len(),
            self.min_wavelength(),
            self.max_wavelength()
        )
    }
}
