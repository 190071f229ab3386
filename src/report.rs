use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::analysis::detrend::DetrendOrder;
use crate::analysis::pipeline::SimilarityResult;
use crate::analysis::resample::Band;
use crate::data::model::Spectrum;

// ---------------------------------------------------------------------------
// Report – what gets printed after a successful comparison
// ---------------------------------------------------------------------------

/// Where a spectrum came from and what range it covers.
#[derive(Debug, Clone, Serialize)]
pub struct SpectrumSummary {
    pub name: String,
    pub path: PathBuf,
    pub points: usize,
    pub min_wavelength: f64,
    pub max_wavelength: f64,
}

impl SpectrumSummary {
    pub fn new(spectrum: &Spectrum, path: &Path) -> Self {
        SpectrumSummary {
            name: spectrum.name().to_string(),
            path: path.to_path_buf(),
            points: spectrum.len(),
            min_wavelength: spectrum.min_wavelength(),
            max_wavelength: spectrum.max_wavelength(),
        }
    }
}

/// Loaded spectra plus the comparison outcome.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub spectra: Vec<SpectrumSummary>,
    pub band: Band,
    pub grid_points: usize,
    pub detrend_order: Option<DetrendOrder>,
    pub correlation: f64,
    pub angle_degrees: f64,
}

impl Report {
    pub fn new(spectra: Vec<SpectrumSummary>, result: &SimilarityResult) -> Self {
        Report {
            spectra,
            band: result.band,
            grid_points: result.grid.len(),
            detrend_order: result.detrend_order(),
            correlation: result.similarity.correlation,
            angle_degrees: result.similarity.angle_degrees,
        }
    }

    /// Plain-text report: one line per spectrum, then correlation and angle.
    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for sp in &self.spectra {
            writeln!(
                out,
                "{} {} records read from {}, spectral range: {:.1} nm to {:.1} nm.",
                sp.points,
                sp.name,
                sp.path.display(),
                sp.min_wavelength,
                sp.max_wavelength
            )?;
        }
        writeln!(out, "Corr: {:.6}", self.correlation)?;
        writeln!(out, "S.A.: {:.6} degrees", self.angle_degrees)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
