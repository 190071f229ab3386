//! Shape similarity of two spectra.
//!
//! Two spectra sampled on different wavelength grids are resampled onto a
//! common grid, normalized at a reference wavelength, optionally stripped of
//! a low-order polynomial baseline, and scored by cosine similarity and the
//! matching spectral angle.
//!
//! ```no_run
//! use std::path::Path;
//! use speccorr::{compare, load_spectrum, CompareParams, DetrendOrder};
//!
//! let a = load_spectrum(Path::new("reference.csv"))?;
//! let b = load_spectrum(Path::new("sample.csv"))?;
//! let params = CompareParams {
//!     detrend: Some(DetrendOrder::Linear),
//!     ..Default::default()
//! };
//! let result = compare(&a, &b, &params)?;
//! println!("{:.6}", result.similarity.correlation);
//! # Ok::<(), speccorr::Error>(())
//! ```

pub mod analysis;
pub mod app;
pub mod chart;
pub mod color;
pub mod data;
pub mod error;
pub mod render;
pub mod report;
pub mod state;
pub mod style;
pub mod ui;

pub use analysis::detrend::{detrend, DetrendOrder, Detrended};
pub use analysis::pipeline::{compare, CompareParams, SimilarityResult};
pub use analysis::resample::{resample, Band, ResampleParams, DEFAULT_STEP};
pub use analysis::similarity::{similarity, spectral_angle, Similarity};
pub use data::loader::{load_sheet, load_spectrum};
pub use data::model::{Sample, Spectrum};
pub use error::{Error, ErrorKind, Result};
