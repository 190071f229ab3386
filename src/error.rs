//! Error types for speccorr.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for speccorr operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised anywhere between loading and scoring.
#[derive(Debug, Error)]
pub enum Error {
    /// File missing, unreadable or malformed.
    #[error("{}: {message}", path.display())]
    InputFile { path: PathBuf, message: String },

    /// Samples that cannot form an interpolant (non-monotonic or non-finite).
    #[error("spectrum '{spectrum}' is malformed: {message}")]
    MalformedSpectrum { spectrum: String, message: String },

    /// Fewer than two usable samples.
    #[error("spectrum '{spectrum}' has {count} usable point(s), at least 2 are required")]
    TooFewPoints { spectrum: String, count: usize },

    /// Wavelength outside the interpolation range of a spectrum.
    #[error(
        "{what} {wavelength} nm lies outside spectrum '{spectrum}' domain [{min}, {max}] nm"
    )]
    OutOfDomain {
        what: &'static str,
        spectrum: String,
        wavelength: f64,
        min: f64,
        max: f64,
    },

    /// Spectrum value is exactly zero at the normalization wavelength.
    #[error("normalization: spectrum '{spectrum}' is zero at {wavelength} nm")]
    ZeroNormalization { spectrum: String, wavelength: f64 },

    /// Polynomial fit has no more points than its order.
    #[error("detrend: order {order} fit needs more than {order} points, grid has {points}")]
    UnderdeterminedFit { order: u8, points: usize },

    /// Normal equations could not be solved.
    #[error("detrend: normal equations for order {order} fit are singular")]
    SingularFit { order: u8 },

    /// All-zero vector fed to the similarity metric.
    #[error("similarity: {operand} has zero norm")]
    ZeroNorm { operand: &'static str },

    /// Two arrays that must pair up element-wise do not.
    #[error("{stage}: length mismatch ({left} vs {right})")]
    LengthMismatch {
        stage: &'static str,
        left: usize,
        right: usize,
    },

    /// Sampling step is zero, negative or not finite.
    #[error("sampling step must be positive and finite, got {0}")]
    InvalidStep(f64),

    /// Step so fine that the grid would not fit in memory.
    #[error("sampling step {step} nm gives about {points:.3e} grid points over the band, at most {limit} allowed")]
    GridTooDense { step: f64, points: f64, limit: usize },

    /// Band upper bound does not exceed the lower bound.
    #[error("band is empty or inverted: from {from} nm to {to} nm")]
    InvertedBand { from: f64, to: f64 },

    /// Detrend order outside 0..=3.
    #[error("detrend order must be 0, 1, 2 or 3, got '{0}'")]
    InvalidDetrendOrder(String),

    /// Any other non-finite parameter.
    #[error("{name} must be finite, got {value}")]
    NonFiniteParameter { name: &'static str, value: f64 },
}

/// Failure category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InputFile,
    Domain,
    DegenerateInput,
    Parameter,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::InputFile => "input file error",
            ErrorKind::Domain => "domain error",
            ErrorKind::DegenerateInput => "degenerate input",
            ErrorKind::Parameter => "parameter error",
        };
        f.write_str(label)
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InputFile { .. } | Error::MalformedSpectrum { .. } => ErrorKind::InputFile,
            Error::TooFewPoints { .. } | Error::OutOfDomain { .. } => ErrorKind::Domain,
            Error::ZeroNormalization { .. }
            | Error::UnderdeterminedFit { .. }
            | Error::SingularFit { .. }
            | Error::ZeroNorm { .. }
            | Error::LengthMismatch { .. } => ErrorKind::DegenerateInput,
            Error::InvalidStep(_)
            | Error::GridTooDense { .. }
            | Error::InvertedBand { .. }
            | Error::InvalidDetrendOrder(_)
            | Error::NonFiniteParameter { .. } => ErrorKind::Parameter,
        }
    }

    pub(crate) fn input_file(path: impl Into<PathBuf>, err: anyhow::Error) -> Self {
        Error::InputFile {
            path: path.into(),
            message: format!("{err:#}"),
        }
    }
}
