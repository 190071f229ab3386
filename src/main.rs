//! speccorr command-line interface.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use speccorr::app::run_viewer;
use speccorr::chart::Chart;
use speccorr::render::save_png;
use speccorr::report::{Report, SpectrumSummary};
use speccorr::state::ViewerState;
use speccorr::style::PlotStyle;
use speccorr::{
    compare, load_sheet, load_spectrum, CompareParams, DetrendOrder, ResampleParams, Spectrum,
    DEFAULT_STEP,
};

/// Measure similarity of two spectra.
///
///   speccorr a.csv b.csv      two two-column spectrum files
///
///   speccorr ab.xlsx          one four-column sheet holding both spectra
#[derive(Parser)]
#[command(name = "speccorr", version, verbatim_doc_comment)]
struct Cli {
    /// Two spectrum files, or one four-column sheet
    #[arg(value_name = "FILE", required = true, num_args = 1..=2)]
    inputs: Vec<PathBuf>,

    /// Minimum wavelength of the spectral band
    #[arg(short = 'f', value_name = "LAMBDA_0", allow_negative_numbers = true)]
    from: Option<f64>,

    /// Maximum wavelength of the spectral band (exclusive)
    #[arg(short = 't', value_name = "LAMBDA_1", allow_negative_numbers = true)]
    to: Option<f64>,

    /// Wavelength sampling resolution
    #[arg(short = 'r', value_name = "D_LAMBDA", default_value_t = DEFAULT_STEP, allow_negative_numbers = true)]
    step: f64,

    /// Wavelength where the two spectra are normalized [default: middle of band]
    #[arg(short = 'n', value_name = "LAMBDA_N", allow_negative_numbers = true)]
    normalize_at: Option<f64>,

    /// Order (0, 1, 2 or 3) of the polynomial slope removed before cross-correlating
    #[arg(short = 's', value_name = "SCALE", default_value = "0", conflicts_with = "no_detrend")]
    scale: String,

    /// Correlate the normalized spectra without removing any baseline
    #[arg(long)]
    no_detrend: bool,

    /// Plot spectra and save as PNG; an empty name opens an interactive window
    #[arg(short = 'p', value_name = "PLOTNAME")]
    plot: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// JSON file overriding plot style defaults
    #[arg(long, value_name = "FILE")]
    style: Option<PathBuf>,
}

impl Cli {
    fn compare_params(&self) -> speccorr::Result<CompareParams> {
        let detrend = if self.no_detrend {
            None
        } else {
            Some(self.scale.parse::<DetrendOrder>()?)
        };
        let params = CompareParams {
            resample: ResampleParams {
                from: self.from,
                to: self.to,
                step: self.step,
                normalize_at: self.normalize_at,
            },
            detrend,
        };
        params.validate()?;
        Ok(params)
    }
}

/// Attach the failure category so the message reads "domain error: ...".
fn classified(err: speccorr::Error) -> anyhow::Error {
    let kind = err.kind();
    anyhow::Error::new(err).context(kind)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    // Parameter errors surface before any file is touched.
    let params = cli.compare_params().map_err(classified)?;
    let style = match &cli.style {
        Some(path) => PlotStyle::from_json_file(path)?,
        None => PlotStyle::default(),
    };

    let (a, b, summaries) = load_inputs(&cli.inputs).map_err(classified)?;
    let result = compare(&a, &b, &params).map_err(classified)?;
    let report = Report::new(summaries, &result);

    if cli.json {
        println!("{}", report.to_json().context("serializing report")?);
    } else {
        report
            .write_text(&mut io::stdout().lock())
            .context("writing report")?;
    }

    if let Some(target) = &cli.plot {
        let chart = Chart::from_result(&result, a.name(), b.name(), &style);
        if target.is_empty() {
            run_viewer(ViewerState::new(chart, report, style))?;
        } else {
            let visible = vec![true; chart.series.len()];
            save_png(&chart, &visible, &style, Path::new(target))?;
        }
    }

    Ok(())
}

fn load_inputs(inputs: &[PathBuf]) -> speccorr::Result<(Spectrum, Spectrum, Vec<SpectrumSummary>)> {
    match inputs {
        [sheet] => {
            let (a, b) = load_sheet(sheet)?;
            let summaries = vec![SpectrumSummary::new(&a, sheet), SpectrumSummary::new(&b, sheet)];
            Ok((a, b, summaries))
        }
        [path_a, path_b] => {
            let a = load_spectrum(path_a)?;
            let b = load_spectrum(path_b)?;
            let summaries = vec![SpectrumSummary::new(&a, path_a), SpectrumSummary::new(&b, path_b)];
            Ok((a, b, summaries))
        }
        _ => unreachable!("clap accepts one or two inputs"),
    }
}
