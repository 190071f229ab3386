use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Sloped reflectance baseline with Gaussian absorption bands.
fn reflectance(
    wavelengths: &[f64],
    baseline: (f64, f64),
    bands: &[(f64, f64, f64)],
    noise_level: f64,
    noise: &mut Noise,
) -> Vec<f64> {
    let (offset, slope) = baseline;
    wavelengths
        .iter()
        .map(|&wl| {
            let absorption: f64 = bands
                .iter()
                .map(|&(mu, sigma, depth)| gaussian(wl, mu, sigma, depth))
                .sum();
            offset + slope * (wl - 380.0) - absorption + noise.normal(noise_level)
        })
        .collect()
}

/// SplitMix64 generator.
struct Noise(u64);

impl Noise {
    fn uniform(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Zero-mean normal deviate (Box-Muller).
    fn normal(&mut self, sigma: f64) -> f64 {
        let u1 = self.uniform().max(f64::MIN_POSITIVE);
        let u2 = self.uniform();
        sigma * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }
}

fn write_csv(path: &Path, name: &str, wavelengths: &[f64], values: &[f64]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["wavelength", name])?;
    for (w, v) in wavelengths.iter().zip(values) {
        writer.serialize((w, v))?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut noise = Noise(42);

    // Reference: regular 1 nm grid, 380 → 780 nm
    let ref_wl: Vec<f64> = (0..=400).map(|i| 380.0 + i as f64).collect();

    // Sample: irregular grid with 0.6–1.6 nm spacing, 385 → ~775 nm
    let mut smp_wl = vec![385.0];
    while *smp_wl.last().unwrap_or(&385.0) < 775.0 {
        let next = smp_wl[smp_wl.len() - 1] + 0.6 + noise.uniform();
        smp_wl.push((next * 100.0).round() / 100.0);
    }

    let bands = [(450.0, 18.0, 0.08), (560.0, 25.0, 0.12), (680.0, 12.0, 0.05)];
    let reference = reflectance(&ref_wl, (0.30, 4.0e-4), &bands, 0.001, &mut noise);
    let sample = reflectance(&smp_wl, (0.42, 1.5e-4), &bands, 0.004, &mut noise);

    let ref_path = out_dir.join("sample_reference.csv");
    let smp_path = out_dir.join("sample_measured.csv");
    write_csv(&ref_path, "reference", &ref_wl, &reference)?;
    write_csv(&smp_path, "measured", &smp_wl, &sample)?;

    // Four-column sheet: both spectra side by side, padded with nulls,
    // with every 37th measured value knocked out.
    let rows = ref_wl.len().max(smp_wl.len());
    let column = |values: &[f64], gap_every: Option<usize>| -> Float64Array {
        (0..rows)
            .map(|i| match gap_every {
                Some(n) if i % n == n - 1 => None,
                _ => values.get(i).copied(),
            })
            .collect()
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("wavelength_a", DataType::Float64, true),
        Field::new("reference", DataType::Float64, true),
        Field::new("wavelength_b", DataType::Float64, true),
        Field::new("measured", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(column(&ref_wl, None)),
            Arc::new(column(&reference, None)),
            Arc::new(column(&smp_wl, None)),
            Arc::new(column(&sample, Some(37))),
        ],
    )
    .context("building record batch")?;

    // Write Parquet
    let sheet_path = out_dir.join("sample_pair.parquet");
    let file = std::fs::File::create(&sheet_path)
        .with_context(|| format!("creating {}", sheet_path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;

    println!(
        "Wrote {} ({} points), {} ({} points) and {}",
        ref_path.display(),
        ref_wl.len(),
        smp_path.display(),
        smp_wl.len(),
        sheet_path.display()
    );
    Ok(())
}
