use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context};
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::Spectrum;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load one spectrum from a two-column file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, then `wavelength,signal` rows; every field must be numeric
/// * `.parquet` – first two columns, castable to Float64, no nulls
///
/// The signal column's header names the spectrum.
pub fn load_spectrum(path: &Path) -> Result<Spectrum> {
    let spectrum = match extension(path).as_str() {
        "csv" => {
            let (name, wavelengths, values) =
                read_csv_pair(path).map_err(|e| Error::input_file(path, e))?;
            Spectrum::from_columns(name_or_stem(name, path), wavelengths, values)?
        }
        "parquet" | "pq" => {
            let table = read_parquet_table(path, 2).map_err(|e| Error::input_file(path, e))?;
            let (wavelengths, values) = table
                .complete_pair(0, 1)
                .map_err(|e| Error::input_file(path, e))?;
            Spectrum::from_columns(
                name_or_stem(table.headers[1].clone(), path),
                wavelengths,
                values,
            )?
        }
        other => return Err(unsupported(path, other)),
    };

    log_loaded(&spectrum, path);
    Ok(spectrum)
}

/// Load two spectra from one four-column sheet.  Dispatch by extension.
///
/// Columns 0–1 are spectrum A's (wavelength, signal), columns 2–3 spectrum B's.
/// The first row holds the headers. Each pair drops its own rows where either
/// cell is missing or non-numeric, so A and B may keep different row counts.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet
/// * `.csv`     – four columns, ragged rows allowed
/// * `.parquet` – first four columns
pub fn load_sheet(path: &Path) -> Result<(Spectrum, Spectrum)> {
    let table = match extension(path).as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook_table(path),
        "csv" => read_csv_table(path),
        "parquet" | "pq" => read_parquet_table(path, 4),
        other => return Err(unsupported(path, other)),
    }
    .map_err(|e| Error::input_file(path, e))?;

    if table.headers.len() < 4 {
        return Err(Error::InputFile {
            path: path.to_path_buf(),
            message: format!(
                "expected 4 columns (two wavelength/signal pairs), found {}",
                table.headers.len()
            ),
        });
    }
    if table.headers.len() > 4 {
        log::warn!(
            "{}: ignoring {} column(s) past the fourth",
            path.display(),
            table.headers.len() - 4
        );
    }

    let a = table.gap_free_spectrum(0, 1, "spectrum A")?;
    let b = table.gap_free_spectrum(2, 3, "spectrum B")?;
    log_loaded(&a, path);
    log_loaded(&b, path);
    Ok((a, b))
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn unsupported(path: &Path, ext: &str) -> Error {
    Error::InputFile {
        path: path.to_path_buf(),
        message: format!("unsupported file extension: .{ext}"),
    }
}

fn name_or_stem(name: String, path: &Path) -> String {
    if !name.trim().is_empty() {
        return name.trim().to_string();
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("spectrum")
        .to_string()
}

fn log_loaded(spectrum: &Spectrum, path: &Path) {
    log::info!(
        "Loaded {} points of '{}' from {}, domain {} nm to {} nm",
        spectrum.len(),
        spectrum.name(),
        path.display(),
        spectrum.min_wavelength(),
        spectrum.max_wavelength()
    );
}

// ---------------------------------------------------------------------------
// Column table – the common shape of every tabular source
// ---------------------------------------------------------------------------

/// Header names plus numeric columns; `None` marks a missing or non-numeric cell.
/// `headers` names every column in the source, `columns` may stop short of it.
struct Table {
    headers: Vec<String>,
    columns: Vec<Vec<Option<f64>>>,
}

impl Table {
    /// Pair two columns, failing on the first gap.
    fn complete_pair(&self, w: usize, v: usize) -> anyhow::Result<(Vec<f64>, Vec<f64>)> {
        self.columns[w]
            .iter()
            .zip(&self.columns[v])
            .enumerate()
            .map(|(row, (wl, val))| match (wl, val) {
                (Some(wl), Some(val)) => Ok((*wl, *val)),
                _ => bail!(
                    "row {row}: missing or non-numeric value in '{}' or '{}'",
                    self.headers[w],
                    self.headers[v]
                ),
            })
            .collect()
    }

    /// Pair two columns, dropping rows with a gap in either.
    fn gap_free_spectrum(&self, w: usize, v: usize, fallback: &str) -> Result<Spectrum> {
        let total = self.columns[w].len().max(self.columns[v].len());
        let (wavelengths, values): (Vec<f64>, Vec<f64>) = self.columns[w]
            .iter()
            .zip(&self.columns[v])
            .filter_map(|(wl, val)| Some(((*wl)?, (*val)?)))
            .unzip();

        let name = match self.headers[v].trim() {
            "" => fallback.to_string(),
            header => header.to_string(),
        };
        log::debug!(
            "'{name}': kept {} of {total} rows from columns {w}-{v}",
            wavelengths.len()
        );
        Spectrum::from_columns(name, wavelengths, values)
    }
}

fn numeric_cell(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

// ---------------------------------------------------------------------------
// CSV loaders
// ---------------------------------------------------------------------------

/// Strict two-column CSV:  `wavelength,signal` with a header row.
/// Returns the signal header and both columns.
fn read_csv_pair(path: &Path) -> anyhow::Result<(String, Vec<f64>, Vec<f64>)> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.len() != 2 {
        bail!(
            "expected 2 columns (wavelength, signal), header has {}",
            headers.len()
        );
    }

    let mut wavelengths = Vec::new();
    let mut values = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = row_no + 2;
        let record = result.with_context(|| format!("CSV line {line}"))?;

        let parse = |idx: usize| -> anyhow::Result<f64> {
            let field = record.get(idx).unwrap_or("");
            field.trim().parse::<f64>().with_context(|| {
                format!(
                    "line {line}, column '{}': '{field}' is not a number",
                    headers[idx]
                )
            })
        };
        wavelengths.push(parse(0)?);
        values.push(parse(1)?);
    }

    Ok((headers[1].clone(), wavelengths, values))
}

/// Four-column CSV sheet.  Short rows and unparsable cells become gaps.
fn read_csv_table(path: &Path) -> anyhow::Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut columns = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV line {}", row_no + 2))?;
        for (idx, column) in columns.iter_mut().enumerate() {
            column.push(record.get(idx).and_then(numeric_cell));
        }
    }

    Ok(Table { headers, columns })
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// First worksheet of an Excel / OpenDocument workbook.
fn read_workbook_table(path: &Path) -> anyhow::Result<Table> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let header_row = rows.next().context("worksheet is empty")?;
    let headers: Vec<String> = header_row.iter().map(|cell| cell.to_string()).collect();

    let mut columns = vec![Vec::new(); headers.len()];
    for row in rows {
        for (idx, column) in columns.iter_mut().enumerate() {
            column.push(row.get(idx).and_then(workbook_cell));
        }
    }

    Ok(Table { headers, columns })
}

fn workbook_cell(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) if !f.is_nan() => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => numeric_cell(s),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Read the first `needed` columns of a Parquet file as Float64, keeping
/// the names of all columns.
///
/// Any Arrow type the cast kernel can turn into Float64 is accepted
/// (floats, integers, numeric strings). Nulls, NaN and unparsable strings
/// become gaps. Works with files written by Pandas, Polars or Arrow.
fn read_parquet_table(path: &Path, needed: usize) -> anyhow::Result<Table> {
    let file = File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    if headers.len() < needed {
        bail!("expected {needed} columns, found {}", headers.len());
    }

    let reader = builder.build().context("building parquet reader")?;
    let mut columns = vec![Vec::new(); needed];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (idx, column) in columns.iter_mut().enumerate() {
            let as_f64 = cast(batch.column(idx), &DataType::Float64)
                .with_context(|| format!("column '{}' is not numeric", headers[idx]))?;
            let values = as_f64.as_primitive::<Float64Type>();
            column.extend(
                (0..values.len())
                    .map(|row| (!values.is_null(row)).then(|| values.value(row)))
                    .map(|v| v.filter(|x| !x.is_nan())),
            );
        }
    }

    Ok(Table { headers, columns })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_csv_pair_names_spectrum_from_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "a.csv", "nm,Reference\n400,0.1\n410,0.2\n420,0.4\n");
        let sp = load_spectrum(&path).unwrap();
        assert_eq!(sp.name(), "Reference");
        assert_eq!(sp.len(), 3);
        assert_eq!(sp.max_wavelength(), 420.0);
    }

    #[test]
    fn test_csv_pair_rejects_non_numeric() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "bad.csv", "nm,s\n400,0.1\n410,oops\n");
        let err = load_spectrum(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputFile);
        let msg = err.to_string();
        assert!(msg.contains("bad.csv"), "{msg}");
        assert!(msg.contains("line 3"), "{msg}");
    }

    #[test]
    fn test_csv_pair_rejects_wrong_column_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "three.csv", "nm,a,b\n400,0.1,0.2\n410,0.2,0.3\n");
        assert_eq!(load_spectrum(&path).unwrap_err().kind(), ErrorKind::InputFile);
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = load_spectrum(Path::new("/nonexistent/spec.csv")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputFile);
        assert!(err.to_string().contains("/nonexistent/spec.csv"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_spectrum(Path::new("spectrum.dat")).unwrap_err();
        assert!(err.to_string().contains("unsupported file extension: .dat"));
    }

    #[test]
    fn test_csv_sheet_filters_gaps_per_pair() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "ab.csv",
            "wa,A,wb,B\n\
             400,1.0,400,2.0\n\
             410,,410,2.1\n\
             420,1.2,420,NaN\n\
             430,1.3\n\
             440,1.4,440,2.4\n",
        );
        let (a, b) = load_sheet(&path).unwrap();
        assert_eq!(a.name(), "A");
        assert_eq!(a.wavelengths(), &[400.0, 420.0, 430.0, 440.0]);
        assert_eq!(b.name(), "B");
        assert_eq!(b.wavelengths(), &[400.0, 410.0, 440.0]);
    }

    #[test]
    fn test_parquet_table_reports_columns_past_needed() {
        use arrow::array::Float64Array;
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.parquet");
        let names = ["wa", "A", "wb", "B", "notes"];
        let schema = Arc::new(Schema::new(
            names
                .iter()
                .map(|n| Field::new(*n, DataType::Float64, true))
                .collect::<Vec<_>>(),
        ));
        let columns = (0..names.len())
            .map(|c| {
                let values: Vec<f64> = (0..3).map(|r| 400.0 + 10.0 * r as f64 + c as f64).collect();
                Arc::new(Float64Array::from(values)) as arrow::array::ArrayRef
            })
            .collect();
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = read_parquet_table(&path, 4).unwrap();
        assert_eq!(table.headers, names);
        assert_eq!(table.columns.len(), 4);

        let (a, b) = load_sheet(&path).unwrap();
        assert_eq!((a.name(), b.name()), ("A", "B"));
        assert_eq!(b.values(), &[403.0, 413.0, 423.0]);
    }

    #[test]
    fn test_workbook_sheet_filters_gaps_per_pair() {
        use rust_xlsxwriter::Workbook;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ab.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in ["wa", "A", "wb", "B"].into_iter().enumerate() {
            sheet.write_string(0, col as u16, header).unwrap();
        }
        let rows: [(f64, Option<f64>, f64, Option<f64>); 4] = [
            (400.0, Some(1.0), 400.0, Some(2.0)),
            (410.0, None, 410.0, Some(2.1)),
            (420.0, Some(1.2), 420.0, None),
            (430.0, Some(1.3), 430.0, Some(2.3)),
        ];
        for (i, (wa, a, wb, b)) in rows.into_iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_number(row, 0, wa).unwrap();
            if let Some(a) = a {
                sheet.write_number(row, 1, a).unwrap();
            }
            sheet.write_number(row, 2, wb).unwrap();
            match b {
                Some(b) => sheet.write_number(row, 3, b).unwrap(),
                None => sheet.write_string(row, 3, "n/a").unwrap(),
            };
        }
        workbook.save(&path).unwrap();

        let (a, b) = load_sheet(&path).unwrap();
        assert_eq!(a.name(), "A");
        assert_eq!(a.wavelengths(), &[400.0, 420.0, 430.0]);
        assert_eq!(a.values(), &[1.0, 1.2, 1.3]);
        assert_eq!(b.name(), "B");
        assert_eq!(b.wavelengths(), &[400.0, 410.0, 430.0]);
        assert_eq!(b.values(), &[2.0, 2.1, 2.3]);
    }

    #[test]
    fn test_sheet_needs_four_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "narrow.csv", "w,a,w2\n1,2,3\n");
        let err = load_sheet(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputFile);
        assert!(err.to_string().contains("found 3"));
    }

    #[test]
    fn test_sheet_with_one_usable_row_is_domain_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "thin.csv", "wa,A,wb,B\n400,1,400,1\n410,1,,\n");
        let err = load_sheet(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
    }
}
