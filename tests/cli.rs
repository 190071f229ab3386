use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn speccorr(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_speccorr"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run speccorr")
}

fn write_spectrum(path: &Path, name: &str, slope: f64) {
    let mut text = format!("wavelength,{name}\n");
    for i in 0..=30 {
        let w = 400.0 + 10.0 * i as f64;
        let value = 1.0 + slope * (w - 400.0) + 0.05 * (w / 25.0).sin();
        text.push_str(&format!("{w},{value}\n"));
    }
    fs::write(path, text).unwrap();
}

#[test]
fn prints_text_report() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    write_spectrum(&a, "left", 0.001);
    write_spectrum(&b, "right", 0.001);

    let out = speccorr(&[
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "-f",
        "450",
        "-t",
        "650",
        "-r",
        "1",
        "--no-detrend",
    ]);
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("31 left records read from"));
    assert!(lines[1].starts_with("31 right records read from"));
    assert_eq!(lines[2], "Corr: 1.000000");
    assert_eq!(lines[3], "S.A.: 0.000000 degrees");
}

#[test]
fn json_report_carries_band_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    write_spectrum(&a, "a", 0.001);
    write_spectrum(&b, "b", -0.0005);

    let out = speccorr(&[a.to_str().unwrap(), b.to_str().unwrap(), "-s", "1", "--json"]);
    assert!(out.status.success());

    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["detrend_order"], 1);
    assert_eq!(value["band"]["from"], 400.0);
    assert_eq!(value["band"]["to"], 700.0);
    assert_eq!(value["band"]["normalize_at"], 550.0);
    assert!(value["correlation"].is_number());
}

#[test]
fn bad_order_is_rejected_before_reading_files() {
    let out = speccorr(&["missing_a.csv", "missing_b.csv", "-s", "4"]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());

    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("parameter error"));
    assert!(!stderr.contains("missing_a.csv"));
}

#[test]
fn out_of_domain_band_prints_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    write_spectrum(&a, "a", 0.001);
    write_spectrum(&b, "b", 0.002);

    let out = speccorr(&[a.to_str().unwrap(), b.to_str().unwrap(), "-f", "390"]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8(out.stderr).unwrap().contains("domain error"));
}

#[test]
fn writes_png_plot() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    let png = dir.path().join("plot.png");
    write_spectrum(&a, "a", 0.001);
    write_spectrum(&b, "b", 0.002);

    let out = speccorr(&[
        a.to_str().unwrap(),
        b.to_str().unwrap(),
        "-r",
        "1",
        "-s",
        "2",
        "-p",
        png.to_str().unwrap(),
    ]);
    assert!(out.status.success());

    let image = image::open(&png).unwrap();
    assert_eq!((image.width(), image.height()), (3200, 2400));
}
