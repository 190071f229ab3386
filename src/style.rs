use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Plot appearance, handed to the PNG renderer and the viewer at call time.
///
/// Every field has a default, so a JSON style file only needs the keys it changes:
///
/// ```json
/// { "width": 1600, "height": 1200, "y_label": "reflectance" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    /// PNG width in pixels.
    pub width: u32,
    /// PNG height in pixels.
    pub height: u32,
    /// Space around the plot area in the PNG, in pixels.
    pub margin: u32,
    /// Curve thickness in PNG pixels; the viewer draws at half this in points.
    pub line_width: f32,
    /// Tick-label and legend text height in PNG pixels; axis titles are set 20% larger.
    pub font_size: f32,
    pub background: [u8; 3],
    pub foreground: [u8; 3],
    pub grid: [u8; 3],
    pub x_label: String,
    pub y_label: String,
    /// Appended to a spectrum name for its detrended residual.
    pub residual_suffix: String,
    /// Appended to a spectrum name for its fitted baseline.
    pub trend_suffix: String,
    /// Initial viewer window size in logical points.
    pub window_size: [f32; 2],
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 3200,
            height: 2400,
            margin: 260,
            line_width: 4.0,
            font_size: 48.0,
            background: [255, 255, 255],
            foreground: [30, 30, 30],
            grid: [225, 225, 225],
            x_label: "wavelength, in nm".to_string(),
            y_label: "reflectance, normalized".to_string(),
            residual_suffix: " variation".to_string(),
            trend_suffix: " baseline".to_string(),
            window_size: [1200.0, 800.0],
        }
    }
}

impl PlotStyle {
    /// Read a (possibly partial) style from a JSON file.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading style file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing style file {}", path.display()))
    }
}
