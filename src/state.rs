use std::path::Path;

use crate::chart::{Chart, Series, SeriesKind};
use crate::render;
use crate::report::Report;
use crate::style::PlotStyle;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// Everything the plot viewer shows, independent of rendering.
pub struct ViewerState {
    /// Series to draw, fixed for the lifetime of the window.
    pub chart: Chart,

    /// Loaded spectra and the comparison outcome.
    pub report: Report,

    pub style: PlotStyle,

    /// One flag per entry of `chart.series`.
    pub visible: Vec<bool>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl ViewerState {
    pub fn new(chart: Chart, report: Report, style: PlotStyle) -> Self {
        let visible = vec![true; chart.series.len()];
        Self {
            chart,
            report,
            style,
            visible,
            status_message: None,
        }
    }

    /// Series currently switched on, in drawing order.
    pub fn visible_series(&self) -> impl Iterator<Item = &Series> {
        self.chart
            .series
            .iter()
            .zip(&self.visible)
            .filter(|(_, shown)| **shown)
            .map(|(series, _)| series)
    }

    pub fn set_visible(&mut self, index: usize, shown: bool) {
        if let Some(flag) = self.visible.get_mut(index) {
            *flag = shown;
        }
    }

    /// Show every series.
    pub fn show_all(&mut self) {
        self.visible.fill(true);
    }

    /// Show only the series of one kind.
    pub fn show_only(&mut self, kind: SeriesKind) {
        for (flag, series) in self.visible.iter_mut().zip(&self.chart.series) {
            *flag = series.kind == kind;
        }
    }

    /// Whether any series of `kind` exists (residuals only exist after detrending).
    pub fn has_kind(&self, kind: SeriesKind) -> bool {
        self.chart.series.iter().any(|s| s.kind == kind)
    }

    /// Write the visible series to a PNG and report the outcome in the status line.
    pub fn save_png(&mut self, path: &Path) {
        match render::save_png(&self.chart, &self.visible, &self.style, path) {
            Ok(()) => {
                self.status_message = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to save plot: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::detrend::DetrendOrder;
    use crate::analysis::pipeline::{compare, CompareParams};
    use crate::analysis::resample::ResampleParams;
    use crate::data::model::Spectrum;

    fn state() -> ViewerState {
        let a = Spectrum::from_columns("a", vec![400.0, 450.0, 500.0], vec![1.0, 0.6, 1.1]).unwrap();
        let b = Spectrum::from_columns("b", vec![400.0, 500.0], vec![0.8, 1.2]).unwrap();
        let params = CompareParams {
            resample: ResampleParams {
                step: 5.0,
                ..Default::default()
            },
            detrend: Some(DetrendOrder::Quadratic),
        };
        let result = compare(&a, &b, &params).unwrap();
        let style = PlotStyle {
            width: 200,
            height: 150,
            margin: 30,
            font_size: 10.0,
            ..Default::default()
        };
        let chart = Chart::from_result(&result, "a", "b", &style);
        ViewerState::new(chart, Report::new(Vec::new(), &result), style)
    }

    #[test]
    fn test_toggles() {
        let mut st = state();
        assert_eq!(st.visible_series().count(), 6);

        st.show_only(SeriesKind::Trend);
        assert!(st.visible_series().all(|s| s.kind == SeriesKind::Trend));
        assert_eq!(st.visible_series().count(), 2);

        st.set_visible(0, true);
        st.set_visible(99, true);
        assert_eq!(st.visible_series().count(), 3);

        st.show_all();
        assert_eq!(st.visible_series().count(), 6);
        assert!(st.has_kind(SeriesKind::Residual));
    }

    #[test]
    fn test_save_reports_status() {
        let mut st = state();
        let dir = tempfile::tempdir().unwrap();
        st.save_png(&dir.path().join("out.png"));
        assert!(st.status_message.as_deref().unwrap().starts_with("Saved"));

        st.save_png(&dir.path().join("missing-dir").join("out.png"));
        assert!(st.status_message.as_deref().unwrap().starts_with("Error"));
    }
}
