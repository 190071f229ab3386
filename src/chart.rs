use crate::analysis::detrend::DetrendOrder;
use crate::analysis::pipeline::SimilarityResult;
use crate::color::{generate_palette, Rgb8};
use crate::style::PlotStyle;

// ---------------------------------------------------------------------------
// Chart model – what gets drawn, independent of the backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    /// Spectrum normalized at the reference wavelength.
    Normalized,
    /// Normalized curve minus its baseline.
    Residual,
    /// Fitted baseline; drawn dash-dotted.
    Trend,
}

/// One line on the chart.
#[derive(Debug, Clone)]
pub struct Series {
    pub label: String,
    pub kind: SeriesKind,
    pub color: Rgb8,
    /// `[wavelength, value]` pairs.
    pub points: Vec<[f64; 2]>,
}

/// All series of a comparison plus axis labels.
#[derive(Debug, Clone)]
pub struct Chart {
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl Chart {
    /// Normalized curves, plus residuals and baselines when a non-constant
    /// baseline was removed.
    pub fn from_result(
        result: &SimilarityResult,
        name_a: &str,
        name_b: &str,
        style: &PlotStyle,
    ) -> Self {
        let zip = |values: &[f64]| -> Vec<[f64; 2]> {
            result
                .grid
                .iter()
                .zip(values)
                .map(|(&x, &y)| [x, y])
                .collect()
        };

        let mut lines = vec![
            (name_a.to_string(), SeriesKind::Normalized, zip(&result.curve_a)),
            (name_b.to_string(), SeriesKind::Normalized, zip(&result.curve_b)),
        ];

        if let Some(d) = &result.detrending {
            if d.a.order != DetrendOrder::Mean {
                for (name, fit) in [(name_a, &d.a), (name_b, &d.b)] {
                    lines.push((
                        format!("{name}{}", style.residual_suffix),
                        SeriesKind::Residual,
                        zip(&fit.residual),
                    ));
                }
                for (name, fit) in [(name_a, &d.a), (name_b, &d.b)] {
                    lines.push((
                        format!("{name}{}", style.trend_suffix),
                        SeriesKind::Trend,
                        zip(&fit.trend),
                    ));
                }
            }
        }

        let colors = generate_palette(lines.len());
        let series = lines
            .into_iter()
            .zip(colors)
            .map(|((label, kind, points), color)| Series {
                label,
                kind,
                color,
                points,
            })
            .collect();

        Chart {
            x_label: style.x_label.clone(),
            y_label: style.y_label.clone(),
            series,
        }
    }

    /// `([x_min, x_max], [y_min, y_max])` over the series selected by `visible`,
    /// or `None` when nothing finite is selected.
    pub fn bounds(&self, visible: &[bool]) -> Option<([f64; 2], [f64; 2])> {
        let mut x = [f64::INFINITY, f64::NEG_INFINITY];
        let mut y = [f64::INFINITY, f64::NEG_INFINITY];
        for (series, _) in self
            .series
            .iter()
            .zip(visible)
            .filter(|(_, shown)| **shown)
        {
            for &[px, py] in series.points.iter().filter(|p| p[0].is_finite() && p[1].is_finite()) {
                x = [x[0].min(px), x[1].max(px)];
                y = [y[0].min(py), y[1].max(py)];
            }
        }
        (x[0] <= x[1]).then_some((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::pipeline::{compare, CompareParams};
    use crate::analysis::resample::ResampleParams;
    use crate::data::model::Spectrum;

    fn result(detrend: Option<DetrendOrder>) -> SimilarityResult {
        let a = Spectrum::from_columns("a", vec![400.0, 450.0, 500.0], vec![1.0, 0.5, 1.2]).unwrap();
        let b = Spectrum::from_columns("b", vec![400.0, 500.0], vec![0.8, 1.1]).unwrap();
        let params = CompareParams {
            resample: ResampleParams {
                step: 10.0,
                ..Default::default()
            },
            detrend,
        };
        compare(&a, &b, &params).unwrap()
    }

    #[test]
    fn test_series_without_baseline() {
        let style = PlotStyle::default();
        for detrend in [None, Some(DetrendOrder::Mean)] {
            let chart = Chart::from_result(&result(detrend), "a", "b", &style);
            assert_eq!(chart.series.len(), 2);
            assert!(chart.series.iter().all(|s| s.kind == SeriesKind::Normalized));
        }
    }

    #[test]
    fn test_series_with_linear_baseline() {
        let style = PlotStyle::default();
        let chart = Chart::from_result(&result(Some(DetrendOrder::Linear)), "a", "b", &style);
        let labels: Vec<&str> = chart.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            ["a", "b", "a variation", "b variation", "a baseline", "b baseline"]
        );
        assert_eq!(chart.series[4].kind, SeriesKind::Trend);
        assert_eq!(chart.series[0].points.len(), 10);
        assert_eq!(chart.series[0].points[0][0], 400.0);
    }

    #[test]
    fn test_bounds_follow_visibility() {
        let style = PlotStyle::default();
        let chart = Chart::from_result(&result(None), "a", "b", &style);
        let (x, _) = chart.bounds(&[true, true]).unwrap();
        assert_eq!(x, [400.0, 490.0]);
        assert!(chart.bounds(&[false, false]).is_none());
    }
}
