//! PNG rendering of a [`Chart`] with the `image` crate.
//!
//! Draws a framed plot area with grid lines, tick labels, axis titles, the
//! series and a legend naming each visible series. Text is rasterized with
//! `ab_glyph` from the Ubuntu-Light face egui uses in the viewer.

use std::path::Path;

use ab_glyph::{point, Font, FontRef, PxScale, ScaleFont};
use anyhow::{anyhow, Context};
use image::{imageops, GrayImage, ImageFormat, Rgb, RgbImage};

use crate::chart::{Chart, SeriesKind};
use crate::color::Rgb8;
use crate::style::PlotStyle;

/// Rasterize the visible series of `chart`.
pub fn render(chart: &Chart, visible: &[bool], style: &PlotStyle) -> anyhow::Result<RgbImage> {
    let font = FontRef::try_from_slice(epaint_default_fonts::UBUNTU_LIGHT)
        .map_err(|e| anyhow!("loading plot font: {e}"))?;

    let width = style.width.max(1);
    let height = style.height.max(1);
    let mut canvas = Canvas::new(width, height, style.background);

    let Some((x_range, y_range)) = chart.bounds(visible) else {
        return Ok(canvas.image);
    };
    let x_range = widen(x_range, 0.0);
    let y_range = widen(y_range, 0.05);

    // Plot rectangle; leaves room for tick labels and titles on the left and bottom.
    let m = style.margin as f64;
    let area = Rect {
        left: m,
        right: (width as f64 - m / 2.0).max(m + 1.0),
        top: m / 2.0,
        bottom: (height as f64 - m).max(m / 2.0 + 1.0),
    };
    let to_px = |x: f64, y: f64| -> (f64, f64) {
        (
            area.left + (x - x_range[0]) / (x_range[1] - x_range[0]) * area.width(),
            area.bottom - (y - y_range[0]) / (y_range[1] - y_range[0]) * area.height(),
        )
    };

    let thin = (style.line_width / 4.0).max(1.0) as f64;
    let frame = (style.line_width / 2.0).max(1.0) as f64;
    let font_size = style.font_size.max(6.0);
    let x_ticks = ticks(x_range, 8);
    let y_ticks = ticks(y_range, 6);

    // Grid
    canvas.clip = Some(area);
    for &(x, _) in &x_ticks {
        let (px, _) = to_px(x, y_range[0]);
        canvas.polyline(&[(px, area.top), (px, area.bottom)], thin, style.grid, None);
    }
    for &(y, _) in &y_ticks {
        let (_, py) = to_px(x_range[0], y);
        canvas.polyline(&[(area.left, py), (area.right, py)], thin, style.grid, None);
    }

    // Series
    let lw = style.line_width.max(1.0) as f64;
    let dash_dot = [6.0 * lw, 2.0 * lw, lw, 2.0 * lw];
    for (series, _) in chart.series.iter().zip(visible).filter(|(_, shown)| **shown) {
        let pattern = (series.kind == SeriesKind::Trend).then_some(&dash_dot[..]);
        let path: Vec<(f64, f64)> = series
            .points
            .iter()
            .map(|&[x, y]| to_px(x, y))
            .collect();
        canvas.polyline(&path, lw, series.color, pattern);
    }

    // Frame, ticks and tick labels
    canvas.clip = None;
    let corners = [
        (area.left, area.top),
        (area.right, area.top),
        (area.right, area.bottom),
        (area.left, area.bottom),
        (area.left, area.top),
    ];
    canvas.polyline(&corners, frame, style.foreground, None);

    let tick_len = 0.3 * font_size as f64;
    let mut x_labels_bottom = area.bottom + 2.0 * tick_len;
    for (x, label) in &x_ticks {
        let (px, _) = to_px(*x, y_range[0]);
        canvas.polyline(
            &[(px, area.bottom), (px, area.bottom + tick_len)],
            frame,
            style.foreground,
            None,
        );
        let mask = text_mask(&font, label, font_size);
        let top = area.bottom + 2.0 * tick_len;
        canvas.stamp(&mask, px - mask.width() as f64 / 2.0, top, style.foreground);
        x_labels_bottom = x_labels_bottom.max(top + mask.height() as f64);
    }
    let mut y_labels_left = area.left - 2.0 * tick_len;
    for (y, label) in &y_ticks {
        let (_, py) = to_px(x_range[0], *y);
        canvas.polyline(
            &[(area.left - tick_len, py), (area.left, py)],
            frame,
            style.foreground,
            None,
        );
        let mask = text_mask(&font, label, font_size);
        let left = area.left - 2.0 * tick_len - mask.width() as f64;
        canvas.stamp(&mask, left, py - mask.height() as f64 / 2.0, style.foreground);
        y_labels_left = y_labels_left.min(left);
    }

    // Axis titles
    let title_size = 1.2 * font_size;
    if !chart.x_label.is_empty() {
        let mask = text_mask(&font, &chart.x_label, title_size);
        let x = area.left + (area.width() - mask.width() as f64) / 2.0;
        canvas.stamp(&mask, x, x_labels_bottom + tick_len, style.foreground);
    }
    if !chart.y_label.is_empty() {
        let mask = imageops::rotate270(&text_mask(&font, &chart.y_label, title_size));
        let x = (y_labels_left - tick_len - mask.width() as f64).max(0.0);
        let y = area.top + (area.height() - mask.height() as f64) / 2.0;
        canvas.stamp(&mask, x, y, style.foreground);
    }

    draw_legend(&mut canvas, &font, chart, visible, style, area, &dash_dot);

    Ok(canvas.image)
}

/// Framed box in the upper right of the plot area: a line swatch and the
/// label for every visible series.
fn draw_legend(
    canvas: &mut Canvas,
    font: &FontRef<'_>,
    chart: &Chart,
    visible: &[bool],
    style: &PlotStyle,
    area: Rect,
    dash_dot: &[f64],
) {
    let font_size = style.font_size.max(6.0);
    let entries: Vec<_> = chart
        .series
        .iter()
        .zip(visible)
        .filter(|(_, shown)| **shown)
        .map(|(series, _)| (series, text_mask(font, &series.label, font_size)))
        .collect();
    if entries.is_empty() {
        return;
    }

    let pad = 0.5 * font_size as f64;
    let swatch = 3.0 * font_size as f64;
    let row = 1.4 * font_size as f64;
    let text_width = entries.iter().map(|(_, m)| m.width()).max().unwrap_or(0) as f64;
    let box_width = pad + swatch + pad + text_width + pad;
    let box_height = pad + row * entries.len() as f64 + pad;
    let legend = Rect {
        left: area.right - pad - box_width,
        right: area.right - pad,
        top: area.top + pad,
        bottom: area.top + pad + box_height,
    };

    canvas.fill(legend, style.background);
    let outline = [
        (legend.left, legend.top),
        (legend.right, legend.top),
        (legend.right, legend.bottom),
        (legend.left, legend.bottom),
        (legend.left, legend.top),
    ];
    canvas.polyline(&outline, (style.line_width / 4.0).max(1.0) as f64, style.grid, None);

    let lw = style.line_width.max(1.0) as f64;
    for (i, (series, mask)) in entries.iter().enumerate() {
        let middle = legend.top + pad + (i as f64 + 0.5) * row;
        let start = legend.left + pad;
        let pattern = (series.kind == SeriesKind::Trend).then_some(dash_dot);
        canvas.polyline(&[(start, middle), (start + swatch, middle)], lw, series.color, pattern);
        canvas.stamp(
            mask,
            start + swatch + pad,
            middle - mask.height() as f64 / 2.0,
            style.foreground,
        );
    }
}

/// Render and write a PNG to `path`.
pub fn save_png(chart: &Chart, visible: &[bool], style: &PlotStyle, path: &Path) -> anyhow::Result<()> {
    let is_png = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));
    if !is_png {
        log::warn!("{} does not end in .png; writing PNG data anyway", path.display());
    }

    render(chart, visible, style)?
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("writing plot to {}", path.display()))?;
    log::info!("Plot written to {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Axis helpers
// ---------------------------------------------------------------------------

fn widen(range: [f64; 2], pad: f64) -> [f64; 2] {
    let span = range[1] - range[0];
    if span > 0.0 {
        [range[0] - pad * span, range[1] + pad * span]
    } else {
        [range[0] - 0.5, range[1] + 0.5]
    }
}

/// Step of the form {1, 2, 5}·10^k giving roughly `target` intervals.
fn nice_step(span: f64, target: usize) -> f64 {
    let raw = span / target.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|f| f * magnitude)
        .find(|&s| s >= raw)
        .unwrap_or(10.0 * magnitude)
}

/// Tick positions inside `range` with their labels.
fn ticks(range: [f64; 2], target: usize) -> Vec<(f64, String)> {
    let step = nice_step(range[1] - range[0], target);
    let decimals = (-step.log10() - 1e-9).ceil().max(0.0) as usize;
    let first = (range[0] / step).ceil() as i64;
    let last = (range[1] / step).floor() as i64;
    (first..=last)
        .map(|k| {
            let v = k as f64 * step;
            // Avoid printing "-0.0".
            let v = if k == 0 { 0.0 } else { v };
            (v, format!("{v:.decimals$}"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Canvas – clipped, thick-line drawing on an RgbImage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Rect {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Rect {
    fn width(&self) -> f64 {
        self.right - self.left
    }

    fn height(&self) -> f64 {
        self.bottom - self.top
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

struct Canvas {
    image: RgbImage,
    clip: Option<Rect>,
}

impl Canvas {
    fn new(width: u32, height: u32, background: Rgb8) -> Self {
        Canvas {
            image: RgbImage::from_pixel(width, height, Rgb(background)),
            clip: None,
        }
    }

    fn put(&mut self, x: i64, y: i64, color: Rgb8) {
        self.blend(x, y, color, 1.0);
    }

    /// Mix `color` into the pixel with weight `alpha` in [0, 1].
    fn blend(&mut self, x: i64, y: i64, color: Rgb8, alpha: f32) {
        if x < 0 || y < 0 || x >= self.image.width() as i64 || y >= self.image.height() as i64 {
            return;
        }
        if let Some(clip) = self.clip {
            if !clip.contains(x as f64, y as f64) {
                return;
            }
        }
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        if alpha >= 1.0 {
            *pixel = Rgb(color);
            return;
        }
        for (dst, src) in pixel.0.iter_mut().zip(color) {
            *dst = (*dst as f32 * (1.0 - alpha) + src as f32 * alpha).round() as u8;
        }
    }

    fn fill(&mut self, rect: Rect, color: Rgb8) {
        for y in rect.top.round() as i64..rect.bottom.round() as i64 {
            for x in rect.left.round() as i64..rect.right.round() as i64 {
                self.put(x, y, color);
            }
        }
    }

    /// Paint `color` through a coverage mask whose top-left corner lands at (x, y).
    fn stamp(&mut self, mask: &GrayImage, x: f64, y: f64, color: Rgb8) {
        let (x0, y0) = (x.round() as i64, y.round() as i64);
        for (mx, my, coverage) in mask.enumerate_pixels() {
            if coverage.0[0] > 0 {
                let alpha = coverage.0[0] as f32 / 255.0;
                self.blend(x0 + mx as i64, y0 + my as i64, color, alpha);
            }
        }
    }

    fn disc(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb8) {
        let r = radius.max(0.5);
        let (x0, x1) = ((cx - r).floor() as i64, (cx + r).ceil() as i64);
        let (y0, y1) = ((cy - r).floor() as i64, (cy + r).ceil() as i64);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let (dx, dy) = (x as f64 + 0.5 - cx, y as f64 + 0.5 - cy);
                if dx * dx + dy * dy <= r * r {
                    self.put(x, y, color);
                }
            }
        }
    }

    /// Stamp discs along the path; `dash` alternates on/off lengths in pixels.
    fn polyline(&mut self, path: &[(f64, f64)], width: f64, color: Rgb8, dash: Option<&[f64]>) {
        let radius = width / 2.0;
        let mut travelled = 0.0;
        for seg in path.windows(2) {
            let ((x0, y0), (x1, y1)) = (seg[0], seg[1]);
            if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
                continue;
            }
            let len = (x1 - x0).hypot(y1 - y0);
            let steps = (len * 2.0).ceil().max(1.0) as usize;
            for k in 0..=steps {
                let t = k as f64 / steps as f64;
                if dash.map_or(true, |pattern| dash_on(pattern, travelled + t * len)) {
                    self.disc(x0 + t * (x1 - x0), y0 + t * (y1 - y0), radius, color);
                }
            }
            travelled += len;
        }
    }
}

fn dash_on(pattern: &[f64], distance: f64) -> bool {
    let period: f64 = pattern.iter().sum();
    if period <= 0.0 {
        return true;
    }
    let mut pos = distance % period;
    for (i, &len) in pattern.iter().enumerate() {
        if pos < len {
            return i % 2 == 0;
        }
        pos -= len;
    }
    true
}

/// Coverage mask of one line of `text`, `size` pixels from ascender to descender.
fn text_mask(font: &FontRef<'_>, text: &str, size: f32) -> GrayImage {
    let scaled = font.as_scaled(PxScale::from(size));
    let mut glyphs = Vec::new();
    let mut caret = 0.0f32;
    let mut previous = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(previous) = previous {
            caret += scaled.kern(previous, id);
        }
        glyphs.push(id.with_scale_and_position(size, point(caret, scaled.ascent())));
        caret += scaled.h_advance(id);
        previous = Some(id);
    }

    let width = caret.ceil().max(1.0) as u32;
    let height = (scaled.ascent() - scaled.descent()).ceil().max(1.0) as u32;
    let mut mask = GrayImage::new(width, height);
    for glyph in glyphs {
        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let x = bounds.min.x as i64 + gx as i64;
            let y = bounds.min.y as i64 + gy as i64;
            if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                return;
            }
            let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
            let pixel = mask.get_pixel_mut(x as u32, y as u32);
            pixel.0[0] = pixel.0[0].max(value);
        });
    }
    mask
}
