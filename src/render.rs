//! Rendering of an [`EchelleLayout`] to an image.
//!
//! The output is a detector-plane schematic rather than a graph: axes and
//! mesh are suppressed, the cartesian area spans the detector extent plus
//! a margin, and the detector's active area is outlined. Order traces,
//! reference markers, and annotations come straight from the layout's
//! draw-command list.

use crate::color::rgb_values_to_color;
use crate::layout::{DrawCommand, EchelleLayout};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while rendering
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("Buffer of {0} bytes cannot hold a {1}x{2} RGB image")]
    BufferSize(usize, u32, u32),
}

/// Cosmetic rendering parameters
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Output image width in pixels
    pub width_px: u32,
    /// Output image height in pixels
    pub height_px: u32,
    /// How far the plot area extends beyond the detector half-extent
    pub margin_factor: f64,
    /// Trace stroke width in pixels
    pub line_width: u32,
    /// Font size for order annotations
    pub label_font_size: u32,
    /// Font size for reference-line labels
    pub marker_font_size: u32,
    /// Optional figure title
    pub title: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width_px: 1024,
            height_px: 1024,
            margin_factor: 1.25,
            line_width: 2,
            label_font_size: 14,
            marker_font_size: 12,
            title: None,
        }
    }
}

/// Render the layout to an image file (format chosen by extension)
pub fn render_to_file(
    layout: &EchelleLayout,
    half_extent_mm: f64,
    config: &RenderConfig,
    path: &Path,
) -> Result<(), RenderError> {
    let root =
        BitMapBackend::new(path, (config.width_px, config.height_px)).into_drawing_area();
    draw_on(&root, layout, half_extent_mm, config)?;
    root.present().map_err(|e| RenderError::Draw(e.to_string()))
}

/// Render the layout into a caller-owned RGB buffer
/// (`width_px * height_px * 3` bytes), used by tests
pub fn render_to_rgb_buffer(
    layout: &EchelleLayout,
    half_extent_mm: f64,
    config: &RenderConfig,
    buffer: &mut [u8],
) -> Result<(), RenderError> {
    let needed = config.width_px as usize * config.height_px as usize * 3;
    if buffer.len() < needed {
        return Err(RenderError::BufferSize(
            buffer.len(),
            config.width_px,
            config.height_px,
        ));
    }
    let root = BitMapBackend::with_buffer(buffer, (config.width_px, config.height_px))
        .into_drawing_area();
    draw_on(&root, layout, half_extent_mm, config)?;
    root.present().map_err(|e| RenderError::Draw(e.to_string()))
}

fn draw_on<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    layout: &EchelleLayout,
    half_extent_mm: f64,
    config: &RenderConfig,
) -> Result<(), RenderError> {
    let err = |e: DrawingAreaErrorKind<DB::ErrorType>| RenderError::Draw(e.to_string());

    root.fill(&WHITE).map_err(err)?;

    let limit = half_extent_mm * config.margin_factor;
    let mut builder = ChartBuilder::on(root);
    builder.margin(10);
    if let Some(title) = &config.title {
        builder.caption(title, ("sans-serif", 24));
    }
    let mut chart = builder
        .build_cartesian_2d(-limit..limit, -limit..limit)
        .map_err(err)?;

    // Detector active area
    let b = half_extent_mm;
    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(-b, -b), (b, b)],
            BLACK.mix(0.15).stroke_width(3),
        )))
        .map_err(err)?;

    let annotation_style = ("sans-serif", config.label_font_size)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Center));
    let marker_style = ("sans-serif", config.marker_font_size)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));

    for command in layout.draw_commands() {
        match command {
            DrawCommand::Polyline { points, color } => {
                let (r, g, b) = color;
                let style = rgb_values_to_color(r, g, b).stroke_width(config.line_width);
                chart
                    .draw_series(LineSeries::new(points, style))
                    .map_err(err)?;
            }
            DrawCommand::Marker {
                position,
                color,
                label,
            } => {
                let (r, g, b) = color;
                let fill = rgb_values_to_color(r, g, b).mix(0.6).filled();
                chart
                    .draw_series(std::iter::once(Circle::new(position, 4, fill)))
                    .map_err(err)?;
                chart
                    .draw_series(std::iter::once(Text::new(
                        label,
                        position,
                        marker_style.clone(),
                    )))
                    .map_err(err)?;
            }
            DrawCommand::Annotation { position, text } => {
                // Trailing pad keeps the label clear of the trace end
                chart
                    .draw_series(std::iter::once(Text::new(
                        format!("{text}  "),
                        position,
                        annotation_style.clone(),
                    )))
                    .map_err(err)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{EchelleLayout, OrderLayout};

    fn tiny_layout() -> EchelleLayout {
        EchelleLayout {
            orders: vec![OrderLayout {
                m: 50,
                trace: vec![(-8.0, 0.0), (0.0, 1.0), (8.0, 0.0)],
                central_wavelength_um: 0.55,
                solution: None,
            }],
            markers: vec![],
        }
    }

    #[test]
    fn test_render_into_buffer() {
        let config = RenderConfig {
            width_px: 200,
            height_px: 200,
            ..Default::default()
        };
        let mut buffer = vec![0u8; 200 * 200 * 3];
        render_to_rgb_buffer(&tiny_layout(), 10.0, &config, &mut buffer).unwrap();

        // Background is white and something was drawn over it
        assert!(buffer.iter().any(|&px| px == 255));
        assert!(buffer.chunks(3).any(|px| px != [255, 255, 255]));
    }

    #[test]
    fn test_buffer_too_small() {
        let config = RenderConfig {
            width_px: 200,
            height_px: 200,
            ..Default::default()
        };
        let mut buffer = vec![0u8; 16];
        assert!(matches!(
            render_to_rgb_buffer(&tiny_layout(), 10.0, &config, &mut buffer),
            Err(RenderError::BufferSize(16, 200, 200))
        ));
    }
}
