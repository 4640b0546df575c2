//! Echellogram layout construction.
//!
//! This is the heart of the pipeline: it combines the optical model's
//! order geometry with the spectrograph's wavelength quantities into one
//! table (one row per order: trace, order number, central wavelength,
//! wavelength solution), maps the reference line catalog into detector
//! space, and emits the deterministic draw-command list the render layer
//! consumes.
//!
//! Edge-case policy follows the rest of the pipeline: an order whose trace
//! cannot support a wavelength solution keeps its trace but gets no line
//! overlay, and reference lines outside every order's covered range are
//! silently skipped.

use crate::catalog::ReferenceLine;
use crate::color::{self, DEFAULT_GAMMA};
use crate::instrument::Spectrograph;
use crate::model::{ModelError, OpticalModel};
use crate::solution::WavelengthSolution;
use crate::units::{Wavelength, WavelengthExt};
use thiserror::Error;

/// Errors that can abort layout construction
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Optical model query failed: {0}")]
    Model(#[from] ModelError),
}

/// One diffraction order's contribution to the layout
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLayout {
    /// Signed diffraction order number
    pub m: i32,
    /// Trace path on the detector, ordered along the dispersion direction
    pub trace: Vec<(f64, f64)>,
    /// Central (blaze) wavelength in micrometers
    pub central_wavelength_um: f64,
    /// Wavelength solution, absent when the trace had too few samples
    pub solution: Option<WavelengthSolution>,
}

impl OrderLayout {
    /// The annotation text drawn at the trace's red end
    pub fn annotation_text(&self) -> String {
        let nm = Wavelength::from_micrometers(self.central_wavelength_um).as_nanometers();
        format!("m={}, {:.1}nm", self.m.abs(), nm)
    }

    /// Annotation anchor: the last trace point, or `None` for an empty trace
    pub fn annotation_anchor(&self) -> Option<(f64, f64)> {
        self.trace.last().copied()
    }
}

/// A reference line mapped onto the detector
#[derive(Debug, Clone, PartialEq)]
pub struct LineMarker {
    /// Element/ion label from the catalog
    pub label: &'static str,
    /// Order the line landed in
    pub order: i32,
    /// Line wavelength in micrometers
    pub wavelength_um: f64,
    /// Detector position in millimeters
    pub position: (f64, f64),
}

/// Complete spectral-format layout, ready to render
#[derive(Debug, Clone, PartialEq)]
pub struct EchelleLayout {
    pub orders: Vec<OrderLayout>,
    pub markers: Vec<LineMarker>,
}

/// One primitive for the plotting surface. The command list is a pure
/// function of the model responses, so two runs over identical responses
/// produce identical lists.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// An order's trace, colored by its central wavelength (black when
    /// the wavelength is outside the visible band)
    Polyline {
        points: Vec<(f64, f64)>,
        color: (f64, f64, f64),
    },
    /// A reference line marker with its element label
    Marker {
        position: (f64, f64),
        color: (f64, f64, f64),
        label: String,
    },
    /// Order number + central wavelength text at the trace's red end
    Annotation {
        position: (f64, f64),
        text: String,
    },
}

impl EchelleLayout {
    /// Build the layout: query the model for every order's trace, attach
    /// wavelength quantities from the spectrograph, and place the catalog
    /// lines. With `fsr_only` set, a line is only attributed to the order
    /// whose free spectral range contains it; otherwise the full covered
    /// span is used and a line may land in two overlapping orders.
    pub fn build(
        model: &mut dyn OpticalModel,
        spectrograph: &Spectrograph,
        catalog: &[ReferenceLine],
        fsr_only: bool,
    ) -> Result<Self, LayoutError> {
        let mut orders = Vec::new();
        let mut markers = Vec::new();

        for m in model.list_orders()? {
            let samples = model.get_trace(m)?;
            if samples.is_empty() {
                log::warn!("order {m}: optical model returned an empty trace, skipping");
                continue;
            }

            let central_wavelength_um = match spectrograph.central_wavelength_um(m) {
                Ok(wl) => wl,
                Err(err) => {
                    log::warn!("order {m}: {err}, skipping");
                    continue;
                }
            };

            let solution = match WavelengthSolution::from_samples(&samples) {
                Ok(sol) => Some(sol),
                Err(err) => {
                    log::warn!("order {m}: no wavelength solution ({err}), trace kept without overlay");
                    None
                }
            };

            if let Some(sol) = &solution {
                for line in catalog {
                    let wl = line.wavelength_um();
                    let in_band = if fsr_only {
                        spectrograph
                            .fsr_bounds_um(m)
                            .map(|(lo, hi)| wl > lo && wl < hi)
                            .unwrap_or(false)
                    } else {
                        sol.covers(wl)
                    };
                    if !in_band {
                        continue;
                    }
                    if let Some(position) = sol.position_at(wl) {
                        log::info!(
                            "{}, {:.3}um, found in order {} at ({:.2}, {:.2})",
                            line.label,
                            wl,
                            m,
                            position.0,
                            position.1
                        );
                        markers.push(LineMarker {
                            label: line.label,
                            order: m,
                            wavelength_um: wl,
                            position,
                        });
                    }
                }
            }

            orders.push(OrderLayout {
                m,
                trace: samples.iter().map(|s| (s.x_mm, s.y_mm)).collect(),
                central_wavelength_um,
                solution,
            });
        }

        Ok(Self { orders, markers })
    }

    /// Emit the draw-command list: one polyline and one annotation per
    /// order, then one marker per placed reference line.
    pub fn draw_commands(&self) -> Vec<DrawCommand> {
        let mut commands = Vec::with_capacity(self.orders.len() * 2 + self.markers.len());

        for order in &self.orders {
            let nm = Wavelength::from_micrometers(order.central_wavelength_um).as_nanometers();
            commands.push(DrawCommand::Polyline {
                points: order.trace.clone(),
                color: color::wavelength_to_rgb(nm, DEFAULT_GAMMA),
            });
            if let Some(position) = order.annotation_anchor() {
                commands.push(DrawCommand::Annotation {
                    position,
                    text: order.annotation_text(),
                });
            }
        }

        for marker in &self.markers {
            let nm = Wavelength::from_micrometers(marker.wavelength_um).as_nanometers();
            commands.push(DrawCommand::Marker {
                position: marker.position,
                color: color::wavelength_to_rgb(nm, DEFAULT_GAMMA),
                label: marker.label.to_string(),
            });
        }

        commands
    }
}
