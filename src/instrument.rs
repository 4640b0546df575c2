//! Echelle spectrograph instrument configuration and wavelength simulation.
//!
//! This module models the spectrograph side of the pipeline: the echelle
//! grating geometry, the detector, and the per-order wavelength quantities
//! derived from the grating equation.
//!
//! # Physics Models
//!
//! ## Grating Equation
//! For an echelle used in high order near Littrow, the blaze (central)
//! wavelength of order m is:
//! - **Blaze wavelength**: λ_c = 2 sin(θ_B) cos(γ) / (σ |m|)
//!   where σ is the groove density, θ_B the blaze angle, and γ the
//!   out-of-plane angle.
//! - **Free spectral range**: Δλ_FSR = λ_c / |m|, the span over which an
//!   order does not overlap its neighbors.
//!
//! Order numbers are signed; instruments that define their orders as
//! negative (sign convention of the optical model) are handled throughout
//! by taking |m| in the physics and normalizing wavelength bounds.
//!
//! # Instrument Models
//!
//! The `models` registry provides predefined configurations, including
//! `TENK_ECHELLE`, a 10k x 10k 9 µm CCD instrument covering orders
//! -35 to -94 across the optical band.

use once_cell::sync::Lazy;
use thiserror::Error;

/// Fractional margin by which an order's covered span exceeds its FSR.
/// Echelle orders are longer than one free spectral range on the detector;
/// the overlap regions repeat wavelengths from adjacent orders.
const COVERAGE_MARGIN: f64 = 1.4;

/// Errors raised by spectrograph queries
#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("Order {0} is outside the configured range {1}..={2}")]
    OrderOutOfRange(i32, i32, i32),
    #[error("Order number must be non-zero")]
    ZeroOrder,
}

/// Echelle grating geometry
#[derive(Debug, Clone)]
pub struct GratingConfig {
    /// Groove density in grooves per millimeter
    pub groove_density_per_mm: f64,
    /// Blaze angle in degrees
    pub blaze_angle_deg: f64,
    /// Out-of-plane (gamma) angle in degrees
    pub gamma_deg: f64,
}

impl GratingConfig {
    pub fn new(groove_density_per_mm: f64, blaze_angle_deg: f64, gamma_deg: f64) -> Self {
        Self {
            groove_density_per_mm,
            blaze_angle_deg,
            gamma_deg,
        }
    }

    /// Groove spacing in micrometers
    pub fn groove_spacing_um(&self) -> f64 {
        1000.0 / self.groove_density_per_mm
    }

    /// The order-independent part of the blaze condition,
    /// 2 d sin(θ_B) cos(γ), in micrometers. Dividing by |m| gives the
    /// blaze wavelength of order m.
    pub fn blaze_constant_um(&self) -> f64 {
        2.0 * self.groove_spacing_um()
            * self.blaze_angle_deg.to_radians().sin()
            * self.gamma_deg.to_radians().cos()
    }
}

/// Detector geometry
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Detector model name
    pub name: String,
    /// Width in pixels
    pub width_px: u32,
    /// Height in pixels
    pub height_px: u32,
    /// Pixel pitch in micrometers
    pub pixel_um: f64,
}

impl DetectorConfig {
    pub fn new(name: impl Into<String>, width_px: u32, height_px: u32, pixel_um: f64) -> Self {
        Self {
            name: name.into(),
            width_px,
            height_px,
            pixel_um,
        }
    }

    /// Half the detector width in millimeters (the detector is centered
    /// on the optical axis, so the active area spans ±half_extent)
    pub fn half_extent_mm(&self) -> f64 {
        self.width_px as f64 * self.pixel_um / 2.0 / 1000.0
    }
}

/// Complete spectrograph instrument configuration
#[derive(Debug, Clone)]
pub struct InstrumentConfig {
    /// Instrument name or identifier
    pub name: String,
    pub grating: GratingConfig,
    pub detector: DetectorConfig,
    /// First diffraction order (inclusive); may be negative
    pub min_order: i32,
    /// Last diffraction order (inclusive); may be negative
    pub max_order: i32,
}

/// Spectrograph simulator: answers per-order wavelength queries for a
/// configured instrument.
///
/// This is the "get wavelength solution / central wavelength for order N"
/// collaborator of the layout pipeline. Geometry comes from the optical
/// model; this type supplies the wavelength side.
#[derive(Debug, Clone)]
pub struct Spectrograph {
    config: InstrumentConfig,
}

impl Spectrograph {
    pub fn new(config: InstrumentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InstrumentConfig {
        &self.config
    }

    /// The configured diffraction orders, walked from `min_order` toward
    /// `max_order` inclusive (descending when the convention is negative)
    pub fn orders(&self) -> Vec<i32> {
        let (lo, hi) = (self.config.min_order, self.config.max_order);
        if lo <= hi {
            (lo..=hi).collect()
        } else {
            (hi..=lo).rev().collect()
        }
    }

    fn check_order(&self, m: i32) -> Result<(), InstrumentError> {
        if m == 0 {
            return Err(InstrumentError::ZeroOrder);
        }
        let (lo, hi) = (
            self.config.min_order.min(self.config.max_order),
            self.config.min_order.max(self.config.max_order),
        );
        if m < lo || m > hi {
            return Err(InstrumentError::OrderOutOfRange(
                m,
                self.config.min_order,
                self.config.max_order,
            ));
        }
        Ok(())
    }

    /// Central (blaze) wavelength of order m in micrometers
    pub fn central_wavelength_um(&self, m: i32) -> Result<f64, InstrumentError> {
        self.check_order(m)?;
        Ok(self.config.grating.blaze_constant_um() / m.unsigned_abs() as f64)
    }

    /// Free spectral range of order m in micrometers
    pub fn fsr_um(&self, m: i32) -> Result<f64, InstrumentError> {
        Ok(self.central_wavelength_um(m)? / m.unsigned_abs() as f64)
    }

    /// FSR wavelength bounds of order m, normalized so min <= max.
    /// With negative order conventions the raw blaze arithmetic yields the
    /// bounds backwards; callers always get (min, max).
    pub fn fsr_bounds_um(&self, m: i32) -> Result<(f64, f64), InstrumentError> {
        let center = self.central_wavelength_um(m)?;
        let half = self.fsr_um(m)? / 2.0;
        Ok((center - half, center + half))
    }

    /// Full wavelength span an order's trace covers on the detector,
    /// the FSR widened by a fixed overlap margin
    pub fn coverage_bounds_um(&self, m: i32) -> Result<(f64, f64), InstrumentError> {
        let center = self.central_wavelength_um(m)?;
        let half = self.fsr_um(m)? * COVERAGE_MARGIN / 2.0;
        Ok((center - half, center + half))
    }

    /// Evenly spaced sample wavelengths across order m's covered span,
    /// ascending, `n` points (n >= 2)
    pub fn wavelength_grid_um(&self, m: i32, n: usize) -> Result<Vec<f64>, InstrumentError> {
        let (lo, hi) = self.coverage_bounds_um(m)?;
        let n = n.max(2);
        Ok((0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
            .collect())
    }
}

/// Standard instrument models
pub mod models {
    use super::*;

    /// High-resolution echelle on a 10k x 10k 9 µm CCD, orders -35 to -94.
    /// R4-style grating, 52.4 gr/mm blazed at 76° with a 2.2° gamma angle;
    /// the blaze wavelengths run from roughly 1.06 µm at m=-35 down to
    /// 394 nm at m=-94.
    pub static TENK_ECHELLE: Lazy<InstrumentConfig> = Lazy::new(|| InstrumentConfig {
        name: "10k Echelle".to_string(),
        grating: GratingConfig::new(52.4, 76.0, 2.2),
        detector: DetectorConfig::new("10k x 10k 9um CCD", 10560, 10560, 9.0),
        min_order: -35,
        max_order: -94,
    });

    /// Compact demonstration echelle on a 4k detector, positive orders
    pub static DEMO_4K: Lazy<InstrumentConfig> = Lazy::new(|| InstrumentConfig {
        name: "4k Demo".to_string(),
        grating: GratingConfig::new(79.0, 63.4, 0.7),
        detector: DetectorConfig::new("4k x 4k 15um CCD", 4096, 4096, 15.0),
        min_order: 40,
        max_order: 60,
    });

    /// Look up a predefined instrument by CLI-friendly name
    pub fn by_name(name: &str) -> Option<&'static InstrumentConfig> {
        match name {
            "tenk" => Some(&TENK_ECHELLE),
            "demo4k" => Some(&DEMO_4K),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn tenk() -> Spectrograph {
        Spectrograph::new(models::TENK_ECHELLE.clone())
    }

    #[test]
    fn test_blaze_constant() {
        let grating = GratingConfig::new(52.4, 76.0, 2.2);
        let expected = 2.0 * (1000.0 / 52.4)
            * 76.0_f64.to_radians().sin()
            * 2.2_f64.to_radians().cos();
        assert!(approx_eq!(
            f64,
            grating.blaze_constant_um(),
            expected,
            epsilon = 1e-9
        ));
    }

    #[test]
    fn test_detector_half_extent() {
        let ccd = DetectorConfig::new("test", 10560, 10560, 9.0);
        assert!(approx_eq!(f64, ccd.half_extent_mm(), 47.52, epsilon = 1e-9));
    }

    #[test]
    fn test_orders_descending_convention() {
        let spec = tenk();
        let orders = spec.orders();
        assert_eq!(orders.len(), 60);
        assert_eq!(orders.first(), Some(&-35));
        assert_eq!(orders.last(), Some(&-94));
    }

    #[test]
    fn test_orders_ascending_convention() {
        let spec = Spectrograph::new(models::DEMO_4K.clone());
        let orders = spec.orders();
        assert_eq!(orders.first(), Some(&40));
        assert_eq!(orders.last(), Some(&60));
        assert_eq!(orders.len(), 21);
    }

    #[test]
    fn test_central_wavelength_decreases_with_order() {
        let spec = tenk();
        let red = spec.central_wavelength_um(-35).unwrap();
        let blue = spec.central_wavelength_um(-94).unwrap();
        assert!(red > blue);
        // Optical band sanity
        assert!(red > 1.0 && red < 1.2);
        assert!(blue > 0.38 && blue < 0.42);
    }

    #[test]
    fn test_fsr_bounds_normalized() {
        let spec = tenk();
        for m in spec.orders() {
            let center = spec.central_wavelength_um(m).unwrap();
            let (lo, hi) = spec.fsr_bounds_um(m).unwrap();
            assert!(lo < hi);
            assert!(lo < center && center < hi);
        }
    }

    #[test]
    fn test_coverage_wider_than_fsr() {
        let spec = tenk();
        let (flo, fhi) = spec.fsr_bounds_um(-60).unwrap();
        let (clo, chi) = spec.coverage_bounds_um(-60).unwrap();
        assert!(clo < flo);
        assert!(chi > fhi);
    }

    #[test]
    fn test_halpha_falls_in_one_fsr() {
        // Adjacent FSRs tile the band, so H-alpha lands in exactly one
        let spec = tenk();
        let halpha = 0.65648131;
        let hits: Vec<i32> = spec
            .orders()
            .into_iter()
            .filter(|&m| {
                let (lo, hi) = spec.fsr_bounds_um(m).unwrap();
                halpha > lo && halpha < hi
            })
            .collect();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_wavelength_grid() {
        let spec = tenk();
        let grid = spec.wavelength_grid_um(-60, 11).unwrap();
        assert_eq!(grid.len(), 11);
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
        let (lo, hi) = spec.coverage_bounds_um(-60).unwrap();
        assert!(approx_eq!(f64, grid[0], lo, epsilon = 1e-12));
        assert!(approx_eq!(f64, grid[10], hi, epsilon = 1e-12));
    }

    #[test]
    fn test_out_of_range_order() {
        let spec = tenk();
        assert!(spec.central_wavelength_um(-20).is_err());
        assert!(spec.central_wavelength_um(0).is_err());
        assert!(spec.central_wavelength_um(50).is_err());
    }
}
