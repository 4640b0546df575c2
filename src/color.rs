//! Perceived-color mapping for visible wavelengths
//!
//! Maps a wavelength in the visible band (380-750 nm) to an approximate
//! human-perceived RGB color, following Dan Bruton's piecewise model
//! (<http://www.physics.sfasu.edu/astro/color/spectra.html>). Wavelengths
//! outside the visible band map to black, which the render layer draws
//! as a plain black line.

use plotters::style::RGBColor;

/// Default gamma applied to the perceived-color curves
pub const DEFAULT_GAMMA: f64 = 0.8;

/// Convert a wavelength in nanometers to linear RGB components in 0.0-1.0.
///
/// The visible band is split into six segments with linear ramps between
/// the primaries; the violet and deep-red ends are additionally attenuated
/// to fade toward black. Out-of-band wavelengths return `(0.0, 0.0, 0.0)`.
pub fn wavelength_to_rgb(wavelength_nm: f64, gamma: f64) -> (f64, f64, f64) {
    let wl = wavelength_nm;

    if (380.0..=440.0).contains(&wl) {
        let attenuation = 0.3 + 0.7 * (wl - 380.0) / (440.0 - 380.0);
        let r = ((-(wl - 440.0) / (440.0 - 380.0)) * attenuation).powf(gamma);
        let b = attenuation.powf(gamma);
        (r, 0.0, b)
    } else if (440.0..=490.0).contains(&wl) {
        let g = ((wl - 440.0) / (490.0 - 440.0)).powf(gamma);
        (0.0, g, 1.0)
    } else if (490.0..=510.0).contains(&wl) {
        let b = ((510.0 - wl) / (510.0 - 490.0)).powf(gamma);
        (0.0, 1.0, b)
    } else if (510.0..=580.0).contains(&wl) {
        let r = ((wl - 510.0) / (580.0 - 510.0)).powf(gamma);
        (r, 1.0, 0.0)
    } else if (580.0..=645.0).contains(&wl) {
        let g = ((645.0 - wl) / (645.0 - 580.0)).powf(gamma);
        (1.0, g, 0.0)
    } else if (645.0..=750.0).contains(&wl) {
        let attenuation = 0.3 + 0.7 * (750.0 - wl) / (750.0 - 645.0);
        (attenuation.powf(gamma), 0.0, 0.0)
    } else {
        (0.0, 0.0, 0.0)
    }
}

/// Convert linear RGB components in 0.0-1.0 to an `RGBColor` for plotters
pub fn rgb_values_to_color(r: f64, g: f64, b: f64) -> RGBColor {
    RGBColor(
        (r * 255.0).clamp(0.0, 255.0) as u8,
        (g * 255.0).clamp(0.0, 255.0) as u8,
        (b * 255.0).clamp(0.0, 255.0) as u8,
    )
}
