//! Type-safe wavelength units for spectrograph calculations
//!
//! The data this crate handles arrives in three different units: reference
//! line catalogs quote angstroms, wavelength solutions work in micrometers,
//! and the perceived-color mapping wants nanometers. This module provides a
//! strongly-typed wavelength using the `uom` crate so the conversions happen
//! in one place instead of as scattered factors of 10.

use uom::si::f64::Length;
use uom::si::length::{angstrom, micrometer, nanometer};

/// Type alias for wavelengths with convenient methods
pub type Wavelength = Length;

/// Extension trait for wavelength conversions used across the crate
pub trait WavelengthExt {
    /// Create a wavelength from angstroms (catalog entries)
    fn from_angstroms(aa: f64) -> Self;

    /// Get the wavelength in angstroms
    fn as_angstroms(&self) -> f64;

    /// Create a wavelength from micrometers (wavelength solutions)
    fn from_micrometers(um: f64) -> Self;

    /// Get the wavelength in micrometers
    fn as_micrometers(&self) -> f64;

    /// Create a wavelength from nanometers (color mapping, labels)
    fn from_nanometers(nm: f64) -> Self;

    /// Get the wavelength in nanometers
    fn as_nanometers(&self) -> f64;
}

impl WavelengthExt for Wavelength {
    fn from_angstroms(aa: f64) -> Self {
        Wavelength::new::<angstrom>(aa)
    }

    fn as_angstroms(&self) -> f64 {
        self.get::<angstrom>()
    }

    fn from_micrometers(um: f64) -> Self {
        Wavelength::new::<micrometer>(um)
    }

    fn as_micrometers(&self) -> f64 {
        self.get::<micrometer>()
    }

    fn from_nanometers(nm: f64) -> Self {
        Wavelength::new::<nanometer>(nm)
    }

    fn as_nanometers(&self) -> f64 {
        self.get::<nanometer>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_angstrom_conversions() {
        // H-alpha as quoted in line catalogs
        let halpha = Wavelength::from_angstroms(6564.8131);
        assert_relative_eq!(halpha.as_angstroms(), 6564.8131, epsilon = 1e-6);
        assert_relative_eq!(halpha.as_micrometers(), 0.65648131, epsilon = 1e-9);
        assert_relative_eq!(halpha.as_nanometers(), 656.48131, epsilon = 1e-6);
    }

    #[test]
    fn test_micrometer_conversions() {
        let wl = Wavelength::from_micrometers(0.55);
        assert_relative_eq!(wl.as_nanometers(), 550.0, epsilon = 1e-9);
        assert_relative_eq!(wl.as_angstroms(), 5500.0, epsilon = 1e-6);
    }

    #[test]
    fn test_nanometer_conversions() {
        let wl = Wavelength::from_nanometers(393.3661);
        assert_relative_eq!(wl.as_angstroms(), 3933.661, epsilon = 1e-6);
        assert_relative_eq!(wl.as_micrometers(), 0.3933661, epsilon = 1e-9);
    }

    #[test]
    fn test_wavelength_ordering() {
        let blue = Wavelength::from_angstroms(3933.6614);
        let green = Wavelength::from_nanometers(550.0);
        let red = Wavelength::from_micrometers(0.6565);
        assert!(blue < green);
        assert!(green < red);
    }
}
