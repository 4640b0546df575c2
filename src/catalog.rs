//! Static catalog of reference stellar spectral lines
//!
//! Wavelengths are quoted in angstroms, as is conventional for optical
//! line lists. The catalog is defined at process start and never mutated;
//! lines whose wavelength falls outside every order's covered range are
//! simply skipped during layout.

use crate::units::{Wavelength, WavelengthExt};
use once_cell::sync::Lazy;

/// A single reference spectral line: element/ion label plus wavelength
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceLine {
    /// Short element/ion label drawn next to the marker
    pub label: &'static str,
    /// Line wavelength in angstroms
    pub wavelength_angstrom: f64,
}

impl ReferenceLine {
    pub const fn new(label: &'static str, wavelength_angstrom: f64) -> Self {
        Self {
            label,
            wavelength_angstrom,
        }
    }

    /// Line wavelength in micrometers, the unit wavelength solutions use
    pub fn wavelength_um(&self) -> f64 {
        Wavelength::from_angstroms(self.wavelength_angstrom).as_micrometers()
    }
}

/// Stellar lines of interest for annotating an echellogram
pub static STELLAR_LINES: Lazy<Vec<ReferenceLine>> = Lazy::new(|| {
    vec![
        // Balmer lines of hydrogen
        ReferenceLine::new("Hα", 6564.8131),
        ReferenceLine::new("Hβ", 4863.3582),
        ReferenceLine::new("Hγ", 4341.2202),
        ReferenceLine::new("Hδ", 4101.7103),
        // Sodium
        ReferenceLine::new("Na D1", 5895.92),
        ReferenceLine::new("Na D2", 5889.95),
        ReferenceLine::new("Na I 8191", 8191.2515),
        // Silicon triplet
        ReferenceLine::new("Si III 4553", 4552.622),
        ReferenceLine::new("Si III 4568", 4567.840),
        ReferenceLine::new("Si III 4575", 4574.757),
        // Calcium
        ReferenceLine::new("Ca I 4227", 4226.7270),
        ReferenceLine::new("Ca I 6164", 6164.2055),
        // Ca II H & K
        ReferenceLine::new("Ca II K", 3933.6614),
        ReferenceLine::new("Ca II H", 3968.4673),
        // Ca II infrared triplet
        ReferenceLine::new("Ca II 8498", 8498.02),
        ReferenceLine::new("Ca II 8542", 8542.09),
        ReferenceLine::new("Ca II 8662", 8662.140),
        // Iron
        ReferenceLine::new("Fe I 4385", 4384.8318),
        ReferenceLine::new("Fe I 4406", 4406.0371),
        ReferenceLine::new("Fe I 8691", 8691.3867),
        ReferenceLine::new("FeH", 9940.0),
        // Helium D3
        ReferenceLine::new("He I D3", 5875.618),
        ReferenceLine::new("Mg I 5174", 5174.141),
        // Rubidium
        ReferenceLine::new("Rb 7930", 7929.781),
        ReferenceLine::new("Rb 7970", 7969.7918),
        // CaH molecular bands
        ReferenceLine::new("CaH 6832", 6831.862),
        ReferenceLine::new("CaH 6977", 6976.9239),
    ]
});
