//! Per-order wavelength solutions
//!
//! A [`WavelengthSolution`] maps wavelength to detector position for a
//! single diffraction order. It is built from the spectral-format samples
//! the optical model returns for that order and evaluated by piecewise
//! linear interpolation with a binary search over the sampled wavelengths.
//! Queries outside the sampled range return `None`; the layout layer
//! silently skips those reference lines.

use crate::model::TraceSample;
use thiserror::Error;

/// Errors that can occur while building a wavelength solution
#[derive(Debug, Error)]
pub enum SolutionError {
    #[error("At least 2 trace samples are required, got {0}")]
    InsufficientSamples(usize),
    #[error("Trace sample wavelengths must be strictly monotonic")]
    NonMonotonic,
}

/// Wavelength-to-detector-position mapping for one order.
///
/// Samples are stored ascending in wavelength regardless of the order's
/// sign convention; negative-order instruments deliver their spectral
/// format with wavelengths descending and are reversed on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct WavelengthSolution {
    wavelengths_um: Vec<f64>,
    positions_mm: Vec<(f64, f64)>,
}

impl WavelengthSolution {
    /// Build a solution from an order's spectral-format samples
    pub fn from_samples(samples: &[TraceSample]) -> Result<Self, SolutionError> {
        if samples.len() < 2 {
            return Err(SolutionError::InsufficientSamples(samples.len()));
        }

        let ascending = samples.windows(2).all(|w| w[0].wavelength_um < w[1].wavelength_um);
        let descending = samples.windows(2).all(|w| w[0].wavelength_um > w[1].wavelength_um);
        if !ascending && !descending {
            return Err(SolutionError::NonMonotonic);
        }

        let ordered: Vec<&TraceSample> = if ascending {
            samples.iter().collect()
        } else {
            samples.iter().rev().collect()
        };

        Ok(Self {
            wavelengths_um: ordered.iter().map(|s| s.wavelength_um).collect(),
            positions_mm: ordered.iter().map(|s| (s.x_mm, s.y_mm)).collect(),
        })
    }

    /// Shortest sampled wavelength in micrometers
    pub fn min_wavelength_um(&self) -> f64 {
        self.wavelengths_um[0]
    }

    /// Longest sampled wavelength in micrometers
    pub fn max_wavelength_um(&self) -> f64 {
        *self.wavelengths_um.last().expect("non-empty by construction")
    }

    /// Whether a wavelength lies inside the sampled range
    pub fn covers(&self, wavelength_um: f64) -> bool {
        wavelength_um >= self.min_wavelength_um() && wavelength_um <= self.max_wavelength_um()
    }

    /// Detector position for a wavelength, or `None` outside the sampled
    /// range. Interpolates linearly between the bracketing samples.
    pub fn position_at(&self, wavelength_um: f64) -> Option<(f64, f64)> {
        if !self.covers(wavelength_um) {
            return None;
        }

        let idx = match self
            .wavelengths_um
            .binary_search_by(|w| w.partial_cmp(&wavelength_um).expect("finite wavelengths"))
        {
            Ok(i) => return Some(self.positions_mm[i]),
            Err(i) => i,
        };

        // covers() guarantees a bracketing interval
        let (w0, w1) = (self.wavelengths_um[idx - 1], self.wavelengths_um[idx]);
        let (p0, p1) = (self.positions_mm[idx - 1], self.positions_mm[idx]);
        let t = (wavelength_um - w0) / (w1 - w0);
        Some((p0.0 + t * (p1.0 - p0.0), p0.1 + t * (p1.1 - p0.1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(wavelength_um: f64, x_mm: f64, y_mm: f64) -> TraceSample {
        TraceSample {
            wavelength_um,
            x_mm,
            y_mm,
        }
    }

    #[test]
    fn test_requires_two_samples() {
        assert!(matches!(
            WavelengthSolution::from_samples(&[]),
            Err(SolutionError::InsufficientSamples(0))
        ));
        assert!(matches!(
            WavelengthSolution::from_samples(&[sample(0.5, 0.0, 0.0)]),
            Err(SolutionError::InsufficientSamples(1))
        ));
    }

    #[test]
    fn test_rejects_non_monotonic() {
        let samples = [
            sample(0.50, 0.0, 0.0),
            sample(0.52, 1.0, 0.0),
            sample(0.51, 2.0, 0.0),
        ];
        assert!(matches!(
            WavelengthSolution::from_samples(&samples),
            Err(SolutionError::NonMonotonic)
        ));
    }

    #[test]
    fn test_interpolation_midpoint() {
        let samples = [sample(0.50, -10.0, 2.0), sample(0.52, 10.0, 4.0)];
        let sol = WavelengthSolution::from_samples(&samples).unwrap();
        let (x, y) = sol.position_at(0.51).unwrap();
        assert!((x - 0.0).abs() < 1e-12);
        assert!((y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_exact_sample_hit() {
        let samples = [
            sample(0.50, -10.0, 2.0),
            sample(0.51, 0.0, 3.0),
            sample(0.52, 10.0, 4.0),
        ];
        let sol = WavelengthSolution::from_samples(&samples).unwrap();
        assert_eq!(sol.position_at(0.51), Some((0.0, 3.0)));
        assert_eq!(sol.position_at(0.50), Some((-10.0, 2.0)));
        assert_eq!(sol.position_at(0.52), Some((10.0, 4.0)));
    }

    #[test]
    fn test_out_of_range_is_none() {
        let samples = [sample(0.50, -10.0, 0.0), sample(0.52, 10.0, 0.0)];
        let sol = WavelengthSolution::from_samples(&samples).unwrap();
        assert_eq!(sol.position_at(0.49), None);
        assert_eq!(sol.position_at(0.53), None);
    }

    #[test]
    fn test_descending_input_normalized() {
        // Negative-order conventions deliver the format red-to-blue
        let samples = [sample(0.52, 10.0, 4.0), sample(0.50, -10.0, 2.0)];
        let sol = WavelengthSolution::from_samples(&samples).unwrap();
        assert_eq!(sol.min_wavelength_um(), 0.50);
        assert_eq!(sol.max_wavelength_um(), 0.52);
        let (x, _) = sol.position_at(0.51).unwrap();
        assert!((x - 0.0).abs() < 1e-12);
    }
}
