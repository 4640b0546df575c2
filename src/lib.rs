//! Echelle spectrograph spectral-format layout and plotting
//!
//! This crate builds labelled echellogram plots: it queries an external
//! optical-design tool (through a narrow request/response bridge) for the
//! trace geometry of each diffraction order, derives per-order wavelength
//! quantities from a spectrograph model, overlays a static catalog of
//! stellar reference lines, and renders the result with annotated order
//! numbers and central wavelengths.
//!
//! The pipeline is a single straight line:
//! [`model::OpticalModel`] → [`layout::EchelleLayout`] → [`render`].

pub mod catalog;
pub mod color;
pub mod instrument;
pub mod layout;
pub mod model;
pub mod render;
pub mod solution;
pub mod units;

// Re-exports for easier access
pub use catalog::{ReferenceLine, STELLAR_LINES};
pub use instrument::{InstrumentConfig, Spectrograph};
pub use layout::{DrawCommand, EchelleLayout};
pub use model::{DdeLink, OpticalModel, SyntheticModel, TraceSample};
pub use render::{render_to_file, RenderConfig};
pub use solution::WavelengthSolution;
