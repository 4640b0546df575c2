//! Bridge to the external optical-design tool.
//!
//! The optical model is a running desktop application reached over a
//! request/response transport. Everything downstream of this module only
//! sees the narrow [`OpticalModel`] capability — list the diffraction
//! orders, fetch the spectral-format trace of one order — so the transport
//! never leaks into the layout pipeline.
//!
//! Two implementations are provided:
//!
//! - [`DdeLink`]: a ZeroMQ REQ client exchanging JSON-serialized
//!   [`ModelRequest`]/[`ModelResponse`] messages with the bridge process
//!   that fronts the optical tool's data-exchange interface. Connection
//!   failure is fatal to the run; there is no retry.
//! - [`SyntheticModel`]: an in-memory model that generates plausible
//!   curved traces from a [`Spectrograph`], for tests and offline plots.

use crate::instrument::Spectrograph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Receive/send timeout for the bridge socket. The optical tool answers
/// trace queries well within this; a silent peer means it is not running.
const BRIDGE_TIMEOUT_MS: i32 = 10_000;

/// Errors that can occur talking to the optical model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Bridge socket error: {0}")]
    Socket(#[from] zmq::Error),
    #[error("Bridge message serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Optical model reported an error: {0}")]
    Remote(String),
    #[error("Protocol violation: {0}")]
    Protocol(String),
    #[error("Optical model has no order {0}")]
    UnknownOrder(i32),
}

/// One spectral-format sample: the detector position of a known
/// wavelength within an order. A trace is an ordered run of these along
/// the dispersion direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceSample {
    /// Sample wavelength in micrometers
    pub wavelength_um: f64,
    /// Detector x position in millimeters
    pub x_mm: f64,
    /// Detector y position in millimeters
    pub y_mm: f64,
}

/// Requests understood by the optical-model bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ModelRequest {
    ListOrders,
    GetTrace { order: i32 },
}

/// Replies from the optical-model bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelResponse {
    Orders { orders: Vec<i32> },
    Trace { samples: Vec<TraceSample> },
    Error { message: String },
}

/// The narrow capability the layout pipeline depends on
pub trait OpticalModel {
    /// List the diffraction orders the model traces
    fn list_orders(&mut self) -> Result<Vec<i32>, ModelError>;

    /// Spectral-format samples for one order, ordered along the
    /// dispersion direction (ordering is trusted, not enforced)
    fn get_trace(&mut self, order: i32) -> Result<Vec<TraceSample>, ModelError>;
}

/// Request/response client for the optical tool's data-exchange bridge.
///
/// Holds the socket for the duration of the run; dropping the link closes
/// the socket on every exit path, success or failure.
pub struct DdeLink {
    // The context must outlive the socket or zmq_ctx_term blocks on drop
    _context: zmq::Context,
    socket: zmq::Socket,
}

impl DdeLink {
    /// Connect to the bridge endpoint, e.g. `tcp://127.0.0.1:5555`.
    ///
    /// ZeroMQ connects lazily, so an unreachable bridge surfaces as a
    /// timeout on the first request rather than here.
    pub fn connect(endpoint: &str) -> Result<Self, ModelError> {
        let context = zmq::Context::new();
        let socket = context.socket(zmq::REQ)?;
        socket.set_rcvtimeo(BRIDGE_TIMEOUT_MS)?;
        socket.set_sndtimeo(BRIDGE_TIMEOUT_MS)?;
        socket.set_linger(0)?;
        socket.connect(endpoint)?;
        log::debug!("connected optical-model bridge at {endpoint}");
        Ok(Self {
            _context: context,
            socket,
        })
    }

    fn request(&mut self, request: &ModelRequest) -> Result<ModelResponse, ModelError> {
        let json = serde_json::to_string(request)?;
        self.socket.send(&json, 0)?;
        let reply = self
            .socket
            .recv_string(0)?
            .map_err(|_| ModelError::Protocol("bridge reply was not UTF-8".to_string()))?;
        match serde_json::from_str::<ModelResponse>(&reply)? {
            ModelResponse::Error { message } => Err(ModelError::Remote(message)),
            other => Ok(other),
        }
    }
}

impl OpticalModel for DdeLink {
    fn list_orders(&mut self) -> Result<Vec<i32>, ModelError> {
        match self.request(&ModelRequest::ListOrders)? {
            ModelResponse::Orders { orders } => Ok(orders),
            other => Err(ModelError::Protocol(format!(
                "expected order list, got {other:?}"
            ))),
        }
    }

    fn get_trace(&mut self, order: i32) -> Result<Vec<TraceSample>, ModelError> {
        match self.request(&ModelRequest::GetTrace { order })? {
            ModelResponse::Trace { samples } => Ok(samples),
            other => Err(ModelError::Protocol(format!(
                "expected trace for order {order}, got {other:?}"
            ))),
        }
    }
}

/// In-memory optical model with precomputed traces.
///
/// `new` derives geometry from a spectrograph: within each order the
/// dispersion runs across the detector with the free spectral range
/// spanning most of the width, orders stack along the cross-dispersion
/// axis from red at one edge to blue at the other, and each trace carries
/// a slight quadratic curvature that grows toward the blue, as echelle
/// formats do.
pub struct SyntheticModel {
    orders: Vec<i32>,
    traces: HashMap<i32, Vec<TraceSample>>,
}

impl SyntheticModel {
    /// Fraction of the detector half-width the FSR of an order spans
    const DISPERSION_FILL: f64 = 0.9;
    /// Fraction of the detector half-height the order stack spans
    const CROSS_DISPERSION_FILL: f64 = 0.92;
    /// Peak trace curvature as a fraction of the detector half-width
    const CURVATURE: f64 = 0.03;

    /// Generate traces for every configured order of a spectrograph
    pub fn new(spectrograph: &Spectrograph, samples_per_order: usize) -> Self {
        let orders = spectrograph.orders();
        let half_extent = spectrograph.config().detector.half_extent_mm();
        let n_orders = orders.len().max(2);

        let traces = orders
            .iter()
            .enumerate()
            .map(|(i, &m)| {
                // orders() walks red to blue; spread that run across y
                let t = i as f64 / (n_orders - 1) as f64;
                let y0 = (2.0 * t - 1.0) * Self::CROSS_DISPERSION_FILL * half_extent;

                let center = spectrograph
                    .central_wavelength_um(m)
                    .expect("orders() only yields configured orders");
                let fsr = spectrograph
                    .fsr_um(m)
                    .expect("orders() only yields configured orders");
                let grid = spectrograph
                    .wavelength_grid_um(m, samples_per_order)
                    .expect("orders() only yields configured orders");

                let samples = grid
                    .into_iter()
                    .map(|wl| {
                        let x = (wl - center) / fsr * 2.0 * Self::DISPERSION_FILL * half_extent;
                        let bow = Self::CURVATURE * half_extent * (1.0 + t);
                        let y = y0 + bow * (x / half_extent).powi(2);
                        TraceSample {
                            wavelength_um: wl,
                            x_mm: x,
                            y_mm: y,
                        }
                    })
                    .collect();
                (m, samples)
            })
            .collect();

        Self { orders, traces }
    }

    /// Build a model directly from canned traces (test fixtures)
    pub fn from_traces(traces: Vec<(i32, Vec<TraceSample>)>) -> Self {
        Self {
            orders: traces.iter().map(|(m, _)| *m).collect(),
            traces: traces.into_iter().collect(),
        }
    }
}

impl OpticalModel for SyntheticModel {
    fn list_orders(&mut self) -> Result<Vec<i32>, ModelError> {
        Ok(self.orders.clone())
    }

    fn get_trace(&mut self, order: i32) -> Result<Vec<TraceSample>, ModelError> {
        self.traces
            .get(&order)
            .cloned()
            .ok_or(ModelError::UnknownOrder(order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::{models, Spectrograph};

    #[test]
    fn test_request_wire_format() {
        let json = serde_json::to_string(&ModelRequest::GetTrace { order: -57 }).unwrap();
        assert_eq!(json, r#"{"op":"get_trace","order":-57}"#);
        let json = serde_json::to_string(&ModelRequest::ListOrders).unwrap();
        assert_eq!(json, r#"{"op":"list_orders"}"#);
    }

    #[test]
    fn test_response_wire_format() {
        let reply = r#"{"kind":"trace","samples":[{"wavelength_um":0.55,"x_mm":1.0,"y_mm":-2.0}]}"#;
        let parsed: ModelResponse = serde_json::from_str(reply).unwrap();
        assert_eq!(
            parsed,
            ModelResponse::Trace {
                samples: vec![TraceSample {
                    wavelength_um: 0.55,
                    x_mm: 1.0,
                    y_mm: -2.0
                }]
            }
        );
    }

    #[test]
    fn test_synthetic_orders_match_instrument() {
        let spec = Spectrograph::new(models::TENK_ECHELLE.clone());
        let mut model = SyntheticModel::new(&spec, 11);
        assert_eq!(model.list_orders().unwrap(), spec.orders());
    }

    #[test]
    fn test_synthetic_traces_are_ordered_and_bounded() {
        let spec = Spectrograph::new(models::TENK_ECHELLE.clone());
        let half = spec.config().detector.half_extent_mm();
        let mut model = SyntheticModel::new(&spec, 11);
        for m in model.list_orders().unwrap() {
            let trace = model.get_trace(m).unwrap();
            assert_eq!(trace.len(), 11);
            assert!(trace.windows(2).all(|w| w[0].wavelength_um < w[1].wavelength_um));
            for s in &trace {
                assert!(s.x_mm.abs() < half * 1.5);
                assert!(s.y_mm.abs() < half * 1.5);
            }
        }
    }

    #[test]
    fn test_synthetic_unknown_order() {
        let spec = Spectrograph::new(models::TENK_ECHELLE.clone());
        let mut model = SyntheticModel::new(&spec, 5);
        assert!(matches!(
            model.get_trace(7),
            Err(ModelError::UnknownOrder(7))
        ));
    }

    #[test]
    fn test_from_traces_fixture() {
        let mut model = SyntheticModel::from_traces(vec![(
            1,
            vec![TraceSample {
                wavelength_um: 0.5,
                x_mm: 0.0,
                y_mm: 0.0,
            }],
        )]);
        assert_eq!(model.list_orders().unwrap(), vec![1]);
        assert_eq!(model.get_trace(1).unwrap().len(), 1);
    }
}
