//! Signal-distance model fitting.
//!
//! Responsibilities:
//!
//! - select usable `(distance, rssi)` pairs
//! - fit the linear and log-distance models
//! - derive the path-loss exponent and its environment label
//! - score the theoretical free-space curve against the observations

pub mod fitter;

pub use fitter::*;
