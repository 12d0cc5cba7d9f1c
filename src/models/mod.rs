//! Signal propagation models.
//!
//! Models are small, pure functions of distance so that the fitter, the
//! derived-metric pass and the renderers share one implementation.

pub mod model;

pub use model::*;
