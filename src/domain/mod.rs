//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw proximity observations (`ContactRecord`)
//! - the numeric field catalogue (`Field`)
//! - distance bands and display categories
//! - descriptive labels attached to computed statistics

pub mod labels;
pub mod types;

pub use labels::*;
pub use types::*;
