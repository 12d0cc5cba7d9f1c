//! `proximity-analysis` library crate.
//!
//! The binary (`proxi`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the analysis can be driven from other front-ends
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod cli;
pub mod config;
pub mod derive;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
