//! Reporting: the Markdown analysis report and formatted terminal output.

pub mod format;
pub mod markdown;

pub use format::*;
pub use markdown::*;
