//! CLI support module
//!
//! Argument definitions live in `main.rs`; this module holds the pieces
//! shared between the binary and tests.

mod logging;

pub use logging::init_logging;
