//! # abiscope-observability
//!
//! Logging setup shared by abiscope binaries and tests.
//!
//! Every crate logs through `tracing`; this crate only installs the
//! subscriber. Component names follow crate names, so
//! `abiscope-index = "debug"` turns on per-record build logs while the
//! rest stays at the global level.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, try_init_tracing, LogConfig};
