//! # abiscope-engine
//!
//! The decode request interface: `decode(calldata, selector_hint?, contract_hint?)`.
//!
//! `DecodeEngine` wires the selector index to the EVM decoder and
//! disambiguator, refuses oversized inputs, fans batches out over rayon and
//! hot-swaps the index on reload.
//!
//! ```ignore
//! let engine = DecodeEngine::from_config(EngineConfig::from_path("abiscope.yaml".as_ref())?)?;
//! for candidate in engine.decode(&calldata, None, Some("ERC20"))? {
//!     println!("{}", candidate.call.summary());
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod request;

pub use config::EngineConfig;
pub use engine::DecodeEngine;
pub use error::{ConfigError, EngineError};
pub use request::DecodeRequest;
