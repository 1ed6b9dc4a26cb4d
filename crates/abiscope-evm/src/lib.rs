//! # abiscope-evm
//!
//! EVM calldata decoding for abiscope: given candidate ABI entries from the
//! selector index, decode, validate and rank them.
//!
//! ## Implementation notes
//! - The ABI tuple walk lives in `walker`: non-canonical words (dirty
//!   padding, oversized offsets) are rejected and every error carries a
//!   field path and an absolute byte position
//! - `alloy_core::dyn_abi` supplies type parsing, `DynSolValue` and encoding
//! - Values are normalized into `abiscope_core::NormalizedValue`

pub mod decoder;
pub mod disambiguator;
pub mod encoder;
pub mod event;
pub mod normalizer;
mod walker;

pub use decoder::{decode, decode_error_data, static_head_size};
pub use disambiguator::resolve;
pub use encoder::{encode_args, encode_call};
pub use event::decode_log;
pub use normalizer::normalize;
