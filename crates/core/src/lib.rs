//! wgforge Core
//!
//! This crate defines the tunnel configuration document model, the pure
//! peer-merge algorithm, and deterministic address derivation used
//! throughout wgforge.

mod derive;
mod document;
mod error;
mod host;
mod merge;

pub use derive::*;
pub use document::*;
pub use error::*;
pub use host::*;
pub use merge::*;
