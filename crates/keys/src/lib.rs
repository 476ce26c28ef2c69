//! wgforge Keys
//!
//! Keypair acquisition for tunnel provisioning. wgforge never implements
//! key cryptography itself; keys come from the external `wg` tool and
//! are handled as the 44-character base64 text it prints.
//!
//! ## Features
//!
//! - [`KeypairSource`] trait seam for key generation
//! - [`WgTool`] implementation backed by `wg genkey` / `wg pubkey`
//! - Key-format validation (length and encoding)
//! - [`mock`] key source for tests

mod keypair;
mod tool;

pub mod mock;

pub use keypair::{validate_key, KeyError, Keypair, KeypairSource, KEY_LEN};
pub use tool::WgTool;

pub type Result<T> = std::result::Result<T, KeyError>;
