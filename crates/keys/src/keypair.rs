use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::Result;

/// Textual length of an encoded key (32 bytes, standard base64)
pub const KEY_LEN: usize = 44;

#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Key has length {0}, expected {expected}", expected = KEY_LEN)]
    WrongLength(usize),

    #[error("Key is not base64-encoded 32-byte material")]
    BadEncoding,

    #[error("Key tool exited with status {status}: {stderr}")]
    ToolFailed { status: i32, stderr: String },

    #[error("Failed to run key tool: {0}")]
    Io(#[from] std::io::Error),
}

/// A tunnel keypair in the textual form the `wg` tool prints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keypair {
    pub private_key: String,
    pub public_key: String,
}

/// External capability that produces tunnel keypairs
#[async_trait]
pub trait KeypairSource: Send + Sync {
    /// Generate a fresh keypair
    async fn generate(&self) -> Result<Keypair>;

    /// Compute the public key for an existing private key
    async fn public_key(&self, private_key: &str) -> Result<String>;
}

/// Check that a key is the 44-character base64 encoding of 32 bytes.
///
/// Guards against writing a corrupt key into a configuration file when
/// tool output was mangled in transit.
pub fn validate_key(key: &str) -> Result<()> {
    if key.len() != KEY_LEN {
        return Err(KeyError::WrongLength(key.len()));
    }
    let bytes = STANDARD.decode(key).map_err(|_| KeyError::BadEncoding)?;
    if bytes.len() != 32 {
        return Err(KeyError::BadEncoding);
    }
    Ok(())
}
