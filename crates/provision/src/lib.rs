//! wgforge Provisioning Pipeline
//!
//! Orchestrates one provisioning run as an explicit
//! read → pure-merge → write sequence:
//!
//! 1. derive stable tunnel addresses from the host identity
//! 2. generate the local keypair
//! 3. read the remote configuration document over the shell seam
//! 4. merge the local peer in with the pure upsert from `wgforge-core`
//! 5. apply the merged document remotely and parse the result tokens
//! 6. emit the matching local configuration artifact
//!
//! Every failure is terminal for the run; there is no retry and no
//! rollback of a remote mutation that already happened.

mod pipeline;

use std::path::PathBuf;

use thiserror::Error;

pub use pipeline::{ProvisionOptions, ProvisionReport, Provisioner};

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Configuration error: {0}")]
    Config(#[from] wgforge_core::WgForgeError),

    #[error("Key error: {0}")]
    Key(#[from] wgforge_keys::KeyError),

    #[error("Remote error: {0}")]
    Remote(#[from] wgforge_remote::RemoteError),

    #[error("Could not decode remote configuration: {0}")]
    DecodeConfig(String),

    #[error("Failed to write local configuration {path:?}: {source}")]
    WriteLocal {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
