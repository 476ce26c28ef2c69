//! wgforge Remote Shell
//!
//! The remote-execution capability used by provisioning. The seam is the
//! [`RemoteShell`] trait; the production implementation drives the
//! system `ssh` client, and [`mock`] provides a scripted shell for
//! tests.
//!
//! Remote programs communicate results back through `NAME[value]` marker
//! tokens on standard output (see [`token`]); the programs themselves
//! are built from typed requests in [`program`].

mod shell;

pub mod mock;
pub mod program;
pub mod token;

pub use shell::{RemoteError, RemoteOutput, RemoteShell, SshShell};

pub type Result<T> = std::result::Result<T, RemoteError>;
