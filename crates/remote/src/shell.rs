use std::process::Stdio;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use wgforge_core::HostSpec;

use crate::Result;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Remote execution failed with status {status}")]
    CommandFailed { status: i32, output: String },

    #[error("Marker token {0}[...] not found in remote output")]
    TokenMissing(String),

    #[error("Failed to launch remote shell: {0}")]
    Launch(#[from] std::io::Error),
}

/// Captured result of a completed remote program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOutput {
    pub stdout: String,
    pub status: i32,
}

/// Capability to run a program on a remote host with root privileges.
///
/// Implementations await the program to completion; no timeout is
/// applied here, so a hung remote side blocks the caller.
#[async_trait]
pub trait RemoteShell: Send + Sync {
    /// Run `program` on `host`, returning captured standard output.
    /// A non-zero exit reports as [`RemoteError::CommandFailed`] with
    /// the captured output attached.
    async fn run(&self, host: &HostSpec, program: &str) -> Result<RemoteOutput>;
}

#[async_trait]
impl<T: RemoteShell + ?Sized> RemoteShell for &T {
    async fn run(&self, host: &HostSpec, program: &str) -> Result<RemoteOutput> {
        (**self).run(host, program).await
    }
}

/// Remote shell backed by the system `ssh` client.
///
/// The program travels base64-encoded inside the command line and is
/// decoded into `sudo sh` on the far side, so its contents never pass
/// through remote shell quoting. `-t` keeps a tty for sudo prompts;
/// standard error stays attached to the operator's terminal.
#[derive(Debug, Clone)]
pub struct SshShell {
    binary: String,
    extra_args: Vec<String>,
}

impl SshShell {
    pub fn new() -> Self {
        Self {
            binary: "ssh".to_string(),
            extra_args: Vec::new(),
        }
    }

    /// Use a non-default ssh binary
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            extra_args: Vec::new(),
        }
    }

    /// Extra arguments inserted before the target (e.g. `-p 2222`)
    pub fn extra_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.extra_args.extend(args);
        self
    }
}

impl Default for SshShell {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteShell for SshShell {
    async fn run(&self, host: &HostSpec, program: &str) -> Result<RemoteOutput> {
        let payload = STANDARD.encode(program);
        let command_line = format!("echo {} | base64 -d | sudo sh", payload);

        debug!("Running {}-byte remote program on {}", program.len(), host);

        let output = Command::new(&self.binary)
            .arg("-t")
            .args(&self.extra_args)
            .arg(host.identity())
            .arg(command_line)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let status = output.status.code().unwrap_or(-1);

        if !output.status.success() {
            return Err(RemoteError::CommandFailed {
                status,
                output: stdout,
            });
        }

        Ok(RemoteOutput { stdout, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_command_failed() {
        let err = RemoteError::CommandFailed {
            status: 255,
            output: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "Remote execution failed with status 255");
    }

    #[test]
    fn test_error_display_token_missing() {
        let err = RemoteError::TokenMissing("PUBLIC_KEY".to_string());
        assert_eq!(
            err.to_string(),
            "Marker token PUBLIC_KEY[...] not found in remote output"
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_launch_error() {
        let shell = SshShell::with_binary("wgforge-test-no-such-binary");
        let host = HostSpec::parse("vpn.example.net").unwrap();
        let err = shell.run(&host, "true").await.unwrap_err();
        assert!(matches!(err, RemoteError::Launch(_)));
    }
}
