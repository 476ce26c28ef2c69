use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::{validate_key, KeyError, Keypair, KeypairSource, Result};

/// Keypair source backed by the system `wg` binary
#[derive(Debug, Clone)]
pub struct WgTool {
    binary: String,
}

impl WgTool {
    pub fn new() -> Self {
        Self {
            binary: "wg".to_string(),
        }
    }

    /// Use a non-default `wg` binary
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(&self, subcommand: &str, stdin: Option<&str>) -> Result<String> {
        let mut command = Command::new(&self.binary);
        command
            .arg(subcommand)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn()?;

        if let Some(input) = stdin {
            if let Some(mut handle) = child.stdin.take() {
                handle.write_all(input.as_bytes()).await?;
                handle.write_all(b"\n").await?;
            }
            // Handle dropped here so the tool sees EOF
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(KeyError::ToolFailed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Default for WgTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeypairSource for WgTool {
    async fn generate(&self) -> Result<Keypair> {
        let private_key = self.run("genkey", None).await?;
        validate_key(&private_key)?;
        let public_key = self.public_key(&private_key).await?;
        Ok(Keypair {
            private_key,
            public_key,
        })
    }

    async fn public_key(&self, private_key: &str) -> Result<String> {
        let public_key = self.run("pubkey", Some(private_key)).await?;
        validate_key(&public_key)?;
        Ok(public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_io_error() {
        let tool = WgTool::with_binary("wgforge-test-no-such-binary");
        let err = tool.generate().await.unwrap_err();
        assert!(matches!(err, KeyError::Io(_)));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_failing_tool_reports_status() {
        // `false` ignores the subcommand argument and exits 1
        let tool = WgTool::with_binary("false");
        let err = tool.generate().await.unwrap_err();
        match err {
            KeyError::ToolFailed { status, .. } => assert_eq!(status, 1),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_tool_output_is_validated() {
        // `echo genkey` prints the subcommand, which is not a key
        let tool = WgTool::with_binary("echo");
        let err = tool.generate().await.unwrap_err();
        assert!(matches!(err, KeyError::WrongLength(_)));
    }
}
