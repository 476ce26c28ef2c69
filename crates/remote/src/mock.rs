//! Mock remote shell for tests
//!
//! Plays back scripted responses in order and records every program it
//! was asked to run, so pipeline tests can assert on the remote
//! conversation without a network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use wgforge_core::HostSpec;

use crate::{RemoteError, RemoteOutput, RemoteShell, Result};

#[derive(Debug)]
enum Response {
    Output(String),
    Failure { status: i32, output: String },
}

/// Scripted remote shell
#[derive(Debug, Default)]
pub struct MockShell {
    responses: Mutex<VecDeque<Response>>,
    programs: Mutex<Vec<String>>,
}

impl MockShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response with the given standard output
    pub fn push_output(&self, stdout: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Response::Output(stdout.into()));
    }

    /// Queue a failed execution
    pub fn push_failure(&self, status: i32, output: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Response::Failure {
            status,
            output: output.into(),
        });
    }

    /// Programs run so far, in order
    pub fn programs(&self) -> Vec<String> {
        self.programs.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteShell for MockShell {
    async fn run(&self, _host: &HostSpec, program: &str) -> Result<RemoteOutput> {
        self.programs.lock().unwrap().push(program.to_string());

        match self.responses.lock().unwrap().pop_front() {
            Some(Response::Output(stdout)) => Ok(RemoteOutput { stdout, status: 0 }),
            Some(Response::Failure { status, output }) => {
                Err(RemoteError::CommandFailed { status, output })
            }
            None => Ok(RemoteOutput {
                stdout: String::new(),
                status: 0,
            }),
        }
    }
}
