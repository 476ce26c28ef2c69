//! Bracketed output-token protocol
//!
//! Remote programs report structured results by printing `NAME[value]`
//! markers on standard output, interleaved with whatever other output
//! the remote side produces. Extraction failures are explicit errors,
//! never panics.

use crate::{RemoteError, Result};

/// Extract the value of a required `name[value]` marker
pub fn extract(output: &str, name: &str) -> Result<String> {
    try_extract(output, name).ok_or_else(|| RemoteError::TokenMissing(name.to_string()))
}

/// Extract the value of an optional marker
pub fn try_extract(output: &str, name: &str) -> Option<String> {
    let marker = format!("{}[", name);
    let start = output.find(&marker)? + marker.len();
    let end = output[start..].find(']')? + start;
    Some(output[start..end].to_string())
}
