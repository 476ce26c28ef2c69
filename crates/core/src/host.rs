//! Remote host specifier

use std::fmt;
use std::str::FromStr;

use crate::{Result, WgForgeError};

/// A remote host given as `user@host` or bare `host`.
///
/// The full specifier as typed is the identity that addresses derive
/// from; the hostname portion names the SSH target, the tunnel endpoint,
/// and the local configuration artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSpec {
    pub user: Option<String>,
    pub host: String,
}

impl HostSpec {
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        let (user, host) = match spec.rsplit_once('@') {
            Some((user, host)) => (Some(user.to_string()), host.to_string()),
            None => (None, spec.to_string()),
        };
        if host.is_empty() || matches!(user.as_deref(), Some("")) {
            return Err(WgForgeError::InvalidHostSpec(spec.to_string()));
        }
        Ok(Self { user, host })
    }

    /// The specifier as typed, used as the address-derivation identity
    pub fn identity(&self) -> String {
        match &self.user {
            Some(user) => format!("{}@{}", user, self.host),
            None => self.host.clone(),
        }
    }

    /// Tunnel endpoint in `host:port` form
    pub fn endpoint(&self, port: u16) -> String {
        format!("{}:{}", self.host, port)
    }
}

impl fmt::Display for HostSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identity())
    }
}

impl FromStr for HostSpec {
    type Err = WgForgeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_and_host() {
        let spec = HostSpec::parse("ops@vpn.example.net").unwrap();
        assert_eq!(spec.user.as_deref(), Some("ops"));
        assert_eq!(spec.host, "vpn.example.net");
        assert_eq!(spec.identity(), "ops@vpn.example.net");
    }

    #[test]
    fn test_parse_bare_host() {
        let spec = HostSpec::parse("vpn.example.net").unwrap();
        assert_eq!(spec.user, None);
        assert_eq!(spec.identity(), "vpn.example.net");
    }

    #[test]
    fn test_parse_splits_at_last_at() {
        let spec = HostSpec::parse("user@dept@vpn.example.net").unwrap();
        assert_eq!(spec.user.as_deref(), Some("user@dept"));
        assert_eq!(spec.host, "vpn.example.net");
    }

    #[test]
    fn test_parse_rejects_empty_parts() {
        assert!(HostSpec::parse("").is_err());
        assert!(HostSpec::parse("ops@").is_err());
        assert!(HostSpec::parse("@vpn.example.net").is_err());
    }

    #[test]
    fn test_endpoint() {
        let spec = HostSpec::parse("ops@vpn.example.net").unwrap();
        assert_eq!(spec.endpoint(51232), "vpn.example.net:51232");
    }

    #[test]
    fn test_display_round_trips() {
        let spec: HostSpec = "ops@vpn.example.net".parse().unwrap();
        assert_eq!(spec.to_string(), "ops@vpn.example.net");
    }
}
