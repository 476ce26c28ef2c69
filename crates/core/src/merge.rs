//! Idempotent peer upsert
//!
//! The merge is a pure function over parsed documents: the caller reads
//! the remote file, merges locally, and writes the result back. It never
//! touches the filesystem or the network.

use crate::document::{
    Block, ConfigDocument, KEY_ADDRESS, KEY_ALLOWED_IPS, KEY_LISTEN_PORT, KEY_PRIVATE_KEY,
    KEY_PUBLIC_KEY,
};
use crate::{Result, WgForgeError};

/// Interface settings used when no document exists yet
#[derive(Debug, Clone)]
pub struct InterfaceDefaults {
    pub address: String,
    pub listen_port: u16,
    pub private_key: String,
}

impl InterfaceDefaults {
    fn to_block(&self) -> Block {
        let mut block = Block::new();
        block.set(KEY_ADDRESS, self.address.clone());
        block.set(KEY_LISTEN_PORT, self.listen_port.to_string());
        block.set(KEY_PRIVATE_KEY, self.private_key.clone());
        block
    }
}

/// Upsert `new_peer` into `existing`.
///
/// A fresh document is synthesized from `defaults` when none exists.
/// When `expected_address` is given, the existing interface must already
/// carry that address; the merge refuses to silently repoint a live
/// tunnel. With `expected_address` absent the existing address is
/// adopted as authoritative.
///
/// Existing peers matching the new peer on `PublicKey` or on
/// `AllowedIPs` are removed before the new peer is appended; either
/// field alone identifies the same local identity, and either may have
/// changed independently since the last run. The result holds at most
/// one peer per identity.
pub fn merge(
    existing: Option<ConfigDocument>,
    new_peer: Block,
    defaults: &InterfaceDefaults,
    expected_address: Option<&str>,
) -> Result<ConfigDocument> {
    let (interface, peers) = match existing {
        Some(doc) => {
            if let Some(expected) = expected_address {
                let found = doc.interface.require("Interface", KEY_ADDRESS)?;
                if found != expected {
                    return Err(WgForgeError::ConfigMismatch {
                        expected: expected.to_string(),
                        found: found.to_string(),
                    });
                }
            }
            (doc.interface, doc.peers)
        }
        None => (defaults.to_block(), Vec::new()),
    };

    let public_key = new_peer.get(KEY_PUBLIC_KEY).map(str::to_owned);
    let allowed_ips = new_peer.get(KEY_ALLOWED_IPS).map(str::to_owned);

    let mut peers: Vec<Block> = peers
        .into_iter()
        .filter(|peer| {
            let same_key =
                public_key.is_some() && peer.get(KEY_PUBLIC_KEY) == public_key.as_deref();
            let same_net =
                allowed_ips.is_some() && peer.get(KEY_ALLOWED_IPS) == allowed_ips.as_deref();
            !same_key && !same_net
        })
        .collect();
    peers.push(new_peer);

    Ok(ConfigDocument { interface, peers })
}
