//! Tunnel configuration document model
//!
//! A configuration file is one `[Interface]` section followed by zero or
//! more `[Peer]` sections. Within a section every meaningful line is a
//! `key = value` pair; anything without an `=` (headers, blanks) carries
//! no data and is skipped on parse.

use crate::{Result, WgForgeError};

/// Section marker separating peer blocks
pub const PEER_HEADER: &str = "[Peer]";

/// Header of the single interface block
pub const INTERFACE_HEADER: &str = "[Interface]";

/// Interface/peer setting names
pub const KEY_ADDRESS: &str = "Address";
pub const KEY_LISTEN_PORT: &str = "ListenPort";
pub const KEY_PRIVATE_KEY: &str = "PrivateKey";
pub const KEY_PUBLIC_KEY: &str = "PublicKey";
pub const KEY_ALLOWED_IPS: &str = "AllowedIPs";
pub const KEY_ENDPOINT: &str = "Endpoint";

/// Ordered `key = value` pairs of one configuration section.
///
/// Insertion order is preserved through render, so a parsed file that is
/// merged and written back keeps its settings where the operator put them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pairs: Vec<(String, String)>,
}

impl Block {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Parse one section body. `#` and `;` start a comment; lines
    /// without `=` are skipped; key and value are trimmed around the
    /// first `=`.
    pub fn parse(text: &str) -> Self {
        let pairs = text
            .lines()
            .filter_map(|line| {
                let line = line.split(['#', ';']).next().unwrap_or_default();
                let (key, value) = line.split_once('=')?;
                Some((key.trim().to_string(), value.trim().to_string()))
            })
            .filter(|(key, _)| !key.is_empty())
            .collect();
        Self { pairs }
    }

    /// Look up a setting by name
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Look up a setting that must be present
    pub fn require(&self, section: &str, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| WgForgeError::FieldMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
    }

    /// Set a value, replacing an existing pair in place or appending
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate pairs in insertion order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as `key = value` lines (no trailing newline)
    pub fn render(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{} = {}", k, v))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl FromIterator<(String, String)> for Block {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

/// One interface block plus its ordered peer blocks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    pub interface: Block,
    pub peers: Vec<Block>,
}

impl ConfigDocument {
    /// Parse a configuration file body by splitting on the peer marker.
    /// The chunk before the first marker is the interface section.
    pub fn parse(text: &str) -> Self {
        let mut chunks = text.split(PEER_HEADER);
        let interface = Block::parse(chunks.next().unwrap_or_default());
        let peers = chunks
            .map(Block::parse)
            .filter(|block| !block.is_empty())
            .collect();
        Self { interface, peers }
    }

    /// Render the full document, blocks separated by a blank line and
    /// the peer marker, with a trailing newline.
    pub fn render(&self) -> String {
        let mut out = String::from(INTERFACE_HEADER);
        out.push('\n');
        out.push_str(&self.interface.render());
        for peer in &self.peers {
            out.push_str("\n\n");
            out.push_str(PEER_HEADER);
            out.push('\n');
            out.push_str(&peer.render());
        }
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> &'static str {
        "[Interface]\n\
         Address = 10.203.5.9\n\
         ListenPort = 51232\n\
         PrivateKey = iface-private\n\
         \n\
         [Peer]\n\
         PublicKey = peer-one\n\
         AllowedIPs = 10.202.5.9/32\n\
         \n\
         [Peer]\n\
         PublicKey = peer-two\n\
         AllowedIPs = 10.202.7.13/32\n\
         Endpoint = example.net:51232\n"
    }

    #[test]
    fn test_block_parse_trims_and_skips() {
        let block = Block::parse("  Address =  10.0.0.1 \nnot a pair\n\nListenPort= 51232");
        assert_eq!(block.get("Address"), Some("10.0.0.1"));
        assert_eq!(block.get("ListenPort"), Some("51232"));
        assert_eq!(block.pairs().count(), 2);
    }

    #[test]
    fn test_block_parse_strips_comments() {
        let block = Block::parse(
            "# full-line comment\nAddress = 10.0.0.1 ; trailing comment\n; ListenPort = 51232\n",
        );
        assert_eq!(block.get("Address"), Some("10.0.0.1"));
        assert_eq!(block.get("ListenPort"), None);
        assert_eq!(block.pairs().count(), 1);
    }

    #[test]
    fn test_block_parse_splits_on_first_equals() {
        // Key material is base64 and may itself end with '='
        let block = Block::parse("PrivateKey = AbCd==\n");
        assert_eq!(block.get("PrivateKey"), Some("AbCd=="));
    }

    #[test]
    fn test_block_set_replaces_in_place() {
        let mut block = Block::parse("Address = 10.0.0.1\nListenPort = 51232");
        block.set("Address", "10.0.0.2");
        assert_eq!(block.get("Address"), Some("10.0.0.2"));
        let first = block.pairs().next().unwrap();
        assert_eq!(first, ("Address", "10.0.0.2"));
    }

    #[test]
    fn test_block_require_missing() {
        let block = Block::new();
        let err = block.require("Interface", KEY_ADDRESS).unwrap_err();
        assert_eq!(err.to_string(), "Missing Address in [Interface] section");
    }

    #[test]
    fn test_document_parse_sections() {
        let doc = ConfigDocument::parse(sample());
        assert_eq!(doc.interface.get(KEY_ADDRESS), Some("10.203.5.9"));
        assert_eq!(doc.peers.len(), 2);
        assert_eq!(doc.peers[0].get(KEY_PUBLIC_KEY), Some("peer-one"));
        assert_eq!(doc.peers[1].get(KEY_ENDPOINT), Some("example.net:51232"));
    }

    #[test]
    fn test_document_parse_interface_only() {
        let doc = ConfigDocument::parse("[Interface]\nAddress = 10.203.1.1\n");
        assert_eq!(doc.peers.len(), 0);
        assert_eq!(doc.interface.get(KEY_ADDRESS), Some("10.203.1.1"));
    }

    #[test]
    fn test_document_round_trip() {
        let doc = ConfigDocument::parse(sample());
        let reparsed = ConfigDocument::parse(&doc.render());
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn test_document_render_layout() {
        let doc = ConfigDocument::parse(sample());
        let text = doc.render();
        assert!(text.starts_with("[Interface]\nAddress = 10.203.5.9\n"));
        assert_eq!(text.matches(PEER_HEADER).count(), 2);
        assert!(text.contains("\n\n[Peer]\nPublicKey = peer-one\n"));
        assert!(text.ends_with("Endpoint = example.net:51232\n"));
    }

    #[test]
    fn test_document_parse_empty() {
        let doc = ConfigDocument::parse("");
        assert!(doc.interface.is_empty());
        assert!(doc.peers.is_empty());
    }
}
