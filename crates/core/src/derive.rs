//! Deterministic address derivation
//!
//! Maps a host identity string to a stable pair of address octets so that
//! repeated provisioning runs for the same identity converge on the same
//! tunnel addresses instead of colliding with unrelated tunnels. This is
//! a usability heuristic, not a security property: distinct identities
//! may rarely collide.

use sha1::{Digest, Sha1};

/// Octets appended to a network prefix by [`derive_address`]
pub const DERIVED_OCTETS: usize = 2;

/// Derive `count` address octets from an identity string.
///
/// The first 32 bits of the identity's SHA-1 digest form an unsigned
/// integer `v`. The terminal octet is `v % 255`, so a derived address
/// never ends in the reserved 255. The remaining octets are the
/// successive low bytes of `v / 255`, ordered most significant first.
pub fn derive_octets(identity: &str, count: usize) -> Vec<u8> {
    if count == 0 {
        return Vec::new();
    }

    let digest = Sha1::digest(identity.as_bytes());
    let mut v = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);

    let mut octets = Vec::with_capacity(count);
    octets.push((v % 255) as u8);
    v /= 255;
    for _ in 1..count {
        octets.push((v & 0xff) as u8);
        v >>= 8;
    }
    octets.reverse();
    octets
}

/// Join a two-octet derivation onto a dotted network prefix, e.g.
/// prefix `10.202` and identity `ops@vpn.example.net` give `10.202.x.y`.
pub fn derive_address(prefix: &str, identity: &str) -> String {
    let octets = derive_octets(identity, DERIVED_OCTETS);
    format!("{}.{}.{}", prefix, octets[0], octets[1])
}
