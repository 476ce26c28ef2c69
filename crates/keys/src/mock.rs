//! Mock key source for tests
//!
//! Returns canned keypairs so pipeline tests never depend on a local
//! `wg` installation.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::{Keypair, KeypairSource, Result};

/// Key source that always hands out the same keypair
#[derive(Debug, Clone)]
pub struct StaticKeys {
    keypair: Keypair,
}

impl StaticKeys {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// A well-formed keypair built from fixed byte patterns
    pub fn example() -> Self {
        Self::new(Keypair {
            private_key: STANDARD.encode([0x11u8; 32]),
            public_key: STANDARD.encode([0x22u8; 32]),
        })
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

#[async_trait]
impl KeypairSource for StaticKeys {
    async fn generate(&self) -> Result<Keypair> {
        Ok(self.keypair.clone())
    }

    async fn public_key(&self, _private_key: &str) -> Result<String> {
        Ok(self.keypair.public_key.clone())
    }
}
