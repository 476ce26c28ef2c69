use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, info};

use wgforge_core::{
    derive_address, merge, Block, ConfigDocument, HostSpec, InterfaceDefaults, KEY_ADDRESS,
    KEY_ALLOWED_IPS, KEY_ENDPOINT, KEY_PRIVATE_KEY, KEY_PUBLIC_KEY,
};
use wgforge_keys::{validate_key, Keypair, KeypairSource};
use wgforge_remote::program::{
    self, ApplyRequest, TOKEN_CONFIG, TOKEN_CONFIG_ABSENT, TOKEN_PUBLIC_KEY, TOKEN_REMOTE_IP,
};
use wgforge_remote::{token, RemoteShell};
use wgforge_settings::Settings;

use crate::{ProvisionError, Result};

/// Per-run options
#[derive(Debug, Clone)]
pub struct ProvisionOptions {
    /// Adopt whatever interface address the remote document already
    /// carries instead of requiring the derived one
    pub adopt_address: bool,

    /// Directory the local artifact is written into
    pub output_dir: PathBuf,
}

impl Default for ProvisionOptions {
    fn default() -> Self {
        Self {
            adopt_address: false,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Outcome of a completed provisioning run
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub host: String,
    pub local_address: String,
    pub remote_address: String,
    pub remote_public_key: String,
    /// Path of the local configuration artifact
    pub config_path: PathBuf,
    /// Whether this run created the remote interface
    pub created_interface: bool,
}

/// One provisioning engine over the two collaborator seams
pub struct Provisioner<S, K> {
    shell: S,
    keys: K,
    settings: Settings,
}

impl<S: RemoteShell, K: KeypairSource> Provisioner<S, K> {
    pub fn new(shell: S, keys: K, settings: Settings) -> Self {
        Self {
            shell,
            keys,
            settings,
        }
    }

    /// Provision a tunnel to `host` and emit the local artifact.
    ///
    /// The local file is only written after the remote side reported a
    /// valid public key; a failed run leaves no local artifact behind.
    pub async fn provision(
        &self,
        host: &HostSpec,
        options: &ProvisionOptions,
    ) -> Result<ProvisionReport> {
        let identity = host.identity();
        let local_address = derive_address(&self.settings.addressing.local_prefix, &identity);
        let remote_address = derive_address(&self.settings.addressing.remote_prefix, &identity);
        info!(
            "Derived tunnel addresses for {}: {} (local) / {} (remote)",
            host, local_address, remote_address
        );

        let local_keys = self.keys.generate().await?;

        let existing = self.fetch_remote_document(host).await?;
        let created_interface = existing.is_none();
        if created_interface {
            info!("No tunnel configuration on {}, creating one", host);
        } else {
            info!("Merging into existing tunnel configuration on {}", host);
        }

        // The defaults are only read by the merge when no document
        // exists, so the interface key is fetched just for that case.
        let interface_key = match existing {
            Some(_) => None,
            None => Some(self.remote_private_key(host).await?),
        };
        let defaults = InterfaceDefaults {
            address: remote_address.clone(),
            listen_port: self.settings.addressing.listen_port,
            private_key: interface_key.unwrap_or_default(),
        };

        let expected_address = if options.adopt_address {
            None
        } else {
            Some(remote_address.as_str())
        };

        let mut peer = Block::new();
        peer.set(KEY_PUBLIC_KEY, local_keys.public_key.clone());
        peer.set(KEY_ALLOWED_IPS, format!("{}/32", local_address));

        let merged = merge(existing, peer, &defaults, expected_address)?;

        let request = ApplyRequest {
            config_path: self.settings.remote.config_path(),
            document: merged.render(),
            interface: self.settings.remote.interface.clone(),
            listen_port: self.settings.addressing.listen_port,
            local_address: local_address.clone(),
            open_firewall: self.settings.remote.open_firewall,
            restart_service: self.settings.remote.restart_service,
        };
        let output = self.shell.run(host, &request.render()).await?;

        let remote_public_key = token::extract(&output.stdout, TOKEN_PUBLIC_KEY)?;
        validate_key(&remote_public_key)?;

        // The apply step reports the interface address it actually
        // wrote; in adoption mode that is the address the local
        // artifact must point at. Any prefix length is dropped.
        let remote_address = token::try_extract(&output.stdout, TOKEN_REMOTE_IP)
            .and_then(|address| address.split('/').next().map(str::to_string))
            .filter(|address| !address.is_empty())
            .unwrap_or(remote_address);

        let config_path = self
            .write_local_artifact(
                host,
                &local_keys,
                &local_address,
                &remote_address,
                &remote_public_key,
                options,
            )
            .await?;

        info!("Wrote local tunnel configuration to {:?}", config_path);

        Ok(ProvisionReport {
            host: host.host.clone(),
            local_address,
            remote_address,
            remote_public_key,
            config_path,
            created_interface,
        })
    }

    /// Read the remote document, distinguishing "absent" from failure
    async fn fetch_remote_document(&self, host: &HostSpec) -> Result<Option<ConfigDocument>> {
        let remote_path = self.settings.remote.config_path();
        let output = self
            .shell
            .run(host, &program::read_config(&remote_path))
            .await?;

        if token::try_extract(&output.stdout, TOKEN_CONFIG_ABSENT).is_some() {
            return Ok(None);
        }

        let encoded = token::extract(&output.stdout, TOKEN_CONFIG)?;
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| ProvisionError::DecodeConfig(e.to_string()))?;
        let text =
            String::from_utf8(bytes).map_err(|e| ProvisionError::DecodeConfig(e.to_string()))?;

        debug!("Fetched {} bytes of configuration from {}", text.len(), host);
        Ok(Some(ConfigDocument::parse(&text)))
    }

    /// Generate a fresh interface private key on the remote host
    async fn remote_private_key(&self, host: &HostSpec) -> Result<String> {
        let output = self
            .shell
            .run(host, &program::generate_private_key())
            .await?;
        let key = output.stdout.trim().to_string();
        validate_key(&key)?;
        Ok(key)
    }

    async fn write_local_artifact(
        &self,
        host: &HostSpec,
        local_keys: &Keypair,
        local_address: &str,
        remote_address: &str,
        remote_public_key: &str,
        options: &ProvisionOptions,
    ) -> Result<PathBuf> {
        let mut interface = Block::new();
        interface.set(KEY_ADDRESS, format!("{}/32", local_address));
        interface.set(KEY_PRIVATE_KEY, local_keys.private_key.clone());

        let mut peer = Block::new();
        peer.set(KEY_PUBLIC_KEY, remote_public_key);
        peer.set(KEY_ALLOWED_IPS, format!("{}/32", remote_address));
        peer.set(
            KEY_ENDPOINT,
            host.endpoint(self.settings.addressing.listen_port),
        );

        let document = ConfigDocument {
            interface,
            peers: vec![peer],
        };

        let path = options.output_dir.join(format!("{}.conf", host.host));
        tokio::fs::write(&path, document.render())
            .await
            .map_err(|source| ProvisionError::WriteLocal {
                path: path.clone(),
                source,
            })?;

        // The artifact holds a private key
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|source| ProvisionError::WriteLocal {
                    path: path.clone(),
                    source,
                })?;
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wgforge_keys::mock::StaticKeys;
    use wgforge_remote::mock::MockShell;

    fn provisioner(shell: MockShell) -> Provisioner<MockShell, StaticKeys> {
        Provisioner::new(shell, StaticKeys::example(), Settings::default())
    }

    fn host() -> HostSpec {
        HostSpec::parse("ops@vpn.example.net").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_remote_document_absent() {
        let shell = MockShell::new();
        shell.push_output("CONFIG_ABSENT[1]\n");

        let result = provisioner(shell).fetch_remote_document(&host()).await;
        assert!(result.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_remote_document_decodes() {
        let text = "[Interface]\nAddress = 10.203.1.2\n";
        let shell = MockShell::new();
        shell.push_output(format!("CONFIG_B64[{}]\n", STANDARD.encode(text)));

        let doc = provisioner(shell)
            .fetch_remote_document(&host())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.interface.get(KEY_ADDRESS), Some("10.203.1.2"));
    }

    #[tokio::test]
    async fn test_fetch_remote_document_rejects_garbage() {
        let shell = MockShell::new();
        shell.push_output("CONFIG_B64[!!not-base64!!]\n");

        let err = provisioner(shell)
            .fetch_remote_document(&host())
            .await
            .unwrap_err();
        assert!(matches!(err, ProvisionError::DecodeConfig(_)));
    }

    #[tokio::test]
    async fn test_remote_private_key_is_validated() {
        let shell = MockShell::new();
        shell.push_output("this is not a key\r\n");

        let err = provisioner(shell)
            .remote_private_key(&host())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::Key(wgforge_keys::KeyError::WrongLength(_))
        ));
    }
}
