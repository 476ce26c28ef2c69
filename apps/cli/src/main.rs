//! wgforge CLI
//!
//! Command-line interface for provisioning point-to-point encrypted
//! tunnels between this machine and remote servers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use wgforge_core::{derive_address, HostSpec};
use wgforge_keys::WgTool;
use wgforge_logging::{try_init as try_init_logging, LogLevel};
use wgforge_provision::{ProvisionError, ProvisionOptions, Provisioner};
use wgforge_remote::{RemoteError, SshShell};
use wgforge_settings::Settings;

/// wgforge - provision encrypted point-to-point tunnels over SSH
#[derive(Parser)]
#[command(name = "wgforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision a tunnel to a remote server and write the matching
    /// local configuration file
    Provision {
        /// Remote host, as `host` or `user@host`
        host: String,

        /// Adopt the interface address already configured on the remote
        /// host instead of requiring the derived one
        #[arg(long)]
        adopt_address: bool,

        /// Directory to write the local configuration file into
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Override the tunnel listen port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override the tunnel interface name
        #[arg(short, long)]
        interface: Option<String>,
    },

    /// Show the tunnel addresses an identity derives to
    Derive {
        /// Identity, e.g. `host` or `user@host`
        identity: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let _ = try_init_logging(level);

    match cli.command {
        Commands::Provision {
            host,
            adopt_address,
            output_dir,
            port,
            interface,
        } => {
            provision(&host, adopt_address, output_dir, port, interface).await?;
        }
        Commands::Derive { identity } => {
            derive(&identity)?;
        }
    }

    Ok(())
}

async fn provision(
    host: &str,
    adopt_address: bool,
    output_dir: PathBuf,
    port: Option<u16>,
    interface: Option<String>,
) -> Result<()> {
    let host: HostSpec = host.parse().context("Invalid remote host")?;

    let mut settings = Settings::load_or_default()?;
    if let Some(port) = port {
        settings.addressing.listen_port = port;
    }
    if let Some(interface) = interface {
        settings.remote.interface = interface;
    }

    info!("Provisioning tunnel to {}", host);

    let provisioner = Provisioner::new(SshShell::new(), WgTool::new(), settings);
    let options = ProvisionOptions {
        adopt_address,
        output_dir,
    };

    let report = match provisioner.provision(&host, &options).await {
        Ok(report) => report,
        Err(err) => {
            // Show what the remote side printed before failing
            if let ProvisionError::Remote(RemoteError::CommandFailed { output, .. }) = &err {
                eprint!("{}", output);
            }
            return Err(err.into());
        }
    };

    println!("Tunnel provisioned");
    println!("==================");
    println!("Remote host:       {}", report.host);
    println!("Remote address:    {}", report.remote_address);
    println!("Remote public key: {}", report.remote_public_key);
    println!("Local address:     {}", report.local_address);
    println!("Local config:      {}", report.config_path.display());
    if report.created_interface {
        println!("Remote interface was created by this run");
    }

    Ok(())
}

fn derive(identity: &str) -> Result<()> {
    let settings = Settings::load_or_default()?;

    println!(
        "Local:  {}",
        derive_address(&settings.addressing.local_prefix, identity)
    );
    println!(
        "Remote: {}",
        derive_address(&settings.addressing.remote_prefix, identity)
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_provision_args() {
        use clap::CommandFactory;
        let cmd = Cli::command();
        let matches = cmd.try_get_matches_from(vec![
            "wgforge",
            "provision",
            "ops@vpn.example.net",
            "--adopt-address",
            "-o",
            "/tmp",
            "-p",
            "51999",
        ]);
        assert!(matches.is_ok());
    }

    #[test]
    fn test_provision_requires_host() {
        use clap::CommandFactory;
        let cmd = Cli::command();
        let matches = cmd.try_get_matches_from(vec!["wgforge", "provision"]);
        assert!(matches.is_err());
    }

    #[test]
    fn test_derive_args() {
        use clap::CommandFactory;
        let cmd = Cli::command();
        let matches = cmd.try_get_matches_from(vec!["wgforge", "derive", "vpn.example.net"]);
        assert!(matches.is_ok());
    }

    #[test]
    fn test_verbose_flag() {
        use clap::CommandFactory;
        let cmd = Cli::command();
        let matches =
            cmd.try_get_matches_from(vec!["wgforge", "-v", "derive", "vpn.example.net"]);
        assert!(matches.is_ok());
    }
}
