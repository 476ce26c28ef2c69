//! Typed remote programs
//!
//! Each remote step is described by typed Rust values and rendered to a
//! small `sh` program at the last moment. Free-form text (the merged
//! configuration document) travels base64-encoded; every interpolated
//! field is either numeric or a derived/validated value.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Marker printed by [`read_config`] carrying the encoded document
pub const TOKEN_CONFIG: &str = "CONFIG_B64";
/// Marker printed by [`read_config`] when no document exists yet
pub const TOKEN_CONFIG_ABSENT: &str = "CONFIG_ABSENT";
/// Marker carrying the interface public key after an apply
pub const TOKEN_PUBLIC_KEY: &str = "PUBLIC_KEY";
/// Marker carrying the interface address after an apply
pub const TOKEN_REMOTE_IP: &str = "REMOTE_INTERNAL_IP";

/// Program that reports the current configuration document, base64
/// encoded, or its absence.
pub fn read_config(config_path: &str) -> String {
    format!(
        "if [ -f '{path}' ]; then printf '{config}[%s]\\n' \"$(base64 -w0 '{path}')\"; \
         else printf '{absent}[1]\\n'; fi",
        path = config_path,
        config = TOKEN_CONFIG,
        absent = TOKEN_CONFIG_ABSENT,
    )
}

/// Program that generates a fresh interface private key on the remote
/// host (first provision only).
pub fn generate_private_key() -> String {
    "wg genkey".to_string()
}

/// Everything the remote side needs to install a merged document and
/// bring the tunnel up.
#[derive(Debug, Clone)]
pub struct ApplyRequest {
    /// Destination of the configuration document
    pub config_path: String,
    /// The merged document text
    pub document: String,
    /// Tunnel interface name, e.g. `wg99`
    pub interface: String,
    /// UDP port the tunnel listens on
    pub listen_port: u16,
    /// Local tunnel address, allowed through the remote firewall for SSH
    pub local_address: String,
    /// Open firewall rules when `ufw` is installed
    pub open_firewall: bool,
    /// Enable and bounce the `wg-quick@<interface>` service
    pub restart_service: bool,
}

impl ApplyRequest {
    /// Render to an `sh` program. The document is written under umask
    /// 077; the interface public key and address are reported from the
    /// file actually written, keeping the remote side authoritative.
    pub fn render(&self) -> String {
        let document_b64 = STANDARD.encode(&self.document);

        let mut script = String::new();
        script.push_str("set -e\n");
        script.push_str("umask 077\n");
        script.push_str(&format!(
            "echo {} | base64 -d > '{}'\n",
            document_b64, self.config_path
        ));
        script.push_str(&format!(
            "printf '{token}[%s]\\n' \"$(sed -n 's/^PrivateKey *= *//p' '{path}' | head -n 1 | wg pubkey)\"\n",
            token = TOKEN_PUBLIC_KEY,
            path = self.config_path,
        ));
        script.push_str(&format!(
            "printf '{token}[%s]\\n' \"$(sed -n 's/^Address *= *//p' '{path}' | head -n 1)\"\n",
            token = TOKEN_REMOTE_IP,
            path = self.config_path,
        ));

        if self.open_firewall {
            script.push_str("if [ -x /usr/sbin/ufw ]; then\n");
            script.push_str(&format!("  ufw allow {}/udp\n", self.listen_port));
            script.push_str(&format!(
                "  ufw allow from {} to any port 22\n",
                self.local_address
            ));
            script.push_str("fi\n");
        }

        if self.restart_service {
            script.push_str(&format!("systemctl enable wg-quick@{}\n", self.interface));
            script.push_str(&format!("wg-quick down {} || true\n", self.interface));
            script.push_str(&format!("wg-quick up {}\n", self.interface));
        }

        script
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ApplyRequest {
        ApplyRequest {
            config_path: "/etc/wireguard/wg99.conf".to_string(),
            document: "[Interface]\nAddress = 10.203.1.2\n".to_string(),
            interface: "wg99".to_string(),
            listen_port: 51232,
            local_address: "10.202.1.2".to_string(),
            open_firewall: true,
            restart_service: true,
        }
    }

    #[test]
    fn test_read_config_program_mentions_both_tokens() {
        let program = read_config("/etc/wireguard/wg99.conf");
        assert!(program.contains("CONFIG_B64["));
        assert!(program.contains("CONFIG_ABSENT[1]"));
        assert!(program.contains("'/etc/wireguard/wg99.conf'"));
    }

    #[test]
    fn test_apply_document_travels_encoded() {
        let request = request();
        let script = request.render();
        // The raw document never appears in the program text
        assert!(!script.contains("[Interface]"));
        assert!(script.contains(&STANDARD.encode(&request.document)));
        assert!(script.contains("umask 077"));
        assert!(script.contains("base64 -d > '/etc/wireguard/wg99.conf'"));
    }

    #[test]
    fn test_apply_reports_key_and_address() {
        let script = request().render();
        assert!(script.contains("PUBLIC_KEY[%s]"));
        assert!(script.contains("REMOTE_INTERNAL_IP[%s]"));
        assert!(script.contains("wg pubkey"));
    }

    #[test]
    fn test_apply_firewall_rules_are_conditional() {
        let script = request().render();
        assert!(script.contains("if [ -x /usr/sbin/ufw ]"));
        assert!(script.contains("ufw allow 51232/udp"));
        assert!(script.contains("ufw allow from 10.202.1.2 to any port 22"));

        let mut quiet = request();
        quiet.open_firewall = false;
        assert!(!quiet.render().contains("ufw"));
    }

    #[test]
    fn test_apply_service_bounce() {
        let script = request().render();
        assert!(script.contains("systemctl enable wg-quick@wg99"));
        assert!(script.contains("wg-quick down wg99 || true"));
        assert!(script.contains("wg-quick up wg99"));

        let mut manual = request();
        manual.restart_service = false;
        assert!(!manual.render().contains("systemctl"));
    }
}
