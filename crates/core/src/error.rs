use thiserror::Error;

#[derive(Error, Debug)]
pub enum WgForgeError {
    #[error("Existing interface address is {found}, refusing to repoint it to {expected}")]
    ConfigMismatch { expected: String, found: String },

    #[error("Missing {key} in [{section}] section")]
    FieldMissing { section: String, key: String },

    #[error("Invalid host specifier: {0}")]
    InvalidHostSpec(String),
}

pub type Result<T> = std::result::Result<T, WgForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config_mismatch() {
        let err = WgForgeError::ConfigMismatch {
            expected: "10.203.5.10".to_string(),
            found: "10.203.5.9".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Existing interface address is 10.203.5.9, refusing to repoint it to 10.203.5.10"
        );
    }

    #[test]
    fn test_error_display_field_missing() {
        let err = WgForgeError::FieldMissing {
            section: "Interface".to_string(),
            key: "Address".to_string(),
        };
        assert_eq!(err.to_string(), "Missing Address in [Interface] section");
    }

    #[test]
    fn test_error_display_invalid_host_spec() {
        let err = WgForgeError::InvalidHostSpec("@".to_string());
        assert_eq!(err.to_string(), "Invalid host specifier: @");
    }

    #[test]
    fn test_error_is_debug() {
        let err = WgForgeError::InvalidHostSpec("".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("InvalidHostSpec"));
    }
}
