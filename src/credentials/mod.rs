//! Storage credentials and their validation

pub mod provider;

pub use provider::{ContextCredentialProvider, CredentialProvider};

use crate::error::{StepError, StepResult};
use serde::Deserialize;

/// Credentials forwarded to the transfer tool.
///
/// Access key id and secret are required; account id and security token
/// are forwarded only when present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Credentials {
    pub account_id: Option<String>,
    pub access_key_id: String,
    pub access_key_secret: String,
    pub security_token: Option<String>,
}

impl Credentials {
    /// Validate against the required-field schema.
    ///
    /// Runs before any network call; a failure here aborts resolution.
    pub fn validate(&self) -> StepResult<()> {
        if self.access_key_id.is_empty() || self.access_key_secret.is_empty() {
            return Err(StepError::Credential(
                "Credentials does not meet expectations".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_credentials_pass() {
        let creds = Credentials {
            account_id: None,
            access_key_id: "ak".to_string(),
            access_key_secret: "sk".to_string(),
            security_token: None,
        };
        assert!(creds.validate().is_ok());
    }

    #[test]
    fn missing_secret_fails() {
        let creds = Credentials {
            access_key_id: "ak".to_string(),
            ..Default::default()
        };
        let err = creds.validate().unwrap_err();
        assert!(matches!(err, StepError::Credential(_)));
        assert!(err.to_string().contains("Credentials does not meet expectations"));
    }

    #[test]
    fn deserializes_camel_case_block() {
        let creds: Credentials = serde_json::from_str(
            r#"{"accessKeyId":"ak","accessKeySecret":"sk","securityToken":"tok"}"#,
        )
        .unwrap();
        assert_eq!(creds.access_key_id, "ak");
        assert_eq!(creds.security_token.as_deref(), Some("tok"));
    }
}
