//! Client configuration, read once at process start.

use crate::ClientError;

/// Validated connection settings for an S3-compatible endpoint.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full endpoint URL (e.g., `https://<account>.r2.cloudflarestorage.com`).
    pub endpoint: String,
    /// S3-compatible access key ID.
    pub access_key_id: String,
    /// S3-compatible secret access key.
    pub secret_access_key: String,
}

impl ClientConfig {
    /// Builds a config from explicit values, rejecting empty fields.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] if any field is empty.
    pub fn new(
        endpoint: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let config = Self {
            endpoint: endpoint.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        };

        for (name, value) in [
            ("endpoint", &config.endpoint),
            ("access key ID", &config.access_key_id),
            ("secret access key", &config.secret_access_key),
        ] {
            if value.is_empty() {
                return Err(ClientError::InvalidConfig {
                    message: format!("{name} must not be empty"),
                });
            }
        }

        Ok(config)
    }

    /// Reads the connection settings from the environment.
    ///
    /// `R2_ENDPOINT_URL` takes precedence; otherwise the endpoint is
    /// derived from `R2_ACCOUNT_ID`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingEnv`] if a required variable is unset
    /// and [`ClientError::InvalidConfig`] if a value is empty.
    pub fn from_env() -> Result<Self, ClientError> {
        let endpoint = match std::env::var("R2_ENDPOINT_URL") {
            Ok(url) if !url.is_empty() => url,
            _ => endpoint_for_account(&require_env("R2_ACCOUNT_ID")?),
        };

        Self::new(
            endpoint,
            require_env("R2_ACCESS_KEY_ID")?,
            require_env("R2_SECRET_ACCESS_KEY")?,
        )
    }
}

/// R2 endpoint URL for a Cloudflare account ID.
fn endpoint_for_account(account_id: &str) -> String {
    format!("https://{account_id}.r2.cloudflarestorage.com")
}

/// Reads a required environment variable.
fn require_env(name: &str) -> Result<String, ClientError> {
    std::env::var(name).map_err(|_| ClientError::MissingEnv {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_r2_endpoint_from_account_id() {
        assert_eq!(
            endpoint_for_account("abc123"),
            "https://abc123.r2.cloudflarestorage.com"
        );
    }

    #[test]
    fn accepts_complete_config() {
        let config = ClientConfig::new("https://s3.example.com", "key", "secret").unwrap();
        assert_eq!(config.endpoint, "https://s3.example.com");
    }

    #[test]
    fn rejects_empty_access_key() {
        let err = ClientConfig::new("https://s3.example.com", "", "secret").unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig { .. }));
    }

    #[test]
    fn rejects_empty_endpoint() {
        assert!(ClientConfig::new("", "key", "secret").is_err());
    }
}
