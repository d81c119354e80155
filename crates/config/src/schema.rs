use std::time::Duration;

use {
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
};

use crate::error::{ConfigError, MIN_SECRET_LEN};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_SIGNATURE_LEEWAY_SECS: u64 = 300;
pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 5;

/// Config values from one source (file, environment, CLI flags).
///
/// Every field is optional; sources are layered with [`PartialConfig::merge`]
/// and the result is validated into a [`RelayConfig`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PartialConfig {
    pub discord_token: Option<Secret<String>>,
    pub forward_webhook: Option<String>,
    pub shared_secret: Option<Secret<String>>,
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub signature_leeway_secs: Option<u64>,
    pub webhook_timeout_secs: Option<u64>,
}

impl PartialConfig {
    /// Fill unset fields of `self` from `lower`. Values already present in
    /// `self` win.
    pub fn merge(self, lower: PartialConfig) -> PartialConfig {
        PartialConfig {
            discord_token: self.discord_token.or(lower.discord_token),
            forward_webhook: self.forward_webhook.or(lower.forward_webhook),
            shared_secret: self.shared_secret.or(lower.shared_secret),
            port: self.port.or(lower.port),
            bind: self.bind.or(lower.bind),
            signature_leeway_secs: self.signature_leeway_secs.or(lower.signature_leeway_secs),
            webhook_timeout_secs: self.webhook_timeout_secs.or(lower.webhook_timeout_secs),
        }
    }

    /// Validate and take only the shared secret. Used by commands that sign
    /// requests without connecting to anything.
    pub fn into_shared_secret(self) -> Result<Secret<String>, ConfigError> {
        let secret = self.shared_secret.ok_or(ConfigError::Missing {
            name: "RELAY_SHARED_SECRET",
        })?;
        validate_secret(&secret)?;
        Ok(secret)
    }
}

/// Validated, process-lifetime relay configuration.
#[derive(Debug)]
pub struct RelayConfig {
    pub discord_token: Secret<String>,
    pub forward_webhook: String,
    pub shared_secret: Secret<String>,
    pub port: u16,
    pub bind: String,
    pub signature_leeway_secs: u64,
    pub webhook_timeout_secs: u64,
}

impl RelayConfig {
    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_timeout_secs)
    }
}

impl TryFrom<PartialConfig> for RelayConfig {
    type Error = ConfigError;

    fn try_from(partial: PartialConfig) -> Result<Self, Self::Error> {
        // Secret first: a short secret is the one failure that must abort
        // startup even when everything else is also missing.
        let shared_secret = partial.shared_secret.ok_or(ConfigError::Missing {
            name: "RELAY_SHARED_SECRET",
        })?;
        validate_secret(&shared_secret)?;

        let discord_token = partial.discord_token.ok_or(ConfigError::Missing {
            name: "DISCORD_TOKEN",
        })?;
        if discord_token.expose_secret().trim().is_empty() {
            return Err(ConfigError::EmptyToken);
        }

        let forward_webhook = partial.forward_webhook.ok_or(ConfigError::Missing {
            name: "FORWARD_WEBHOOK",
        })?;
        validate_webhook(&forward_webhook)?;

        Ok(Self {
            discord_token,
            forward_webhook,
            shared_secret,
            port: partial.port.unwrap_or(DEFAULT_PORT),
            bind: partial.bind.unwrap_or_else(|| DEFAULT_BIND.to_string()),
            signature_leeway_secs: partial
                .signature_leeway_secs
                .unwrap_or(DEFAULT_SIGNATURE_LEEWAY_SECS),
            webhook_timeout_secs: partial
                .webhook_timeout_secs
                .unwrap_or(DEFAULT_WEBHOOK_TIMEOUT_SECS),
        })
    }
}

/// Reject secrets shorter than [`MIN_SECRET_LEN`] characters.
pub fn validate_secret(secret: &Secret<String>) -> Result<(), ConfigError> {
    let len = secret.expose_secret().chars().count();
    if len < MIN_SECRET_LEN {
        return Err(ConfigError::SecretTooShort {
            len,
            min: MIN_SECRET_LEN,
        });
    }
    Ok(())
}

fn validate_webhook(raw: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(raw).map_err(|e| ConfigError::InvalidWebhook {
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidWebhook {
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
