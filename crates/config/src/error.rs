use std::path::PathBuf;

/// Minimum length of the shared HMAC secret, in characters.
pub const MIN_SECRET_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is required")]
    Missing { name: &'static str },

    #[error("RELAY_SHARED_SECRET must be at least {min} characters (got {len})")]
    SecretTooShort { len: usize, min: usize },

    #[error("DISCORD_TOKEN must not be empty")]
    EmptyToken,

    #[error("FORWARD_WEBHOOK is not a valid http(s) URL: {reason}")]
    InvalidWebhook { reason: String },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
