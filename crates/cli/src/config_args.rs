use std::path::PathBuf;

use {
    clap::Args,
    relaybot_config::PartialConfig,
    secrecy::Secret,
};

/// Config flags; each falls back to its environment variable.
#[derive(Debug, Default, Args)]
pub struct ConfigArgs {
    /// Path to a relaybot.toml file.
    #[arg(long = "config", env = "RELAY_CONFIG", global = true)]
    pub config_path: Option<PathBuf>,

    /// Discord bot token.
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true, global = true)]
    pub discord_token: Option<String>,

    /// Platform webhook that receives forwarded messages.
    #[arg(long, env = "FORWARD_WEBHOOK", global = true)]
    pub forward_webhook: Option<String>,

    /// Shared HMAC secret for /send (at least 16 characters).
    #[arg(long, env = "RELAY_SHARED_SECRET", hide_env_values = true, global = true)]
    pub shared_secret: Option<String>,

    /// HTTP listen port [default: 8000].
    #[arg(long, env = "PORT", global = true)]
    pub port: Option<u16>,

    /// HTTP bind address [default: 0.0.0.0].
    #[arg(long, env = "RELAY_BIND", global = true)]
    pub bind: Option<String>,

    /// Accepted clock skew for signed requests, in seconds [default: 300].
    #[arg(long, env = "RELAY_SIGNATURE_LEEWAY", global = true)]
    pub signature_leeway: Option<u64>,

    /// Webhook POST timeout, in seconds [default: 5].
    #[arg(long, env = "RELAY_WEBHOOK_TIMEOUT", global = true)]
    pub webhook_timeout: Option<u64>,
}

impl ConfigArgs {
    /// Split into the config file path and the flag/env layer.
    pub fn into_parts(self) -> (Option<PathBuf>, PartialConfig) {
        let partial = PartialConfig {
            discord_token: self.discord_token.map(Secret::new),
            forward_webhook: self.forward_webhook,
            shared_secret: self.shared_secret.map(Secret::new),
            port: self.port,
            bind: self.bind,
            signature_leeway_secs: self.signature_leeway,
            webhook_timeout_secs: self.webhook_timeout,
        };
        (self.config_path, partial)
    }
}
