mod config_args;
mod lifecycle;
mod sign_command;

use {
    anyhow::Result,
    clap::{Parser, Subcommand},
    relaybot_config::{PartialConfig, RelayConfig, discover_and_load},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use crate::config_args::ConfigArgs;

#[derive(Parser)]
#[command(name = "relaybot", version, about = "relaybot: relay messages between Discord and a platform webhook")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    config: ConfigArgs,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and serve the relay API (the default).
    Run,
    /// Print signed headers for a /send body.
    Sign {
        /// Exact request body to sign.
        #[arg(long)]
        body: String,
        /// Unix timestamp to sign with (defaults to now).
        #[arg(long)]
        timestamp: Option<i64>,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_names(true)
                    .with_ansi(true),
            )
            .init();
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    let (config_path, flags) = cli.config.into_parts();
    let partial = match discover_and_load(config_path.as_deref())? {
        Some(file) => flags.merge(file),
        None => flags,
    };

    execute(cli.command.unwrap_or(Commands::Run), partial, lifecycle::run)
}

/// Validate config for `command` and run it. `serve` is only reached with a
/// validated config, so no listener is bound for an invalid one.
fn execute(
    command: Commands,
    partial: PartialConfig,
    serve: impl FnOnce(RelayConfig) -> Result<()>,
) -> Result<()> {
    match command {
        Commands::Run => {
            let config = RelayConfig::try_from(partial)?;
            info!(
                version = env!("CARGO_PKG_VERSION"),
                bind = %config.bind,
                port = config.port,
                "relaybot starting"
            );
            serve(config)
        },
        Commands::Sign { body, timestamp } => {
            let secret = partial.into_shared_secret()?;
            sign_command::handle_sign(&secret, &body, timestamp)
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        clap::CommandFactory,
        relaybot_config::ConfigError,
        secrecy::Secret,
        std::cell::Cell,
    };

    fn run_config(secret: &str) -> PartialConfig {
        PartialConfig {
            discord_token: Some(Secret::new("discord-bot-token".into())),
            forward_webhook: Some("https://platform.example.com/hook".into()),
            shared_secret: Some(Secret::new(secret.into())),
            ..Default::default()
        }
    }

    #[test]
    fn short_secret_never_reaches_serve() {
        let served = Cell::new(false);
        let err = execute(Commands::Run, run_config("0123456789abcde"), |_| {
            served.set(true);
            Ok(())
        })
        .unwrap_err();
        assert!(!served.get());
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::SecretTooShort { len: 15, min: 16 })
        ));
    }

    #[test]
    fn valid_config_is_handed_to_serve() {
        let mut port = None;
        execute(Commands::Run, run_config("0123456789abcdef"), |config| {
            port = Some(config.port);
            Ok(())
        })
        .unwrap();
        assert_eq!(port, Some(8000));
    }

    #[test]
    fn sign_rejects_short_secret() {
        let sign = Commands::Sign {
            body: "{}".into(),
            timestamp: Some(1_700_000_000),
        };
        let err = execute(sign, run_config("short"), |_| Ok(())).unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_config_flags_before_subcommand() {
        let cli = Cli::try_parse_from([
            "relaybot",
            "--port",
            "9100",
            "--bind",
            "127.0.0.1",
            "run",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Run)));
        let (_, partial) = cli.config.into_parts();
        assert_eq!(partial.port, Some(9100));
        assert_eq!(partial.bind.as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn parses_sign_subcommand() {
        let cli = Cli::try_parse_from([
            "relaybot",
            "sign",
            "--body",
            r#"{"channel_id":"1","content":"x"}"#,
            "--timestamp",
            "1700000000",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Sign { body, timestamp }) => {
                assert_eq!(body, r#"{"channel_id":"1","content":"x"}"#);
                assert_eq!(timestamp, Some(1_700_000_000));
            },
            _ => panic!("expected sign subcommand"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["relaybot", "run", "--json-logs", "--port", "8123"]).unwrap();
        assert!(cli.json_logs);
        assert_eq!(cli.config.port, Some(8123));
    }
}
