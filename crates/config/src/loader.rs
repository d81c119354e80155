use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{env_subst::substitute_env, error::ConfigError, schema::PartialConfig};

/// Standard config file name.
const CONFIG_FILENAME: &str = "relaybot.toml";

/// Load a TOML config file, substituting `${ENV_VAR}` placeholders first.
pub fn load_config(path: &Path) -> Result<PartialConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&substitute_env(&raw), path)
}

/// Load the config file from `explicit` if given, otherwise from the first
/// standard location that exists.
///
/// Search order:
/// 1. `./relaybot.toml` (project-local)
/// 2. `~/.config/relaybot/relaybot.toml` (user-global)
///
/// Returns `Ok(None)` when no file is found; the environment alone is a
/// complete configuration.
pub fn discover_and_load(explicit: Option<&Path>) -> Result<Option<PartialConfig>, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match find_config_file() {
            Some(p) => p,
            None => {
                debug!("no config file found, using environment only");
                return Ok(None);
            },
        },
    };
    debug!(path = %path.display(), "loading config");
    load_config(&path).map(Some)
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }
    config_dir()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .filter(|p| p.exists())
}

/// Returns `~/.config/relaybot/` on all platforms.
pub fn config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().join(".config").join("relaybot"))
}

fn parse_config(raw: &str, path: &Path) -> Result<PartialConfig, ConfigError> {
    toml::from_str(raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, secrecy::ExposeSecret, std::io::Write};

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_toml_file() {
        let file = write_config(
            r#"
discord_token = "token"
forward_webhook = "https://platform.example.com/hook"
shared_secret = "0123456789abcdef"
port = 9000
"#,
        );
        let partial = load_config(file.path()).unwrap();
        assert_eq!(partial.port, Some(9000));
        assert_eq!(
            partial.shared_secret.unwrap().expose_secret(),
            "0123456789abcdef"
        );
        assert!(partial.bind.is_none());
    }

    #[test]
    fn explicit_path_is_used() {
        let file = write_config("bind = \"127.0.0.1\"\n");
        let partial = discover_and_load(Some(file.path())).unwrap().unwrap();
        assert_eq!(partial.bind.as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_and_load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_reports_path() {
        let file = write_config("port = \"not a number\"\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}
