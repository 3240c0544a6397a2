use anyhow::{anyhow, Result};
use std::{io::ErrorKind, path::PathBuf, time::Duration};
use tokio::io::AsyncReadExt;

const CONFIG_PATH_REL_HOME: &str = ".config/ollama-relay/config.toml";
/// Used when the configuration leaves `discord_token` empty
const TOKEN_ENV_VAR: &str = "DISCORD_TOKEN";

/// Bot configuration
#[derive(Default, serde::Serialize, serde::Deserialize)]
pub struct Config {
    pub general: General,
    #[serde(default)]
    pub llm: Llm,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct General {
    #[serde(default)]
    pub discord_token: String,
    /// Directory holding server settings and per-server chat history
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct Llm {
    /// Upper bound on any single request to an inference server
    pub request_timeout_seconds: u64,
}

impl Default for Llm {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 120,
        }
    }
}

impl Default for General {
    fn default() -> Self {
        Self {
            discord_token: String::new(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Config {
    fn config_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|p| p.join(CONFIG_PATH_REL_HOME))
            .ok_or(anyhow!("Could not find home directory"))
    }

    /// Read the configuration file.  Without one, the defaults are used and the token must come
    /// from the environment.
    pub async fn load() -> Result<Self> {
        let path = Self::config_path()?;

        let contents = match tokio::fs::File::open(&path).await {
            Ok(mut file) => {
                let mut contents = String::new();
                file.read_to_string(&mut contents).await.map_err(|e| {
                    anyhow!(
                        "Could not read configuration at `{}`: {}",
                        path.to_string_lossy(),
                        e
                    )
                })?;
                Some(contents)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                return Err(anyhow!(
                    "Could not open configuration at `{}`: {}",
                    path.to_string_lossy(),
                    e
                ))
            }
        };

        Self::resolve(contents.as_deref(), std::env::var(TOKEN_ENV_VAR).ok()).map_err(|e| {
            anyhow!(
                "Invalid configuration at `{}`: {}",
                path.to_string_lossy(),
                e
            )
        })
    }

    /// Build the configuration from the file contents, if there is a file, filling in the
    /// token from the environment when the file leaves it empty.
    fn resolve(contents: Option<&str>, env_token: Option<String>) -> Result<Self> {
        let mut config = match contents {
            Some(contents) => Self::parse(contents)?,
            None => Self::default(),
        };

        if config.general.discord_token.is_empty() {
            config.general.discord_token = env_token
                .filter(|token| !token.is_empty())
                .ok_or(anyhow!("No discord_token set and ${} is not set", TOKEN_ENV_VAR))?;
        }

        Ok(config)
    }

    fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.request_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let config = Config::parse("[general]\ndiscord_token = \"abc\"\n").unwrap();

        assert_eq!(config.general.discord_token, "abc");
        assert_eq!(config.general.data_dir, PathBuf::from("./data"));
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn reads_all_fields() {
        let config = Config::parse(
            r#"
            [general]
            discord_token = "abc"
            data_dir = "/var/lib/ollama-relay"

            [llm]
            request_timeout_seconds = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.general.data_dir, PathBuf::from("/var/lib/ollama-relay"));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn general_section_is_required() {
        assert!(Config::parse("[llm]\nrequest_timeout_seconds = 30\n").is_err());
    }

    #[test]
    fn missing_file_uses_defaults_and_env_token() {
        let config = Config::resolve(None, Some("from-env".to_string())).unwrap();

        assert_eq!(config.general.discord_token, "from-env");
        assert_eq!(config.general.data_dir, PathBuf::from("./data"));
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn configured_token_wins_over_env() {
        let config = Config::resolve(
            Some("[general]\ndiscord_token = \"abc\"\n"),
            Some("from-env".to_string()),
        )
        .unwrap();

        assert_eq!(config.general.discord_token, "abc");
    }

    #[test]
    fn token_is_required_somewhere() {
        assert!(Config::resolve(None, None).is_err());
        assert!(Config::resolve(None, Some(String::new())).is_err());
        assert!(Config::resolve(Some("[general]\n"), None).is_err());
    }
}
