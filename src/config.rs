//! Client configuration.
//!
//! Consumed, never produced, by the engine: where to connect, who to be,
//! and which channels to join once registered.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Full client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Server to connect to.
    pub server: ServerConfig,
    /// Identity presented during registration.
    pub identity: Identity,
    /// Channels joined automatically once the connection is live.
    #[serde(default)]
    pub autojoin: Vec<String>,
}

/// Server endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Hostname or address.
    pub host: String,
    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    6667
}

/// Nick and user identity.
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    /// Primary nickname.
    pub nick: String,
    /// Fallback nickname when the primary is taken. Defaults to the
    /// primary with a trailing underscore.
    #[serde(default)]
    pub altnick: Option<String>,
    /// Username (ident).
    pub username: String,
    /// Real name / GECOS.
    pub realname: String,
}

impl Identity {
    /// The fallback nickname, defaulted from the primary when unset.
    #[must_use]
    pub fn altnick(&self) -> String {
        self.altnick
            .clone()
            .unwrap_or_else(|| format!("{}_", self.nick))
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// The `host:port` address string to connect to.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r##"
        autojoin = ["#testidevi", "#day9tv"]

        [server]
        host = "irc.quakenet.org"

        [identity]
        nick = "irckaaja"
        username = "irckaaja"
        realname = "Irk Kaaja"
    "##;

    #[test]
    fn test_parse_example() {
        let config: ClientConfig = toml::from_str(EXAMPLE).unwrap();
        assert_eq!(config.server.host, "irc.quakenet.org");
        assert_eq!(config.server.port, 6667);
        assert_eq!(config.identity.nick, "irckaaja");
        assert_eq!(config.autojoin, vec!["#testidevi", "#day9tv"]);
        assert_eq!(config.address(), "irc.quakenet.org:6667");
    }

    #[test]
    fn test_altnick_defaults_to_underscore() {
        let config: ClientConfig = toml::from_str(EXAMPLE).unwrap();
        assert_eq!(config.identity.altnick(), "irckaaja_");
    }

    #[test]
    fn test_explicit_altnick_and_port() {
        let raw = r#"
            [server]
            host = "localhost"
            port = 6697

            [identity]
            nick = "bot"
            altnick = "bot2"
            username = "bot"
            realname = "Bot"
        "#;
        let config: ClientConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.server.port, 6697);
        assert_eq!(config.identity.altnick(), "bot2");
        assert!(config.autojoin.is_empty());
    }
}
