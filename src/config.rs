use std::{fmt, fs, path::Path};

use anyhow::Context;
use log::debug;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Connection and login details for the outgoing mail server
    pub smtp: SmtpSettings,
}

impl Config {
    pub fn load_from(config_path: &Path) -> anyhow::Result<Config> {
        debug!("Loading Config from: {config_path:?}");
        let file_contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read contents of {config_path:?}"))?;
        let result = serde_json::from_str(&file_contents)
            .with_context(|| format!("Failed to parse contents of {config_path:?}"))?;
        debug!("Loaded Config: {result:?}");
        Ok(result)
    }
}

#[derive(Clone, Deserialize)]
pub struct SmtpSettings {
    pub host: String,

    pub port: u16,

    /// Also used as the From address
    pub username: String,

    pub password: String,

    /// How the connection to the server is secured
    #[serde(default)]
    pub tls: TlsMode,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"********")
            .field("tls", &self.tls)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// Plain text connection
    None,

    /// Upgrade with STARTTLS when the server offers it
    #[default]
    Opportunistic,

    /// Fail unless STARTTLS succeeds
    Required,

    /// TLS from the first byte (usually port 465)
    Wrapper,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn tls_defaults_to_opportunistic() {
        // Arrange
        let input = r#"{"smtp": {"host": "smtp.example.com", "port": 587,
            "username": "me@example.com", "password": "hunter2"}}"#;

        // Act
        let actual: Config = serde_json::from_str(input).unwrap();

        // Assert
        assert_eq!(actual.smtp.host, "smtp.example.com");
        assert_eq!(actual.smtp.port, 587);
        assert_eq!(actual.smtp.username, "me@example.com");
        assert_eq!(actual.smtp.password, "hunter2");
        assert_eq!(actual.smtp.tls, TlsMode::Opportunistic);
    }

    #[rstest]
    #[case("none", TlsMode::None)]
    #[case("opportunistic", TlsMode::Opportunistic)]
    #[case("required", TlsMode::Required)]
    #[case("wrapper", TlsMode::Wrapper)]
    fn tls_mode(#[case] value: &str, #[case] expected: TlsMode) {
        let input = format!(
            r#"{{"smtp": {{"host": "h", "port": 25, "username": "u", "password": "p", "tls": "{value}"}}}}"#
        );
        let actual: Config = serde_json::from_str(&input).unwrap();
        assert_eq!(actual.smtp.tls, expected);
    }

    #[test]
    fn debug_hides_password() {
        let input = r#"{"smtp": {"host": "h", "port": 25, "username": "u", "password": "hunter2"}}"#;
        let config: Config = serde_json::from_str(input).unwrap();
        let actual = format!("{config:?}");
        assert!(!actual.contains("hunter2"));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"smtp": {{"host": "localhost", "port": 2525, "username": "u", "password": "p"}}}}"#
        )
        .unwrap();

        let actual = Config::load_from(file.path()).unwrap();

        assert_eq!(actual.smtp.port, 2525);
    }

    #[test]
    fn load_from_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let actual = Config::load_from(&path);

        assert!(actual.is_err());
    }

    #[test]
    fn load_from_malformed_file_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"smtp": {{"host": "localhost", "port": "not a port"}}}}"#).unwrap();

        let actual = Config::load_from(file.path()).unwrap_err();

        assert!(format!("{actual:#}").contains("Failed to parse contents"));
    }
}
