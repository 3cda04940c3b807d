//! SMTP settings resolved from layered sources.
//!
//! Each setting is taken from the first source that provides a usable value,
//! falling back to built-in defaults: `smtp.gmail.com` on port 465 with
//! implicit TLS.

mod source;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use source::{EnvSource, KeyringSource, SettingKey, SettingsSource};

/// Default SMTP server.
pub const DEFAULT_HOST: &str = "smtp.gmail.com";

/// Default SMTP port (implicit TLS).
pub const DEFAULT_PORT: u16 = 465;

/// Default time allowed for a whole send.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Security/encryption mode for connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Security {
    /// No encryption (not recommended).
    None,
    /// Implicit TLS (connect directly with TLS).
    #[default]
    Tls,
    /// STARTTLS upgrade after plaintext connect.
    StartTls,
}

impl Security {
    /// Get display name for the security mode.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::None => "None (insecure)",
            Self::Tls => "SSL/TLS",
            Self::StartTls => "STARTTLS",
        }
    }

    /// The usual mode for a port when none is configured.
    #[must_use]
    pub const fn for_port(port: u16) -> Self {
        match port {
            25 | 587 => Self::StartTls,
            _ => Self::Tls,
        }
    }
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Security {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tls" | "ssl" => Ok(Self::Tls),
            "starttls" => Ok(Self::StartTls),
            "none" | "plain" => Ok(Self::None),
            other => Err(format!("unknown security mode {other:?}")),
        }
    }
}

/// Everything needed to reach and log in to the SMTP server.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Connection security.
    pub security: Security,
    /// Login user and sender address.
    pub username: Option<String>,
    /// Login password.
    pub password: Option<String>,
    /// Time allowed for a whole send.
    pub timeout: Duration,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            security: Security::Tls,
            username: None,
            password: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("security", &self.security)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SmtpSettings {
    /// Resolves settings from the keyring, then the environment.
    #[must_use]
    pub fn from_environment() -> Self {
        Self::resolve(&[&KeyringSource::new(), &EnvSource])
    }

    /// Resolves each setting from the first source that provides a usable
    /// value.
    ///
    /// Values that fail to parse are logged and the next source is tried.
    #[must_use]
    pub fn resolve(sources: &[&dyn SettingsSource]) -> Self {
        let defaults = Self::default();

        let host = first_value(sources, SettingKey::Host, |v| Some(v.trim().to_string()))
            .unwrap_or(defaults.host);
        let port = first_value(sources, SettingKey::Port, |v| {
            v.trim().parse::<u16>().ok().filter(|p| *p > 0)
        })
        .unwrap_or(defaults.port);
        let security = first_value(sources, SettingKey::Security, |v| v.parse().ok())
            .unwrap_or_else(|| Security::for_port(port));
        let timeout = first_value(sources, SettingKey::Timeout, |v| {
            v.trim().parse::<u64>().ok().filter(|s| *s > 0)
        })
        .map_or(defaults.timeout, Duration::from_secs);
        let username = first_value(sources, SettingKey::User, |v| Some(v.trim().to_string()));
        let password = first_value(sources, SettingKey::Password, |v| Some(v.to_string()));

        let settings = Self {
            host,
            port,
            security,
            username,
            password,
            timeout,
        };
        debug!(?settings, "Resolved SMTP settings");
        settings
    }

    /// Returns `(user, password)` when both are configured.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(password)) => Some((user.as_str(), password.as_str())),
            _ => None,
        }
    }

    /// Returns true if sending is possible.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.credentials().is_some()
    }

    /// Message shown when sending is unavailable.
    #[must_use]
    pub const fn missing_credentials_warning() -> &'static str {
        "SMTP credentials are not configured. Set SMTP_USER and SMTP_PASS \
         (or store smtp_user/smtp_pass in the system keyring) to enable sending."
    }
}

fn first_value<T>(
    sources: &[&dyn SettingsSource],
    key: SettingKey,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    for source in sources {
        let Some(raw) = source.lookup(key) else {
            continue;
        };
        if let Some(value) = parse(&raw) {
            debug!(setting = ?key, source = source.name(), "Using setting");
            return Some(value);
        }
        if key.is_secret() {
            warn!(setting = ?key, source = source.name(), "Ignoring invalid value");
        } else {
            warn!(setting = ?key, source = source.name(), value = %raw, "Ignoring invalid value");
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapSource(HashMap<SettingKey, String>);

    impl MapSource {
        fn new(values: &[(SettingKey, &str)]) -> Self {
            Self(values.iter().map(|(k, v)| (*k, (*v).to_string())).collect())
        }
    }

    impl SettingsSource for MapSource {
        fn name(&self) -> &'static str {
            "map"
        }

        fn lookup(&self, key: SettingKey) -> Option<String> {
            self.0.get(&key).cloned()
        }
    }

    #[test]
    fn test_defaults_without_sources() {
        let settings = SmtpSettings::resolve(&[]);
        assert_eq!(settings, SmtpSettings::default());
        assert_eq!(settings.host, "smtp.gmail.com");
        assert_eq!(settings.port, 465);
        assert_eq!(settings.security, Security::Tls);
        assert!(!settings.has_credentials());
    }

    #[test]
    fn test_first_source_wins() {
        let secrets = MapSource::new(&[(SettingKey::User, "pie@example.com")]);
        let env = MapSource::new(&[
            (SettingKey::User, "env@example.com"),
            (SettingKey::Password, "hunter2"),
            (SettingKey::Host, "mail.example.com"),
        ]);
        let settings = SmtpSettings::resolve(&[&secrets, &env]);
        assert_eq!(settings.host, "mail.example.com");
        assert_eq!(settings.credentials(), Some(("pie@example.com", "hunter2")));
    }

    #[test]
    fn test_invalid_port_falls_through() {
        let secrets = MapSource::new(&[(SettingKey::Port, "not-a-port")]);
        let env = MapSource::new(&[(SettingKey::Port, "587")]);
        let settings = SmtpSettings::resolve(&[&secrets, &env]);
        assert_eq!(settings.port, 587);
        assert_eq!(settings.security, Security::StartTls);

        let bad = MapSource::new(&[(SettingKey::Port, "70000")]);
        assert_eq!(SmtpSettings::resolve(&[&bad]).port, DEFAULT_PORT);
    }

    #[test]
    fn test_explicit_security_and_timeout() {
        let source = MapSource::new(&[
            (SettingKey::Port, "2525"),
            (SettingKey::Security, "none"),
            (SettingKey::Timeout, "5"),
        ]);
        let settings = SmtpSettings::resolve(&[&source]);
        assert_eq!(settings.security, Security::None);
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_security_parse() {
        assert_eq!("SSL".parse::<Security>().unwrap(), Security::Tls);
        assert_eq!("starttls".parse::<Security>().unwrap(), Security::StartTls);
        assert!("quantum".parse::<Security>().is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let settings = SmtpSettings {
            password: Some("hunter2".to_string()),
            ..SmtpSettings::default()
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("***"));
    }
}
