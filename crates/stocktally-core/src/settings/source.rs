//! Setting sources: system keyring and process environment.
//!
//! Keyring entries live under the `stocktally` service:
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - macOS: Keychain
//! - Windows: Credential Manager

use keyring::Entry;
use tracing::{debug, warn};

use crate::error::Result;

/// Service name used for keyring entries.
const SERVICE_NAME: &str = "stocktally";

/// A single SMTP setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// Server hostname.
    Host,
    /// Server port.
    Port,
    /// Login user, also used as the From address.
    User,
    /// Login password.
    Password,
    /// Connection security (`tls`, `starttls` or `none`).
    Security,
    /// Send timeout in seconds.
    Timeout,
}

impl SettingKey {
    /// All keys, in lookup order.
    pub const ALL: [Self; 6] = [
        Self::Host,
        Self::Port,
        Self::User,
        Self::Password,
        Self::Security,
        Self::Timeout,
    ];

    /// Environment variable name.
    #[must_use]
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::Host => "SMTP_HOST",
            Self::Port => "SMTP_PORT",
            Self::User => "SMTP_USER",
            Self::Password => "SMTP_PASS",
            Self::Security => "SMTP_SECURITY",
            Self::Timeout => "SMTP_TIMEOUT",
        }
    }

    /// Keyring entry name.
    #[must_use]
    pub const fn keyring_entry(self) -> &'static str {
        match self {
            Self::Host => "smtp_host",
            Self::Port => "smtp_port",
            Self::User => "smtp_user",
            Self::Password => "smtp_pass",
            Self::Security => "smtp_security",
            Self::Timeout => "smtp_timeout",
        }
    }

    /// Whether the value must not be logged.
    #[must_use]
    pub const fn is_secret(self) -> bool {
        matches!(self, Self::Password)
    }
}

/// Somewhere settings can be looked up.
///
/// A source returns `None` when it has no usable value; blank values count
/// as missing.
pub trait SettingsSource {
    /// Short name for log messages.
    fn name(&self) -> &'static str;

    /// Looks up one setting.
    fn lookup(&self, key: SettingKey) -> Option<String>;
}

/// Reads `SMTP_*` environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl SettingsSource for EnvSource {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn lookup(&self, key: SettingKey) -> Option<String> {
        std::env::var(key.env_var()).ok().and_then(non_blank)
    }
}

/// Reads settings stored in the system keyring.
///
/// Keyring failures other than a missing entry are logged and treated as
/// missing values.
#[derive(Debug, Clone)]
pub struct KeyringSource {
    service: String,
}

impl KeyringSource {
    /// Uses the default `stocktally` service.
    #[must_use]
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Uses a custom service name.
    #[must_use]
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Stores a setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the keyring operation fails.
    pub fn store(&self, key: SettingKey, value: &str) -> Result<()> {
        let entry = Entry::new(&self.service, key.keyring_entry())?;
        entry.set_password(value)?;
        debug!(entry = key.keyring_entry(), "Stored setting in keyring");
        Ok(())
    }

    /// Deletes a setting. Missing entries are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the keyring operation fails.
    pub fn delete(&self, key: SettingKey) -> Result<()> {
        let entry = Entry::new(&self.service, key.keyring_entry())?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Default for KeyringSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsSource for KeyringSource {
    fn name(&self) -> &'static str {
        "keyring"
    }

    fn lookup(&self, key: SettingKey) -> Option<String> {
        let entry = match Entry::new(&self.service, key.keyring_entry()) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(entry = key.keyring_entry(), "Failed to open keyring entry: {e}");
                return None;
            }
        };

        match entry.get_password() {
            Ok(value) => non_blank(value),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(entry = key.keyring_entry(), "Failed to read keyring: {e}");
                None
            }
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_distinct() {
        for (i, a) in SettingKey::ALL.iter().enumerate() {
            for b in &SettingKey::ALL[i + 1..] {
                assert_ne!(a.env_var(), b.env_var());
                assert_ne!(a.keyring_entry(), b.keyring_entry());
            }
        }
    }

    #[test]
    fn test_only_password_is_secret() {
        let secret: Vec<_> = SettingKey::ALL.into_iter().filter(|k| k.is_secret()).collect();
        assert_eq!(secret, vec![SettingKey::Password]);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  ".to_string()), None);
        assert_eq!(non_blank("x".to_string()), Some("x".to_string()));
    }

    // These tests require a keyring service to be available.
    #[test]
    #[ignore = "requires system keyring"]
    fn test_keyring_store_and_lookup() {
        let source = KeyringSource::with_service("stocktally-test");
        source.store(SettingKey::Host, "smtp.example.com").unwrap();
        assert_eq!(
            source.lookup(SettingKey::Host),
            Some("smtp.example.com".to_string())
        );
        source.delete(SettingKey::Host).unwrap();
        assert_eq!(source.lookup(SettingKey::Host), None);
    }
}
