//! SMTP connection management with type-state pattern.

mod client;
mod stream;

pub use client::{Authenticated, Client, Connected, Data, MailTransaction, RecipientAdded};
pub use stream::{SmtpStream, Transport, connect, connect_tls};

use crate::types::{AuthMechanism, Extension};

/// Server capabilities from the EHLO response.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Server hostname from the greeting.
    pub hostname: String,
    /// Supported extensions, in the order advertised.
    pub extensions: Vec<Extension>,
}

impl ServerInfo {
    /// Replaces the extension list from the lines of an EHLO reply.
    ///
    /// The first line is the server's greeting, not an extension.
    pub(crate) fn set_extensions<'a>(&mut self, ehlo_lines: impl IntoIterator<Item = &'a String>) {
        self.extensions = ehlo_lines
            .into_iter()
            .skip(1)
            .map(|line| Extension::parse(line))
            .collect();
    }

    /// Checks if the server supports an extension.
    #[must_use]
    pub fn supports(&self, ext: &Extension) -> bool {
        self.extensions.contains(ext)
    }

    /// Checks if STARTTLS is supported.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.supports(&Extension::StartTls)
    }

    /// Returns the maximum message size, if advertised.
    #[must_use]
    pub fn max_message_size(&self) -> Option<usize> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Size(size) => *size,
            _ => None,
        })
    }

    /// Returns supported authentication mechanisms.
    #[must_use]
    pub fn auth_mechanisms(&self) -> &[AuthMechanism] {
        self.extensions
            .iter()
            .find_map(|ext| match ext {
                Extension::Auth(mechanisms) => Some(mechanisms.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn info(lines: &[&str]) -> ServerInfo {
        let lines: Vec<String> = lines.iter().map(ToString::to_string).collect();
        let mut info = ServerInfo::default();
        info.set_extensions(&lines);
        info
    }

    #[test]
    fn test_capabilities_from_ehlo() {
        let info = info(&["mx.example.com greets you", "STARTTLS", "SIZE 1024", "AUTH PLAIN"]);
        assert!(info.supports_starttls());
        assert_eq!(info.max_message_size(), Some(1024));
        assert_eq!(info.auth_mechanisms(), &[AuthMechanism::Plain]);
    }

    #[test]
    fn test_greeting_line_is_not_an_extension() {
        let info = info(&["STARTTLS"]);
        assert!(!info.supports_starttls());
        assert!(info.auth_mechanisms().is_empty());
        assert_eq!(info.max_message_size(), None);
    }
}
