//! MIME header handling.

use crate::error::{Error, Result};
use std::fmt;

/// Ordered collection of message headers.
///
/// Names are matched case-insensitively but written as given, in insertion
/// order.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    headers: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a valid field name or the value
    /// contains a bare line break (which would inject extra headers).
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let name = name.into();
        let value = value.into();
        validate(&name, &value)?;
        self.headers.push((name, value));
        Ok(())
    }

    /// Sets a header, replacing any existing values.
    ///
    /// # Errors
    ///
    /// Same as [`Headers::add`].
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.remove(&name);
        self.add(name, value)
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Removes all values for a header.
    pub fn remove(&mut self, name: &str) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    /// Returns an iterator over all headers.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

fn validate(name: &str, value: &str) -> Result<()> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_graphic() && b != b':') {
        return Err(Error::InvalidHeader(format!("bad field name {name:?}")));
    }

    // Folded values ("\r\n" followed by whitespace) are the only line breaks allowed.
    let mut rest = value;
    while let Some(pos) = rest.find(['\r', '\n']) {
        let folded = rest[pos..].starts_with("\r\n ") || rest[pos..].starts_with("\r\n\t");
        if !folded {
            return Err(Error::InvalidHeader(format!(
                "line break in value of {name}"
            )));
        }
        rest = &rest[pos + 3..];
    }
    Ok(())
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.headers {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_add_get_case_insensitive() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain").unwrap();
        assert_eq!(headers.get("content-type"), Some("text/plain"));
    }

    #[test]
    fn test_headers_keep_insertion_order() {
        let mut headers = Headers::new();
        headers.add("From", "a@example.com").unwrap();
        headers.add("To", "b@example.com").unwrap();
        headers.add("Subject", "Stock").unwrap();
        assert_eq!(
            headers.to_string(),
            "From: a@example.com\r\nTo: b@example.com\r\nSubject: Stock\r\n"
        );
    }

    #[test]
    fn test_headers_set_replaces() {
        let mut headers = Headers::new();
        headers.add("To", "alice@example.com").unwrap();
        headers.add("To", "bob@example.com").unwrap();
        headers.set("to", "carol@example.com").unwrap();
        assert_eq!(headers.iter().count(), 1);
        assert_eq!(headers.get("To"), Some("carol@example.com"));
    }

    #[test]
    fn test_headers_reject_injection() {
        let mut headers = Headers::new();
        assert!(headers.add("Subject", "hi\r\nBcc: x@example.com").is_err());
        assert!(headers.add("Subject", "hi\nthere").is_err());
        assert!(headers.add("Bad Name", "x").is_err());
        assert!(headers.add("Subject", "=?utf-8?B?AA==?=\r\n =?utf-8?B?AA==?=").is_ok());
    }
}
