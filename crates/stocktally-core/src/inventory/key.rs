//! Item keys and the `name~~~tag` text codec.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Separator between item name and category tag in encoded keys.
pub const SEPARATOR: &str = "~~~";

/// Identifies one stock line: an item name within a category.
///
/// Names are trimmed on construction. Tags may be empty but must not contain
/// [`SEPARATOR`] or begin with `~`, so every key survives an encode/decode
/// round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    name: String,
    tag: String,
}

impl ItemKey {
    /// Creates a key from a display name and a category tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the trimmed name is empty or the tag
    /// cannot be encoded.
    pub fn new(name: &str, tag: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("item name is empty".to_string()));
        }
        validate_tag(tag)?;

        Ok(Self {
            name: name.to_string(),
            tag: tag.to_string(),
        })
    }

    /// Returns the item name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the category tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns a key for the same item under another tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the tag cannot be encoded.
    pub fn with_tag(&self, tag: &str) -> Result<Self> {
        validate_tag(tag)?;
        Ok(Self {
            name: self.name.clone(),
            tag: tag.to_string(),
        })
    }

    /// Encodes the key as `name~~~tag`.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{}{SEPARATOR}{}", self.name, self.tag)
    }
}

fn validate_tag(tag: &str) -> Result<()> {
    if tag.contains(SEPARATOR) || tag.starts_with('~') {
        return Err(Error::InvalidInput(format!(
            "category {tag:?} must not contain {SEPARATOR:?} or start with '~'"
        )));
    }
    Ok(())
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tag.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} ({})", self.name, self.tag)
        }
    }
}

impl FromStr for ItemKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, tag) = decode_key(s)?;
        Self::new(&name, &tag).map_err(|_| Error::MalformedKey(s.to_string()))
    }
}

/// Encodes a name and tag as a single `name~~~tag` string.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] under the same conditions as
/// [`ItemKey::new`].
pub fn encode_key(name: &str, tag: &str) -> Result<String> {
    ItemKey::new(name, tag).map(|key| key.encode())
}

/// Splits an encoded key at the last separator.
///
/// # Errors
///
/// Returns [`Error::MalformedKey`] if the string has no separator.
pub fn decode_key(key: &str) -> Result<(String, String)> {
    key.rsplit_once(SEPARATOR)
        .map(|(name, tag)| (name.to_string(), tag.to_string()))
        .ok_or_else(|| Error::MalformedKey(key.to_string()))
}
