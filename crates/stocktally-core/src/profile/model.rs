//! Profile model.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::inventory::ItemKey;

/// Subject used when a profile sets none.
pub const DEFAULT_SUBJECT: &str = "Inventory Report";

/// A producer/store configuration.
///
/// Categories are shown in the given order and become report sections.
/// Mainstays seed the store when no saved template exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name, unique within a catalog.
    pub name: String,
    /// Ordered category tags.
    pub categories: Vec<String>,
    /// Subject line for outgoing reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_subject: Option<String>,
    /// Address reports go to unless changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_recipient: Option<String>,
    /// (name, category) pairs to start each session with.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mainstays: Vec<(String, String)>,
}

impl Profile {
    /// Creates a profile with categories and no defaults.
    #[must_use]
    pub fn new(name: impl Into<String>, categories: &[&str]) -> Self {
        Self {
            name: name.into(),
            categories: categories.iter().map(ToString::to_string).collect(),
            default_subject: None,
            default_recipient: None,
            mainstays: Vec::new(),
        }
    }

    /// Sets the default subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.default_subject = Some(subject.into());
        self
    }

    /// Sets the default recipient.
    #[must_use]
    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.default_recipient = Some(recipient.into());
        self
    }

    /// Adds a mainstay item.
    #[must_use]
    pub fn with_mainstay(mut self, name: impl Into<String>, category: impl Into<String>) -> Self {
        self.mainstays.push((name.into(), category.into()));
        self
    }

    /// Returns the configured subject, or [`DEFAULT_SUBJECT`].
    #[must_use]
    pub fn subject_or_default(&self) -> &str {
        self.default_subject
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SUBJECT)
    }

    /// Returns the configured recipient, or an empty string.
    #[must_use]
    pub fn recipient_or_default(&self) -> &str {
        self.default_recipient.as_deref().map_or("", str::trim)
    }

    /// Returns a file-name-safe form of the profile name.
    ///
    /// ASCII letters and digits are lowercased; runs of anything else become a
    /// single `-`.
    #[must_use]
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        for ch in self.name.chars() {
            if ch.is_ascii_alphanumeric() {
                slug.push(ch.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        let slug = slug.trim_end_matches('-');
        if slug.is_empty() {
            "profile".to_string()
        } else {
            slug.to_string()
        }
    }

    /// Resolves user input to a category.
    ///
    /// Accepts a 1-based index, an exact name, or a case-insensitive name.
    #[must_use]
    pub fn resolve_category(&self, input: &str) -> Option<&str> {
        let input = input.trim();
        if let Ok(index) = input.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|i| self.categories.get(i))
                .map(String::as_str);
        }
        self.categories
            .iter()
            .find(|c| c.as_str() == input)
            .or_else(|| self.categories.iter().find(|c| c.eq_ignore_ascii_case(input)))
            .map(String::as_str)
    }

    /// Checks that the profile can be used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the name is blank, there are no categories,
    /// a category repeats or cannot be used as a tag, or a mainstay is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("profile name is empty".to_string()));
        }
        if self.categories.is_empty() {
            return Err(Error::Config(format!("profile {:?} has no categories", self.name)));
        }
        for (index, category) in self.categories.iter().enumerate() {
            if self.categories[..index].contains(category) {
                return Err(Error::Config(format!(
                    "profile {:?} lists category {category:?} twice",
                    self.name
                )));
            }
            ItemKey::new("x", category)
                .map_err(|e| Error::Config(format!("profile {:?}: {e}", self.name)))?;
        }
        for (name, category) in &self.mainstays {
            ItemKey::new(name, category)
                .map_err(|e| Error::Config(format!("profile {:?} mainstay: {e}", self.name)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(Profile::new("Why Not Pie", &["Cafe"]).slug(), "why-not-pie");
        assert_eq!(Profile::new("  Sample Bakery!! ", &["A"]).slug(), "sample-bakery");
        assert_eq!(Profile::new("Café #2", &["A"]).slug(), "caf-2");
        assert_eq!(Profile::new("???", &["A"]).slug(), "profile");
    }

    #[test]
    fn test_subject_fallback() {
        let profile = Profile::new("P", &["A"]);
        assert_eq!(profile.subject_or_default(), DEFAULT_SUBJECT);
        assert_eq!(profile.clone().with_subject("  ").subject_or_default(), DEFAULT_SUBJECT);
        assert_eq!(profile.with_subject("Daily").subject_or_default(), "Daily");
    }

    #[test]
    fn test_resolve_category() {
        let profile = Profile::new("P", &["Cafe", "Market"]);
        assert_eq!(profile.resolve_category("2"), Some("Market"));
        assert_eq!(profile.resolve_category("Cafe"), Some("Cafe"));
        assert_eq!(profile.resolve_category("market"), Some("Market"));
        assert_eq!(profile.resolve_category("0"), None);
        assert_eq!(profile.resolve_category("3"), None);
        assert_eq!(profile.resolve_category("Frozen"), None);
    }

    #[test]
    fn test_validate() {
        assert!(Profile::new("P", &["Cafe"]).validate().is_ok());
        assert!(Profile::new(" ", &["Cafe"]).validate().is_err());
        assert!(Profile::new("P", &[]).validate().is_err());
        assert!(Profile::new("P", &["Cafe", "Cafe"]).validate().is_err());
        assert!(Profile::new("P", &["a~~~b"]).validate().is_err());
        assert!(
            Profile::new("P", &["Cafe"])
                .with_mainstay("", "Cafe")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_deserialize_minimal() {
        let profile: Profile =
            serde_json::from_str(r#"{"name": "Kiosk", "categories": ["Front"]}"#).unwrap();
        assert_eq!(profile, Profile::new("Kiosk", &["Front"]));
    }

    #[test]
    fn test_mainstays_as_pairs() {
        let profile: Profile = serde_json::from_str(
            r#"{"name": "Kiosk", "categories": ["Front"], "mainstays": [["Pie", "Front"]]}"#,
        )
        .unwrap();
        assert_eq!(profile.mainstays, vec![("Pie".to_string(), "Front".to_string())]);
    }
}
