//! Profile catalog loading.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::model::Profile;
use crate::error::{Error, Result};

/// The set of profiles available to a session.
///
/// A catalog always holds at least one profile and names are unique.
#[derive(Debug, Clone)]
pub struct ProfileCatalog {
    profiles: Vec<Profile>,
}

impl ProfileCatalog {
    /// Returns the built-in profiles.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            profiles: vec![
                Profile::new("Why Not Pie", &["Cafe", "Market", "Goodies", "Frozen"])
                    .with_subject("Why Not Pie – Daily Inventory"),
                Profile::new("Sample Bakery", &["Front", "Back", "Freezer"])
                    .with_subject("Sample Bakery – Inventory"),
            ],
        }
    }

    /// Builds a catalog from configured profiles.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the list is empty, a profile is invalid
    /// or two profiles share a name.
    pub fn from_profiles(profiles: Vec<Profile>) -> Result<Self> {
        if profiles.is_empty() {
            return Err(Error::Config("no profiles configured".to_string()));
        }
        for (index, profile) in profiles.iter().enumerate() {
            profile.validate()?;
            if profiles[..index].iter().any(|p| p.name == profile.name) {
                return Err(Error::Config(format!(
                    "duplicate profile name {:?}",
                    profile.name
                )));
            }
        }
        Ok(Self { profiles })
    }

    /// Loads profiles from a JSON array file.
    ///
    /// A missing file yields the built-in profiles.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed or
    /// validated.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No profile file, using built-in profiles");
            return Ok(Self::builtin());
        }

        let contents = std::fs::read_to_string(path)?;
        let profiles: Vec<Profile> = serde_json::from_str(&contents)?;
        debug!(path = %path.display(), count = profiles.len(), "Loaded profiles");
        Self::from_profiles(profiles)
    }

    /// Default profile file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stocktally").join("profiles.json"))
    }

    /// Finds a profile by exact name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Resolves user input to a profile: 1-based index, exact or
    /// case-insensitive name.
    #[must_use]
    pub fn resolve(&self, input: &str) -> Option<&Profile> {
        let input = input.trim();
        if let Ok(index) = input.parse::<usize>() {
            return index.checked_sub(1).and_then(|i| self.profiles.get(i));
        }
        self.find(input).or_else(|| {
            self.profiles
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(input))
        })
    }

    /// Returns the first profile.
    #[must_use]
    pub fn first(&self) -> &Profile {
        // from_profiles and builtin never produce an empty list
        &self.profiles[0]
    }

    /// Returns profile names in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    /// Iterates over profiles.
    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter()
    }

    /// Returns the number of profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns true if the catalog has no profiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
