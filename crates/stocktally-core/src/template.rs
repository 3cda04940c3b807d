//! Saved seed lists ("templates"), one JSON file per profile.
//!
//! A template file looks like:
//!
//! ```json
//! { "profile": "Why Not Pie", "items": ["Apple Pie~~~Cafe", "Bagel~~~Market"] }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::inventory::ItemKey;
use crate::profile::Profile;

#[derive(Debug, Serialize, Deserialize)]
struct TemplateFile {
    profile: String,
    items: Vec<String>,
}

/// Where the seeds for a session came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSource {
    /// A saved template file.
    Template,
    /// The profile's mainstays (no usable template).
    Mainstays,
}

/// Result of loading seeds for a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLoad {
    /// Keys to seed the store with.
    pub seeds: Vec<ItemKey>,
    /// Where they came from.
    pub source: SeedSource,
    /// Problems worth telling the user about.
    pub warnings: Vec<String>,
}

/// Template files in one directory.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    /// Uses `dir` for template files. It is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default template directory.
    #[must_use]
    pub fn default_location() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join("stocktally").join("templates")))
    }

    /// Returns the template directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file used for a profile.
    #[must_use]
    pub fn path_for(&self, profile: &Profile) -> PathBuf {
        self.dir.join(format!("{}.json", profile.slug()))
    }

    /// Saves keys as the profile's template, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, profile: &Profile, keys: &[ItemKey]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(profile);
        let file = TemplateFile {
            profile: profile.name.clone(),
            items: keys.iter().map(ItemKey::encode).collect(),
        };
        fs::write(&path, serde_json::to_string_pretty(&file)?)?;
        info!(path = %path.display(), count = keys.len(), "Saved template");
        Ok(path)
    }

    /// Loads the profile's seeds.
    ///
    /// Falls back to the profile's mainstays when there is no template or it
    /// cannot be read. Undecodable items are skipped with a warning.
    #[must_use]
    pub fn load(&self, profile: &Profile) -> TemplateLoad {
        let path = self.path_for(profile);
        let mut warnings = Vec::new();

        match read_template(&path) {
            Ok(Some(file)) => {
                if file.profile != profile.name {
                    warnings.push(format!(
                        "Template {} was saved for {:?}",
                        path.display(),
                        file.profile
                    ));
                }
                let mut seeds = Vec::with_capacity(file.items.len());
                for item in &file.items {
                    match item.parse::<ItemKey>() {
                        Ok(key) => seeds.push(key),
                        Err(e) => warnings.push(format!("Skipped template item: {e}")),
                    }
                }
                debug!(path = %path.display(), count = seeds.len(), "Loaded template");
                return TemplateLoad {
                    seeds,
                    source: SeedSource::Template,
                    warnings,
                };
            }
            Ok(None) => debug!(path = %path.display(), "No template saved"),
            Err(e) => {
                warn!(path = %path.display(), "Failed to load template: {e}");
                warnings.push(format!(
                    "Could not load template {}: {e}. Using mainstays.",
                    path.display()
                ));
            }
        }

        let (seeds, skipped) = mainstays(profile);
        warnings.extend(skipped);
        TemplateLoad {
            seeds,
            source: SeedSource::Mainstays,
            warnings,
        }
    }

    /// Deletes the profile's template. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn delete(&self, profile: &Profile) -> Result<bool> {
        match fs::remove_file(self.path_for(profile)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn read_template(path: &Path) -> Result<Option<TemplateFile>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Converts a profile's mainstays to keys, reporting invalid ones.
#[must_use]
pub fn mainstays(profile: &Profile) -> (Vec<ItemKey>, Vec<String>) {
    let mut keys = Vec::with_capacity(profile.mainstays.len());
    let mut skipped = Vec::new();
    for (name, category) in &profile.mainstays {
        match ItemKey::new(name, category) {
            Ok(key) => keys.push(key),
            Err(e) => skipped.push(format!("Skipped mainstay {name:?}: {e}")),
        }
    }
    (keys, skipped)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn profile() -> Profile {
        Profile::new("Why Not Pie", &["Cafe", "Market"]).with_mainstay("Apple Pie", "Cafe")
    }

    fn key(name: &str, tag: &str) -> ItemKey {
        ItemKey::new(name, tag).unwrap()
    }

    #[test]
    fn test_missing_template_uses_mainstays() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::new(dir.path());
        let load = store.load(&profile());
        assert_eq!(load.source, SeedSource::Mainstays);
        assert_eq!(load.seeds, vec![key("Apple Pie", "Cafe")]);
        assert!(load.warnings.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::new(dir.path().join("templates"));
        let keys = vec![key("Bagel", "Market"), key("Scone", "")];

        let path = store.save(&profile(), &keys).unwrap();
        assert!(path.ends_with("why-not-pie.json"));

        let load = store.load(&profile());
        assert_eq!(load.source, SeedSource::Template);
        assert_eq!(load.seeds, keys);
        assert!(load.warnings.is_empty());
    }

    #[test]
    fn test_file_format() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::new(dir.path());
        let path = store.save(&profile(), &[key("Bagel", "Market")]).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "profile": "Why Not Pie", "items": ["Bagel~~~Market"] })
        );
    }

    #[test]
    fn test_corrupt_template_falls_back() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::new(dir.path());
        fs::write(store.path_for(&profile()), "{ not json").unwrap();

        let load = store.load(&profile());
        assert_eq!(load.source, SeedSource::Mainstays);
        assert_eq!(load.seeds, vec![key("Apple Pie", "Cafe")]);
        assert_eq!(load.warnings.len(), 1);
    }

    #[test]
    fn test_malformed_items_skipped() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::new(dir.path());
        fs::write(
            store.path_for(&profile()),
            r#"{"profile": "Why Not Pie", "items": ["Bagel~~~Market", "no separator", "~~~Cafe"]}"#,
        )
        .unwrap();

        let load = store.load(&profile());
        assert_eq!(load.source, SeedSource::Template);
        assert_eq!(load.seeds, vec![key("Bagel", "Market")]);
        assert_eq!(load.warnings.len(), 2);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::new(dir.path());
        store.save(&profile(), &[]).unwrap();
        assert!(store.delete(&profile()).unwrap());
        assert!(!store.delete(&profile()).unwrap());
        assert_eq!(store.load(&profile()).source, SeedSource::Mainstays);
    }

    #[test]
    fn test_invalid_mainstay_reported() {
        let profile = profile().with_mainstay(" ", "Cafe");
        let (keys, skipped) = mainstays(&profile);
        assert_eq!(keys, vec![key("Apple Pie", "Cafe")]);
        assert_eq!(skipped.len(), 1);
    }
}
