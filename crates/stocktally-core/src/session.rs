//! The active profile and its inventory.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::inventory::InventoryStore;
use crate::profile::{Profile, ProfileCatalog};
use crate::report::{Report, render};
use crate::service::{Deliver, OutgoingReport};
use crate::template::{SeedSource, TemplateLoad, TemplateStore, mainstays};

/// One tallying session.
///
/// Switching to another profile discards the current entries and seeds the
/// store from that profile's template or mainstays.
#[derive(Debug)]
pub struct Session {
    catalog: ProfileCatalog,
    templates: Option<TemplateStore>,
    profile: Profile,
    store: InventoryStore,
}

impl Session {
    /// Starts a session on the catalog's first profile.
    ///
    /// Returns the session and any warnings from seeding.
    #[must_use]
    pub fn new(catalog: ProfileCatalog, templates: Option<TemplateStore>) -> (Self, Vec<String>) {
        let profile = catalog.first().clone();
        let mut session = Self {
            catalog,
            templates,
            profile,
            store: InventoryStore::new(),
        };
        let warnings = session.reset_to_template();
        (session, warnings)
    }

    /// Switches profile. Selecting the active profile keeps the entries.
    ///
    /// Returns warnings from seeding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownProfile`] if no profile matches.
    pub fn select_profile(&mut self, input: &str) -> Result<Vec<String>> {
        let profile = self
            .catalog
            .resolve(input)
            .ok_or_else(|| Error::UnknownProfile(input.trim().to_string()))?;
        if profile.name == self.profile.name {
            debug!(profile = %profile.name, "Profile already active");
            return Ok(Vec::new());
        }

        info!(from = %self.profile.name, to = %profile.name, "Switching profile");
        self.profile = profile.clone();
        Ok(self.reset_to_template())
    }

    /// Replaces the entries with the profile's seeds at quantity zero.
    pub fn reset_to_template(&mut self) -> Vec<String> {
        let TemplateLoad {
            seeds,
            source,
            mut warnings,
        } = match &self.templates {
            Some(templates) => templates.load(&self.profile),
            None => {
                let (seeds, warnings) = mainstays(&self.profile);
                TemplateLoad {
                    seeds,
                    source: SeedSource::Mainstays,
                    warnings,
                }
            }
        };
        if let Err(e) = self
            .store
            .load_from(seeds.iter().map(|key| (key.name(), key.tag())))
        {
            warnings.push(format!("Could not seed items: {e}"));
        }
        debug!(profile = %self.profile.name, ?source, count = seeds.len(), "Seeded store");
        warnings
    }

    /// Saves the current keys as the profile's template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no template directory is available, or an
    /// I/O error from writing.
    pub fn save_template(&self) -> Result<PathBuf> {
        let templates = self
            .templates
            .as_ref()
            .ok_or_else(|| Error::Config("no template directory available".to_string()))?;
        templates.save(&self.profile, &self.store.template())
    }

    /// Returns the active profile.
    #[must_use]
    pub const fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Returns the profile catalog.
    #[must_use]
    pub const fn catalog(&self) -> &ProfileCatalog {
        &self.catalog
    }

    /// Returns the store.
    #[must_use]
    pub const fn store(&self) -> &InventoryStore {
        &self.store
    }

    /// Returns the store for editing.
    pub const fn store_mut(&mut self) -> &mut InventoryStore {
        &mut self.store
    }

    /// Returns true if a report could be sent to `recipient`.
    #[must_use]
    pub fn can_send(&self, recipient: &str) -> bool {
        !recipient.trim().is_empty() && self.store.has_stock()
    }

    /// Renders the current entries under the profile's categories.
    #[must_use]
    pub fn compose(&self, before: &str, after: &str) -> Report {
        render(&self.store.snapshot(), &self.profile.categories, before, after)
    }

    /// Prepares a report for sending.
    ///
    /// A blank subject falls back to the profile's default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the recipient is blank or nothing
    /// has a positive quantity.
    pub fn outgoing(
        &self,
        subject: &str,
        recipient: &str,
        before: &str,
        after: &str,
    ) -> Result<OutgoingReport> {
        if recipient.trim().is_empty() {
            return Err(Error::InvalidInput("no recipient".to_string()));
        }
        if !self.store.has_stock() {
            return Err(Error::InvalidInput("nothing in stock to report".to_string()));
        }

        let subject = match subject.trim() {
            "" => self.profile.subject_or_default(),
            subject => subject,
        };
        Ok(OutgoingReport {
            subject: subject.to_string(),
            to: recipient.trim().to_string(),
            report: self.compose(before, after),
        })
    }

    /// Renders and sends a report. Entries are kept after sending.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Session::outgoing`] and
    /// [`Error::Delivery`] if sending fails.
    pub async fn send<D: Deliver>(
        &self,
        delivery: &D,
        subject: &str,
        recipient: &str,
        before: &str,
        after: &str,
    ) -> Result<OutgoingReport> {
        let outgoing = self.outgoing(subject, recipient, before, after)?;
        delivery.deliver(&outgoing).await?;
        Ok(outgoing)
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
    use crate::inventory::ItemKey;
    use crate::service::DeliveryError;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<OutgoingReport>>,
        fail: bool,
    }

    impl Deliver for Recorder {
        async fn deliver(&self, report: &OutgoingReport) -> std::result::Result<(), DeliveryError> {
            if self.fail {
                return Err(DeliveryError::Connection("refused".to_string()));
            }
            self.sent.lock().unwrap().push(report.clone());
            Ok(())
        }
    }

    fn catalog() -> ProfileCatalog {
        ProfileCatalog::from_profiles(vec![
            Profile::new("Why Not Pie", &["Cafe", "Market"]).with_mainstay("Apple Pie", "Cafe"),
            Profile::new("Sample Bakery", &["Front"]).with_subject("Bakery Stock"),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_seeds_from_mainstays() {
        let (session, warnings) = Session::new(catalog(), None);
        assert!(warnings.is_empty());
        assert_eq!(session.profile().name, "Why Not Pie");
        assert_eq!(
            session.store().get(&ItemKey::new("Apple Pie", "Cafe").unwrap()),
            Some(0)
        );
    }

    #[test]
    fn test_select_same_profile_keeps_entries() {
        let (mut session, _) = Session::new(catalog(), None);
        session.store_mut().add("Bagel", "Market", 3).unwrap();
        session.select_profile("Why Not Pie").unwrap();
        assert_eq!(session.store().len(), 2);
    }

    #[test]
    fn test_select_other_profile_resets() {
        let (mut session, _) = Session::new(catalog(), None);
        session.store_mut().add("Bagel", "Market", 3).unwrap();
        session.select_profile("2").unwrap();
        assert_eq!(session.profile().name, "Sample Bakery");
        assert!(session.store().is_empty());
        assert!(matches!(
            session.select_profile("Nope"),
            Err(Error::UnknownProfile(_))
        ));
    }

    #[test]
    fn test_template_round_trip() {
        let dir = TempDir::new().unwrap();
        let templates = TemplateStore::new(dir.path());
        let (mut session, _) = Session::new(catalog(), Some(templates.clone()));
        session.store_mut().add("Bagel", "Market", 3).unwrap();
        session.save_template().unwrap();

        session.store_mut().clear();
        session.reset_to_template();
        let snapshot = session.store().snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().all(|e| e.quantity == 0));

        let (fresh, _) = Session::new(catalog(), Some(templates));
        assert_eq!(fresh.store().len(), 2);
    }

    #[test]
    fn test_save_template_without_directory() {
        let (session, _) = Session::new(catalog(), None);
        assert!(matches!(session.save_template(), Err(Error::Config(_))));
    }

    #[test]
    fn test_can_send() {
        let (mut session, _) = Session::new(catalog(), None);
        assert!(!session.can_send("owner@example.com"));
        session.store_mut().add("Bagel", "Market", 1).unwrap();
        assert!(session.can_send("owner@example.com"));
        assert!(!session.can_send("   "));
    }

    #[test]
    fn test_outgoing_uses_default_subject() {
        let (mut session, _) = Session::new(catalog(), None);
        session.select_profile("Sample Bakery").unwrap();
        session.store_mut().add("Loaf", "Front", 2).unwrap();

        let outgoing = session.outgoing("  ", " boss@example.com ", "", "").unwrap();
        assert_eq!(outgoing.subject, "Bakery Stock");
        assert_eq!(outgoing.to, "boss@example.com");
        assert_eq!(outgoing.report.plain, "=== Front ===\nItem\tQuantity\nLoaf\t2");
    }

    #[tokio::test]
    async fn test_send_delivers_and_keeps_entries() {
        let (mut session, _) = Session::new(catalog(), None);
        session.store_mut().add("Muffin", "Cafe", 5).unwrap();
        let recorder = Recorder::default();

        session
            .send(&recorder, "Daily", "owner@example.com", "", "")
            .await
            .unwrap();

        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Daily");
        assert!(sent[0].report.plain.contains("Muffin\t5"));
        assert!(session.store().has_stock());
    }

    #[tokio::test]
    async fn test_send_failure_surfaces() {
        let (mut session, _) = Session::new(catalog(), None);
        session.store_mut().add("Muffin", "Cafe", 5).unwrap();
        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };

        let err = session
            .send(&recorder, "Daily", "owner@example.com", "", "")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Delivery(DeliveryError::Connection(_))));
    }

    #[test]
    fn test_duplicate_template_items_collapse() {
        let dir = TempDir::new().unwrap();
        let templates = TemplateStore::new(dir.path());
        let profile = catalog().first().clone();
        std::fs::write(
            templates.path_for(&profile),
            r#"{"profile":"Why Not Pie","items":["Pie~~~Cafe","Tart~~~Market","Pie~~~Cafe"]}"#,
        )
        .unwrap();

        let (mut session, warnings) = Session::new(catalog(), Some(templates));
        assert!(warnings.is_empty());
        session.store_mut().add("Pie", "Cafe", 3).unwrap();

        assert!(session.reset_to_template().is_empty());
        let keys = session.store().template();
        assert_eq!(
            keys,
            vec![
                ItemKey::new("Pie", "Cafe").unwrap(),
                ItemKey::new("Tart", "Market").unwrap()
            ]
        );
        assert!(!session.store().has_stock());
    }
}
