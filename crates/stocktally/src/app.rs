//! Application state and command handling.

use stocktally_core::{Deliver, Entry, ItemKey, Session, SmtpSettings};
use tracing::{info, warn};

use crate::command::Command;
use crate::view;

/// What the prompt loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Print the text and read the next command.
    Continue(String),
    /// Leave the program.
    Quit,
}

/// Main application state.
pub struct StockTally<D> {
    /// Active profile and its items.
    session: Session,
    /// Where reports go.
    delivery: D,
    /// Whether SMTP credentials are configured.
    can_deliver: bool,
    /// Report subject; blank means the profile default.
    subject: String,
    /// Report recipient.
    recipient: String,
    /// Text above the table.
    before: String,
    /// Text below the table.
    after: String,
}

impl<D: Deliver> StockTally<D> {
    pub fn new(session: Session, delivery: D, can_deliver: bool) -> Self {
        let mut app = Self {
            session,
            delivery,
            can_deliver,
            subject: String::new(),
            recipient: String::new(),
            before: String::new(),
            after: String::new(),
        };
        app.apply_profile_defaults();
        app
    }

    /// Startup text: active profile and any credential warning.
    pub fn banner(&self) -> String {
        let mut lines = vec![self.status()];
        if !self.can_deliver {
            lines.push(format!("Warning: {}", SmtpSettings::missing_credentials_warning()));
        }
        lines.push("Type 'help' for commands.".to_string());
        lines.join("\n")
    }

    pub async fn update(&mut self, command: Command) -> Outcome {
        let text = match command {
            Command::Help => view::HELP.to_string(),
            Command::Profiles => {
                view::profiles(self.session.catalog(), &self.session.profile().name)
            }
            Command::Profile(input) => match self.session.select_profile(&input) {
                Ok(warnings) => {
                    self.apply_profile_defaults();
                    with_warnings(self.status(), &warnings)
                }
                Err(e) => format!("Error: {e}"),
            },
            Command::List => view::entries(&self.entries()),
            Command::Add {
                quantity,
                category,
                name,
            } => self.add(&name, &category, quantity),
            Command::Increment(index) => self.with_item(index, |session, key| {
                let quantity = session.store_mut().increment(key)?;
                Ok(format!("{key}: {quantity}"))
            }),
            Command::Decrement(index) => self.with_item(index, |session, key| {
                let quantity = session.store_mut().decrement(key)?;
                Ok(format!("{key}: {quantity}"))
            }),
            Command::Set { index, quantity } => self.with_item(index, |session, key| {
                session.store_mut().set_quantity(key, quantity)?;
                Ok(format!("{key}: {quantity}"))
            }),
            Command::Retag { index, category } => {
                let Some(tag) = self.session.profile().resolve_category(&category) else {
                    return Outcome::Continue(self.unknown_category(&category));
                };
                let tag = tag.to_string();
                self.with_item(index, |session, key| {
                    let moved = session.store_mut().retag(key, &tag)?;
                    let quantity = session.store().get(&moved).unwrap_or_default();
                    Ok(format!("Moved to {moved}: {quantity}"))
                })
            }
            Command::Remove(index) => self.with_item(index, |session, key| {
                session.store_mut().remove(key);
                Ok(format!("Deleted {key}"))
            }),
            Command::Clear => {
                self.session.store_mut().clear();
                "Cleared all items.".to_string()
            }
            Command::Subject(subject) => {
                self.subject = subject;
                format!("Subject: {}", self.effective_subject())
            }
            Command::Before(text) => {
                self.before = text;
                "Updated text before the table.".to_string()
            }
            Command::After(text) => {
                self.after = text;
                "Updated text after the table.".to_string()
            }
            Command::Recipient(recipient) => {
                self.recipient = recipient.trim().to_string();
                if self.recipient.is_empty() {
                    "Recipient cleared.".to_string()
                } else {
                    format!("Recipient: {}", self.recipient)
                }
            }
            Command::Preview { html } => {
                let report = self.session.compose(&self.before, &self.after);
                let body = if html { report.html } else { report.plain };
                format!(
                    "To: {}\nSubject: {}\n\n{body}",
                    self.recipient,
                    self.effective_subject()
                )
            }
            Command::Send => self.send().await,
            Command::Save => match self.session.save_template() {
                Ok(path) => format!("Saved template to {}", path.display()),
                Err(e) => format!("Error: {e}"),
            },
            Command::Reset => {
                let warnings = self.session.reset_to_template();
                with_warnings(
                    format!("Reloaded {} item(s) at zero.", self.session.store().len()),
                    &warnings,
                )
            }
            Command::Quit => return Outcome::Quit,
        };
        Outcome::Continue(text)
    }

    /// Items sorted by name then category; list numbers index into this.
    fn entries(&self) -> Vec<Entry> {
        let mut entries = self.session.store().snapshot();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    fn with_item(
        &mut self,
        index: usize,
        action: impl FnOnce(&mut Session, &ItemKey) -> stocktally_core::Result<String>,
    ) -> String {
        let entries = self.entries();
        let Some(entry) = index.checked_sub(1).and_then(|i| entries.get(i)) else {
            return format!("No item {index}. Use 'list' to see item numbers.");
        };
        match action(&mut self.session, &entry.key) {
            Ok(text) => text,
            Err(e) => format!("Error: {e}"),
        }
    }

    fn add(&mut self, name: &str, category: &str, quantity: i64) -> String {
        let Some(tag) = self.session.profile().resolve_category(category) else {
            return self.unknown_category(category);
        };
        let tag = tag.to_string();

        let store = self.session.store_mut();
        match store.add(name, &tag, quantity) {
            Ok(key) => format!("{key}: {}", store.get(&key).unwrap_or_default()),
            Err(e) => format!("Error: {e}"),
        }
    }

    async fn send(&mut self) -> String {
        if !self.can_deliver {
            return SmtpSettings::missing_credentials_warning().to_string();
        }
        if !self.session.can_send(&self.recipient) {
            return "Set a recipient ('to <address>') and at least one quantity above zero."
                .to_string();
        }

        match self
            .session
            .send(
                &self.delivery,
                &self.subject,
                &self.recipient,
                &self.before,
                &self.after,
            )
            .await
        {
            Ok(sent) => {
                info!(to = %sent.to, "Report sent");
                format!("Sent {:?} to {}.", sent.subject, sent.to)
            }
            Err(e) => {
                warn!("Send failed: {e}");
                format!("Error: {e}")
            }
        }
    }

    fn apply_profile_defaults(&mut self) {
        let profile = self.session.profile();
        self.subject = profile.subject_or_default().to_string();
        self.recipient = profile.recipient_or_default().to_string();
    }

    fn effective_subject(&self) -> &str {
        match self.subject.trim() {
            "" => self.session.profile().subject_or_default(),
            subject => subject,
        }
    }

    fn status(&self) -> String {
        let profile = self.session.profile();
        format!(
            "Profile: {} ({})",
            profile.name,
            view::categories(profile)
        )
    }

    fn unknown_category(&self, input: &str) -> String {
        format!(
            "Unknown category {input:?}. Choose one of: {}",
            view::categories(self.session.profile())
        )
    }
}

fn with_warnings(text: String, warnings: &[String]) -> String {
    if warnings.is_empty() {
        return text;
    }
    let mut lines = vec![text];
    lines.extend(warnings.iter().map(|w| format!("Warning: {w}")));
    lines.join("\n")
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
    use std::sync::Mutex;
    use stocktally_core::{DeliveryError, OutgoingReport, Profile, ProfileCatalog};

    #[derive(Default)]
    struct Outbox(Mutex<Vec<OutgoingReport>>);

    impl Deliver for Outbox {
        async fn deliver(&self, report: &OutgoingReport) -> Result<(), DeliveryError> {
            self.0.lock().unwrap().push(report.clone());
            Ok(())
        }
    }

    fn app() -> StockTally<Outbox> {
        let (session, _) = Session::new(ProfileCatalog::builtin(), None);
        StockTally::new(session, Outbox::default(), true)
    }

    async fn run(app: &mut StockTally<Outbox>, line: &str) -> String {
        let command = Command::parse(line).unwrap().unwrap();
        match app.update(command).await {
            Outcome::Continue(text) => text,
            Outcome::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let mut app = app();
        assert_eq!(run(&mut app, "add 3 Cafe Muffin").await, "Muffin (Cafe): 3");
        assert_eq!(run(&mut app, "add 2 1 Muffin").await, "Muffin (Cafe): 5");
        run(&mut app, "add 1 market Bagel").await;
        assert_eq!(
            run(&mut app, "list").await,
            "  1. Bagel       1  [Market]\n  2. Muffin      5  [Cafe]"
        );
    }

    #[tokio::test]
    async fn test_rejected_input() {
        let mut app = app();
        assert!(run(&mut app, "add -1 Cafe Muffin").await.starts_with("Error: Invalid input"));
        assert!(run(&mut app, "add 1 Herbal Tea").await.starts_with("Unknown category"));
        assert!(run(&mut app, "inc 1").await.starts_with("No item 1"));
    }

    #[tokio::test]
    async fn test_item_numbers_follow_list_order() {
        let mut app = app();
        run(&mut app, "add 1 Cafe Scone").await;
        run(&mut app, "add 4 Cafe Brownie").await;
        assert_eq!(run(&mut app, "inc 1").await, "Brownie (Cafe): 5");
        assert_eq!(run(&mut app, "dec 2").await, "Scone (Cafe): 0");
        assert_eq!(run(&mut app, "set 2 7").await, "Scone (Cafe): 7");
        assert_eq!(run(&mut app, "del 1").await, "Deleted Brownie (Cafe)");
        assert_eq!(app.session.store().len(), 1);
    }

    #[tokio::test]
    async fn test_retag_merges() {
        let mut app = app();
        run(&mut app, "add 2 Cafe Pie").await;
        run(&mut app, "add 3 Frozen Pie").await;
        assert_eq!(run(&mut app, "tag 1 Frozen").await, "Moved to Pie (Frozen): 5");
        assert_eq!(app.session.store().len(), 1);
    }

    #[tokio::test]
    async fn test_send_requires_recipient_and_stock() {
        let mut app = app();
        assert!(run(&mut app, "send").await.starts_with("Set a recipient"));
        run(&mut app, "to owner@example.com").await;
        assert!(run(&mut app, "send").await.starts_with("Set a recipient"));

        run(&mut app, "add 5 Cafe Muffin").await;
        assert_eq!(
            run(&mut app, "send").await,
            "Sent \"Why Not Pie – Daily Inventory\" to owner@example.com."
        );
        let sent = app.delivery.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].report.plain.contains("=== Cafe ===\nItem\tQuantity\nMuffin\t5"));
    }

    #[tokio::test]
    async fn test_send_without_credentials() {
        let (session, _) = Session::new(ProfileCatalog::builtin(), None);
        let mut app = StockTally::new(session, Outbox::default(), false);
        assert!(app.banner().contains("credentials are not configured"));
        assert_eq!(
            run(&mut app, "send").await,
            SmtpSettings::missing_credentials_warning()
        );
    }

    #[tokio::test]
    async fn test_profile_switch_resets_defaults() {
        let mut app = app();
        run(&mut app, "add 1 Cafe Pie").await;
        run(&mut app, "subject Custom").await;
        let text = run(&mut app, "profile Sample Bakery").await;
        assert_eq!(text, "Profile: Sample Bakery (1=Front, 2=Back, 3=Freezer)");
        assert!(app.session.store().is_empty());
        assert_eq!(app.effective_subject(), "Sample Bakery – Inventory");
    }

    #[tokio::test]
    async fn test_profile_default_recipient_used_for_send() {
        let catalog = ProfileCatalog::from_profiles(vec![
            Profile::new("Why Not Pie", &["Cafe"]),
            Profile::new("Kiosk", &["Front"]).with_recipient("owner@kiosk.example"),
        ])
        .unwrap();
        let (session, _) = Session::new(catalog, None);
        let mut app = StockTally::new(session, Outbox::default(), true);
        assert_eq!(app.recipient, "");

        run(&mut app, "profile Kiosk").await;
        assert_eq!(app.recipient, "owner@kiosk.example");
        run(&mut app, "add 2 Front Coffee").await;
        assert_eq!(
            run(&mut app, "send").await,
            "Sent \"Inventory Report\" to owner@kiosk.example."
        );
    }

    #[tokio::test]
    async fn test_preview() {
        let mut app = app();
        run(&mut app, "add 1 Market Bagel").await;
        run(&mut app, "before Good morning").await;
        let text = run(&mut app, "preview").await;
        assert!(text.starts_with("To: \nSubject: Why Not Pie – Daily Inventory\n\nGood morning\n\n"));
        let html = run(&mut app, "preview html").await;
        assert!(html.contains("<p>Good morning</p>"));
    }

    #[tokio::test]
    async fn test_save_without_template_dir() {
        let mut app = app();
        assert!(run(&mut app, "save").await.starts_with("Error: Configuration error"));
    }

    #[tokio::test]
    async fn test_quit() {
        let mut app = app();
        assert_eq!(app.update(Command::Quit).await, Outcome::Quit);
    }
}
