//! # stocktally-core
//!
//! Core logic for `StockTally`, a single-session inventory tally tool.
//!
//! This crate provides:
//! - **Inventory store** - (item, category) → quantity with merge-on-duplicate
//!   semantics and a `name~~~tag` key codec for persisted data
//! - **Report rendering** - plain-text and HTML reports grouped by category
//! - **Profiles** - per-producer category lists, defaults and mainstays
//! - **Templates** - named seed lists saved as JSON
//! - **Settings** - layered SMTP configuration (keyring, environment, defaults)
//! - **Delivery** - report e-mail over SMTP
//! - **Session** - the active profile and its store

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod inventory;
pub mod profile;
pub mod report;
pub mod service;
mod session;
pub mod settings;
pub mod template;

pub use error::{Error, Result};
pub use inventory::{Entry, InventoryStore, ItemKey, SEPARATOR, decode_key, encode_key};
pub use profile::{Profile, ProfileCatalog};
pub use report::{Report, render};
pub use service::{Deliver, DeliveryError, OutgoingReport, SmtpDelivery};
pub use session::Session;
pub use settings::{Security, SettingKey, SettingsSource, SmtpSettings};
pub use template::{SeedSource, TemplateLoad, TemplateStore};
