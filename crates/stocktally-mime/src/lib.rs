//! # stocktally-mime
//!
//! MIME message generation for report e-mails.
//!
//! ## Features
//!
//! - **Message building**: single-part or `multipart/alternative` messages
//!   carrying a plain-text and an HTML rendering of the same content
//! - **Encoding**: Quoted-Printable bodies and RFC 2047 encoded headers
//! - **Deterministic output**: headers keep insertion order, and boundary,
//!   date and Message-ID can be pinned for reproducible messages
//!
//! ## Quick Start
//!
//! ```ignore
//! use stocktally_mime::MessageBuilder;
//!
//! let message = MessageBuilder::new()
//!     .from("counter@example.com")
//!     .to("owner@example.com")
//!     .subject("Daily Inventory")
//!     .text_body("=== Cafe ===\nItem\tQuantity\nMuffin\t5")
//!     .html_body("<html><body><table>...</table></body></html>")
//!     .build()?; // multipart/alternative
//!
//! smtp_client.send_message(message.as_bytes()).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod builder;
mod content_type;
mod error;
mod header;

pub mod encoding;

pub use builder::MessageBuilder;
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
