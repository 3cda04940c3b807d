//! # stocktally-smtp
//!
//! A small SMTP submission client (RFC 5321) used to deliver inventory reports.
//!
//! ## Features
//!
//! - **Type-state sessions**: the compiler rejects `RCPT TO` before `MAIL FROM`
//!   or `DATA` before a recipient has been accepted
//! - **TLS**: implicit TLS (port 465) and STARTTLS upgrade
//! - **Authentication**: AUTH PLAIN
//! - **Any transport**: the client runs over [`SmtpStream`] or any buffered
//!   async stream, which keeps sessions scriptable in tests
//!
//! ## Quick Start
//!
//! ```ignore
//! use stocktally_smtp::{Address, Client};
//! use stocktally_smtp::connection::connect_tls;
//!
//! #[tokio::main]
//! async fn main() -> stocktally_smtp::Result<()> {
//!     let stream = connect_tls("smtp.example.com", 465).await?;
//!     let client = Client::greet(stream).await?;
//!     let client = client.ehlo("localhost").await?;
//!     let client = client.auth_plain("user@example.com", "password").await?;
//!
//!     let client = client.mail_from(Address::new("user@example.com")?).await?;
//!     let client = client.rcpt_to(Address::new("boss@example.com")?).await?;
//!     let client = client.data().await?;
//!     let client = client.send_message(b"Subject: Stock\r\n\r\nMuffin 5\r\n").await?;
//!
//!     client.quit().await
//! }
//! ```
//!
//! ## Session States
//!
//! ```text
//! Connected ── auth_plain() ──→ Authenticated
//!     │                              │
//!     └──────── mail_from() ─────────┴──→ MailTransaction ── rcpt_to() ──→ RecipientAdded
//!                                                                              │
//!                                          Connected ←── send_message() ── Data ←┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use connection::{
    Authenticated, Client, Connected, Data, MailTransaction, RecipientAdded, ServerInfo,
    SmtpStream, Transport,
};
pub use error::{Error, Result};
pub use types::{Address, AuthMechanism, Extension, Reply, ReplyCode};
