//! Type-state SMTP client.

use super::{ServerInfo, SmtpStream, Transport};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{Address, AuthMechanism, Extension, Reply, ReplyCode};
use base64::Engine;
use std::marker::PhantomData;
use tracing::{debug, trace};

/// Type-state marker for connected state.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker for authenticated state.
#[derive(Debug)]
pub struct Authenticated;

/// Type-state marker for mail transaction started.
#[derive(Debug)]
pub struct MailTransaction;

/// Type-state marker for recipient added.
#[derive(Debug)]
pub struct RecipientAdded;

/// Type-state marker for data mode.
#[derive(Debug)]
pub struct Data;

/// States from which a new mail transaction may start.
pub trait Ready {}
impl Ready for Connected {}
impl Ready for Authenticated {}

/// SMTP client with type-state pattern.
#[derive(Debug)]
pub struct Client<T, State> {
    transport: T,
    server_info: ServerInfo,
    _state: PhantomData<State>,
}

impl<T: Transport> Client<T, Connected> {
    /// Wraps a transport and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the greeting fails or the server refuses service.
    pub async fn greet(mut transport: T) -> Result<Self> {
        let greeting = read_reply(&mut transport)
            .await?
            .expect_code(ReplyCode::SERVICE_READY)?;

        let hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();
        debug!(server = %hostname, "SMTP greeting received");

        Ok(Self {
            transport,
            server_info: ServerInfo {
                hostname,
                extensions: Vec::new(),
            },
            _state: PhantomData,
        })
    }

    /// Sends EHLO and records the server's capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the EHLO command fails.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        let reply = self
            .command(Command::Ehlo {
                hostname: client_hostname.to_string(),
            })
            .await?
            .expect_success()?;
        self.server_info.set_extensions(&reply.message);
        Ok(self)
    }

    /// Authenticates using the PLAIN mechanism.
    ///
    /// # Errors
    ///
    /// Returns an error if the server advertises AUTH without PLAIN, or
    /// rejects the credentials.
    pub async fn auth_plain(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<T, Authenticated>> {
        let mechanisms = self.server_info.auth_mechanisms();
        if !mechanisms.is_empty() && !mechanisms.contains(&AuthMechanism::Plain) {
            return Err(Error::NotSupported("AUTH PLAIN".into()));
        }

        let credentials = format!("\0{username}\0{password}");
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());

        self.command(Command::Auth {
            mechanism: AuthMechanism::Plain,
            initial_response: Some(encoded),
        })
        .await?
        .expect_code(ReplyCode::AUTH_SUCCEEDED)?;

        debug!(user = username, "authenticated");
        Ok(self.into_state())
    }
}

impl Client<SmtpStream, Connected> {
    /// Upgrades the connection with STARTTLS and repeats EHLO over TLS.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not advertised or the upgrade fails.
    pub async fn starttls(mut self, server_hostname: &str, client_hostname: &str) -> Result<Self> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        self.command(Command::StartTls).await?.expect_success()?;
        self.transport = self.transport.upgrade_to_tls(server_hostname).await?;
        debug!("connection upgraded to TLS");

        // Capabilities advertised before the upgrade are discarded (RFC 3207).
        self.ehlo(client_hostname).await
    }
}

impl<T: Transport, S: Ready> Client<T, S> {
    /// Checks a message size against the server's advertised SIZE limit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MessageTooLarge`] if the limit would be exceeded.
    pub fn check_size(&self, size: usize) -> Result<()> {
        match self.server_info.max_message_size() {
            Some(limit) if limit > 0 && size > limit => Err(Error::MessageTooLarge { size, limit }),
            _ => Ok(()),
        }
    }

    /// Starts a mail transaction.
    ///
    /// `size` is announced with the SIZE parameter when the server supports it.
    ///
    /// # Errors
    ///
    /// Returns an error if the MAIL FROM command fails.
    pub async fn mail_from(
        mut self,
        from: Address,
        size: Option<usize>,
    ) -> Result<Client<T, MailTransaction>> {
        let announce_size = self
            .server_info
            .extensions
            .iter()
            .any(|ext| matches!(ext, Extension::Size(_)));
        let eight_bit = self.server_info.supports(&Extension::EightBitMime);

        self.command(Command::MailFrom {
            from,
            size: size.filter(|_| announce_size),
            eight_bit,
        })
        .await?
        .expect_success()?;

        Ok(self.into_state())
    }
}

impl<T: Transport> Client<T, MailTransaction> {
    /// Adds the first recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Client<T, RecipientAdded>> {
        self.command(Command::RcptTo { to }).await?.expect_success()?;
        Ok(self.into_state())
    }
}

impl<T: Transport> Client<T, RecipientAdded> {
    /// Adds another recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Self> {
        self.command(Command::RcptTo { to }).await?.expect_success()?;
        Ok(self)
    }

    /// Begins sending message data.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers 354.
    pub async fn data(mut self) -> Result<Client<T, Data>> {
        self.command(Command::Data)
            .await?
            .expect_code(ReplyCode::START_DATA)?;
        Ok(self.into_state())
    }

    /// Abandons the transaction with RSET.
    ///
    /// # Errors
    ///
    /// Returns an error if the RSET command fails.
    pub async fn reset(mut self) -> Result<Client<T, Connected>> {
        self.command(Command::Rset).await?.expect_success()?;
        Ok(self.into_state())
    }
}

impl<T: Transport> Client<T, Data> {
    /// Sends the message content and completes the transaction.
    ///
    /// The message should be RFC 5322 formatted. Line endings are normalized to
    /// CRLF, lines starting with `.` are dot-stuffed, and the terminating `.`
    /// line is added.
    ///
    /// # Errors
    ///
    /// Returns an error if sending fails or the server rejects the message.
    pub async fn send_message(mut self, message: &[u8]) -> Result<Client<T, Connected>> {
        let payload = encode_data(message);
        self.transport.send(&payload).await?;

        let reply = read_reply(&mut self.transport).await?.expect_success()?;
        debug!(reply = %reply.message_text(), "message accepted");
        Ok(self.into_state())
    }
}

impl<T: Transport, S> Client<T, S> {
    /// Returns the server information.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Sends QUIT and closes the session (available in any state).
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT command fails.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.command(Command::Quit).await?;
        if !reply.is_success() && reply.code != ReplyCode::CLOSING {
            return Err(Error::smtp_error(reply.code.as_u16(), reply.message_text()));
        }
        Ok(())
    }

    async fn command(&mut self, cmd: Command) -> Result<Reply> {
        trace!(command = %cmd.redacted(), "C:");
        self.transport.send(&cmd.serialize()).await?;
        read_reply(&mut self.transport).await
    }

    fn into_state<N>(self) -> Client<T, N> {
        Client {
            transport: self.transport,
            server_info: self.server_info,
            _state: PhantomData,
        }
    }
}

async fn read_reply<T: Transport>(transport: &mut T) -> Result<Reply> {
    let mut lines = Vec::new();
    loop {
        let line = transport.recv_line().await?;
        if line.is_empty() {
            continue;
        }
        trace!(line = %line, "S:");

        let is_last = is_last_reply_line(&line);
        lines.push(line);
        if is_last {
            break;
        }
    }
    parse_reply(&lines)
}

/// Normalizes line endings to CRLF, dot-stuffs, and appends the end-of-data marker.
fn encode_data(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + 16);
    let body = message.strip_suffix(b"\n").unwrap_or(message);
    let body = body.strip_suffix(b"\r").unwrap_or(body);

    if !body.is_empty() {
        for line in body.split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.first() == Some(&b'.') {
                out.push(b'.');
            }
            out.extend_from_slice(line);
            out.extend_from_slice(b"\r\n");
        }
    }

    out.extend_from_slice(b".\r\n");
    out
}
