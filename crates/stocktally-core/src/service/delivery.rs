//! Report delivery over SMTP.

use std::future::Future;
use std::time::Duration;

use stocktally_mime::MessageBuilder;
use stocktally_smtp::connection::{connect, connect_tls};
use stocktally_smtp::{Address, Client, Connected, Transport};
use tracing::{debug, info};

use crate::report::Report;
use crate::settings::{Security, SmtpSettings};

/// Hostname sent with EHLO.
const CLIENT_HOSTNAME: &str = "localhost";

/// Errors that can occur while sending a report.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// No user/password configured.
    #[error("SMTP credentials are not configured")]
    MissingCredentials,

    /// Sender or recipient is not a usable address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Send failed.
    #[error("Send failed: {0}")]
    Send(String),

    /// The server did not finish in time.
    #[error("Timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The message could not be assembled.
    #[error("Could not build message: {0}")]
    Compose(String),
}

/// A rendered report addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingReport {
    /// Subject line.
    pub subject: String,
    /// Recipient address.
    pub to: String,
    /// Rendered bodies.
    pub report: Report,
}

impl OutgoingReport {
    /// Builds the MIME message (plain text with an HTML alternative).
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Compose`] if a header cannot be written.
    pub fn to_message(&self, from: &str) -> Result<String, DeliveryError> {
        MessageBuilder::new()
            .from(from)
            .to(self.to.trim())
            .subject(self.subject.as_str())
            .text_body(self.report.plain.as_str())
            .html_body(self.report.html.as_str())
            .build()
            .map_err(|e| DeliveryError::Compose(e.to_string()))
    }
}

/// Sends reports somewhere.
pub trait Deliver {
    /// Delivers one report.
    fn deliver(
        &self,
        report: &OutgoingReport,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// Delivers reports with an authenticated SMTP session.
#[derive(Debug, Clone)]
pub struct SmtpDelivery {
    settings: SmtpSettings,
}

impl SmtpDelivery {
    /// Creates a delivery that announces itself as `localhost`.
    #[must_use]
    pub const fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    /// Returns the settings in use.
    #[must_use]
    pub const fn settings(&self) -> &SmtpSettings {
        &self.settings
    }

    async fn send(&self, report: &OutgoingReport) -> Result<(), DeliveryError> {
        let (user, password) = self
            .settings
            .credentials()
            .ok_or(DeliveryError::MissingCredentials)?;
        let from = Address::new(user).map_err(|e| DeliveryError::InvalidAddress(e.to_string()))?;
        let to = Address::new(&report.to)
            .map_err(|e| DeliveryError::InvalidAddress(e.to_string()))?;
        let message = report.to_message(from.as_str())?;

        let host = self.settings.host.as_str();
        let port = self.settings.port;
        debug!(host, port, security = %self.settings.security, "Connecting to SMTP server");

        let stream = match self.settings.security {
            Security::Tls => connect_tls(host, port).await,
            Security::StartTls | Security::None => connect(host, port).await,
        }
        .map_err(|e| DeliveryError::Connection(e.to_string()))?;

        let client = Client::greet(stream)
            .await
            .map_err(|e| DeliveryError::Connection(e.to_string()))?
            .ehlo(CLIENT_HOSTNAME)
            .await
            .map_err(|e| DeliveryError::Connection(e.to_string()))?;

        let client = if self.settings.security == Security::StartTls {
            client
                .starttls(host, CLIENT_HOSTNAME)
                .await
                .map_err(|e| DeliveryError::Connection(e.to_string()))?
        } else {
            client
        };

        transmit(client, user, password, from, to, &message).await?;
        info!(to = %report.to, subject = %report.subject, "Report sent");
        Ok(())
    }
}

impl Deliver for SmtpDelivery {
    async fn deliver(&self, report: &OutgoingReport) -> Result<(), DeliveryError> {
        let limit = self.settings.timeout;
        tokio::time::timeout(limit, self.send(report))
            .await
            .map_err(|_| DeliveryError::Timeout(limit))?
    }
}

/// Authenticates and sends one message over an established session.
async fn transmit<T: Transport + Send>(
    client: Client<T, Connected>,
    user: &str,
    password: &str,
    from: Address,
    to: Address,
    message: &str,
) -> Result<(), DeliveryError> {
    let client = client
        .auth_plain(user, password)
        .await
        .map_err(|e| DeliveryError::Authentication(e.to_string()))?;

    client
        .check_size(message.len())
        .map_err(|e| DeliveryError::Send(e.to_string()))?;

    let client = client
        .mail_from(from, Some(message.len()))
        .await
        .map_err(|e| DeliveryError::Send(e.to_string()))?
        .rcpt_to(to)
        .await
        .map_err(|e| DeliveryError::Send(e.to_string()))?
        .data()
        .await
        .map_err(|e| DeliveryError::Send(e.to_string()))?
        .send_message(message.as_bytes())
        .await
        .map_err(|e| DeliveryError::Send(e.to_string()))?;

    client
        .quit()
        .await
        .map_err(|e| DeliveryError::Send(e.to_string()))
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
    use tokio::io::BufReader;
    use tokio::net::TcpListener;
    use tokio_test::io::Builder;

    fn outgoing() -> OutgoingReport {
        OutgoingReport {
            subject: "Daily".to_string(),
            to: "owner@example.com".to_string(),
            report: Report {
                plain: "=== Cafe ===\nItem\tQuantity\nMuffin\t5".to_string(),
                html: "<html><body></body></html>".to_string(),
            },
        }
    }

    fn settings_for(port: u16) -> SmtpSettings {
        SmtpSettings {
            host: "127.0.0.1".to_string(),
            port,
            security: Security::None,
            username: Some("counter@example.com".to_string()),
            password: Some("secret".to_string()),
            timeout: Duration::from_millis(200),
        }
    }

    #[test]
    fn test_to_message_has_both_parts() {
        let message = outgoing().to_message("counter@example.com").unwrap();
        assert!(message.contains("From: counter@example.com\r\n"));
        assert!(message.contains("To: owner@example.com\r\n"));
        assert!(message.contains("Subject: Daily\r\n"));
        assert!(message.contains("Content-Type: text/plain; charset=utf-8"));
        assert!(message.contains("Content-Type: text/html; charset=utf-8"));
    }

    #[tokio::test]
    async fn test_transmit_session() {
        let message = "Subject: x\r\n\r\nbody";
        let mock = Builder::new()
            .read(b"220 mx.example.com ESMTP\r\n")
            .write(b"EHLO localhost\r\n")
            .read(b"250-mx.example.com\r\n250 AUTH PLAIN\r\n")
            .write(b"AUTH PLAIN AHVzZXJAZXhhbXBsZS5jb20AcHc=\r\n")
            .read(b"235 Accepted\r\n")
            .write(b"MAIL FROM:<user@example.com>\r\n")
            .read(b"250 OK\r\n")
            .write(b"RCPT TO:<owner@example.com>\r\n")
            .read(b"250 OK\r\n")
            .write(b"DATA\r\n")
            .read(b"354 Go ahead\r\n")
            .write(b"Subject: x\r\n\r\nbody\r\n.\r\n")
            .read(b"250 queued\r\n")
            .write(b"QUIT\r\n")
            .read(b"221 bye\r\n")
            .build();

        let client = Client::greet(BufReader::new(mock))
            .await
            .unwrap()
            .ehlo("localhost")
            .await
            .unwrap();
        transmit(
            client,
            "user@example.com",
            "pw",
            Address::new("user@example.com").unwrap(),
            Address::new("owner@example.com").unwrap(),
            message,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_transmit_auth_rejected() {
        let mock = Builder::new()
            .read(b"220 mx.example.com ESMTP\r\n")
            .write(b"EHLO localhost\r\n")
            .read(b"250 mx.example.com\r\n")
            .write(b"AUTH PLAIN AHVzZXJAZXhhbXBsZS5jb20AcHc=\r\n")
            .read(b"535 5.7.8 Bad credentials\r\n")
            .build();

        let client = Client::greet(BufReader::new(mock))
            .await
            .unwrap()
            .ehlo("localhost")
            .await
            .unwrap();
        let err = transmit(
            client,
            "user@example.com",
            "pw",
            Address::new("user@example.com").unwrap(),
            Address::new("owner@example.com").unwrap(),
            "x",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DeliveryError::Authentication(_)));
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let delivery = SmtpDelivery::new(SmtpSettings::default());
        let err = delivery.deliver(&outgoing()).await.unwrap_err();
        assert!(matches!(err, DeliveryError::MissingCredentials));
    }

    #[tokio::test]
    async fn test_invalid_recipient() {
        let delivery = SmtpDelivery::new(settings_for(1));
        let mut report = outgoing();
        report.to = "not an address".to_string();
        let err = delivery.deliver(&report).await.unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let delivery = SmtpDelivery::new(settings_for(port));
        let err = delivery.deliver(&outgoing()).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Timeout(_)));
        server.abort();
    }
}
