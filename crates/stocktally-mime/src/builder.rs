//! MIME message builder.

use crate::content_type::ContentType;
use crate::encoding::{encode_quoted_printable, encode_rfc2047};
use crate::error::{Error, Result};
use crate::header::Headers;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-process counter mixed into generated boundaries and Message-IDs.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Preamble shown by clients that do not understand multipart messages.
const MULTIPART_PREAMBLE: &str = "This is a multi-part message in MIME format.";

/// Builds RFC 5322 messages with a plain-text and/or HTML body.
///
/// With both bodies the result is `multipart/alternative` (plain text first,
/// as clients prefer the last part they can render).
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    from: Option<String>,
    to: Vec<String>,
    subject: Option<String>,
    date: Option<DateTime<Utc>>,
    message_id: Option<String>,
    boundary: Option<String>,
    text: Option<String>,
    html: Option<String>,
}

impl MessageBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sender.
    #[must_use]
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Adds a recipient.
    #[must_use]
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to.push(to.into());
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Pins the Date header (defaults to now).
    #[must_use]
    pub const fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Pins the Message-ID, without angle brackets.
    #[must_use]
    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    /// Pins the multipart boundary.
    #[must_use]
    pub fn boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = Some(boundary.into());
        self
    }

    /// Sets the plain-text body.
    #[must_use]
    pub fn text_body(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn html_body(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Renders the message with CRLF line endings.
    ///
    /// # Errors
    ///
    /// Returns an error if From, To or a body is missing, or a header value
    /// cannot be written safely.
    pub fn build(self) -> Result<String> {
        let from = self.from.ok_or(Error::MissingHeader("From"))?;
        if self.to.is_empty() {
            return Err(Error::MissingHeader("To"));
        }

        let date = self.date.unwrap_or_else(Utc::now);
        let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let stamp = date.timestamp_nanos_opt().unwrap_or_default();

        let message_id = self.message_id.unwrap_or_else(|| {
            let domain = from.rsplit_once('@').map_or("localhost", |(_, d)| d);
            format!("{stamp:x}.{sequence}@{domain}")
        });

        let mut headers = Headers::new();
        headers.add("Date", date.to_rfc2822())?;
        headers.add("From", from)?;
        headers.add("To", self.to.join(", "))?;
        headers.add(
            "Subject",
            encode_rfc2047(self.subject.as_deref().unwrap_or_default(), "utf-8"),
        )?;
        headers.add("Message-ID", format!("<{message_id}>"))?;
        headers.add("MIME-Version", "1.0")?;

        let body = match (self.text, self.html) {
            (Some(text), Some(html)) => {
                let boundary = self
                    .boundary
                    .unwrap_or_else(|| format!("=_tally_{stamp:x}_{sequence}"));
                headers.add(
                    "Content-Type",
                    ContentType::multipart_alternative(boundary.as_str()).to_string(),
                )?;

                let mut body = format!("{MULTIPART_PREAMBLE}\r\n");
                for (content_type, content) in [
                    (ContentType::text_plain(), text),
                    (ContentType::text_html(), html),
                ] {
                    body.push_str(&format!("\r\n--{boundary}\r\n"));
                    body.push_str(&part(&content_type, &content)?);
                }
                body.push_str(&format!("\r\n--{boundary}--\r\n"));
                body
            }
            (Some(text), None) => return single_part(headers, &ContentType::text_plain(), &text),
            (None, Some(html)) => return single_part(headers, &ContentType::text_html(), &html),
            (None, None) => return Err(Error::MissingBody),
        };

        Ok(format!("{headers}\r\n{body}"))
    }
}

fn single_part(mut headers: Headers, content_type: &ContentType, content: &str) -> Result<String> {
    headers.add("Content-Type", content_type.to_string())?;
    headers.add("Content-Transfer-Encoding", "quoted-printable")?;
    Ok(format!(
        "{headers}\r\n{}\r\n",
        encode_quoted_printable(content)
    ))
}

fn part(content_type: &ContentType, content: &str) -> Result<String> {
    let mut headers = Headers::new();
    headers.add("Content-Type", content_type.to_string())?;
    headers.add("Content-Transfer-Encoding", "quoted-printable")?;
    Ok(format!(
        "{headers}\r\n{}",
        encode_quoted_printable(content)
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::encoding::decode_quoted_printable;
    use chrono::TimeZone;

    fn fixed() -> MessageBuilder {
        MessageBuilder::new()
            .from("counter@whynotpie.example")
            .to("owner@whynotpie.example")
            .subject("Daily Inventory")
            .date(Utc.with_ymd_and_hms(2025, 4, 29, 8, 30, 0).unwrap())
            .message_id("report-1@whynotpie.example")
            .boundary("BOUNDARY")
    }

    #[test]
    fn test_multipart_alternative_layout() {
        let message = fixed()
            .text_body("=== Cafe ===\nItem\tQuantity\nMuffin\t5")
            .html_body("<html><body><table></table></body></html>")
            .build()
            .unwrap();

        let expected = concat!(
            "Date: Tue, 29 Apr 2025 08:30:00 +0000\r\n",
            "From: counter@whynotpie.example\r\n",
            "To: owner@whynotpie.example\r\n",
            "Subject: Daily Inventory\r\n",
            "Message-ID: <report-1@whynotpie.example>\r\n",
            "MIME-Version: 1.0\r\n",
            "Content-Type: multipart/alternative; boundary=BOUNDARY\r\n",
            "\r\n",
            "This is a multi-part message in MIME format.\r\n",
            "\r\n--BOUNDARY\r\n",
            "Content-Type: text/plain; charset=utf-8\r\n",
            "Content-Transfer-Encoding: quoted-printable\r\n",
            "\r\n",
            "=3D=3D=3D Cafe =3D=3D=3D\r\nItem\tQuantity\r\nMuffin\t5",
            "\r\n--BOUNDARY\r\n",
            "Content-Type: text/html; charset=utf-8\r\n",
            "Content-Transfer-Encoding: quoted-printable\r\n",
            "\r\n",
            "<html><body><table></table></body></html>",
            "\r\n--BOUNDARY--\r\n",
        );
        assert_eq!(message, expected);
    }

    #[test]
    fn test_single_text_part() {
        let message = fixed().text_body("Crème\t2").build().unwrap();
        assert!(message.contains("Content-Type: text/plain; charset=utf-8\r\n"));
        assert!(!message.contains("multipart"));

        let (_, body) = message.split_once("\r\n\r\n").unwrap();
        assert_eq!(decode_quoted_printable(body.trim_end()).unwrap(), "Crème\t2");
    }

    #[test]
    fn test_non_ascii_subject_is_encoded() {
        let message = fixed()
            .subject("Why Not Pie – Daily Inventory")
            .text_body("x")
            .build()
            .unwrap();
        assert!(message.contains("Subject: =?utf-8?B?"));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = MessageBuilder::new()
            .from("a@example.com")
            .to("b@example.com")
            .text_body("x")
            .html_body("y")
            .build()
            .unwrap();
        let b = MessageBuilder::new()
            .from("a@example.com")
            .to("b@example.com")
            .text_body("x")
            .html_body("y")
            .build()
            .unwrap();
        assert_ne!(a, b);
        assert!(a.contains("@example.com>\r\n"));
    }

    #[test]
    fn test_missing_parts() {
        assert!(matches!(
            MessageBuilder::new().to("b@example.com").text_body("x").build(),
            Err(Error::MissingHeader("From"))
        ));
        assert!(matches!(
            MessageBuilder::new().from("a@example.com").text_body("x").build(),
            Err(Error::MissingHeader("To"))
        ));
        assert!(matches!(
            MessageBuilder::new().from("a@example.com").to("b@example.com").build(),
            Err(Error::MissingBody)
        ));
    }

    #[test]
    fn test_subject_line_breaks_are_encoded() {
        let message = fixed()
            .subject("Stock\r\nBcc: spy@example.com")
            .text_body("x")
            .build()
            .unwrap();
        assert!(message.contains("Subject: =?utf-8?B?"));
        assert!(!message.contains("\r\nBcc:"));
    }

    #[test]
    fn test_recipient_injection_rejected() {
        let result = fixed()
            .to("x@example.com\r\nBcc: spy@example.com")
            .text_body("x")
            .build();
        assert!(matches!(result, Err(Error::InvalidHeader(_))));
    }
}
