//! Integration tests for a full tally session.
//!
//! The SMTP tests run against a scripted server on a local socket.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use stocktally_core::settings::Security;
use stocktally_core::{
    ItemKey, Profile, ProfileCatalog, SeedSource, Session, SmtpDelivery, SmtpSettings,
    TemplateStore,
};

/// Minimal SMTP server: accepts one message and returns the DATA payload.
async fn scripted_server(listener: TcpListener) -> String {
    let (socket, _) = listener.accept().await.unwrap();
    let (read, mut write) = socket.into_split();
    let mut lines = BufReader::new(read).lines();
    let mut data = String::new();

    write.write_all(b"220 localhost ESMTP test\r\n").await.unwrap();
    while let Some(line) = lines.next_line().await.unwrap() {
        let verb = line.split_whitespace().next().unwrap_or_default().to_ascii_uppercase();
        let reply: &[u8] = match verb.as_str() {
            "EHLO" => b"250-localhost\r\n250-8BITMIME\r\n250 AUTH PLAIN\r\n",
            "AUTH" => b"235 2.7.0 Accepted\r\n",
            "MAIL" | "RCPT" => b"250 OK\r\n",
            "DATA" => {
                write.write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n").await.unwrap();
                while let Some(body_line) = lines.next_line().await.unwrap() {
                    if body_line == "." {
                        break;
                    }
                    data.push_str(&body_line);
                    data.push('\n');
                }
                b"250 Queued\r\n"
            }
            "QUIT" => {
                write.write_all(b"221 Bye\r\n").await.unwrap();
                break;
            }
            _ => b"502 Unknown\r\n",
        };
        write.write_all(reply).await.unwrap();
    }
    data
}

fn settings(port: u16) -> SmtpSettings {
    SmtpSettings {
        host: "127.0.0.1".to_string(),
        port,
        security: Security::None,
        username: Some("counter@whynotpie.example".to_string()),
        password: Some("secret".to_string()),
        timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn test_tally_and_send_report() {
    let (mut session, warnings) = Session::new(ProfileCatalog::builtin(), None);
    assert!(warnings.is_empty());
    assert_eq!(session.profile().name, "Why Not Pie");

    let store = session.store_mut();
    store.add("Muffin", "Cafe", 3).unwrap();
    store.add("Muffin", "Cafe", 2).unwrap();
    store.add("Bagel", "Market", 1).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(scripted_server(listener));

    let delivery = SmtpDelivery::new(settings(port));
    let sent = session
        .send(&delivery, "", "owner@whynotpie.example", "Morning count", "")
        .await
        .unwrap();

    assert_eq!(sent.subject, "Why Not Pie – Daily Inventory");
    assert!(sent.report.plain.starts_with(
        "Morning count\n\n=== Cafe ===\nItem\tQuantity\nMuffin\t5\n\n=== Market ===\nItem\tQuantity\nBagel\t1"
    ));

    let data = server.await.unwrap();
    assert!(data.contains("From: counter@whynotpie.example\n"));
    assert!(data.contains("To: owner@whynotpie.example\n"));
    assert!(data.contains("Content-Type: multipart/alternative;"));
    assert!(data.contains("Content-Type: text/plain; charset=utf-8"));
    assert!(data.contains("Content-Type: text/html; charset=utf-8"));
    assert!(data.contains("Muffin\t5"));

    assert!(session.store().has_stock());
}

#[tokio::test]
async fn test_rejected_login_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read, mut write) = socket.into_split();
        let mut lines = BufReader::new(read).lines();
        write.write_all(b"220 localhost ESMTP\r\n").await.unwrap();
        lines.next_line().await.unwrap();
        write.write_all(b"250 localhost\r\n").await.unwrap();
        lines.next_line().await.unwrap();
        write
            .write_all(b"535 5.7.8 Username and Password not accepted\r\n")
            .await
            .unwrap();
    });

    let (mut session, _) = Session::new(ProfileCatalog::builtin(), None);
    session.store_mut().add("Muffin", "Cafe", 1).unwrap();

    let err = session
        .send(&SmtpDelivery::new(settings(port)), "Daily", "owner@example.com", "", "")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Authentication failed"));
    server.await.unwrap();
}

#[test]
fn test_profile_switch_with_templates() {
    let dir = tempfile::TempDir::new().unwrap();
    let templates = TemplateStore::new(dir.path());
    let catalog = ProfileCatalog::from_profiles(vec![
        Profile::new("Why Not Pie", &["Cafe", "Market"]),
        Profile::new("Sample Bakery", &["Front", "Back"]).with_mainstay("Loaf", "Front"),
    ])
    .unwrap();

    let (mut session, _) = Session::new(catalog, Some(templates.clone()));
    session.store_mut().add("Apple Pie", "Cafe", 4).unwrap();
    session.store_mut().add("Herbal Tea", "Herbal", 2).unwrap();
    session.save_template().unwrap();

    session.select_profile("Sample Bakery").unwrap();
    assert_eq!(
        session.store().template(),
        vec![ItemKey::new("Loaf", "Front").unwrap()]
    );

    session.select_profile("Why Not Pie").unwrap();
    let load = templates.load(session.profile());
    assert_eq!(load.source, SeedSource::Template);
    assert_eq!(session.store().len(), 2);
    assert!(!session.store().has_stock());

    // Unknown tags still get their own section
    session
        .store_mut()
        .set_quantity(&ItemKey::new("Herbal Tea", "Herbal").unwrap(), 2)
        .unwrap();
    let report = session.compose("", "");
    assert!(report.plain.ends_with("=== Herbal ===\nItem\tQuantity\nHerbal Tea\t2"));
}

#[test]
fn test_muffin_and_bagel_report() {
    let mut store = stocktally_core::InventoryStore::new();
    store.add("Muffin", "Cafe", 3).unwrap();
    store.add("Muffin", "Cafe", 2).unwrap();
    store.add("Bagel", "Market", 1).unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!((snapshot[0].name(), snapshot[0].tag(), snapshot[0].quantity), ("Muffin", "Cafe", 5));
    assert_eq!((snapshot[1].name(), snapshot[1].tag(), snapshot[1].quantity), ("Bagel", "Market", 1));

    let report = stocktally_core::render(&snapshot, &["Cafe", "Market"], "", "");
    assert_eq!(
        report.plain,
        "=== Cafe ===\nItem\tQuantity\nMuffin\t5\n\n=== Market ===\nItem\tQuantity\nBagel\t1"
    );
    assert_eq!(report.html.matches("<td colspan='2'").count(), 2);
    assert_eq!(report.html.matches("<td align='right'>").count(), 2);
}
