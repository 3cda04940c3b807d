//! Plain-text and HTML report rendering.

use std::fmt::Write as _;

use crate::inventory::Entry;

const TABLE_OPEN: &str = "<table border='1' cellspacing='0' cellpadding='4' \
    style='border-collapse:collapse;font-family:sans-serif;'>\
    <tr><th style='padding:4px 12px'>Item</th><th>Qty</th></tr>";

/// A rendered report in both formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Plain-text body.
    pub plain: String,
    /// HTML body.
    pub html: String,
}

/// Renders entries grouped by category.
///
/// Sections follow `categories`, then any other tags in the order they first
/// appear in `entries`. Categories without entries are left out. Items are
/// sorted by name within a section. Non-empty `before` and `after`
/// text is placed around the table.
#[must_use]
pub fn render<S: AsRef<str>>(
    entries: &[Entry],
    categories: &[S],
    before: &str,
    after: &str,
) -> Report {
    let sections = group(entries, categories);
    let before = before.trim();
    let after = after.trim();

    Report {
        plain: render_plain(&sections, before, after),
        html: render_html(&sections, before, after),
    }
}

type Section<'a> = (&'a str, Vec<&'a Entry>);

fn group<'a, S: AsRef<str>>(entries: &'a [Entry], categories: &'a [S]) -> Vec<Section<'a>> {
    let mut sections: Vec<Section<'a>> = Vec::new();
    for category in categories {
        let category = category.as_ref();
        if !sections.iter().any(|(tag, _)| *tag == category) {
            sections.push((category, Vec::new()));
        }
    }

    for entry in entries {
        match sections.iter_mut().find(|(tag, _)| *tag == entry.tag()) {
            Some((_, items)) => items.push(entry),
            None => sections.push((entry.tag(), vec![entry])),
        }
    }

    sections.retain(|(_, items)| !items.is_empty());
    for (_, items) in &mut sections {
        items.sort_by(|a, b| {
            a.name()
                .to_lowercase()
                .cmp(&b.name().to_lowercase())
                .then_with(|| a.name().cmp(b.name()))
                .then_with(|| a.quantity.cmp(&b.quantity))
        });
    }
    sections
}

fn render_plain(sections: &[Section<'_>], before: &str, after: &str) -> String {
    let mut rows = Vec::new();
    for (category, items) in sections {
        rows.push(format!("=== {category} ==="));
        rows.push("Item\tQuantity".to_string());
        for entry in items {
            rows.push(format!("{}\t{}", entry.name(), entry.quantity));
        }
        rows.push(String::new());
    }
    let table = rows.join("\n");

    [before, table.trim_end(), after]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_html(sections: &[Section<'_>], before: &str, after: &str) -> String {
    let mut table = String::from(TABLE_OPEN);
    for (category, items) in sections {
        let _ = write!(
            table,
            "<tr style='background:#f3f3f3;font-weight:bold;'>\
             <td colspan='2' style='padding:6px 12px'>{}</td></tr>",
            escape_html(category)
        );
        for entry in items {
            let _ = write!(
                table,
                "<tr><td style='padding:4px 12px'>{}</td><td align='right'>{}</td></tr>",
                escape_html(entry.name()),
                entry.quantity
            );
        }
    }
    table.push_str("</table>");

    let mut parts = Vec::with_capacity(3);
    if !before.is_empty() {
        parts.push(paragraph(before));
    }
    parts.push(table);
    if !after.is_empty() {
        parts.push(paragraph(after));
    }
    format!("<html><body>{}</body></html>", parts.join("\n"))
}

fn paragraph(text: &str) -> String {
    format!("<p>{}</p>", escape_html(text).replace('\n', "<br>"))
}

/// Escapes text for use in HTML content and attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
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
    use crate::inventory::{InventoryStore, ItemKey};
    use proptest::prelude::*;

    fn entry(name: &str, tag: &str, quantity: u64) -> Entry {
        Entry {
            key: ItemKey::new(name, tag).unwrap(),
            quantity,
        }
    }

    #[test]
    fn test_plain_groups_by_category() {
        let entries = [entry("Muffin", "Cafe", 5), entry("Bagel", "Market", 1)];
        let report = render(&entries, &["Cafe", "Market"], "", "");
        assert_eq!(
            report.plain,
            "=== Cafe ===\nItem\tQuantity\nMuffin\t5\n\n=== Market ===\nItem\tQuantity\nBagel\t1"
        );
    }

    #[test]
    fn test_empty_categories_skipped() {
        let report = render(&[entry("Muffin", "Cafe", 5)], &["Frozen", "Cafe"], "", "");
        assert_eq!(report.plain, "=== Cafe ===\nItem\tQuantity\nMuffin\t5");
        assert!(!report.html.contains("Frozen"));
    }

    #[test]
    fn test_unknown_tag_alone() {
        let report = render(&[entry("Tea", "Herbal", 4)], &["Cafe"], "", "");
        assert_eq!(report.plain, "=== Herbal ===\nItem\tQuantity\nTea\t4");
    }

    #[test]
    fn test_zero_quantity_entries_listed() {
        let report = render(&[entry("Muffin", "Cafe", 0)], &["Cafe"], "", "");
        assert_eq!(report.plain, "=== Cafe ===\nItem\tQuantity\nMuffin\t0");
    }

    #[test]
    fn test_unknown_tag_gets_trailing_section() {
        let entries = [
            entry("Tea", "Herbal", 2),
            entry("Muffin", "Cafe", 5),
            entry("Scone", "Bakery", 1),
        ];
        let report = render(&entries, &["Cafe"], "", "");
        let headings: Vec<_> = report
            .plain
            .lines()
            .filter(|l| l.starts_with("==="))
            .collect();
        assert_eq!(
            headings,
            vec!["=== Cafe ===", "=== Herbal ===", "=== Bakery ==="]
        );
        assert!(report.plain.contains("=== Herbal ===\nItem\tQuantity\nTea\t2"));
    }

    #[test]
    fn test_items_sorted_case_insensitively() {
        let entries = [
            entry("scone", "Cafe", 1),
            entry("Apple Pie", "Cafe", 2),
            entry("Brownie", "Cafe", 3),
        ];
        let report = render(&entries, &["Cafe"], "", "");
        assert_eq!(
            report.plain,
            "=== Cafe ===\nItem\tQuantity\nApple Pie\t2\nBrownie\t3\nscone\t1"
        );
    }

    #[test]
    fn test_before_and_after_text() {
        let report = render(
            &[entry("Muffin", "Cafe", 5)],
            &["Cafe"],
            "  Good morning\n",
            "Thanks!",
        );
        assert_eq!(
            report.plain,
            "Good morning\n\n=== Cafe ===\nItem\tQuantity\nMuffin\t5\n\nThanks!"
        );
        assert!(report.html.starts_with("<html><body><p>Good morning</p>\n<table"));
        assert!(report.html.ends_with("</table>\n<p>Thanks!</p></body></html>"));
    }

    #[test]
    fn test_html_layout() {
        let report = render(&[entry("Muffin", "Cafe", 5)], &["Cafe"], "", "");
        let expected = format!(
            "<html><body>{TABLE_OPEN}\
             <tr style='background:#f3f3f3;font-weight:bold;'>\
             <td colspan='2' style='padding:6px 12px'>Cafe</td></tr>\
             <tr><td style='padding:4px 12px'>Muffin</td><td align='right'>5</td></tr>\
             </table></body></html>"
        );
        assert_eq!(report.html, expected);
    }

    #[test]
    fn test_html_escapes_text() {
        let report = render(
            &[entry("Mac & Cheese <large>", "Cafe", 1)],
            &["Cafe"],
            "Line one\nLine <two>",
            "",
        );
        assert!(report.html.contains("Mac &amp; Cheese &lt;large&gt;"));
        assert!(report.html.contains("<p>Line one<br>Line &lt;two&gt;</p>"));
        assert!(report.plain.contains("Mac & Cheese <large>\t1"));
    }

    #[test]
    fn test_empty_store() {
        let none: [&str; 0] = [];
        let report = render(&[], &none, "", "");
        assert_eq!(report.plain, "");
        assert_eq!(
            report.html,
            format!("<html><body>{TABLE_OPEN}</table></body></html>")
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;"
        );
    }

    const CONFIGURED: [&str; 3] = ["Cafe", "Market", "Goodies"];
    const TAGS: [&str; 5] = ["Cafe", "Market", "Goodies", "Herbal", "Frozen"];

    proptest! {
        #[test]
        fn every_entry_rendered_once_in_section_order(
            adds in proptest::collection::vec((0usize..6, 0usize..TAGS.len(), 0i64..50), 0..30)
        ) {
            let mut store = InventoryStore::new();
            for (n, t, q) in &adds {
                let tag = TAGS[*t];
                store.add(&format!("Item{n} {tag}"), tag, *q).unwrap();
            }
            let entries = store.snapshot();
            let report = render(&entries, &CONFIGURED, "", "");

            for entry in &entries {
                let row = format!("{}\t{}", entry.name(), entry.quantity);
                prop_assert_eq!(report.plain.lines().filter(|l| *l == row).count(), 1);
                let cell = format!(">{}</td>", entry.name());
                prop_assert_eq!(report.html.matches(&cell).count(), 1);
            }
            let rows = report
                .plain
                .lines()
                .filter(|l| l.contains('\t') && *l != "Item\tQuantity")
                .count();
            prop_assert_eq!(rows, entries.len());

            let mut expected: Vec<&str> = CONFIGURED
                .iter()
                .copied()
                .filter(|c| entries.iter().any(|e| e.tag() == *c))
                .collect();
            for entry in &entries {
                if !expected.contains(&entry.tag()) {
                    expected.push(entry.tag());
                }
            }
            let headings: Vec<&str> = report
                .plain
                .lines()
                .filter_map(|l| l.strip_prefix("=== ").and_then(|l| l.strip_suffix(" ===")))
                .collect();
            prop_assert_eq!(&headings, &expected);
            prop_assert_eq!(report.html.matches("colspan='2'").count(), expected.len());
        }
    }
}
