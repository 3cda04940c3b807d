//! Text rendering for the prompt.

use std::fmt::Write as _;

use stocktally_core::{Entry, Profile, ProfileCatalog};

/// Command summary.
pub const HELP: &str = "\
Items
  list                           show items with their numbers
  add <qty> <category> <name>    add units (category by number or name)
  inc <n> / dec <n>              add or remove one unit
  set <n> <qty>                  overwrite a quantity
  tag <n> <category>             move an item to another category
  del <n>                        delete an item
  clear                          delete every item

Report
  subject [text]                 set the subject (blank restores the default)
  to <address>                   set the recipient
  before [text] / after [text]   notes around the table (\\n for a new line)
  preview [html]                 show the report
  send                           e-mail the report

Profiles and templates
  profiles                       list profiles
  profile <n|name>               switch profile (clears items)
  save                           save current items as this profile's template
  reset                          reload the template with zero quantities

  help, quit";

/// Numbered item list.
pub fn entries(entries: &[Entry]) -> String {
    if entries.is_empty() {
        return "No items. Use 'add <qty> <category> <name>'.".to_string();
    }

    let width = entries.iter().map(|e| e.name().chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        let tag = if entry.tag().is_empty() { "-" } else { entry.tag() };
        let _ = writeln!(
            out,
            "{:>3}. {:<width$}  {:>5}  [{tag}]",
            i + 1,
            entry.name(),
            entry.quantity,
        );
    }
    out.truncate(out.trim_end().len());
    out
}

/// Profile list with the active one marked.
pub fn profiles(catalog: &ProfileCatalog, active: &str) -> String {
    catalog
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let marker = if p.name == active { '*' } else { ' ' };
            format!("{marker}{:>2}. {}", i + 1, p.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Numbered category list.
pub fn categories(profile: &Profile) -> String {
    profile
        .categories
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}={c}", i + 1))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use stocktally_core::ItemKey;

    #[test]
    fn test_entries_numbered() {
        let list = entries(&[
            Entry {
                key: ItemKey::new("Apple Pie", "Cafe").unwrap(),
                quantity: 3,
            },
            Entry {
                key: ItemKey::new("Tea", "").unwrap(),
                quantity: 12,
            },
        ]);
        assert_eq!(list, "  1. Apple Pie      3  [Cafe]\n  2. Tea           12  [-]");
    }

    #[test]
    fn test_profiles_marks_active() {
        let list = profiles(&ProfileCatalog::builtin(), "Sample Bakery");
        assert_eq!(list, "  1. Why Not Pie\n* 2. Sample Bakery");
    }

    #[test]
    fn test_categories() {
        let profile = Profile::new("P", &["Cafe", "Market"]);
        assert_eq!(categories(&profile), "1=Cafe, 2=Market");
    }
}
