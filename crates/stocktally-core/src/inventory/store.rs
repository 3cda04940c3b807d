//! In-memory inventory store.

use tracing::debug;

use super::key::ItemKey;
use crate::error::{Error, Result};

/// One stock line: a key and its quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Item name and category.
    pub key: ItemKey,
    /// Units on hand.
    pub quantity: u64,
}

impl Entry {
    /// Returns the item name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// Returns the category tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        self.key.tag()
    }
}

/// Mapping from (name, tag) to quantity for the current session.
///
/// Keys are unique and entries keep insertion order. Adding an existing key
/// merges quantities instead of creating a duplicate.
#[derive(Debug, Clone, Default)]
pub struct InventoryStore {
    entries: Vec<Entry>,
}

impl InventoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` units of an item, merging with an existing entry.
    ///
    /// Returns the key of the affected entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the quantity is negative, the name is
    /// empty, the tag cannot be encoded or the merged total overflows.
    pub fn add(&mut self, name: &str, tag: &str, quantity: i64) -> Result<ItemKey> {
        let quantity = to_quantity(quantity)?;
        let key = ItemKey::new(name, tag)?;

        if let Some(entry) = self.entries.iter_mut().find(|e| e.key == key) {
            entry.quantity = entry
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| overflow(&key))?;
            debug!(item = %key, quantity = entry.quantity, "Merged into existing entry");
        } else {
            debug!(item = %key, quantity, "Added entry");
            self.entries.push(Entry {
                key: key.clone(),
                quantity,
            });
        }
        Ok(key)
    }

    /// Overwrites the quantity of an existing entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a negative quantity and
    /// [`Error::NotFound`] if the key is absent.
    pub fn set_quantity(&mut self, key: &ItemKey, quantity: i64) -> Result<()> {
        let quantity = to_quantity(quantity)?;
        self.entry_mut(key)?.quantity = quantity;
        Ok(())
    }

    /// Adds one unit. Returns the new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the key is absent.
    pub fn increment(&mut self, key: &ItemKey) -> Result<u64> {
        let entry = self.entry_mut(key)?;
        entry.quantity = entry.quantity.saturating_add(1);
        Ok(entry.quantity)
    }

    /// Removes one unit, stopping at zero. Returns the new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the key is absent.
    pub fn decrement(&mut self, key: &ItemKey) -> Result<u64> {
        let entry = self.entry_mut(key)?;
        entry.quantity = entry.quantity.saturating_sub(1);
        Ok(entry.quantity)
    }

    /// Moves an entry to another category.
    ///
    /// A plain rename keeps the entry's position. If the destination already
    /// exists the quantities are summed there and the source is removed.
    /// Returns the destination key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the key is absent and
    /// [`Error::InvalidInput`] if the tag cannot be encoded or the merged total
    /// overflows.
    pub fn retag(&mut self, key: &ItemKey, new_tag: &str) -> Result<ItemKey> {
        let source = self.position(key)?;
        let destination = key.with_tag(new_tag)?;
        if destination == *key {
            return Ok(destination);
        }

        if let Some(target) = self.entries.iter().position(|e| e.key == destination) {
            let total = self.entries[target]
                .quantity
                .checked_add(self.entries[source].quantity)
                .ok_or_else(|| overflow(&destination))?;
            self.entries[target].quantity = total;
            self.entries.remove(source);
            debug!(from = %key, to = %destination, quantity = total, "Merged on retag");
        } else {
            self.entries[source].key = destination.clone();
            debug!(from = %key, to = %destination, "Retagged entry");
        }
        Ok(destination)
    }

    /// Deletes an entry. Returns whether it was present.
    pub fn remove(&mut self, key: &ItemKey) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.key != *key);
        before != self.entries.len()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replaces the contents with the given seeds at quantity zero.
    ///
    /// Duplicate seeds collapse into one entry. On error the store is left
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if any seed has an empty name or an
    /// unencodable tag.
    pub fn load_from<I, N, T>(&mut self, seeds: I) -> Result<()>
    where
        I: IntoIterator<Item = (N, T)>,
        N: AsRef<str>,
        T: AsRef<str>,
    {
        let mut entries: Vec<Entry> = Vec::new();
        for (name, tag) in seeds {
            let key = ItemKey::new(name.as_ref(), tag.as_ref())?;
            if !entries.iter().any(|e| e.key == key) {
                entries.push(Entry { key, quantity: 0 });
            }
        }
        debug!(count = entries.len(), "Loaded seeds");
        self.entries = entries;
        Ok(())
    }

    /// Returns all entries in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Entry> {
        self.entries.clone()
    }

    /// Returns every key, for saving as a template.
    #[must_use]
    pub fn template(&self) -> Vec<ItemKey> {
        self.entries.iter().map(|e| e.key.clone()).collect()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Returns the quantity for a key.
    #[must_use]
    pub fn get(&self, key: &ItemKey) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.key == *key)
            .map(|e| e.quantity)
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains(&self, key: &ItemKey) -> bool {
        self.entries.iter().any(|e| e.key == *key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if any entry has a positive quantity.
    #[must_use]
    pub fn has_stock(&self) -> bool {
        self.entries.iter().any(|e| e.quantity > 0)
    }

    fn position(&self, key: &ItemKey) -> Result<usize> {
        self.entries
            .iter()
            .position(|e| e.key == *key)
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    fn entry_mut(&mut self, key: &ItemKey) -> Result<&mut Entry> {
        self.entries
            .iter_mut()
            .find(|e| e.key == *key)
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }
}

fn to_quantity(quantity: i64) -> Result<u64> {
    u64::try_from(quantity)
        .map_err(|_| Error::InvalidInput(format!("quantity must not be negative, got {quantity}")))
}

fn overflow(key: &ItemKey) -> Error {
    Error::InvalidInput(format!("quantity for {key} is too large"))
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
    use proptest::prelude::*;

    fn key(name: &str, tag: &str) -> ItemKey {
        ItemKey::new(name, tag).unwrap()
    }

    #[test]
    fn test_add_merges_duplicates() {
        let mut store = InventoryStore::new();
        store.add("Apple Pie", "Cafe", 3).unwrap();
        store.add("Apple Pie", "Cafe", 2).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&key("Apple Pie", "Cafe")), Some(5));
    }

    #[test]
    fn test_same_name_different_tags_are_distinct() {
        let mut store = InventoryStore::new();
        store.add("Muffin", "Cafe", 1).unwrap();
        store.add("Muffin", "Market", 2).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let mut store = InventoryStore::new();
        assert!(matches!(store.add("Pie", "Cafe", -1), Err(Error::InvalidInput(_))));
        assert!(matches!(store.add("  ", "Cafe", 1), Err(Error::InvalidInput(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_overflow_leaves_entry() {
        let mut store = InventoryStore::new();
        store.add("Pie", "Cafe", i64::MAX).unwrap();
        store.add("Pie", "Cafe", i64::MAX).unwrap();
        assert!(store.add("Pie", "Cafe", 2).is_err());
        assert_eq!(store.get(&key("Pie", "Cafe")), Some(u64::MAX - 1));
    }

    #[test]
    fn test_set_quantity() {
        let mut store = InventoryStore::new();
        store.add("Pie", "Cafe", 4).unwrap();
        store.set_quantity(&key("Pie", "Cafe"), 0).unwrap();
        assert_eq!(store.get(&key("Pie", "Cafe")), Some(0));
        assert!(matches!(
            store.set_quantity(&key("Pie", "Cafe"), -3),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            store.set_quantity(&key("Tart", "Cafe"), 1),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_decrement_stops_at_zero() {
        let mut store = InventoryStore::new();
        store.add("Pie", "Cafe", 1).unwrap();
        let pie = key("Pie", "Cafe");
        assert_eq!(store.decrement(&pie).unwrap(), 0);
        assert_eq!(store.decrement(&pie).unwrap(), 0);
        assert_eq!(store.increment(&pie).unwrap(), 1);
        assert!(matches!(store.increment(&key("Tart", "")), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_retag_merges_into_existing() {
        let mut store = InventoryStore::new();
        store.add("Pie", "Cafe", 2).unwrap();
        store.add("Pie", "Market", 3).unwrap();
        let moved = store.retag(&key("Pie", "Cafe"), "Market").unwrap();
        assert_eq!(moved, key("Pie", "Market"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&moved), Some(5));
    }

    #[test]
    fn test_retag_keeps_position() {
        let mut store = InventoryStore::new();
        store.add("Pie", "Cafe", 2).unwrap();
        store.add("Tart", "Cafe", 1).unwrap();
        store.retag(&key("Pie", "Cafe"), "Frozen").unwrap();
        let names: Vec<_> = store.iter().map(|e| e.key.clone()).collect();
        assert_eq!(names, vec![key("Pie", "Frozen"), key("Tart", "Cafe")]);
    }

    #[test]
    fn test_retag_same_tag_is_noop() {
        let mut store = InventoryStore::new();
        store.add("Pie", "Cafe", 2).unwrap();
        store.retag(&key("Pie", "Cafe"), "Cafe").unwrap();
        assert_eq!(store.get(&key("Pie", "Cafe")), Some(2));
        assert!(matches!(
            store.retag(&key("Tart", "Cafe"), "Market"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = InventoryStore::new();
        store.add("Pie", "Cafe", 2).unwrap();
        store.add("Tart", "Cafe", 1).unwrap();
        assert!(store.remove(&key("Pie", "Cafe")));
        assert!(!store.remove(&key("Pie", "Cafe")));
        store.clear();
        assert!(store.is_empty());
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_from_replaces_contents() {
        let mut store = InventoryStore::new();
        store.add("Old", "Cafe", 9).unwrap();
        store
            .load_from([("Pie", "Cafe"), ("Tart", "Market"), ("Pie", "Cafe")])
            .unwrap();
        assert_eq!(
            store.snapshot(),
            vec![
                Entry { key: key("Pie", "Cafe"), quantity: 0 },
                Entry { key: key("Tart", "Market"), quantity: 0 },
            ]
        );
        assert!(!store.has_stock());
    }

    #[test]
    fn test_load_from_is_atomic() {
        let mut store = InventoryStore::new();
        store.add("Old", "Cafe", 9).unwrap();
        assert!(store.load_from([("Pie", "Cafe"), ("", "Cafe")]).is_err());
        assert_eq!(store.get(&key("Old", "Cafe")), Some(9));
    }

    #[test]
    fn test_template_lists_keys() {
        let mut store = InventoryStore::new();
        store.add("Pie", "Cafe", 2).unwrap();
        store.add("Tart", "", 0).unwrap();
        assert_eq!(store.template(), vec![key("Pie", "Cafe"), key("Tart", "")]);
    }

    proptest! {
        #[test]
        fn repeated_adds_sum(quantities in proptest::collection::vec(0i64..1000, 1..20)) {
            let mut store = InventoryStore::new();
            for q in &quantities {
                store.add("Pie", "Cafe", *q).unwrap();
            }
            let total: i64 = quantities.iter().sum();
            prop_assert_eq!(store.len(), 1);
            prop_assert_eq!(store.get(&key("Pie", "Cafe")), Some(total.unsigned_abs()));
        }

        #[test]
        fn negative_quantities_never_stored(q in i64::MIN..0) {
            let mut store = InventoryStore::new();
            store.add("Pie", "Cafe", 1).unwrap();
            prop_assert!(store.add("Pie", "Cafe", q).is_err());
            prop_assert!(store.set_quantity(&key("Pie", "Cafe"), q).is_err());
            prop_assert_eq!(store.get(&key("Pie", "Cafe")), Some(1));
        }

        #[test]
        fn retag_preserves_total(a in 0i64..1000, b in 0i64..1000) {
            let mut store = InventoryStore::new();
            store.add("Pie", "Cafe", a).unwrap();
            store.add("Pie", "Market", b).unwrap();
            store.retag(&key("Pie", "Cafe"), "Market").unwrap();
            let total: u64 = store.iter().map(|e| e.quantity).sum();
            prop_assert_eq!(total, (a + b).unsigned_abs());
        }
    }
}
