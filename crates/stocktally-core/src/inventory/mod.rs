//! Inventory keys and the session store.

mod key;
mod store;

pub use key::{ItemKey, SEPARATOR, decode_key, encode_key};
pub use store::{Entry, InventoryStore};
