//! Producer profiles.

mod catalog;
mod model;

pub use catalog::ProfileCatalog;
pub use model::{DEFAULT_SUBJECT, Profile};
