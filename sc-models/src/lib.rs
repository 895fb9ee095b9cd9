//! Showcase Models - Entity types exchanged with the backend.
//!
//! Records are decoded from the loosely-typed JSON rows the REST surface
//! returns; field sets are validated here before any write leaves the
//! process.

pub mod models;
pub mod validate;

// Re-export key types
pub use models::offering::{Offering, OfferingFields};
pub use models::media_item::MediaItem;
pub use models::contact_message::{ContactFields, ContactMessage};
pub use models::session::{Session, User};
