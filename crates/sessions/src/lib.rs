//! Session state for the intake gateway.
//!
//! Holds the question catalogs, the per-session intake state machine, and the
//! in-memory session store shared by the HTTP handlers.

pub mod catalog;
pub mod intake;
pub mod store;

pub use catalog::{catalog, FieldDef, ASSET_KEYS, LIABILITY_KEYS};
pub use intake::Intake;
pub use store::{SessionEntry, SessionStore};
