//! Login history for `tierbadge`, kept behind an explicit key/value capability.
//!
//! This crate is intentionally decoupled from any identity provider: callers
//! pass the user id they got from their session and a store to keep history in.

pub mod ledger;
pub mod record;
pub mod store;

pub use ledger::{LoginOutcome, SessionLedger, SessionLookup};
pub use record::LoginRecord;
pub use store::{FileStore, InMemoryStore, KeyValueStore, StoreError, StoreResult};
