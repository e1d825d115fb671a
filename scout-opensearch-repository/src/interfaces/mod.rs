//! Interface definitions for the engine's external collaborators.
//!
//! This module defines the abstract `SearchTransport` and `RecordStore` traits
//! that allow for dependency injection of the search backend and of the
//! authoritative record store.

mod record_store;
mod search_transport;

pub use record_store::RecordStore;
pub use search_transport::SearchTransport;
