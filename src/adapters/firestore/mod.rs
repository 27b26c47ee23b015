//! Firestore adapters for the flow, session and lead store ports.
//!
//! Talks to the Firestore REST API directly (no SDK). Lawyers edit the
//! flow document in the Firebase Console; nothing here ever writes to it
//! except the one-time default seed.

mod client;
mod stores;

pub use client::{FirestoreClient, FirestoreConfig};
pub use stores::{FirestoreFlowStore, FirestoreLeadStore, FirestoreSessionStore};
