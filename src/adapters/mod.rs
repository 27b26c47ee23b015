//! Adapters - concrete implementations of the ports plus the HTTP layer.

pub mod ai;
pub mod firestore;
pub mod gateway;
pub mod http;
pub mod memory;
