//! Domain layer - value objects and aggregates.

pub mod foundation;
pub mod intake;
