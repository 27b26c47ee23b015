//! Foundation value objects shared across the domain.

mod ids;
mod timestamp;

pub use ids::{LeadId, SessionId};
pub use timestamp::Timestamp;
