//! Responder adapters: the Gemini client and a configurable test mock.

mod gemini;
mod mock;

pub use gemini::{GeminiConfig, GeminiResponder};
pub use mock::MockResponder;
