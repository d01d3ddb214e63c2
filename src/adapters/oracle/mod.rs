//! Oracle adapter implementations.

pub mod mock;
pub mod openai_compat;

pub use mock::MockOracle;
pub use openai_compat::{OpenAiCompatOracle, FALLBACK_MODEL};
