//! Concrete provider adapters.

#[cfg(feature = "provider-openai")]
pub mod openai;
