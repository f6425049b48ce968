//! Adapters for external systems: the store, the text-generation API and HTTP.

pub mod http;
pub mod llm;
pub mod sqlite;
