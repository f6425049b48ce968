//! Text-generation adapters.

pub mod mock;
pub mod openai_chat;

pub use mock::{MockResponse, MockTextGenerator};
pub use openai_chat::{OpenAiChatConfig, OpenAiChatGenerator};
