//! HTTP surface for participants and the research team.

pub mod chat_http;

pub use chat_http::{ChatHttpServer, ErrorResponse, LedgerResponse, SubmitTurnRequest};
