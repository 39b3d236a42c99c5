//! Chat transcript and send/stream pipeline.
//!
//! A submission walks `idle → sending → receiving → idle`: the user's
//! text is echoed into the transcript immediately, the full history goes
//! to the chat endpoint, and the reply lands either as incrementally
//! decoded stream frames or as one parsed document. Every failure path
//! absorbs into an error-flavored assistant message; the transcript is
//! never left pending.

pub mod client;
pub mod transcript;

pub use client::ChatClient;
pub use helm_core::agent::{AgentEvent, extract_response_text, parse_agent_payload};
pub use transcript::Transcript;
