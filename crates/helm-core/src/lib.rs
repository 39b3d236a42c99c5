//! # helm-core
//!
//! Foundation types for the helm console: the shared vocabulary between
//! the client crate and the chat proxy:
//!
//! - **Records**: [`types::TodoItem`], [`types::PlanItem`], [`types::BacklogItem`],
//!   [`types::Approval`], [`types::CodeInterpreterState`], [`types::FileRecord`],
//!   [`types::ChatMessage`] and their create/update request shapes
//! - **Push events**: [`events::PushEvent`] envelope with opt-in typed
//!   payload dispatch via [`events::EventPayload`]
//! - **Agent replies**: [`agent::AgentEvent`] schema and the
//!   double-parse payload strategy shared by chat client and proxy
//! - **Wire framing**: the line-oriented chat stream codec in [`frames`]
//! - **Backoff**: [`backoff::BackoffPolicy`] for the reconnect loop
//! - **Text**: UTF-8–safe truncation for log previews
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other helm crates.

#![deny(unsafe_code)]

pub mod agent;
pub mod backoff;
pub mod events;
pub mod frames;
pub mod text;
pub mod types;
