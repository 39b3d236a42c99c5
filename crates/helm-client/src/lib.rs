//! # helm-client
//!
//! The console-side client stack for the agent backend:
//!
//! - **[`api::ApiClient`]**: typed REST wrappers per resource (todos,
//!   plans, backlogs, approvals, code-interpreter states, files)
//! - **[`sse`]**: incremental Server-Sent-Events frame parser
//! - **[`bus::EventBus`]**: injectable publish/subscribe fan-out of
//!   [`helm_core::events::PushEvent`] plus connection health
//! - **[`stream::EventStreamClient`]**: the persistent `/events`
//!   connection with capped-backoff reconnect
//! - **[`store`]**: in-memory resource lists kept in sync by
//!   fetch-on-start + event-driven incremental patching
//! - **[`chat`]**: transcript state and the send/stream pipeline against
//!   the chat proxy
//!
//! Control flow: callers mutate through [`store`] methods → the backend
//! emits a push event → [`stream`] publishes it on the [`bus`] → stores
//! apply it. The push event, not the HTTP response, is the source of
//! truth for list membership.

#![deny(unsafe_code)]

pub mod api;
pub mod bus;
pub mod chat;
pub mod error;
pub mod sse;
pub mod store;
pub mod stream;

pub use api::ApiClient;
pub use bus::{ConnectionHealth, EventBus};
pub use error::ClientError;
pub use stream::{EventStreamClient, StreamHandle};
