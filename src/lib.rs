//! Client core for the Notelark notes service.
//!
//! Passwordless (one-time-code) authentication, a session state machine,
//! and a server-authoritative note collection kept in sync over the remote
//! HTTP API. Presentation lives in the `notelark` binary; everything here is
//! UI-agnostic.

pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod events;
pub mod http;
pub mod models;
pub mod notes_cache;
pub mod notes_store;
pub mod session;
pub mod validation;
