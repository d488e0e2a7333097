//! tutord - the tutor answer daemon.
//!
//! Receives student questions over HTTP, assembles context, prompts AI
//! providers with fallback, post-processes the accepted answer, and streams
//! it back as NDJSON events.

pub mod config;
pub mod extract;
pub mod orchestrator;
pub mod profile;
pub mod providers;
pub mod routes;
pub mod search;
pub mod server;
pub mod stream;
