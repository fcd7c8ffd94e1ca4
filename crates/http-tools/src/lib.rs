//! Outbound HTTP forwarding for the Flexo MMS MCP adapter.
//!
//! Every MCP tool exposed by the adapter resolves to exactly one HTTP request against the MMS
//! backend. This crate owns that request:
//! - [`runtime`]: the forwarder, its transport seam and the error taxonomy
//! - [`semantics`]: MCP tool annotations derived from HTTP method semantics
//! - [`safety`]: redaction helpers for error messages
//!
//! It intentionally knows nothing about the operation catalog or MCP sessions.

pub mod runtime;
pub mod safety;
pub mod semantics;
