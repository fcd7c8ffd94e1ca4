//! HTTP semantics helpers.
//!
//! MMS tools are thin HTTP forwards, so their MCP `ToolAnnotations` follow from what the request
//! does to the backend. Queries are sent as POST but never mutate anything, which is why callers
//! can override the method-based hints with [`query_annotations`].

use reqwest::Method;
use rmcp::model::ToolAnnotations;

/// Annotations for a tool that only reads from the backend, whatever verb it uses.
#[must_use]
pub fn query_annotations() -> ToolAnnotations {
    ToolAnnotations {
        title: None,
        read_only_hint: Some(true),
        destructive_hint: Some(false),
        idempotent_hint: Some(true),
        open_world_hint: Some(true),
    }
}

/// Annotations derived from RFC 9110 method semantics.
///
/// `openWorldHint` is always `true`: every tool talks to the remote MMS service.
#[must_use]
pub fn annotations_for_method(method: &Method) -> ToolAnnotations {
    if method == Method::GET {
        return query_annotations();
    }

    let (destructive, idempotent) = if method == Method::PUT {
        // Replaces the target resource wholesale.
        (Some(true), Some(true))
    } else if method == Method::PATCH {
        // MMS applies a Turtle patch; repeated application may or may not converge.
        (Some(true), None)
    } else if method == Method::POST {
        (Some(false), Some(false))
    } else {
        return ToolAnnotations {
            title: None,
            read_only_hint: None,
            destructive_hint: None,
            idempotent_hint: None,
            open_world_hint: Some(true),
        };
    };

    ToolAnnotations {
        title: None,
        read_only_hint: Some(false),
        destructive_hint: destructive,
        idempotent_hint: idempotent,
        open_world_hint: Some(true),
    }
}
