//! Per-request credentials for the multi-tenant HTTP transport.
//!
//! When a tool call arrives over streamable HTTP, the inbound request's
//! `Authorization` header is available in the request context. A token found
//! there is used for that call only; otherwise the process-wide resolver
//! applies.

use std::sync::Arc;

use axum::http::request::Parts;
use axum::http::HeaderMap;
use rmcp::service::RequestContext;
use rmcp::RoleServer;

use seodata_client::{Credential, RequestExecutor, StaticCredential};

/// Extract a token from `Authorization: Bearer <t>` or `Authorization: <scheme> <t>`.
pub fn credential_from_headers(headers: &HeaderMap, scheme: &str) -> Option<Credential> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let (prefix, token) = value.trim().split_once(' ')?;
    let accepted = prefix.eq_ignore_ascii_case("bearer")
        || (!scheme.is_empty() && prefix.eq_ignore_ascii_case(scheme));
    if accepted {
        Credential::parse(token)
    } else {
        None
    }
}

/// Executor for this call: scoped to the inbound token if there is one.
pub fn executor_for(
    base: &RequestExecutor,
    context: &RequestContext<RoleServer>,
) -> RequestExecutor {
    let inbound = context
        .extensions
        .get::<Parts>()
        .and_then(|parts| credential_from_headers(&parts.headers, &base.config().auth_scheme));

    match inbound {
        Some(credential) => {
            tracing::debug!("Using per-request credential from inbound Authorization header");
            base.with_credentials(Arc::new(StaticCredential::new(credential)))
        }
        None => base.clone(),
    }
}
