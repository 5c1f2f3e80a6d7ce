//! Shared helper functions for MCP tool implementations.

use seodata_client::{ClientError, ClientResult, OperationResult};

/// Error JSON for a client failure, carrying URL, status and raw body when known.
pub fn client_error_json(error: &ClientError) -> String {
    error.to_json().to_string()
}

/// Turn a pipeline outcome into the tool's text response.
pub fn render(result: ClientResult<OperationResult>) -> String {
    match result {
        Ok(result) => result.text,
        Err(e) => {
            tracing::debug!(error = %e, "Tool call failed");
            client_error_json(&e)
        }
    }
}
