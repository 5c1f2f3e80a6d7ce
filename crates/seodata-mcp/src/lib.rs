//! SE Ranking data MCP server library.
//!
//! Provides the [`server::SeoDataMcpServer`] MCP handler and tool parameter
//! types. Used by the `seodata-mcp` binary and by integration tests.

pub mod auth;
pub mod progress;
pub mod server;
pub mod tools;
