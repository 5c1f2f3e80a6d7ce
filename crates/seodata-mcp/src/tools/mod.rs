//! MCP tool parameter types and shared helpers.
//!
//! All parameter structs derive `Deserialize + JsonSchema` for MCP tool
//! registration and `Serialize` to become the request's parameter bag.

pub mod helpers;
pub mod params;

pub use helpers::*;
pub use params::*;
