//! Parameter structs for all MCP tools.
//!
//! Field order is the order parameters are sent. Range filters serialize to
//! `filter.<field>.<bound>` keys, which the client rewrites into the
//! provider's `filter[field][bound]` syntax.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ── account_balance / project_list ──

/// Parameters for tools that take no arguments.
#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct EmptyParams {}

// ── domain_overview ──

/// Parameters for the `domain_overview` tool.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct DomainOverviewParams {
    #[schemars(description = "Domain to analyze (e.g., 'example.com')")]
    pub domain: String,
    #[schemars(description = "Currency code for traffic cost (e.g., 'USD')")]
    pub currency: Option<String>,
}

// ── domain_keywords ──

/// Parameters for the `domain_keywords` tool.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct DomainKeywordsParams {
    #[schemars(description = "Regional database code (e.g., 'us', 'uk', 'de')")]
    pub source: String,
    #[schemars(description = "Domain to list keywords for")]
    pub domain: String,
    #[schemars(description = "'organic' (default) or 'adv'")]
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[schemars(description = "Results per page (max 1000)")]
    pub limit: Option<u32>,
    #[schemars(description = "Page number, starting at 1")]
    pub page: Option<u32>,
    #[schemars(description = "Minimum monthly search volume")]
    #[serde(rename(serialize = "filter.volume.from"))]
    pub volume_from: Option<u64>,
    #[schemars(description = "Maximum monthly search volume")]
    #[serde(rename(serialize = "filter.volume.to"))]
    pub volume_to: Option<u64>,
    #[schemars(description = "Best ranking position to include")]
    #[serde(rename(serialize = "filter.position.from"))]
    pub position_from: Option<u32>,
    #[schemars(description = "Worst ranking position to include")]
    #[serde(rename(serialize = "filter.position.to"))]
    pub position_to: Option<u32>,
    #[schemars(description = "Search intent codes to keep (I, N, T, C, L)")]
    #[serde(rename(serialize = "filter.intents"), default)]
    pub intents: Vec<String>,
}

// ── keywords_similar ──

/// Parameters for the `keywords_similar` tool.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct KeywordsSimilarParams {
    #[schemars(description = "Regional database code (e.g., 'us')")]
    pub source: String,
    #[schemars(description = "Seed keyword")]
    pub keyword: String,
    #[schemars(description = "Maximum number of keywords to return")]
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    #[schemars(description = "Minimum monthly search volume")]
    #[serde(rename(serialize = "filter.volume.from"))]
    pub volume_from: Option<u64>,
    #[schemars(description = "Maximum monthly search volume")]
    #[serde(rename(serialize = "filter.volume.to"))]
    pub volume_to: Option<u64>,
    #[schemars(description = "Minimum keyword difficulty (0-100)")]
    #[serde(rename(serialize = "filter.difficulty.from"))]
    pub difficulty_from: Option<u8>,
    #[schemars(description = "Maximum keyword difficulty (0-100)")]
    #[serde(rename(serialize = "filter.difficulty.to"))]
    pub difficulty_to: Option<u8>,
}

// ── backlinks_summary ──

/// Parameters for the `backlinks_summary` tool.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct BacklinksSummaryParams {
    #[schemars(description = "One or more domains or URLs to summarize")]
    pub target: Vec<String>,
    #[schemars(description = "Scope: 'host', 'domain' (default) or 'url'")]
    pub mode: Option<String>,
}

// ── project_add_keywords ──

/// Parameters for the `project_add_keywords` tool.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct ProjectAddKeywordsParams {
    #[schemars(description = "Project (site) id from project_list")]
    pub site_id: u64,
    #[schemars(description = "Keywords to start tracking")]
    pub keywords: Vec<KeywordEntry>,
}

/// A tracked keyword entry.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct KeywordEntry {
    pub keyword: String,
    #[schemars(description = "Keyword group id (optional)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<u64>,
    #[schemars(description = "Landing page URL to associate (optional)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
}

// ── serp_check ──

/// Parameters for the `serp_check` tool.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SerpCheckParams {
    #[schemars(description = "Search query to check")]
    pub query: String,
    #[schemars(description = "Search engine id (e.g., 200 for google.com)")]
    pub engine_id: u32,
    #[schemars(description = "Location id for localized results (optional)")]
    pub location_id: Option<u32>,
    #[schemars(description = "Seconds between status checks (1-30, default 5)")]
    #[serde(skip_serializing)]
    pub poll_interval_seconds: Option<u64>,
    #[schemars(description = "Maximum seconds to wait before returning the task id (10-600, default 300)")]
    #[serde(skip_serializing)]
    pub max_wait_seconds: Option<u64>,
}

// ── serp_task_results ──

/// Parameters for the `serp_task_results` tool.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct SerpTaskResultsParams {
    #[schemars(description = "Task id returned by serp_check")]
    pub task_id: String,
}
