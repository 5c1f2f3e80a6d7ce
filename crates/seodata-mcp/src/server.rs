//! MCP ServerHandler implementation for the SE Ranking data API.
//!
//! Every tool is a thin declaration: a parameter struct plus a path. The
//! shared [`RequestExecutor`] does the work; `serp_check` additionally goes
//! through the [`TaskOrchestrator`].
//!
//! **Account**
//! - `account_balance`: Remaining API credits
//!
//! **Research (read-only)**
//! - `domain_overview`: Worldwide traffic and keyword totals for a domain
//! - `domain_keywords`: Keywords a domain ranks for, with volume/position filters
//! - `keywords_similar`: Keywords similar to a seed keyword
//! - `backlinks_summary`: Backlink profile summary for domains or URLs
//!
//! **Projects**
//! - `project_list`: Tracked projects (sites)
//! - `project_add_keywords`: Start tracking keywords in a project
//!
//! **SERP tasks (long-running)**
//! - `serp_check`: Submit a SERP task and wait for results, with progress
//! - `serp_task_results`: Fetch results for a task id (resume after a timeout)

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::service::RequestContext;
use rmcp::{tool, tool_handler, tool_router, RoleServer, ServerHandler};
use serde::Serialize;

use seodata_client::{
    ApiRequest, ClientConfig, ClientResult, Method, ParameterBag, PollingConfig,
    RequestExecutor, TaskOrchestrator,
};

use crate::auth::executor_for;
use crate::progress::ProgressForwarder;
use crate::tools::*;

/// SEO data MCP server handler.
#[derive(Debug, Clone)]
pub struct SeoDataMcpServer {
    tool_router: ToolRouter<Self>,
    executor: RequestExecutor,
    polling: PollingConfig,
}

impl SeoDataMcpServer {
    /// Create a server around an executor; polling bounds come from its config.
    pub fn new(executor: RequestExecutor) -> Self {
        let polling = executor.config().polling;
        Self {
            tool_router: Self::tool_router(),
            executor,
            polling,
        }
    }

    /// Create a server with the reqwest transport and the config's credential source.
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        Ok(Self::new(RequestExecutor::from_config(config)?))
    }

    /// The process-wide executor (and through it, the credential slot).
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Run one declarative request and render the outcome as tool text.
    async fn call<T: Serialize>(
        &self,
        context: &RequestContext<RoleServer>,
        method: Method,
        path: &str,
        params: &T,
    ) -> String {
        match ParameterBag::from_serializable(params) {
            Ok(bag) => self.send(context, ApiRequest::new(method, path, bag)).await,
            Err(e) => client_error_json(&e),
        }
    }

    /// Like [`call`](Self::call), with a JSON request body.
    async fn call_json<T: Serialize>(
        &self,
        context: &RequestContext<RoleServer>,
        method: Method,
        path: &str,
        params: &T,
    ) -> String {
        match ParameterBag::from_serializable(params) {
            Ok(bag) => {
                self.send(context, ApiRequest::new(method, path, bag).json())
                    .await
            }
            Err(e) => client_error_json(&e),
        }
    }

    async fn send(&self, context: &RequestContext<RoleServer>, request: ApiRequest) -> String {
        render(
            executor_for(&self.executor, context)
                .execute_request(request)
                .await,
        )
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for SeoDataMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "seodata-mcp".to_string(),
                title: Some("SE Ranking Data MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: Some(
                    "MCP server exposing SE Ranking keyword, domain, backlink, project \
                     and SERP data"
                        .to_string(),
                ),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "SEO data tools backed by the SE Ranking API. Every call spends API credits; \
                 check account_balance when in doubt.\n\
                 Research: domain_overview → domain_keywords (filter by volume/position) → \
                 keywords_similar. Backlinks: backlinks_summary.\n\
                 Projects: project_list → project_add_keywords.\n\
                 SERP: serp_check submits a task and waits (reports progress). If it returns \
                 status 'timeout', call serp_task_results later with the returned task_id."
                    .to_string(),
            ),
        }
    }
}

#[tool_router(router = tool_router)]
impl SeoDataMcpServer {
    // ── Account ──

    #[tool(
        name = "account_balance",
        description = "Get the remaining API credit balance for the configured account."
    )]
    pub async fn account_balance(
        &self,
        Parameters(params): Parameters<EmptyParams>,
        context: RequestContext<RoleServer>,
    ) -> String {
        self.call(&context, Method::GET, "/account/balance", &params)
            .await
    }

    // ── Research ──

    #[tool(
        name = "domain_overview",
        description = "Worldwide overview for a domain: organic and paid traffic, keyword counts and traffic cost per regional database."
    )]
    pub async fn domain_overview(
        &self,
        Parameters(params): Parameters<DomainOverviewParams>,
        context: RequestContext<RoleServer>,
    ) -> String {
        self.call(&context, Method::GET, "/domain/overview/worldwide", &params)
            .await
    }

    #[tool(
        name = "domain_keywords",
        description = "List keywords a domain ranks for in one regional database. Supports volume, position and intent filters plus pagination."
    )]
    pub async fn domain_keywords(
        &self,
        Parameters(params): Parameters<DomainKeywordsParams>,
        context: RequestContext<RoleServer>,
    ) -> String {
        self.call(&context, Method::GET, "/domain/keywords", &params)
            .await
    }

    #[tool(
        name = "keywords_similar",
        description = "Find keywords similar to a seed keyword, with volume and difficulty filters."
    )]
    pub async fn keywords_similar(
        &self,
        Parameters(params): Parameters<KeywordsSimilarParams>,
        context: RequestContext<RoleServer>,
    ) -> String {
        self.call(&context, Method::GET, "/keywords/similar", &params)
            .await
    }

    #[tool(
        name = "backlinks_summary",
        description = "Summarize the backlink profile (referring domains, backlinks, authority) of one or more targets."
    )]
    pub async fn backlinks_summary(
        &self,
        Parameters(params): Parameters<BacklinksSummaryParams>,
        context: RequestContext<RoleServer>,
    ) -> String {
        self.call(&context, Method::GET, "/backlinks/summary", &params)
            .await
    }

    // ── Projects ──

    #[tool(
        name = "project_list",
        description = "List tracked projects (sites) with their ids."
    )]
    pub async fn project_list(
        &self,
        Parameters(params): Parameters<EmptyParams>,
        context: RequestContext<RoleServer>,
    ) -> String {
        self.call(&context, Method::GET, "/sites", &params).await
    }

    #[tool(
        name = "project_add_keywords",
        description = "Add keywords to a tracked project. Use project_list to find the site_id."
    )]
    pub async fn project_add_keywords(
        &self,
        Parameters(params): Parameters<ProjectAddKeywordsParams>,
        context: RequestContext<RoleServer>,
    ) -> String {
        self.call_json(&context, Method::POST, "/sites/{site_id}/keywords", &params)
            .await
    }

    // ── SERP tasks ──

    #[tool(
        name = "serp_check",
        description = "Check live search results for a query. Submits a SERP task and waits for it, reporting progress. On timeout returns the task_id for serp_task_results."
    )]
    pub async fn serp_check(
        &self,
        Parameters(params): Parameters<SerpCheckParams>,
        context: RequestContext<RoleServer>,
    ) -> String {
        let bag = match ParameterBag::from_serializable(&params) {
            Ok(bag) => bag,
            Err(e) => return client_error_json(&e),
        };
        let options = self.polling.options(
            params.poll_interval_seconds.map(|s| s.saturating_mul(1000)),
            params.max_wait_seconds.map(|s| s.saturating_mul(1000)),
        );
        let progress = ProgressForwarder::for_request(&context);
        let orchestrator = TaskOrchestrator::new(executor_for(&self.executor, &context));

        let outcome = orchestrator
            .run(
                ApiRequest::post("/serp/classic/tasks", bag).json(),
                serp_results_request,
                options,
                progress.sink(),
            )
            .await;
        progress.finish().await;
        render(outcome.map(|o| o.into_result()))
    }

    #[tool(
        name = "serp_task_results",
        description = "Fetch status or results of a SERP task by id. Returns status 'processing' while the task is still running."
    )]
    pub async fn serp_task_results(
        &self,
        Parameters(params): Parameters<SerpTaskResultsParams>,
        context: RequestContext<RoleServer>,
    ) -> String {
        self.send(&context, serp_results_request(&params.task_id))
            .await
    }
}

fn serp_results_request(task_id: &str) -> ApiRequest {
    ApiRequest::get(
        "/serp/classic/tasks/{task_id}",
        ParameterBag::new().with("task_id", task_id),
    )
}
