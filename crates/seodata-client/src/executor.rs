//! Uniform request pipeline shared by every declarative operation.
//!
//! credential → path/params encoding → HTTP call → outcome classification →
//! normalized text result.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::codec::{self, ParameterBag};
use crate::config::ClientConfig;
use crate::credentials::{CredentialHandle, CredentialResolver};
use crate::error::{ClientError, ClientResult};
use crate::transport::{HttpRequest, HttpTransport, Method, ReqwestTransport, RequestBody};

/// How a write operation carries its parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BodyFormat {
    #[default]
    Form,
    Json,
}

/// One call against the provider API, described declaratively.
///
/// `path` may contain `{name}` placeholders; they are filled from `params`
/// and the consumed entries are not sent again as query or body fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub params: ParameterBag,
    pub body_format: BodyFormat,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>, params: ParameterBag) -> Self {
        Self {
            method,
            path: path.into(),
            params,
            body_format: BodyFormat::default(),
        }
    }

    pub fn get(path: impl Into<String>, params: ParameterBag) -> Self {
        Self::new(Method::GET, path, params)
    }

    pub fn post(path: impl Into<String>, params: ParameterBag) -> Self {
        Self::new(Method::POST, path, params)
    }

    pub fn put(path: impl Into<String>, params: ParameterBag) -> Self {
        Self::new(Method::PUT, path, params)
    }

    pub fn patch(path: impl Into<String>, params: ParameterBag) -> Self {
        Self::new(Method::PATCH, path, params)
    }

    pub fn delete(path: impl Into<String>, params: ParameterBag) -> Self {
        Self::new(Method::DELETE, path, params)
    }

    /// Send write parameters as a JSON object instead of a form.
    pub fn json(mut self) -> Self {
        self.body_format = BodyFormat::Json;
        self
    }

    fn is_read(&self) -> bool {
        self.method == Method::GET || self.method == Method::HEAD
    }
}

/// The text payload handed back to tool callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    pub text: String,
}

impl OperationResult {
    /// Pretty-print JSON bodies; pass anything else through verbatim.
    pub fn from_body(body: String) -> Self {
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(text) => Self { text },
                Err(_) => Self { text: body },
            },
            Err(_) => Self { text: body },
        }
    }

    /// Pretty-printed rendering of a locally built value.
    pub fn from_json(value: &Value) -> Self {
        Self {
            text: serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
        }
    }

    /// Parse the payload as JSON, if it is JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.text).ok()
    }
}

/// Executes [`ApiRequest`]s with a freshly resolved credential per call.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    config: Arc<ClientConfig>,
    transport: Arc<dyn HttpTransport>,
    credentials: CredentialHandle,
}

impl RequestExecutor {
    pub fn new(
        config: Arc<ClientConfig>,
        transport: Arc<dyn HttpTransport>,
        credentials: CredentialHandle,
    ) -> Self {
        Self {
            config,
            transport,
            credentials,
        }
    }

    /// Executor with the reqwest transport and the config's default credential source.
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        let transport = ReqwestTransport::new(&config)?;
        let credentials = CredentialHandle::new(config.credential_resolver());
        Ok(Self::new(Arc::new(config), Arc::new(transport), credentials))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The swappable credential slot shared by clones of this executor.
    pub fn credentials(&self) -> &CredentialHandle {
        &self.credentials
    }

    /// A copy of this executor bound to its own credential strategy.
    ///
    /// Used for per-request credentials in multi-tenant mode; the original
    /// executor and its other clones are unaffected.
    pub fn with_credentials(&self, resolver: Arc<dyn CredentialResolver>) -> Self {
        Self {
            config: Arc::clone(&self.config),
            transport: Arc::clone(&self.transport),
            credentials: CredentialHandle::scoped(resolver),
        }
    }

    /// Shorthand for [`execute_request`](Self::execute_request).
    pub async fn execute(
        &self,
        path: &str,
        method: Method,
        params: ParameterBag,
    ) -> ClientResult<OperationResult> {
        self.execute_request(ApiRequest::new(method, path, params))
            .await
    }

    /// Run one request through the pipeline. Never retries.
    pub async fn execute_request(&self, request: ApiRequest) -> ClientResult<OperationResult> {
        let credential = self.credentials.resolve().ok_or(ClientError::AuthMissing)?;

        let is_read = request.is_read();
        let ApiRequest {
            method,
            path,
            mut params,
            body_format,
        } = request;

        let mut url = self.build_url(&path, &mut params)?;
        let body = if is_read {
            let query = codec::encode(&params);
            if !query.is_empty() {
                url.set_query(Some(&query.to_query_string()));
            }
            None
        } else if params.is_empty() {
            None
        } else {
            Some(match body_format {
                BodyFormat::Form => RequestBody::Form(codec::encode(&params).to_query_string()),
                BodyFormat::Json => RequestBody::Json(Value::Object(codec::encode_json(&params))),
            })
        };

        let url = url.to_string();
        debug!(method = %method, url = %url, "Sending API request");

        let response = self
            .transport
            .send(HttpRequest {
                method,
                url: url.clone(),
                headers: vec![
                    (
                        self.config.auth_header.clone(),
                        self.config.authorization_value(&credential),
                    ),
                    ("Accept".to_string(), "application/json".to_string()),
                ],
                body,
            })
            .await?;

        if !response.is_success() {
            warn!(status = response.status, url = %url, "API request failed");
            return Err(ClientError::http(response.status, url, response.body));
        }

        debug!(status = response.status, bytes = response.body.len(), "API request succeeded");
        Ok(OperationResult::from_body(response.body))
    }

    /// Join the base URL with a path template, consuming `{name}` params.
    fn build_url(&self, path: &str, params: &mut ParameterBag) -> ClientResult<Url> {
        let mut url = Url::parse(&self.config.base_url).map_err(|e| {
            ClientError::config_error(format!("invalid base-url '{}': {}", self.config.base_url, e))
        })?;

        let mut segments = Vec::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            match segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
            {
                Some(name) => segments.push(path_value(name, params.take(name))?),
                None => segments.push(segment.to_string()),
            }
        }

        {
            let mut parts = url.path_segments_mut().map_err(|_| {
                ClientError::config_error(format!(
                    "base-url '{}' cannot be a base",
                    self.config.base_url
                ))
            })?;
            parts.pop_if_empty();
            for segment in &segments {
                parts.push(segment);
            }
        }
        Ok(url)
    }
}

fn path_value(name: &str, value: Option<Value>) -> ClientResult<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(ClientError::invalid_input(format!(
            "missing value for path parameter '{}'",
            name
        ))),
    }
}
