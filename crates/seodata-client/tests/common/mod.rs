//! Shared test helpers: a scripted transport and a collecting progress sink.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use seodata_client::{
    ClientConfig, ClientResult, Credential, CredentialHandle, HttpRequest, HttpResponse,
    HttpTransport, Method, PollLimits, PollOptions, ProgressEvent, ProgressSink,
    RequestExecutor, StaticCredential,
};

/// Replays one submit response and a queue of poll responses.
///
/// The last poll response repeats once the queue is drained. With
/// `hang_polls` set, GET requests never complete.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    submit: Mutex<Option<HttpResponse>>,
    polls: Mutex<VecDeque<HttpResponse>>,
    hang_polls: bool,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(submit_body: &str, poll_bodies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            submit: Mutex::new(Some(ok(submit_body))),
            polls: Mutex::new(poll_bodies.iter().map(|b| ok(b)).collect()),
            hang_polls: false,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn with_poll_responses(submit_body: &str, polls: Vec<HttpResponse>) -> Arc<Self> {
        Arc::new(Self {
            submit: Mutex::new(Some(ok(submit_body))),
            polls: Mutex::new(polls.into()),
            hang_polls: false,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn hanging(submit_body: &str) -> Arc<Self> {
        Arc::new(Self {
            submit: Mutex::new(Some(ok(submit_body))),
            polls: Mutex::new(VecDeque::new()),
            hang_polls: true,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn submit_calls(&self) -> usize {
        self.count(Method::POST)
    }

    pub fn poll_calls(&self) -> usize {
        self.count(Method::GET)
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }

    fn count(&self, method: Method) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .count()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> ClientResult<HttpResponse> {
        let is_poll = request.method == Method::GET;
        self.requests.lock().unwrap().push(request);

        if !is_poll {
            return Ok(self.submit.lock().unwrap().clone().unwrap_or_else(|| ok("{}")));
        }
        if self.hang_polls {
            std::future::pending::<()>().await;
        }

        let mut polls = self.polls.lock().unwrap();
        let response = if polls.len() > 1 {
            polls.pop_front()
        } else {
            polls.front().cloned()
        };
        Ok(response.unwrap_or_else(|| ok(r#"{"status":"processing"}"#)))
    }
}

pub fn ok(body: &str) -> HttpResponse {
    HttpResponse {
        status: 200,
        body: body.to_string(),
    }
}

/// Collects every progress event in order.
#[derive(Debug, Default)]
pub struct CollectingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingProgress {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn values(&self) -> Vec<u8> {
        self.events().iter().map(|e| e.progress).collect()
    }
}

impl ProgressSink for CollectingProgress {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn executor_with(transport: Arc<dyn HttpTransport>) -> RequestExecutor {
    executor_with_config(
        transport,
        ClientConfig {
            base_url: "https://api.example.com/v1".into(),
            ..Default::default()
        },
    )
}

pub fn executor_with_config(
    transport: Arc<dyn HttpTransport>,
    config: ClientConfig,
) -> RequestExecutor {
    let credentials = CredentialHandle::new(Arc::new(StaticCredential::new(
        Credential::parse("test-token").unwrap(),
    )));
    RequestExecutor::new(Arc::new(config), transport, credentials)
}

/// Poll options that bypass the production bounds for fast paused-clock tests.
pub fn fast_options(interval_ms: u64, max_wait_ms: u64) -> PollOptions {
    let limits = PollLimits {
        min_interval: Duration::from_millis(1),
        max_interval: Duration::from_secs(60),
        min_wait: Duration::from_millis(1),
        max_wait: Duration::from_secs(3600),
    };
    PollOptions::clamped(
        Duration::from_millis(interval_ms),
        Duration::from_millis(max_wait_ms),
        &limits,
    )
}
