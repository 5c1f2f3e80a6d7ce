//! Bridges orchestrator progress events to MCP progress notifications.

use std::fmt;
use std::sync::Arc;

use rmcp::model::ProgressNotificationParam;
use rmcp::service::RequestContext;
use rmcp::RoleServer;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use seodata_client::{ChannelProgress, NoopProgress, ProgressEvent, ProgressSink};

/// Progress delivery for one tool call.
///
/// If the caller supplied a progress token, events go through an unbounded
/// channel to a forwarding task that sends `notifications/progress`, so the
/// poll loop never waits on the client. Without a token, events are dropped.
pub struct ProgressForwarder {
    sink: Arc<dyn ProgressSink>,
    task: Option<JoinHandle<()>>,
}

impl fmt::Debug for ProgressForwarder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressForwarder")
            .field("forwarding", &self.task.is_some())
            .finish()
    }
}

impl ProgressForwarder {
    pub fn for_request(context: &RequestContext<RoleServer>) -> Self {
        let Some(token) = context.meta.get_progress_token() else {
            return Self::disabled();
        };

        let (tx, mut rx) = mpsc::unbounded_channel::<ProgressEvent>();
        let peer = context.peer.clone();
        let task = tokio::spawn(async move {
            // Ends once every sender is dropped.
            while let Some(event) = rx.recv().await {
                let param = ProgressNotificationParam {
                    progress_token: token.clone(),
                    progress: f64::from(event.progress),
                    total: Some(f64::from(event.total)),
                    message: Some(event.message),
                };
                if let Err(e) = peer.notify_progress(param).await {
                    tracing::debug!(error = %e, "Dropping progress notification");
                }
            }
        });

        Self {
            sink: Arc::new(ChannelProgress::new(tx)),
            task: Some(task),
        }
    }

    /// Forwarder for a call without a progress token: events are discarded.
    pub fn disabled() -> Self {
        Self {
            sink: Arc::new(NoopProgress),
            task: None,
        }
    }

    pub fn sink(&self) -> &dyn ProgressSink {
        self.sink.as_ref()
    }

    /// Close the channel and wait until queued notifications are sent, so
    /// none trail the tool result.
    pub async fn finish(self) {
        let Self { sink, task } = self;
        drop(sink);
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::debug!(error = %e, "Progress forwarder stopped early");
            }
        }
    }
}
