//! # seodata-client
//!
//! Shared machinery behind every SE Ranking data API operation:
//!
//! - [`credentials`]: swappable credential strategies, resolved per call
//! - [`codec`]: parameter bag → wire pairs, including `filter[field][bound]` keys
//! - [`executor`]: the request pipeline returning a normalized text result
//! - [`orchestrator`]: submit-and-poll for long-running tasks with progress events
//! - [`config`]: TOML + environment configuration
//!
//! ```rust,ignore
//! let executor = RequestExecutor::from_config(ClientConfig::load(None)?)?;
//! let result = executor
//!     .execute("/domain/overview/worldwide", Method::GET, ParameterBag::new().with("domain", "example.com"))
//!     .await?;
//! println!("{}", result.text);
//! ```

pub mod codec;
pub mod config;
pub mod credentials;
pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod transport;

pub use codec::{EncodedQuery, ParameterBag};
pub use config::{ClientConfig, PollingConfig};
pub use credentials::{
    Credential, CredentialHandle, CredentialResolver, EnvCredential, NoCredential,
    StaticCredential,
};
pub use error::{ClientError, ClientResult};
pub use executor::{ApiRequest, BodyFormat, OperationResult, RequestExecutor};
pub use orchestrator::{
    ChannelProgress, NoopProgress, PollLimits, PollOptions, ProgressEvent, ProgressSink,
    TaskOrchestrator, TaskOutcome, TaskPhase,
};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
