//! Asynchronous AWS Systems Manager client.
//!
//! [`SsmAsyncClient`] wraps any blocking [`SimpleSystemsManagement`]
//! implementation and runs its calls on a fixed-size [`WorkerPool`],
//! returning a [`CallFuture`] per call and optionally notifying an
//! [`AsyncHandler`].
//!
//! ```no_run
//! # async fn run() -> Result<(), ssm_async::SsmError> {
//! use ssm_async::{ClientConfig, SsmAsyncClient, model::GetParameterRequest};
//!
//! let client = SsmAsyncClient::connect(&ClientConfig::load(None)?).await?;
//! let response = client
//!     .get_parameter_async(GetParameterRequest::new("/app/db/host"))
//!     .await?;
//! println!("{}", response.parameter.value);
//! client.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod async_client;
pub mod aws;
pub mod config;
pub mod error;
pub mod executor;
pub mod handler;
pub mod logging;
pub mod model;
pub mod ssm;

pub use async_client::SsmAsyncClient;
pub use aws::SdkSsmClient;
pub use config::ClientConfig;
pub use error::SsmError;
pub use executor::{CallError, CallFuture, DEFAULT_THREAD_POOL_SIZE, WorkerPool};
pub use handler::{AsyncHandler, FnHandler, TracingHandler, handler_fn};
pub use ssm::SimpleSystemsManagement;
