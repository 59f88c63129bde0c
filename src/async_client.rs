//! Asynchronous Systems Manager client.
//!
//! [`SsmAsyncClient`] runs each call of a blocking
//! [`SimpleSystemsManagement`] delegate on a [`WorkerPool`] and hands back a
//! [`CallFuture`]. It adds no retries, translation or logging of its own:
//! whatever the delegate returns is what the future resolves to.

use crate::aws::SdkSsmClient;
use crate::config::ClientConfig;
use crate::error::SsmError;
use crate::executor::{CallFuture, WorkerPool};
use crate::handler::AsyncHandler;
use crate::model::*;
use crate::ssm::{SimpleSystemsManagement, for_each_operation};
use std::sync::Arc;

const POOL_NAME: &str = "ssm-async";

pub struct SsmAsyncClient<D = SdkSsmClient> {
    delegate: Arc<D>,
    pool: Arc<WorkerPool>,
}

impl<D> Clone for SsmAsyncClient<D> {
    fn clone(&self) -> Self {
        Self {
            delegate: Arc::clone(&self.delegate),
            pool: Arc::clone(&self.pool),
        }
    }
}

impl SsmAsyncClient<SdkSsmClient> {
    /// Builds an SDK-backed client from `config`, with credentials from the
    /// default provider chain and a pool of `config.max_connections` threads.
    pub async fn connect(config: &ClientConfig) -> Result<Self, SsmError> {
        config.validate()?;
        let delegate = SdkSsmClient::load(config).await?;
        Self::with_config(delegate, config)
    }
}

impl<D> SsmAsyncClient<D>
where
    D: SimpleSystemsManagement + 'static,
{
    /// Wraps `delegate` with a pool of
    /// [`DEFAULT_THREAD_POOL_SIZE`](crate::executor::DEFAULT_THREAD_POOL_SIZE)
    /// threads.
    pub fn new(delegate: D) -> Result<Self, SsmError> {
        let pool = WorkerPool::with_default_size(POOL_NAME)?;
        Ok(Self::with_pool(delegate, Arc::new(pool)))
    }

    /// Wraps `delegate` with a pool sized by `config.max_connections`.
    pub fn with_config(delegate: D, config: &ClientConfig) -> Result<Self, SsmError> {
        config.validate()?;
        let pool = WorkerPool::new(POOL_NAME, config.max_connections)?;
        Ok(Self::with_pool(delegate, Arc::new(pool)))
    }

    /// Wraps `delegate` with a caller-provided pool, which may be shared.
    pub fn with_pool(delegate: D, pool: Arc<WorkerPool>) -> Self {
        Self {
            delegate: Arc::new(delegate),
            pool,
        }
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    /// The pool every call of this client runs on.
    pub fn executor(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Runs `operation` against the delegate on the pool.
    ///
    /// The future resolves to exactly what `operation` returned; a delegate
    /// error arrives untouched inside
    /// [`CallError::Delegate`](crate::executor::CallError::Delegate).
    pub fn invoke<Req, Resp, E, Op>(&self, operation: Op, request: Req) -> CallFuture<Resp, E>
    where
        Req: Send + 'static,
        Resp: Send + 'static,
        E: Send + 'static,
        Op: FnOnce(&D, &Req) -> Result<Resp, E> + Send + 'static,
    {
        let delegate = Arc::clone(&self.delegate);
        self.pool.submit(move || operation(&delegate, &request))
    }

    /// Like [`invoke`](Self::invoke), and notifies `handler` on the worker
    /// thread before the future completes.
    pub fn invoke_with_handler<Req, Resp, E, Op, H>(
        &self,
        operation: Op,
        request: Req,
        handler: H,
    ) -> CallFuture<Resp, E>
    where
        Req: Send + 'static,
        Resp: Send + 'static,
        E: Send + 'static,
        Op: FnOnce(&D, &Req) -> Result<Resp, E> + Send + 'static,
        H: AsyncHandler<Req, Resp, E> + Send + 'static,
    {
        let delegate = Arc::clone(&self.delegate);
        self.pool
            .submit(move || match operation(&delegate, &request) {
                Ok(response) => {
                    handler.on_success(&request, &response);
                    Ok(response)
                }
                Err(error) => {
                    handler.on_error(&error);
                    Err(error)
                }
            })
    }

    /// Releases the delegate, then stops the pool without draining it:
    /// queued calls are discarded and running calls are not awaited. To
    /// drain first, call
    /// [`WorkerPool::shutdown_graceful`] on [`executor`](Self::executor).
    pub fn shutdown(&self) {
        self.delegate.shutdown();
        self.pool.shutdown_now();
    }
}

macro_rules! define_async_operations {
    ($(
        $(#[$doc:meta])*
        $op:ident, $async_op:ident, $handler_op:ident: $req:ident => $resp:ident;
    )*) => {
        impl<D> SsmAsyncClient<D>
        where
            D: SimpleSystemsManagement + 'static,
        {
            $(
                $(#[$doc])*
                pub fn $async_op(&self, request: $req) -> CallFuture<$resp, SsmError> {
                    self.invoke(D::$op, request)
                }

                $(#[$doc])*
                ///
                /// `handler` is notified on the worker thread before the
                /// returned future completes.
                pub fn $handler_op<H>(&self, request: $req, handler: H) -> CallFuture<$resp, SsmError>
                where
                    H: AsyncHandler<$req, $resp, SsmError> + Send + 'static,
                {
                    self.invoke_with_handler(D::$op, request, handler)
                }
            )*
        }
    };
}

for_each_operation!(define_async_operations);
