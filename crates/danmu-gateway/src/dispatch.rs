//! Concurrent fan-out with per-callback fault isolation.
//!
//! Every subscriber invocation runs in its own task behind a `catch_unwind` boundary:
//! a panicking or never-returning subscriber cannot stall packet ingestion, crash
//! sibling subscribers, or propagate into the router.

use futures::FutureExt;
use futures::future::BoxFuture;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::error;

use crate::handler::EventHandler;

/// Tuning for the fan-out dispatcher.
#[derive(Debug, Clone, Default)]
pub struct DispatchConfig {
    /// Upper bound on concurrently running subscriber tasks. `None` (the default)
    /// spawns without limit; setting a bound makes bursty traffic (gift storms) queue
    /// inside already-spawned tasks instead of running all at once. Either way,
    /// routing itself never blocks.
    pub max_concurrent: Option<usize>,
}

/// Spawns one task per subscriber invocation and isolates its failures.
pub(crate) struct FanOut {
    limiter: Option<Arc<Semaphore>>,
}

impl FanOut {
    pub(crate) fn new(config: &DispatchConfig) -> Self {
        Self {
            limiter: config
                .max_concurrent
                .map(|n| Arc::new(Semaphore::new(n.max(1)))),
        }
    }

    /// Invoke every subscriber in the list, each in its own task. Returns as soon as
    /// the tasks are spawned; completion is never awaited.
    pub(crate) fn dispatch_all<T>(&self, handlers: &[EventHandler<T>], event: Arc<T>)
    where
        T: Send + Sync + 'static,
    {
        for handler in handlers {
            self.spawn(handler(Arc::clone(&event)));
        }
    }

    /// Run a single callback future inside the failure boundary.
    pub(crate) fn spawn(&self, fut: BoxFuture<'static, ()>) {
        let limiter = self.limiter.clone();
        tokio::spawn(async move {
            let _permit = match limiter {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };
            if let Err(panic) = AssertUnwindSafe(fut).catch_unwind().await {
                error!("event error: {}", panic_message(panic.as_ref()));
            }
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
