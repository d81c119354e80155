//! Cross-runtime dispatch into the chat gateway.
//!
//! The chat client lives on the gateway's single-threaded runtime. HTTP
//! handlers run elsewhere and hand work over through a [`DispatchBridge`]:
//! each submission is a boxed job pushed onto an mpsc queue that a pump task
//! on the gateway runtime drains, with a oneshot channel carrying the result
//! back.

use std::{future::Future, sync::Arc};

use {
    futures::future::BoxFuture,
    tokio::sync::{RwLock, mpsc, oneshot},
    tracing::{debug, trace},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// Nothing is attached on the gateway side, or it went away before
    /// answering.
    #[error("chat gateway is not connected")]
    Unavailable,
}

type Job<C> = Box<dyn FnOnce(C) -> BoxFuture<'static, ()> + Send>;

/// Handle for running actions on the gateway runtime.
///
/// `C` is the context value each action receives, typically the chat client.
pub struct DispatchBridge<C> {
    sender: Arc<RwLock<Option<mpsc::UnboundedSender<Job<C>>>>>,
}

impl<C> Clone for DispatchBridge<C> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
        }
    }
}

impl<C> Default for DispatchBridge<C>
where
    C: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C> DispatchBridge<C>
where
    C: Clone + Send + Sync + 'static,
{
    /// A detached bridge. Submissions fail until [`attach`](Self::attach).
    pub fn new() -> Self {
        Self {
            sender: Arc::new(RwLock::new(None)),
        }
    }

    /// Start accepting work. Must be called from the gateway runtime: the
    /// pump task is spawned onto the runtime of the caller.
    ///
    /// Returns `false` if a live pump is already attached.
    pub async fn attach(&self, ctx: C) -> bool {
        let mut slot = self.sender.write().await;
        if slot.as_ref().is_some_and(|tx| !tx.is_closed()) {
            return false;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(pump(rx, ctx));
        *slot = Some(tx);
        debug!("dispatch bridge attached");
        true
    }

    /// Stop accepting work. Jobs already queued still run.
    pub async fn detach(&self) {
        if self.sender.write().await.take().is_some() {
            debug!("dispatch bridge detached");
        }
    }

    pub async fn is_available(&self) -> bool {
        self.sender
            .read()
            .await
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Run `action` on the gateway runtime and wait for its output.
    ///
    /// Fails immediately with [`BridgeError::Unavailable`] when no gateway is
    /// attached. Only the calling task waits; other submissions proceed.
    pub async fn submit<T, F, Fut>(&self, action: F) -> Result<T, BridgeError>
    where
        F: FnOnce(C) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job<C> = Box::new(move |ctx| {
            Box::pin(async move {
                // The submitter may have gone away; the action still ran.
                let _ = reply_tx.send(action(ctx).await);
            })
        });

        {
            let slot = self.sender.read().await;
            let tx = slot.as_ref().ok_or(BridgeError::Unavailable)?;
            tx.send(job).map_err(|_| BridgeError::Unavailable)?;
        }

        reply_rx.await.map_err(|_| BridgeError::Unavailable)
    }
}

async fn pump<C>(mut rx: mpsc::UnboundedReceiver<Job<C>>, ctx: C)
where
    C: Clone + Send + Sync + 'static,
{
    while let Some(job) = rx.recv().await {
        trace!("dispatching bridged job");
        tokio::spawn(job(ctx.clone()));
    }
    debug!("dispatch bridge pump stopped");
}
