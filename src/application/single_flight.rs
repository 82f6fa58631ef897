use crate::error::{CheckoutError, Result};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::debug;

/// Bridges a push-style vendor callback into one awaited result.
///
/// [`begin`](DeferredRequest::begin) opens a request and hands back the
/// future the caller awaits; the vendor callback later settles it through
/// [`resolve`](DeferredRequest::resolve) or [`reject`](DeferredRequest::reject)
/// on any clone of the same holder. At most one request is live: beginning a
/// new one rejects the previous one with `Timeout { Superseded }` before
/// `begin` returns.
pub struct DeferredRequest<T> {
    name: &'static str,
    pending: Arc<Mutex<Option<oneshot::Sender<Result<T>>>>>,
}

impl<T> Clone for DeferredRequest<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<T> DeferredRequest<T> {
    /// `name` identifies the callback in logs and in `UnexpectedCallback`.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            pending: Arc::new(Mutex::new(None)),
        }
    }

    pub fn begin(&self) -> PendingRequest<T> {
        let (sender, receiver) = oneshot::channel();
        let previous = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(sender);

        if let Some(previous) = previous {
            debug!(request = self.name, "superseding pending request");
            let _ = previous.send(Err(CheckoutError::superseded()));
        }

        PendingRequest { receiver }
    }

    pub fn resolve(&self, value: T) -> Result<()> {
        self.settle(Ok(value))
    }

    pub fn reject(&self, error: CheckoutError) -> Result<()> {
        self.settle(Err(error))
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Rejects the live request, if any, with `Timeout { Abandoned }`.
    pub fn cancel(&self) -> bool {
        let pending = self.pending.lock().unwrap_or_else(|e| e.into_inner()).take();
        match pending {
            Some(sender) => {
                let _ = sender.send(Err(CheckoutError::abandoned()));
                true
            }
            None => false,
        }
    }

    fn settle(&self, outcome: Result<T>) -> Result<()> {
        let sender = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or(CheckoutError::UnexpectedCallback(self.name))?;

        if sender.send(outcome).is_err() {
            debug!(request = self.name, "caller stopped waiting before the callback arrived");
        }
        Ok(())
    }
}

/// The caller's side of a [`DeferredRequest`].
pub struct PendingRequest<T> {
    receiver: oneshot::Receiver<Result<T>>,
}

impl<T> Future for PendingRequest<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(CheckoutError::abandoned())),
            Poll::Pending => Poll::Pending,
        }
    }
}
