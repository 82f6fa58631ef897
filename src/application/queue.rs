use crate::error::Result;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

/// Queue for wallet side effects that reload checkout and payment method state.
pub const WIDGET_INTERACTION: &str = "widgetInteraction";
/// Queue for shipping address and option updates.
pub const SHIPPING_STRATEGY: &str = "shippingStrategy";

/// Runs asynchronous operations one at a time per queue id.
///
/// Each call to [`run`](SerializedQueue::run) takes its place in line when it
/// is called, not when its future is first polled, so submission order is
/// execution order. Every operation waits for its predecessor to settle
/// (succeed, fail, or be dropped) before starting. Different queue ids never
/// wait on each other.
#[derive(Default)]
pub struct SerializedQueue {
    tails: Mutex<HashMap<String, oneshot::Receiver<()>>>,
}

impl SerializedQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run<F, Fut, T>(
        &self,
        queue_id: &str,
        operation: F,
    ) -> impl Future<Output = Result<T>> + use<F, Fut, T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let (done, done_rx) = oneshot::channel::<()>();
        let predecessor = {
            let mut tails = self.tails.lock().unwrap_or_else(|e| e.into_inner());
            tails.insert(queue_id.to_string(), done_rx)
        };
        let queue_id = queue_id.to_string();

        async move {
            if let Some(previous) = predecessor {
                // Resolves once the previous operation's sender is gone,
                // whichever way it finished.
                let _ = previous.await;
            }

            debug!(queue_id = %queue_id, "running queued operation");
            let result = operation().await;
            if result.is_err() {
                debug!(queue_id = %queue_id, "queued operation failed");
            }
            drop(done);
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckoutError;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    #[tokio::test]
    async fn test_same_queue_runs_in_submission_order() {
        let queue = SerializedQueue::new();
        let events = Arc::new(Mutex::new(Vec::new()));

        let slow = {
            let events = events.clone();
            queue.run(WIDGET_INTERACTION, move || async move {
                events.lock().unwrap().push("slow:start");
                sleep(Duration::from_millis(30)).await;
                events.lock().unwrap().push("slow:end");
                Ok(1)
            })
        };
        let fast = {
            let events = events.clone();
            queue.run(WIDGET_INTERACTION, move || async move {
                events.lock().unwrap().push("fast:start");
                events.lock().unwrap().push("fast:end");
                Ok(2)
            })
        };

        // Poll the later submission first; order must not change.
        let (fast, slow) = tokio::join!(fast, slow);
        assert_eq!(slow.unwrap(), 1);
        assert_eq!(fast.unwrap(), 2);
        assert_eq!(
            *events.lock().unwrap(),
            vec!["slow:start", "slow:end", "fast:start", "fast:end"]
        );
    }

    #[tokio::test]
    async fn test_failure_is_reported_only_to_its_caller() {
        let queue = SerializedQueue::new();

        let failing = queue.run(WIDGET_INTERACTION, || async {
            Err::<(), _>(CheckoutError::Synchronization)
        });
        let next = queue.run(WIDGET_INTERACTION, || async { Ok("next") });

        let (failing, next) = tokio::join!(failing, next);
        assert!(matches!(failing, Err(CheckoutError::Synchronization)));
        assert_eq!(next.unwrap(), "next");
    }

    #[tokio::test]
    async fn test_different_queues_do_not_block_each_other() {
        let queue = SerializedQueue::new();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let blocked = queue.run(WIDGET_INTERACTION, move || async move {
            release_rx.await.ok();
            Ok(())
        });
        let other = queue.run(SHIPPING_STRATEGY, move || async move {
            release_tx.send(()).ok();
            Ok(())
        });

        let both = async { tokio::join!(blocked, other) };
        let (blocked, other) = timeout(Duration::from_secs(1), both)
            .await
            .expect("queues with different ids must run concurrently");
        assert!(blocked.is_ok() && other.is_ok());
    }

    #[tokio::test]
    async fn test_dropped_operation_releases_the_queue() {
        let queue = SerializedQueue::new();

        let abandoned = queue.run(SHIPPING_STRATEGY, || async { Ok(()) });
        let next = queue.run(SHIPPING_STRATEGY, || async { Ok(7) });
        drop(abandoned);

        let value = timeout(Duration::from_secs(1), next).await.unwrap().unwrap();
        assert_eq!(value, 7);
    }
}
