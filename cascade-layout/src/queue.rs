//! Bounded-concurrency batch driver for height measurement.
//!
//! Measuring an item can suspend for a long time (image loads), so a batch
//! is never resolved all at once. A semaphore caps how many items are in
//! flight; a finished item releases its permit and the next unscheduled item
//! takes it.

use std::{future::Future, sync::Arc};

use futures_util::future::try_join_all;
use tokio::sync::Semaphore;

/// Measurement ceiling: at most this many items are in flight at a time.
pub const MAX_IN_FLIGHT: usize = 5;

/// Runs `work` for every item with at most `limit` in flight, completing
/// exactly once all of them have completed. Completion order is
/// unconstrained; a failing item aborts the whole batch with its error.
///
/// The batch is driven entirely on the calling task, so suspension only
/// happens inside `work` itself. There is no per-item timeout: work that
/// never completes stalls the batch indefinitely.
pub(crate) async fn for_each_bounded<T, F, Fut, E>(
    items: &[Arc<T>],
    limit: usize,
    work: F,
) -> Result<(), E>
where
    F: Fn(Arc<T>) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let gate = Semaphore::new(limit.max(1));
    let passes = items.iter().map(|item| {
        let gate = &gate;
        let work = &work;
        async move {
            // The gate is never closed, so acquire only waits for a permit.
            let _permit = gate.acquire().await.expect("measurement gate closed");
            work(item.clone()).await
        }
    });
    try_join_all(passes).await.map(|_| ())
}
