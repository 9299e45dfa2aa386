use std::future::Future;
use std::sync::Arc;

use futures::future;
use tokio::sync::Semaphore;

/// Default concurrency: two copies per core, capped.
pub fn default_concurrency() -> usize {
    std::cmp::min(num_cpus::get() * 2, crate::constants::MAX_DEFAULT_COPY_CONCURRENCY)
}

/// Run `task` for every item with at most `limit` in flight, waiting for all
/// of them. Results come back in input order.
pub async fn run_bounded<T, R, F, Fut>(items: Vec<T>, limit: usize, task: F) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R>,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));

    let futures = items.into_iter().map(|item| {
        let semaphore = Arc::clone(&semaphore);
        let work = task(item);
        async move {
            // The semaphore is never closed, so acquire cannot fail
            let _permit = semaphore.acquire().await.ok();
            work.await
        }
    });

    future::join_all(futures).await
}
