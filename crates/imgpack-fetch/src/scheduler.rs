//! Concurrency-limited worker pool over a shared index cursor.
//!
//! A fixed number of tokio tasks each claim the next unprocessed index
//! with an atomic `fetch_add` and loop until the cursor passes the end of
//! the batch. Results travel back over an mpsc channel and land in a
//! vector slot matching the input index, so the output is index-aligned
//! with the input no matter which fetch finishes first. Peak in-flight
//! work is bounded by the pool size independent of batch length.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

/// Run `task` for every index in `0..count` with at most `concurrency`
/// invocations in flight. A `None` outcome marks a failed slot; failures
/// never cancel sibling tasks or the batch.
pub async fn run_pool<T, F, Fut>(count: usize, concurrency: usize, task: F) -> Vec<Option<T>>
where
    T: Send + 'static,
    F: Fn(usize) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<T>> + Send + 'static,
{
    let mut results: Vec<Option<T>> = Vec::with_capacity(count);
    results.resize_with(count, || None);
    if count == 0 {
        return results;
    }

    let workers = concurrency.max(1).min(count);
    let cursor = Arc::new(AtomicUsize::new(0));
    let task = Arc::new(task);
    let (tx, mut rx) = mpsc::channel::<(usize, Option<T>)>(workers);

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let cursor = Arc::clone(&cursor);
        let task = Arc::clone(&task);
        let tx = tx.clone();

        handles.push(tokio::spawn(async move {
            loop {
                // Atomic claim; no two workers ever process the same index.
                let index = cursor.fetch_add(1, Ordering::SeqCst);
                if index >= count {
                    break;
                }
                let outcome = task(index).await;
                if tx.send((index, outcome)).await.is_err() {
                    break;
                }
            }
        }));
    }
    drop(tx);

    while let Some((index, outcome)) = rx.recv().await {
        // Each index is claimed once, so each slot is written once.
        results[index] = outcome;
    }

    for handle in handles {
        let _ = handle.await;
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_results_are_index_aligned() {
        // Later indices finish first; slots must still line up.
        let results = run_pool(8, 3, |index| async move {
            tokio::time::sleep(Duration::from_millis((8 - index as u64) * 5)).await;
            Some(index * 10)
        })
        .await;

        assert_eq!(results.len(), 8);
        for (index, slot) in results.iter().enumerate() {
            assert_eq!(*slot, Some(index * 10));
        }
    }

    #[tokio::test]
    async fn test_failures_stay_in_their_slot() {
        let results = run_pool(5, 2, |index| async move {
            if index == 1 || index == 3 {
                None
            } else {
                Some(index)
            }
        })
        .await;

        assert_eq!(results, vec![Some(0), None, Some(2), None, Some(4)]);
    }

    #[tokio::test]
    async fn test_in_flight_never_exceeds_concurrency() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let high_water = Arc::new(AtomicUsize::new(0));

        let in_flight_task = Arc::clone(&in_flight);
        let high_water_task = Arc::clone(&high_water);
        let results = run_pool(20, 4, move |index| {
            let in_flight = Arc::clone(&in_flight_task);
            let high_water = Arc::clone(&high_water_task);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                high_water.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Some(index)
            }
        })
        .await;

        assert_eq!(results.len(), 20);
        let peak = high_water.load(Ordering::SeqCst);
        assert!(peak <= 4, "peak in-flight was {}", peak);
        assert!(peak >= 2, "pool never overlapped (peak {})", peak);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let results = run_pool(0, 5, |index| async move { Some(index) }).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_concurrency_larger_than_batch() {
        let results = run_pool(2, 50, |index| async move { Some(index) }).await;
        assert_eq!(results, vec![Some(0), Some(1)]);
    }

    #[tokio::test]
    async fn test_zero_concurrency_clamped_to_one() {
        let results = run_pool(3, 0, |index| async move { Some(index) }).await;
        assert_eq!(results, vec![Some(0), Some(1), Some(2)]);
    }
}
