//! Semaphore-bounded concurrent fan-out.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use crate::errors::{Result, TalentSearchError};

/// Run `futures` concurrently under a worker pool of size
/// `min(futures.len(), pool_cap)`, returning results in input order.
///
/// When `deadline` is set and elapses before all tasks finish, the
/// still-running tasks are aborted and their slots report an error; callers
/// treat those the same as any other failed sub-task (zero contribution).
/// A panicked task likewise degrades to an error slot rather than poisoning
/// the whole fan-out.
pub async fn bounded_join_all<T, F>(
    futures: Vec<F>,
    pool_cap: usize,
    deadline: Option<Duration>,
) -> Vec<Result<T>>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let count = futures.len();
    if count == 0 {
        return Vec::new();
    }

    let workers = pool_cap.max(1).min(count);
    let semaphore = Arc::new(Semaphore::new(workers));
    let mut set: JoinSet<(usize, Result<T>)> = JoinSet::new();

    for (index, future) in futures.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        set.spawn(async move {
            // The semaphore is never closed, so acquisition only fails if the
            // task is being torn down; in that case the slot stays empty.
            let _permit = semaphore.acquire_owned().await;
            (index, future.await)
        });
    }

    let started = tokio::time::Instant::now();
    let mut slots: Vec<Option<Result<T>>> = std::iter::repeat_with(|| None).take(count).collect();

    loop {
        let joined = match deadline {
            Some(limit) => {
                let remaining = limit.saturating_sub(started.elapsed());
                match tokio::time::timeout(remaining, set.join_next()).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        warn!(
                            abandoned = set.len(),
                            "fan-out deadline elapsed, abandoning in-flight tasks"
                        );
                        set.abort_all();
                        break;
                    }
                }
            }
            None => set.join_next().await,
        };

        match joined {
            Some(Ok((index, result))) => slots[index] = Some(result),
            Some(Err(join_err)) => {
                warn!(error = %join_err, "fan-out task aborted or panicked");
            }
            None => break,
        }
    }

    slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| {
                Err(TalentSearchError::Index(
                    "sub-task abandoned before completion".to_string(),
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_results_preserve_input_order() {
        let futures: Vec<_> = (0..5_u64)
            .map(|i| async move {
                // Later tasks finish first.
                tokio::time::sleep(Duration::from_millis(50 - i * 10)).await;
                Ok(i)
            })
            .collect();

        let results = bounded_join_all(futures, 5, None).await;
        let values: Vec<u64> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let futures: Vec<std::future::Ready<Result<u8>>> = Vec::new();
        let results = bounded_join_all(futures, 4, None).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_individual_failure_does_not_poison_others() {
        let futures: Vec<_> = (0..3_i32)
            .map(|i| async move {
                if i == 1 {
                    Err(TalentSearchError::Index("boom".to_string()))
                } else {
                    Ok(i)
                }
            })
            .collect();

        let results = bounded_join_all(futures, 2, None).await;
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_abandons_slow_tasks() {
        let futures: Vec<_> = (0..2_u64)
            .map(|i| async move {
                if i == 0 {
                    Ok(i)
                } else {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(i)
                }
            })
            .collect();

        let results = bounded_join_all(futures, 2, Some(Duration::from_millis(100))).await;
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[tokio::test]
    async fn test_pool_cap_of_zero_still_runs() {
        let futures = vec![async { Ok(42_u8) }];
        let results = bounded_join_all(futures, 0, None).await;
        assert_eq!(*results[0].as_ref().unwrap(), 42);
    }
}
