use std::sync::Arc;

use tokio::task::JoinError;

/// Run `task` over `items` on at most `workers` blocking threads, preserving input order.
///
/// Items are split into contiguous chunks so each worker owns its slice outright; nothing
/// mutable is shared between workers.
pub(crate) async fn run_bounded<T, R, F>(
    items: Vec<T>,
    workers: usize,
    task: F,
) -> Result<Vec<R>, JoinError>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(&T) -> R + Send + Sync + 'static,
{
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let total = items.len();
    let chunk_size = total.div_ceil(workers.max(1));
    let task = Arc::new(task);

    let mut remaining = items;
    let mut handles = Vec::new();
    while !remaining.is_empty() {
        let rest = remaining.split_off(chunk_size.min(remaining.len()));
        let chunk = std::mem::replace(&mut remaining, rest);
        let task = Arc::clone(&task);
        handles.push(tokio::task::spawn_blocking(move || {
            chunk.iter().map(|item| task(item)).collect::<Vec<R>>()
        }));
    }

    let mut results = Vec::with_capacity(total);
    for handle in handles {
        results.extend(handle.await?);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn preserves_input_order_across_chunks() {
        let items: Vec<u32> = (0..23).collect();
        let doubled = run_bounded(items, 4, |value| value * 2)
            .await
            .expect("workers complete");
        assert_eq!(doubled, (0..23).map(|value| value * 2).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn treats_zero_workers_as_one() {
        let results = run_bounded(vec![1, 2, 3], 0, |value| value + 1)
            .await
            .expect("workers complete");
        assert_eq!(results, vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn empty_input_spawns_nothing() {
        let results: Vec<u8> = run_bounded(Vec::<u8>::new(), 8, |value| *value)
            .await
            .expect("no workers");
        assert!(results.is_empty());
    }
}
