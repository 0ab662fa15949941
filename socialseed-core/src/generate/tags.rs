use socialseed_types::Tag;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};

use crate::error::{SeedError, SeedResult};

/// Flipped to `true` to stop tag workers between tags
pub type CancelSignal = watch::Receiver<bool>;

pub fn cancellation() -> (watch::Sender<bool>, CancelSignal) {
    watch::channel(false)
}

/// `Err(Cancelled)` once the signal has been flipped
pub fn ensure_running(cancel: &CancelSignal) -> SeedResult<()> {
    if *cancel.borrow() {
        return Err(SeedError::Cancelled);
    }
    Ok(())
}

/// Associate every tag with every subject whose caption contains the tag
/// name as a case-sensitive substring.
///
/// `workers` tasks pull tags from a shared queue and scan the immutable
/// caption map on the blocking pool. Matches stream back over a channel that
/// closes once the last worker exits. The result is a set, so scheduling
/// order never shows in the output.
pub async fn associate_tags<K>(
    tags: &[Tag],
    captions: Arc<HashMap<K, String>>,
    workers: usize,
    cancel: CancelSignal,
) -> SeedResult<HashSet<(K, i64)>>
where
    K: Copy + Eq + Hash + Send + Sync + 'static,
{
    if tags.is_empty() || captions.is_empty() {
        return Ok(HashSet::new());
    }
    let workers = workers.clamp(1, tags.len());

    let (queue_tx, queue_rx) = mpsc::channel::<Tag>(tags.len());
    for tag in tags {
        queue_tx
            .send(tag.clone())
            .await
            .map_err(|e| SeedError::Worker(format!("failed to queue tag: {}", e)))?;
    }
    drop(queue_tx);
    let queue = Arc::new(Mutex::new(queue_rx));

    let (result_tx, mut result_rx) = mpsc::channel::<Vec<(K, i64)>>(workers * 4);

    let mut handles = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        let queue = Arc::clone(&queue);
        let captions = Arc::clone(&captions);
        let results = result_tx.clone();
        let cancel = cancel.clone();
        handles.push(tokio::spawn(async move {
            tag_worker(worker_id, queue, captions, results, cancel).await
        }));
    }
    // Channel closes when the last worker's sender drops
    drop(result_tx);

    let coordinator = tokio::spawn(async move {
        let mut scanned = 0usize;
        for handle in handles {
            scanned += handle
                .await
                .map_err(|e| SeedError::Worker(format!("tag worker panicked: {}", e)))??;
        }
        Ok::<usize, SeedError>(scanned)
    });

    let mut matches = HashSet::new();
    while let Some(batch) = result_rx.recv().await {
        matches.extend(batch);
    }

    let scanned = coordinator
        .await
        .map_err(|e| SeedError::Worker(format!("tag coordinator panicked: {}", e)))??;

    tracing::info!(
        "Scanned {} tags over {} captions with {} workers: {} associations",
        scanned,
        captions.len(),
        workers,
        matches.len()
    );
    Ok(matches)
}

async fn tag_worker<K>(
    worker_id: usize,
    queue: Arc<Mutex<mpsc::Receiver<Tag>>>,
    captions: Arc<HashMap<K, String>>,
    results: mpsc::Sender<Vec<(K, i64)>>,
    cancel: CancelSignal,
) -> SeedResult<usize>
where
    K: Copy + Eq + Hash + Send + Sync + 'static,
{
    let mut scanned = 0usize;
    loop {
        if let Err(e) = ensure_running(&cancel) {
            tracing::debug!("Tag worker {} cancelled after {} tags", worker_id, scanned);
            return Err(e);
        }
        // The collector is gone when the run was aborted
        if results.is_closed() {
            tracing::debug!("Tag worker {} abandoned after {} tags", worker_id, scanned);
            return Err(SeedError::Cancelled);
        }

        let next = {
            let mut rx = queue.lock().await;
            rx.recv().await
        };
        let Some(tag) = next else { break };

        let captions = Arc::clone(&captions);
        let batch = tokio::task::spawn_blocking(move || scan_captions(&tag, &captions))
            .await
            .map_err(|e| SeedError::Worker(format!("worker {}: {}", worker_id, e)))?;
        scanned += 1;

        if !batch.is_empty() && results.send(batch).await.is_err() {
            return Err(SeedError::Worker(format!(
                "worker {}: result channel closed",
                worker_id
            )));
        }
    }

    tracing::debug!("Tag worker {} finished after {} tags", worker_id, scanned);
    Ok(scanned)
}

fn scan_captions<K: Copy>(tag: &Tag, captions: &HashMap<K, String>) -> Vec<(K, i64)> {
    if tag.name.is_empty() {
        return Vec::new();
    }
    captions
        .iter()
        .filter(|(_, caption)| caption.contains(tag.name.as_str()))
        .map(|(subject, _)| (*subject, tag.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tags(names: &[&str]) -> Vec<Tag> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Tag {
                id: i as i64 + 1,
                name: name.to_string(),
            })
            .collect()
    }

    fn sequential(tags: &[Tag], captions: &HashMap<i64, String>) -> HashSet<(i64, i64)> {
        tags.iter().flat_map(|tag| scan_captions(tag, captions)).collect()
    }

    #[tokio::test]
    async fn test_substring_matches_both_tags() {
        let tags = tags(&["cat", "category"]);
        let captions: HashMap<i64, String> = [(1, "category day".to_string())].into_iter().collect();
        let (_tx, cancel) = cancellation();

        let matches = associate_tags(&tags, Arc::new(captions), 4, cancel).await.unwrap();

        let expected: HashSet<(i64, i64)> = [(1, 1), (1, 2)].into_iter().collect();
        assert_eq!(matches, expected);
    }

    #[tokio::test]
    async fn test_matching_is_case_sensitive() {
        let tags = tags(&["Cat"]);
        let captions: HashMap<i64, String> = [(1, "category".to_string())].into_iter().collect();
        let (_tx, cancel) = cancellation();

        let matches = associate_tags(&tags, Arc::new(captions), 2, cancel).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_worker_count_does_not_change_result() {
        let tags = tags(&["sun", "sea", "sand", "surf", "s", "beach", "nothing"]);
        let captions: HashMap<i64, String> = (0..50)
            .map(|i| {
                let caption = match i % 4 {
                    0 => "sun and sea",
                    1 => "sandy beach",
                    2 => "surfing",
                    _ => "plain",
                };
                (i, caption.to_string())
            })
            .collect();
        let expected = sequential(&tags, &captions);
        let captions = Arc::new(captions);

        for workers in [1, 3, 8, 64] {
            let (_tx, cancel) = cancellation();
            let matches = associate_tags(&tags, Arc::clone(&captions), workers, cancel)
                .await
                .unwrap();
            assert_eq!(matches, expected, "workers = {}", workers);
        }
    }

    #[tokio::test]
    async fn test_uuid_subjects() {
        let story = uuid::Uuid::from_u128(7);
        let tags = tags(&["travel"]);
        let captions: HashMap<uuid::Uuid, String> = [(story, "#travel".to_string())].into_iter().collect();
        let (_tx, cancel) = cancellation();

        let matches = associate_tags(&tags, Arc::new(captions), 2, cancel).await.unwrap();
        assert!(matches.contains(&(story, 1)));
    }

    #[tokio::test]
    async fn test_cancelled_run_fails() {
        let tags = tags(&["a", "b", "c"]);
        let captions: HashMap<i64, String> = [(1, "abc".to_string())].into_iter().collect();
        let (tx, cancel) = cancellation();
        tx.send(true).unwrap();

        let result = associate_tags(&tags, Arc::new(captions), 2, cancel).await;
        assert!(matches!(result, Err(SeedError::Cancelled)));
    }

    #[tokio::test]
    async fn test_empty_inputs() {
        let (_tx, cancel) = cancellation();
        let empty: HashMap<i64, String> = HashMap::new();
        let matches = associate_tags(&tags(&["x"]), Arc::new(empty), 4, cancel.clone())
            .await
            .unwrap();
        assert!(matches.is_empty());

        let captions: HashMap<i64, String> = [(1, "x".to_string())].into_iter().collect();
        let matches = associate_tags(&[], Arc::new(captions), 4, cancel).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_worker_stops_when_collector_dropped() {
        let tags = tags(&["a", "b", "c"]);
        let (queue_tx, queue_rx) = mpsc::channel(tags.len());
        for tag in &tags {
            queue_tx.send(tag.clone()).await.unwrap();
        }
        drop(queue_tx);
        let queue = Arc::new(Mutex::new(queue_rx));
        let (results, collector) = mpsc::channel(4);
        drop(collector);
        let captions: HashMap<i64, String> = [(1, "abc".to_string())].into_iter().collect();
        let (_tx, cancel) = cancellation();

        let result = tag_worker(0, Arc::clone(&queue), Arc::new(captions), results, cancel).await;
        assert!(matches!(result, Err(SeedError::Cancelled)));

        // Nothing was taken off the queue
        let mut rx = queue.lock().await;
        let mut remaining = 0;
        while rx.try_recv().is_ok() {
            remaining += 1;
        }
        assert_eq!(remaining, 3);
    }

    proptest! {
        #[test]
        fn prop_pool_matches_sequential_scan(
            names in proptest::collection::vec("[ab]{1,3}", 1..8),
            texts in proptest::collection::vec("[ab ]{0,12}", 0..20),
            workers in 1usize..10,
        ) {
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let tags = tags(&refs);
            let captions: HashMap<i64, String> = texts
                .into_iter()
                .enumerate()
                .map(|(i, text)| (i as i64, text))
                .collect();
            let expected = sequential(&tags, &captions);

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let (_tx, cancel) = cancellation();
            let matches = runtime
                .block_on(associate_tags(&tags, Arc::new(captions), workers, cancel))
                .unwrap();
            prop_assert_eq!(matches, expected);
        }
    }
}
