//! Paced batch embedding.
//!
//! [`generate`] walks a list of `(index, text)` records in fixed-size
//! batches, one remote call per batch, strictly in sequence. A fixed
//! delay separates consecutive batches so a run of thousands of articles
//! stays under the provider's request-rate ceiling.
//!
//! A failing batch does not abort the run: its error is logged and
//! recorded, its indices are left out of the result, and the next batch
//! is attempted. Configuration errors are the exception and end the run.
//! Callers detect partial failure with [`EmbeddingResultMap::is_complete`]
//! or by comparing [`EmbeddingResultMap::len`] with the input size.

use std::collections::hash_map::{Entry, HashMap};
use std::hash::Hash;
use std::ops::Range;
use std::time::Duration;

use tracing::{info, warn};

use crate::embed::{Embedder, EmbeddingRequest};
use crate::error::EmbedError;
use crate::openai::{DEFAULT_DIMENSION, DEFAULT_MODEL};

pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Pause between two consecutive batches.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_secs(10);

/// Options for one [`generate`] run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub batch_size: usize,
    pub dimensions: usize,
    pub model: String,
    pub delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            dimensions: DEFAULT_DIMENSION,
            model: DEFAULT_MODEL.to_string(),
            delay: DEFAULT_BATCH_DELAY,
        }
    }
}

impl BatchOptions {
    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    pub fn with_dimensions(mut self, dim: usize) -> Self {
        self.dimensions = dim;
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Reject option values that can never produce a valid request.
    pub fn validate(&self) -> Result<(), EmbedError> {
        if self.batch_size == 0 {
            return Err(EmbedError::InvalidConfig(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        if self.dimensions == 0 {
            return Err(EmbedError::InvalidConfig(
                "dimensions must be greater than zero".to_string(),
            ));
        }
        if self.model.is_empty() {
            return Err(EmbedError::InvalidConfig("model must be non-empty".to_string()));
        }
        Ok(())
    }
}

/// Waits out the pause between two batches.
#[async_trait::async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, delay: Duration);
}

/// Pacer backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

#[async_trait::async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// A batch whose request failed.
#[derive(Debug)]
pub struct BatchFailure {
    /// 1-based batch number.
    pub batch: usize,
    /// Positions of the batch's records in the input slice.
    pub items: Range<usize>,
    pub error: EmbedError,
}

/// Embeddings keyed by record index, accumulated over one run.
#[derive(Debug)]
pub struct EmbeddingResultMap<K> {
    embeddings: HashMap<K, Vec<f32>>,
    total: usize,
    failures: Vec<BatchFailure>,
}

impl<K: Eq + Hash> EmbeddingResultMap<K> {
    fn with_capacity(total: usize) -> Self {
        Self {
            embeddings: HashMap::with_capacity(total),
            total,
            failures: Vec::new(),
        }
    }

    /// Number of embedded records.
    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    /// Number of input records the run was given.
    pub fn total(&self) -> usize {
        self.total
    }

    /// True when every record of the input was embedded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.embeddings.len() == self.total
    }

    pub fn get(&self, index: &K) -> Option<&Vec<f32>> {
        self.embeddings.get(index)
    }

    pub fn contains(&self, index: &K) -> bool {
        self.embeddings.contains_key(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Vec<f32>)> {
        self.embeddings.iter()
    }

    pub fn failures(&self) -> &[BatchFailure] {
        &self.failures
    }

    pub fn into_map(self) -> HashMap<K, Vec<f32>> {
        self.embeddings
    }
}

/// Number of batches `total` records split into.
pub fn batch_count(total: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    total.div_ceil(batch_size)
}

/// Embed `records` in paced batches using [`TokioPacer`].
pub async fn generate<E, K, S>(
    embedder: &E,
    records: &[(K, S)],
    opts: &BatchOptions,
) -> Result<EmbeddingResultMap<K>, EmbedError>
where
    E: Embedder + ?Sized,
    K: Eq + Hash + Clone,
    S: AsRef<str>,
{
    generate_with_pacer(embedder, records, opts, &TokioPacer).await
}

/// Embed `records` in paced batches, pausing through `pacer`.
///
/// Invalid `opts`, including a batch size above the embedder's
/// [`Embedder::max_batch_size`], return `Err` before any request is made.
/// A configuration error reported by the embedder also ends the run with
/// `Err`. Other batch failures end up in [`EmbeddingResultMap::failures`].
pub async fn generate_with_pacer<E, K, S, P>(
    embedder: &E,
    records: &[(K, S)],
    opts: &BatchOptions,
    pacer: &P,
) -> Result<EmbeddingResultMap<K>, EmbedError>
where
    E: Embedder + ?Sized,
    K: Eq + Hash + Clone,
    S: AsRef<str>,
    P: Pacer + ?Sized,
{
    opts.validate()?;
    if let Some(max) = embedder.max_batch_size() {
        if opts.batch_size > max {
            return Err(EmbedError::InvalidConfig(format!(
                "batch_size {} exceeds the embedder limit of {max}",
                opts.batch_size
            )));
        }
    }

    let total = records.len();
    let batches = batch_count(total, opts.batch_size);
    let mut result = EmbeddingResultMap::with_capacity(total);

    for (n, chunk) in records.chunks(opts.batch_size).enumerate() {
        let start = n * opts.batch_size;
        let items = start..start + chunk.len();
        info!(
            "processing batch {}/{}: items {} to {}",
            n + 1,
            batches,
            items.start,
            items.end - 1
        );

        let texts: Vec<&str> = chunk.iter().map(|(_, text)| text.as_ref()).collect();
        let outcome = embedder
            .create(EmbeddingRequest {
                texts: &texts,
                model: &opts.model,
                dimensions: opts.dimensions,
            })
            .await
            .and_then(|vecs| check_batch(vecs, chunk.len(), opts.dimensions));

        match outcome {
            Ok(vecs) => {
                for ((index, _), vec) in chunk.iter().zip(vecs) {
                    match result.embeddings.entry(index.clone()) {
                        Entry::Vacant(slot) => {
                            slot.insert(vec);
                        }
                        Entry::Occupied(_) => {
                            warn!(batch = n + 1, "duplicate record index, keeping first embedding");
                        }
                    }
                }
            }
            Err(error) if error.is_config() => return Err(error),
            Err(error) => {
                warn!(
                    batch = n + 1,
                    "error processing batch starting at item {}: {error}", items.start
                );
                result.failures.push(BatchFailure {
                    batch: n + 1,
                    items,
                    error,
                });
            }
        }

        if n + 1 < batches {
            pacer.pause(opts.delay).await;
        }
    }

    info!(
        "completed embedding {} out of {} items",
        result.len(),
        result.total()
    );
    Ok(result)
}

/// Reject a service response that does not line up with the request.
fn check_batch(
    vecs: Vec<Vec<f32>>,
    expected: usize,
    dimensions: usize,
) -> Result<Vec<Vec<f32>>, EmbedError> {
    if vecs.len() != expected {
        return Err(EmbedError::CountMismatch {
            expected,
            got: vecs.len(),
        });
    }
    if let Some((position, v)) = vecs.iter().enumerate().find(|(_, v)| v.len() != dimensions) {
        return Err(EmbedError::DimensionMismatch {
            position,
            expected: dimensions,
            got: v.len(),
        });
    }
    Ok(vecs)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;

    /// Returns `[text as f32; dimensions]` per text and fails the calls
    /// whose 1-based number is listed in `fail_calls`.
    struct FakeEmbedder {
        calls: Mutex<Vec<usize>>,
        fail_calls: Vec<usize>,
        config_fail_calls: Vec<usize>,
        drop_last: bool,
        max_batch: Option<usize>,
    }

    impl FakeEmbedder {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_calls: Vec::new(),
                config_fail_calls: Vec::new(),
                drop_last: false,
                max_batch: None,
            }
        }

        fn failing(calls: &[usize]) -> Self {
            Self {
                fail_calls: calls.to_vec(),
                ..Self::new()
            }
        }

        fn call_sizes(&self) -> Vec<usize> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Embedder for FakeEmbedder {
        async fn create(&self, req: EmbeddingRequest<'_>) -> Result<Vec<Vec<f32>>, EmbedError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(req.texts.len());
                calls.len()
            };
            if self.fail_calls.contains(&call) {
                return Err(EmbedError::Api("HTTP 429 Too Many Requests".into()));
            }
            if self.config_fail_calls.contains(&call) {
                return Err(EmbedError::InvalidConfig("deployment not configured".into()));
            }
            let mut out: Vec<Vec<f32>> = req
                .texts
                .iter()
                .map(|t| vec![t.parse::<f32>().unwrap(); req.dimensions])
                .collect();
            if self.drop_last {
                out.pop();
            }
            Ok(out)
        }

        fn model(&self) -> &str {
            "fake"
        }

        fn dimension(&self) -> usize {
            4
        }

        fn max_batch_size(&self) -> Option<usize> {
            self.max_batch
        }
    }

    #[derive(Default)]
    struct CountingPacer {
        pauses: Mutex<Vec<Duration>>,
    }

    impl CountingPacer {
        fn count(&self) -> usize {
            self.pauses.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl Pacer for CountingPacer {
        async fn pause(&self, delay: Duration) {
            self.pauses.lock().unwrap().push(delay);
        }
    }

    fn records(n: usize) -> Vec<(usize, String)> {
        (0..n).map(|i| (i, i.to_string())).collect()
    }

    fn opts(batch_size: usize) -> BatchOptions {
        BatchOptions::default()
            .with_batch_size(batch_size)
            .with_dimensions(4)
    }

    #[tokio::test]
    async fn splits_1250_items_into_three_batches() {
        let embedder = FakeEmbedder::new();
        let pacer = CountingPacer::default();

        let out = generate_with_pacer(&embedder, &records(1250), &opts(500), &pacer)
            .await
            .unwrap();

        assert_eq!(embedder.call_sizes(), vec![500, 500, 250]);
        assert_eq!(pacer.count(), 2);
        assert_eq!(out.len(), 1250);
        assert!(out.is_complete());
    }

    #[tokio::test]
    async fn exact_multiple_keeps_full_last_batch() {
        let embedder = FakeEmbedder::new();
        let pacer = CountingPacer::default();

        generate_with_pacer(&embedder, &records(1000), &opts(500), &pacer)
            .await
            .unwrap();

        assert_eq!(embedder.call_sizes(), vec![500, 500]);
        assert_eq!(pacer.count(), 1);
    }

    #[tokio::test]
    async fn pauses_use_configured_delay() {
        let embedder = FakeEmbedder::new();
        let pacer = CountingPacer::default();
        let opts = opts(2).with_delay(Duration::from_millis(250));

        generate_with_pacer(&embedder, &records(5), &opts, &pacer)
            .await
            .unwrap();

        let pauses = pacer.pauses.lock().unwrap().clone();
        assert_eq!(pauses, vec![Duration::from_millis(250); 2]);
    }

    #[tokio::test]
    async fn single_batch_never_pauses() {
        let embedder = FakeEmbedder::new();
        let pacer = CountingPacer::default();

        generate_with_pacer(&embedder, &records(3), &opts(500), &pacer)
            .await
            .unwrap();

        assert_eq!(embedder.call_sizes(), vec![3]);
        assert_eq!(pacer.count(), 0);
    }

    #[tokio::test]
    async fn result_keys_equal_input_indices() {
        let embedder = FakeEmbedder::new();
        let pacer = CountingPacer::default();
        let input: Vec<(u64, String)> = [40u64, 7, 1003, 12, 5]
            .iter()
            .map(|&i| (i, i.to_string()))
            .collect();

        let out = generate_with_pacer(&embedder, &input, &opts(2), &pacer)
            .await
            .unwrap();

        let keys: HashSet<u64> = out.iter().map(|(k, _)| *k).collect();
        let expected: HashSet<u64> = input.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, expected);
        for (k, v) in out.iter() {
            assert_eq!(v, &vec![*k as f32; 4]);
        }
    }

    #[tokio::test]
    async fn failed_batch_is_skipped_and_run_continues() {
        let embedder = FakeEmbedder::failing(&[2]);
        let pacer = CountingPacer::default();

        let out = generate_with_pacer(&embedder, &records(1250), &opts(500), &pacer)
            .await
            .unwrap();

        assert_eq!(embedder.call_sizes(), vec![500, 500, 250]);
        assert_eq!(pacer.count(), 2);
        assert_eq!(out.len(), 750);
        assert!(!out.is_complete());
        for i in 0..1250 {
            assert_eq!(out.contains(&i), !(500..1000).contains(&i), "index {i}");
        }

        let failures = out.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].batch, 2);
        assert_eq!(failures[0].items, 500..1000);
        assert!(matches!(failures[0].error, EmbedError::Api(_)));
    }

    #[tokio::test]
    async fn every_batch_failing_returns_empty_map() {
        let embedder = FakeEmbedder::failing(&[1, 2, 3]);
        let pacer = CountingPacer::default();

        let out = generate_with_pacer(&embedder, &records(5), &opts(2), &pacer)
            .await
            .unwrap();

        assert!(out.is_empty());
        assert_eq!(out.total(), 5);
        assert_eq!(out.failures().len(), 3);
        assert_eq!(pacer.count(), 2);
    }

    #[tokio::test]
    async fn short_response_fails_that_batch() {
        let embedder = FakeEmbedder {
            drop_last: true,
            ..FakeEmbedder::new()
        };
        let pacer = CountingPacer::default();

        let out = generate_with_pacer(&embedder, &records(4), &opts(2), &pacer)
            .await
            .unwrap();

        assert!(out.is_empty());
        assert!(matches!(
            out.failures()[0].error,
            EmbedError::CountMismatch {
                expected: 2,
                got: 1
            }
        ));
    }

    #[tokio::test]
    async fn zero_batch_size_fails_before_any_call() {
        let embedder = FakeEmbedder::new();
        let pacer = CountingPacer::default();

        let err = generate_with_pacer(&embedder, &records(10), &opts(0), &pacer)
            .await
            .unwrap_err();

        assert!(err.is_config());
        assert!(embedder.call_sizes().is_empty());
        assert_eq!(pacer.count(), 0);
    }

    #[tokio::test]
    async fn batch_size_above_embedder_limit_fails_before_any_call() {
        let embedder = FakeEmbedder {
            max_batch: Some(2048),
            ..FakeEmbedder::new()
        };
        let pacer = CountingPacer::default();

        let err = generate_with_pacer(&embedder, &records(6000), &opts(3000), &pacer)
            .await
            .unwrap_err();

        assert!(err.is_config());
        assert!(embedder.call_sizes().is_empty());
        assert_eq!(pacer.count(), 0);
    }

    #[tokio::test]
    async fn openai_limit_applies_to_batch_size() {
        let embedder = crate::OpenAI::new("sk-test").unwrap();
        let pacer = CountingPacer::default();

        let err = generate_with_pacer(&embedder, &records(6000), &opts(3000), &pacer)
            .await
            .unwrap_err();

        assert!(matches!(err, EmbedError::InvalidConfig(_)));
        assert_eq!(pacer.count(), 0);
    }

    #[tokio::test]
    async fn config_error_from_embedder_ends_the_run() {
        let embedder = FakeEmbedder {
            config_fail_calls: vec![2],
            ..FakeEmbedder::new()
        };
        let pacer = CountingPacer::default();

        let err = generate_with_pacer(&embedder, &records(30), &opts(10), &pacer)
            .await
            .unwrap_err();

        assert!(err.is_config());
        assert_eq!(embedder.call_sizes(), vec![10, 10]);
        assert_eq!(pacer.count(), 1);
    }

    #[tokio::test]
    async fn empty_model_is_rejected() {
        let embedder = FakeEmbedder::new();
        let err = generate(&embedder, &records(1), &opts(1).with_model(""))
            .await
            .unwrap_err();
        assert!(matches!(err, EmbedError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn empty_input_makes_no_calls() {
        let embedder = FakeEmbedder::new();
        let pacer = CountingPacer::default();

        let out = generate_with_pacer(&embedder, &records(0), &opts(500), &pacer)
            .await
            .unwrap();

        assert!(out.is_empty());
        assert!(out.is_complete());
        assert!(embedder.call_sizes().is_empty());
        assert_eq!(pacer.count(), 0);
    }

    #[tokio::test]
    async fn duplicate_index_keeps_first_embedding() {
        let embedder = FakeEmbedder::new();
        let pacer = CountingPacer::default();
        let input = vec![("a", "1"), ("b", "2"), ("a", "3")];

        let out = generate_with_pacer(&embedder, &input, &opts(2), &pacer)
            .await
            .unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out.get(&"a"), Some(&vec![1.0; 4]));
    }

    #[test]
    fn batch_count_rounds_up() {
        assert_eq!(batch_count(1250, 500), 3);
        assert_eq!(batch_count(1000, 500), 2);
        assert_eq!(batch_count(1, 500), 1);
        assert_eq!(batch_count(0, 500), 0);
        assert_eq!(batch_count(10, 0), 0);
    }
}
