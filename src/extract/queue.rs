//! Bounded-concurrency extraction queue.
//!
//! Orchestrates calls to an external slip extractor: at most
//! `max_concurrent` requests in flight (tokio `Semaphore`), paced by a
//! `governor` rate limiter, with exponential backoff on retryable errors
//! (`base_delay * 2^attempt`) and cooperative cancellation via a
//! `CancellationToken`. Each submission moves through
//! `Queued -> Processing -> Retrying -> Completed | Failed | Cancelled`;
//! cancellation never disturbs items that already completed or failed.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use governor::{Quota, RateLimiter};
use tokio::sync::{RwLock, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::errors::ExtractError;
use crate::models::Leg;

type DirectLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A raw slip awaiting extraction.
#[derive(Debug, Clone)]
pub struct SlipRequest {
    pub id: Uuid,
    pub raw_text: String,
}

impl SlipRequest {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            raw_text: raw_text.into(),
        }
    }
}

/// Lifecycle of a submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Queued,
    Processing,
    Retrying,
    Completed,
    Failed,
    Cancelled,
}

/// Queue tuning knobs.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub max_concurrent: usize,
    pub max_retries: u32,
    pub base_delay: Duration,
    pub rate_per_second: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            rate_per_second: 5,
        }
    }
}

/// The external extraction collaborator. Implementations call whatever
/// service turns raw slip text into structured legs.
pub trait SlipExtractor: Send + Sync {
    fn extract(&self, request: &SlipRequest) -> BoxFuture<'_, Result<Vec<Leg>, ExtractError>>;
}

/// Dispatches slip requests to an extractor under concurrency, rate, and
/// retry discipline.
pub struct ExtractionQueue {
    extractor: Arc<dyn SlipExtractor>,
    config: QueueConfig,
    semaphore: Arc<Semaphore>,
    limiter: Arc<DirectLimiter>,
    states: Arc<RwLock<HashMap<Uuid, TaskState>>>,
    cancel: CancellationToken,
}

impl ExtractionQueue {
    pub fn new(extractor: Arc<dyn SlipExtractor>, config: QueueConfig) -> Self {
        let rate = NonZeroU32::new(config.rate_per_second)
            .unwrap_or(NonZeroU32::new(5).unwrap_or(NonZeroU32::MIN));
        Self {
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(rate))),
            states: Arc::new(RwLock::new(HashMap::new())),
            cancel: CancellationToken::new(),
            extractor,
            config,
        }
    }

    /// Submit a request. Returns a handle resolving to the extracted legs
    /// or the terminal error; state is tracked independently and can be
    /// polled via [`ExtractionQueue::state`].
    pub fn submit(&self, request: SlipRequest) -> JoinHandle<Result<Vec<Leg>, ExtractError>> {
        let extractor = self.extractor.clone();
        let semaphore = self.semaphore.clone();
        let limiter = self.limiter.clone();
        let states = self.states.clone();
        let cancel = self.cancel.clone();
        let config = self.config.clone();

        tokio::spawn(async move {
            set_state(&states, request.id, TaskState::Queued).await;

            let _permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    set_state(&states, request.id, TaskState::Cancelled).await;
                    return Err(ExtractError::Cancelled);
                }
                permit = semaphore.acquire_owned() => match permit {
                    Ok(p) => p,
                    Err(_) => {
                        set_state(&states, request.id, TaskState::Cancelled).await;
                        return Err(ExtractError::Cancelled);
                    }
                },
            };

            let max_attempts = config.max_retries.max(1);
            let mut last_error = String::new();

            for attempt in 0..max_attempts {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        set_state(&states, request.id, TaskState::Cancelled).await;
                        return Err(ExtractError::Cancelled);
                    }
                    _ = limiter.until_ready() => {}
                }

                set_state(&states, request.id, TaskState::Processing).await;
                debug!(id = %request.id, attempt = attempt + 1, "Extraction attempt");

                let outcome = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        set_state(&states, request.id, TaskState::Cancelled).await;
                        return Err(ExtractError::Cancelled);
                    }
                    res = extractor.extract(&request) => res,
                };

                match outcome {
                    Ok(legs) => {
                        set_state(&states, request.id, TaskState::Completed).await;
                        info!(id = %request.id, legs = legs.len(), "Extraction completed");
                        return Ok(legs);
                    }
                    Err(e) if e.is_retryable() && attempt + 1 < max_attempts => {
                        last_error = e.to_string();
                        set_state(&states, request.id, TaskState::Retrying).await;
                        let delay = config.base_delay * 2u32.saturating_pow(attempt);
                        warn!(
                            id = %request.id,
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Retryable extraction error, backing off"
                        );
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => {
                                set_state(&states, request.id, TaskState::Cancelled).await;
                                return Err(ExtractError::Cancelled);
                            }
                            _ = tokio::time::sleep(delay) => {}
                        }
                    }
                    Err(e) if e.is_retryable() => {
                        set_state(&states, request.id, TaskState::Failed).await;
                        warn!(id = %request.id, error = %e, "Extraction retries exhausted");
                        return Err(ExtractError::MaxRetriesExceeded {
                            attempts: max_attempts,
                            last_error: e.to_string(),
                        });
                    }
                    Err(e) => {
                        set_state(&states, request.id, TaskState::Failed).await;
                        warn!(id = %request.id, error = %e, "Extraction failed");
                        return Err(e);
                    }
                }
            }

            set_state(&states, request.id, TaskState::Failed).await;
            Err(ExtractError::MaxRetriesExceeded {
                attempts: max_attempts,
                last_error,
            })
        })
    }

    /// Cancel every queued and in-flight request. Completed and failed
    /// items keep their terminal state.
    pub async fn cancel_all(&self) {
        self.cancel.cancel();
        let mut states = self.states.write().await;
        for state in states.values_mut() {
            if matches!(
                state,
                TaskState::Queued | TaskState::Processing | TaskState::Retrying
            ) {
                *state = TaskState::Cancelled;
            }
        }
        info!("Extraction queue cancelled");
    }

    pub async fn state(&self, id: Uuid) -> Option<TaskState> {
        self.states.read().await.get(&id).copied()
    }
}

async fn set_state(states: &RwLock<HashMap<Uuid, TaskState>>, id: Uuid, state: TaskState) {
    states.write().await.insert(id, state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parlay::simulator::create_leg;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Returns the scripted results in order, then repeats the last one.
    struct ScriptedExtractor {
        script: Mutex<VecDeque<Result<Vec<Leg>, ExtractError>>>,
        calls: AtomicU32,
    }

    impl ScriptedExtractor {
        fn new(script: Vec<Result<Vec<Leg>, ExtractError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SlipExtractor for ScriptedExtractor {
        fn extract(
            &self,
            _request: &SlipRequest,
        ) -> BoxFuture<'_, Result<Vec<Leg>, ExtractError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .script
                .lock()
                .ok()
                .and_then(|mut s| s.pop_front())
                .unwrap_or(Err(ExtractError::Cancelled));
            Box::pin(async move { next })
        }
    }

    /// Never resolves; only cancellation can finish the task.
    struct HangingExtractor;

    impl SlipExtractor for HangingExtractor {
        fn extract(
            &self,
            _request: &SlipRequest,
        ) -> BoxFuture<'_, Result<Vec<Leg>, ExtractError>> {
            Box::pin(futures::future::pending())
        }
    }

    fn test_config() -> QueueConfig {
        QueueConfig {
            max_concurrent: 2,
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            // High enough that the limiter never blocks a test.
            rate_per_second: 100,
        }
    }

    fn legs() -> Vec<Leg> {
        vec![create_leg("LeBron over 25.5 pts", -110)]
    }

    #[tokio::test]
    async fn test_success_first_attempt() {
        let extractor = Arc::new(ScriptedExtractor::new(vec![Ok(legs())]));
        let queue = ExtractionQueue::new(extractor.clone(), test_config());
        let req = SlipRequest::new("2-leg NBA slip");
        let id = req.id;

        let result = queue.submit(req).await.unwrap().unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(extractor.calls(), 1);
        assert_eq!(queue.state(id).await, Some(TaskState::Completed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retryable_error_backs_off_then_succeeds() {
        let extractor = Arc::new(ScriptedExtractor::new(vec![
            Err(ExtractError::RateLimited { retry_after: 1 }),
            Err(ExtractError::Timeout("deadline".into())),
            Ok(legs()),
        ]));
        let queue = ExtractionQueue::new(extractor.clone(), test_config());
        let req = SlipRequest::new("slip");
        let id = req.id;

        let result = queue.submit(req).await.unwrap();
        assert!(result.is_ok());
        assert_eq!(extractor.calls(), 3);
        assert_eq!(queue.state(id).await, Some(TaskState::Completed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_exhausted_is_failed() {
        let always_timeout = vec![
            Err(ExtractError::Timeout("t1".into())),
            Err(ExtractError::Timeout("t2".into())),
            Err(ExtractError::Timeout("t3".into())),
        ];
        let extractor = Arc::new(ScriptedExtractor::new(always_timeout));
        let queue = ExtractionQueue::new(extractor.clone(), test_config());
        let req = SlipRequest::new("slip");
        let id = req.id;

        let err = queue.submit(req).await.unwrap().unwrap_err();
        match err {
            ExtractError::MaxRetriesExceeded { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("expected MaxRetriesExceeded, got {other}"),
        }
        assert_eq!(extractor.calls(), 3);
        assert_eq!(queue.state(id).await, Some(TaskState::Failed));
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let extractor = Arc::new(ScriptedExtractor::new(vec![Err(ExtractError::Provider {
            code: "UNPARSEABLE".into(),
            message: "no legs found".into(),
        })]));
        let queue = ExtractionQueue::new(extractor.clone(), test_config());
        let req = SlipRequest::new("not a slip");
        let id = req.id;

        let err = queue.submit(req).await.unwrap().unwrap_err();
        assert!(matches!(err, ExtractError::Provider { .. }));
        assert_eq!(extractor.calls(), 1);
        assert_eq!(queue.state(id).await, Some(TaskState::Failed));
    }

    #[tokio::test]
    async fn test_cancellation_marks_in_flight_cancelled() {
        let queue = ExtractionQueue::new(Arc::new(HangingExtractor), test_config());
        let req = SlipRequest::new("slip");
        let id = req.id;
        let handle = queue.submit(req);

        // Let the worker reach the extractor call before cancelling.
        tokio::task::yield_now().await;
        queue.cancel_all().await;

        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, ExtractError::Cancelled));
        assert_eq!(queue.state(id).await, Some(TaskState::Cancelled));
    }

    #[tokio::test]
    async fn test_cancellation_preserves_completed_items() {
        let extractor = Arc::new(ScriptedExtractor::new(vec![Ok(legs())]));
        let queue = ExtractionQueue::new(extractor, test_config());
        let req = SlipRequest::new("slip");
        let id = req.id;

        queue.submit(req).await.unwrap().unwrap();
        queue.cancel_all().await;

        assert_eq!(queue.state(id).await, Some(TaskState::Completed));
    }

    #[tokio::test]
    async fn test_submit_after_cancel_is_cancelled() {
        let queue = ExtractionQueue::new(Arc::new(HangingExtractor), test_config());
        queue.cancel_all().await;

        let req = SlipRequest::new("slip");
        let id = req.id;
        let err = queue.submit(req).await.unwrap().unwrap_err();
        assert!(matches!(err, ExtractError::Cancelled));
        assert_eq!(queue.state(id).await, Some(TaskState::Cancelled));
    }
}
