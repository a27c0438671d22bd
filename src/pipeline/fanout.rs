use crate::{
    error::{GenerationError, Result},
    models::{GeneratedImage, GenerationOutcome},
};
use futures::{
    future::BoxFuture,
    stream::{FuturesUnordered, StreamExt},
    FutureExt,
};
use std::future::Future;

/// Number of variants requested per generation.
pub const FAN_OUT: usize = 4;

/// Runs a fixed number of independent calls as spawned tasks and reassembles
/// their outcomes by issue index, whatever order they finish in.
#[derive(Debug, Clone, Copy)]
pub struct FanOutExecutor {
    count: usize,
}

impl Default for FanOutExecutor {
    fn default() -> Self {
        Self::new(FAN_OUT)
    }
}

impl FanOutExecutor {
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    fn spawn_all<F, Fut>(
        &self,
        make_call: F,
    ) -> FuturesUnordered<BoxFuture<'static, (usize, GenerationOutcome)>>
    where
        F: Fn(usize) -> Fut,
        Fut: Future<Output = GenerationOutcome> + Send + 'static,
    {
        (0..self.count)
            .map(|index| {
                let handle = tokio::spawn(make_call(index));
                async move {
                    let outcome = match handle.await {
                        Ok(outcome) => outcome,
                        Err(e) => Err(GenerationError::Internal(format!(
                            "generation task {} did not complete: {}",
                            index, e
                        ))),
                    };
                    (index, outcome)
                }
                .boxed()
            })
            .collect()
    }

    /// Awaits every call. The returned vector has exactly `count` entries and
    /// entry `i` is the outcome of the call issued `i`-th.
    pub async fn execute<F, Fut>(&self, make_call: F) -> Vec<GenerationOutcome>
    where
        F: Fn(usize) -> Fut,
        Fut: Future<Output = GenerationOutcome> + Send + 'static,
    {
        let mut pending = self.spawn_all(make_call);
        let mut slots: Vec<Option<GenerationOutcome>> = (0..self.count).map(|_| None).collect();

        while let Some((index, outcome)) = pending.next().await {
            log::debug!(
                "Call {}/{} finished ({})",
                index + 1,
                self.count,
                if outcome.is_ok() { "ok" } else { "failed" }
            );
            slots[index] = Some(outcome);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    Err(GenerationError::Internal(format!(
                        "no outcome recorded for call {}",
                        index
                    )))
                })
            })
            .collect()
    }

    /// Returns every image in issue order, or the first failure to arrive.
    /// Calls still in flight at that point keep running; their results are dropped.
    pub async fn execute_fail_fast<F, Fut>(&self, make_call: F) -> Result<Vec<GeneratedImage>>
    where
        F: Fn(usize) -> Fut,
        Fut: Future<Output = GenerationOutcome> + Send + 'static,
    {
        let mut pending = self.spawn_all(make_call);
        let mut slots: Vec<Option<GeneratedImage>> = (0..self.count).map(|_| None).collect();
        let mut completed = 0;

        while let Some((index, outcome)) = pending.next().await {
            completed += 1;
            match outcome {
                Ok(image) => slots[index] = Some(image),
                Err(source) => {
                    log::warn!(
                        "Call {}/{} failed, discarding {} call(s) still in flight: {}",
                        index + 1,
                        self.count,
                        self.count - completed,
                        source
                    );
                    return Err(GenerationError::FanOut {
                        index,
                        total: self.count,
                        source: Box::new(source),
                    });
                }
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    GenerationError::Internal(format!("no image recorded for call {}", index))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use std::time::Duration;

    fn image(tag: usize) -> GeneratedImage {
        GeneratedImage {
            mime_type: "image/png".into(),
            data: tag.to_string(),
        }
    }

    #[tokio::test]
    async fn test_outcomes_follow_issue_order() {
        let executor = FanOutExecutor::default();

        // Later calls finish first.
        let outcomes = executor
            .execute(|index| async move {
                tokio::time::sleep(Duration::from_millis(((FAN_OUT - index) * 20) as u64)).await;
                Ok(image(index))
            })
            .await;

        assert_eq!(outcomes.len(), FAN_OUT);
        for (index, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.as_ref().unwrap().data, index.to_string());
        }
    }

    #[tokio::test]
    async fn test_failures_are_recorded_not_dropped() {
        let outcomes = FanOutExecutor::new(4)
            .execute(|index| async move {
                if index == 1 {
                    Err(GenerationError::Transport("connection reset".into()))
                } else {
                    Ok(image(index))
                }
            })
            .await;

        assert_eq!(outcomes.len(), 4);
        assert!(matches!(outcomes[1], Err(GenerationError::Transport(_))));
        assert!(outcomes[0].is_ok() && outcomes[2].is_ok() && outcomes[3].is_ok());
    }

    #[tokio::test]
    async fn test_panicking_call_becomes_internal_error() {
        let outcomes = FanOutExecutor::new(2)
            .execute(|index| async move {
                if index == 0 {
                    panic!("provider client exploded");
                }
                Ok(image(index))
            })
            .await;

        assert!(matches!(outcomes[0], Err(GenerationError::Internal(_))));
        assert!(outcomes[1].is_ok());
    }

    #[tokio::test]
    async fn test_fail_fast_success_keeps_order() {
        let images = FanOutExecutor::default()
            .execute_fail_fast(|index| async move {
                tokio::time::sleep(Duration::from_millis(((FAN_OUT - index) * 10) as u64)).await;
                Ok(image(index))
            })
            .await
            .unwrap();

        let tags: Vec<String> = images.into_iter().map(|image| image.data).collect();
        assert_eq!(tags, vec!["0", "1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_fail_fast_leaves_in_flight_calls_running() {
        let finished = Arc::new(AtomicUsize::new(0));

        let result = {
            let finished = finished.clone();
            FanOutExecutor::default()
                .execute_fail_fast(move |index| {
                    let finished = finished.clone();
                    async move {
                        if index == 2 {
                            return Err(GenerationError::NoImageReturned {
                                text: None,
                                finish_reason: None,
                            });
                        }
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        finished.fetch_add(1, Ordering::SeqCst);
                        Ok(image(index))
                    }
                })
                .await
        };

        match result {
            Err(GenerationError::FanOut { index, total, .. }) => {
                assert_eq!(index, 2);
                assert_eq!(total, FAN_OUT);
            }
            other => panic!("unexpected result: {:?}", other),
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 3);
    }
}
