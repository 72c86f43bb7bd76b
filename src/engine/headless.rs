use super::Animator;
use crate::easing::Easing;
use futures::future::{BoxFuture, FutureExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// One call made to a [`HeadlessAnimator`].
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionRecord {
    Animate {
        target: f64,
        duration: Duration,
        easing: Easing,
        issued_at: Instant,
    },
    Assign {
        value: f64,
    },
}

#[derive(Debug, Default)]
struct Log {
    offset: f64,
    records: VecDeque<TransitionRecord>,
    /// Oldest records are dropped past this many. `None` keeps everything.
    limit: Option<usize>,
}

impl Log {
    fn push(&mut self, record: TransitionRecord) {
        if self.limit == Some(0) {
            return;
        }
        self.records.push_back(record);
        if let Some(limit) = self.limit {
            while self.records.len() > limit {
                self.records.pop_front();
            }
        }
    }
}

/// Animator without frames: each transition is a single timer that jumps to
/// the target on completion.
///
/// Calls are recorded for the controller tests to assert against. The
/// text/JSON modes use [`HeadlessAnimator::with_history`] to bound that log.
#[derive(Debug, Clone, Default)]
pub struct HeadlessAnimator {
    log: Arc<Mutex<Log>>,
}

impl HeadlessAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the most recent `limit` records, for long-running hosts.
    pub fn with_history(limit: usize) -> Self {
        Self {
            log: Arc::new(Mutex::new(Log {
                limit: Some(limit),
                ..Log::default()
            })),
        }
    }

    pub fn offset(&self) -> f64 {
        self.lock().offset
    }

    pub fn records(&self) -> Vec<TransitionRecord> {
        self.lock().records.iter().cloned().collect()
    }

    /// Animated transitions only, in issue order.
    pub fn animations(&self) -> Vec<(f64, Duration, Easing)> {
        self.lock()
            .records
            .iter()
            .filter_map(|r| match r {
                TransitionRecord::Animate {
                    target,
                    duration,
                    easing,
                    ..
                } => Some((*target, *duration, *easing)),
                TransitionRecord::Assign { .. } => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Log> {
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Animator for HeadlessAnimator {
    fn animate(&self, target: f64, duration: Duration, easing: Easing) -> BoxFuture<'static, ()> {
        self.lock().push(TransitionRecord::Animate {
            target,
            duration,
            easing,
            issued_at: Instant::now(),
        });
        let log = Arc::clone(&self.log);
        async move {
            tokio::time::sleep(duration).await;
            log.lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .offset = target;
        }
        .boxed()
    }

    fn assign(&self, value: f64) {
        let mut log = self.lock();
        log.offset = value;
        log.push(TransitionRecord::Assign { value });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn bounded_history_keeps_the_latest_records() {
        let animator = HeadlessAnimator::with_history(2);
        animator.assign(0.0);
        for target in [1.0, 2.0, 3.0] {
            animator
                .animate(target, Duration::from_millis(10), Easing::Linear)
                .await;
        }
        let targets: Vec<f64> = animator.animations().iter().map(|a| a.0).collect();
        assert_eq!(targets, [2.0, 3.0]);
        assert_eq!(animator.offset(), 3.0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_history_records_nothing_but_still_moves() {
        let animator = HeadlessAnimator::with_history(0);
        animator
            .animate(-40.0, Duration::from_millis(10), Easing::Linear)
            .await;
        assert!(animator.records().is_empty());
        assert_eq!(animator.offset(), -40.0);
    }
}
