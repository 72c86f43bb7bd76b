//! Wheel bank controller.
//!
//! Owns the handles of every wheel, turns UI commands into per-wheel
//! operations, and paces a "stop all" so the wheels halt one after another.

use crate::cli::ReelPlan;
use anyhow::{Context, Result};
use rand::Rng;
use slot_wheel::engine::Animator;
use slot_wheel::{wheel, ReelGeometry, Status, WheelEvent, WheelHandle, WheelId};
use std::collections::{HashSet, VecDeque};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::{Duration, Instant};
use tracing::debug;

/// How soon a stop is retried for a wheel that is not spinning yet.
const STOP_RETRY: Duration = Duration::from_millis(10);

/// Commands emitted by UI layers to control the wheels.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    StartAll,
    /// Stop every wheel, left to right, `stop_stagger` apart.
    StopAll,
    /// Start the wheel if it is idle, stop it if it is spinning.
    Toggle(usize),
    Faster,
    Slower,
    Quit,
}

/// Handles and tasks of every wheel in the machine.
pub(crate) struct Bank {
    handles: Vec<WheelHandle>,
    tasks: Vec<tokio::task::JoinHandle<()>>,
}

impl Bank {
    #[cfg(test)]
    pub fn handles(&self) -> &[WheelHandle] {
        &self.handles
    }
}

/// Build and spawn one wheel per animator.
pub(crate) fn spawn_bank<A: Animator>(
    plan: &ReelPlan,
    animators: Vec<A>,
    event_tx: UnboundedSender<WheelEvent>,
) -> Result<Bank> {
    let geometry = ReelGeometry::new(plan.items.len(), plan.item_height)?;
    let mut rng = rand::thread_rng();
    let mut handles = Vec::with_capacity(animators.len());
    let mut tasks = Vec::with_capacity(animators.len());

    for (i, animator) in animators.into_iter().enumerate() {
        let mut cfg = plan.wheel.clone();
        if plan.random_start {
            cfg.initial_position = Some(rng.gen_range(0..plan.items.len()));
        }
        let (handle, task) = wheel::spawn(WheelId(i), geometry, cfg, animator, event_tx.clone())
            .with_context(|| format!("create wheel {i}"))?;
        handles.push(handle);
        tasks.push(task);
    }
    Ok(Bank { handles, tasks })
}

/// Route UI commands to the wheels until `Quit` or the command channel closes.
pub(crate) async fn run_controller(
    plan: &ReelPlan,
    bank: Bank,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let Bank { handles, tasks } = bank;
    let mut stop_queue: VecDeque<usize> = VecDeque::new();
    let mut next_stop: Option<Instant> = None;
    // Wheels sent a start whose snapshot may not show it yet.
    let mut start_pending: HashSet<usize> = HashSet::new();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::StartAll) => {
                        // A fresh spin cancels any stop still queued from the last one.
                        stop_queue.clear();
                        next_stop = None;
                        for (i, h) in handles.iter().enumerate() {
                            if !h.status().is_moving() {
                                h.start();
                                start_pending.insert(i);
                            }
                        }
                    }
                    Some(UiCommand::StopAll) => {
                        stop_queue = (0..handles.len()).collect();
                        next_stop = Some(Instant::now());
                    }
                    Some(UiCommand::Toggle(i)) => {
                        let Some(h) = handles.get(i) else { continue };
                        stop_queue.retain(|&q| q != i);
                        if h.status().is_moving() || start_pending.contains(&i) {
                            stop_queue.push_front(i);
                            next_stop = Some(Instant::now());
                        } else {
                            h.start();
                            start_pending.insert(i);
                        }
                    }
                    Some(UiCommand::Faster) => handles.iter().for_each(WheelHandle::faster),
                    Some(UiCommand::Slower) => handles.iter().for_each(WheelHandle::slower),
                    Some(UiCommand::Quit) | None => break,
                }
            }
            _ = async {
                match next_stop {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => futures::future::pending().await,
                }
            } => {
                let mut retry = false;
                if let Some(i) = stop_queue.pop_front() {
                    let status = handles[i].status();
                    if status.is_moving() {
                        start_pending.remove(&i);
                    }
                    match status {
                        Status::Spinning => handles[i].stop(),
                        // A stop is only accepted once the wheel is spinning.
                        Status::Starting => retry = true,
                        _ if start_pending.contains(&i) => retry = true,
                        _ => debug!(wheel = i, %status, "not spinning; stop skipped"),
                    }
                    if retry {
                        stop_queue.push_front(i);
                    }
                }
                next_stop = match (stop_queue.is_empty(), retry) {
                    (true, _) => None,
                    (false, true) => Some(Instant::now() + STOP_RETRY),
                    (false, false) => Some(Instant::now() + stagger(plan.stop_stagger)),
                };
            }
        }
    }

    // Dropping the last handle of each wheel ends its task.
    drop(handles);
    for task in tasks {
        task.await.context("wheel task panicked")?;
    }
    Ok(())
}

/// Stagger with up to 25% random jitter, so the reels do not halt on a metronome.
fn stagger(base: Duration) -> Duration {
    let jitter = base.as_millis() as u64 / 4;
    if jitter == 0 {
        return base;
    }
    base + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter))
}
