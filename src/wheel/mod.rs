//! Reel controller.
//!
//! Each wheel runs as its own task. The task owns the reel state and at most
//! one in-flight transition; the next transition is only issued once the
//! previous one resolves, and `stop()` is the single path that drops a
//! transition early. Hosts talk to the task through a [`WheelHandle`].

mod geometry;

pub use geometry::{render_strip, ReelGeometry, Step};

use crate::easing::Easing;
use crate::engine::Animator;
use crate::error::WheelError;
use crate::model::{Operation, Status, WheelConfig, WheelEvent, WheelId, WheelSnapshot};
use futures::future::BoxFuture;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
enum WheelCommand {
    Start,
    Stop,
    Faster,
    Slower,
}

/// Cloneable handle to a running wheel.
///
/// Commands are queued to the wheel task and checked against its state there;
/// rejected ones surface as [`WheelEvent::Ignored`]. Dropping every handle ends
/// the task.
#[derive(Debug, Clone)]
pub struct WheelHandle {
    id: WheelId,
    commands: UnboundedSender<WheelCommand>,
    snapshot: watch::Receiver<WheelSnapshot>,
}

impl WheelHandle {
    pub fn id(&self) -> WheelId {
        self.id
    }

    pub fn start(&self) {
        self.send(WheelCommand::Start);
    }

    pub fn stop(&self) {
        self.send(WheelCommand::Stop);
    }

    /// Shorten the duration of transitions issued from now on.
    pub fn faster(&self) {
        self.send(WheelCommand::Faster);
    }

    /// Lengthen the duration of transitions issued from now on.
    pub fn slower(&self) {
        self.send(WheelCommand::Slower);
    }

    pub fn status(&self) -> Status {
        self.snapshot.borrow().status
    }

    pub fn position(&self) -> usize {
        self.snapshot.borrow().position
    }

    pub fn spinning_duration(&self) -> Duration {
        self.snapshot.borrow().spinning_duration
    }

    pub fn items_to_stop_to_go(&self) -> Option<u32> {
        self.snapshot.borrow().items_to_stop_to_go
    }

    pub fn snapshot(&self) -> WheelSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Wait for the next published snapshot. Returns `false` once the wheel
    /// task has ended.
    pub async fn changed(&mut self) -> bool {
        self.snapshot.changed().await.is_ok()
    }

    fn send(&self, cmd: WheelCommand) {
        if self.commands.send(cmd).is_err() {
            debug!(wheel = %self.id, ?cmd, "wheel task has ended; command dropped");
        }
    }
}

/// Which part of the spin cycle a transition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leg {
    Starting,
    Spin,
    /// Remainder of the transition interrupted by `stop()`.
    RollOut,
    Brake,
    Settle,
}

struct Transition {
    motion: BoxFuture<'static, ()>,
    leg: Leg,
    step: Step,
    easing: Easing,
    duration: Duration,
    started: Instant,
}

struct Reel<A> {
    id: WheelId,
    geometry: ReelGeometry,
    config: WheelConfig,
    animator: A,
    status: Status,
    position: usize,
    spinning_duration: Duration,
    items_to_stop_to_go: Option<u32>,
    events: UnboundedSender<WheelEvent>,
    snapshot: watch::Sender<WheelSnapshot>,
}

/// A wheel ready to run. Call [`WheelController::run`] (or [`spawn`]) to
/// announce `ready` and start accepting commands.
pub struct WheelController<A: Animator> {
    reel: Reel<A>,
    commands: UnboundedReceiver<WheelCommand>,
}

impl<A: Animator> WheelController<A> {
    pub fn new(
        id: WheelId,
        geometry: ReelGeometry,
        config: WheelConfig,
        animator: A,
        events: UnboundedSender<WheelEvent>,
    ) -> Result<(Self, WheelHandle), WheelError> {
        config.validate()?;

        let position = geometry.normalize(config.initial_position.unwrap_or(0) as isize);
        animator.assign(geometry.offset_for(position as isize));

        let spinning_duration = config.spinning_duration;
        let (snapshot, snapshot_rx) = watch::channel(WheelSnapshot {
            status: Status::Init,
            position,
            spinning_duration,
            items_to_stop_to_go: None,
        });
        let (cmd_tx, commands) = mpsc::unbounded_channel();

        let reel = Reel {
            id,
            geometry,
            config,
            animator,
            status: Status::Init,
            position,
            spinning_duration,
            items_to_stop_to_go: None,
            events,
            snapshot,
        };
        let handle = WheelHandle {
            id,
            commands: cmd_tx,
            snapshot: snapshot_rx,
        };
        Ok((Self { reel, commands }, handle))
    }

    /// Drive the wheel until every handle is dropped.
    pub async fn run(self) {
        let WheelController {
            mut reel,
            mut commands,
        } = self;
        reel.enter(Status::Ready);

        let mut in_flight: Option<Transition> = None;
        loop {
            tokio::select! {
                cmd = commands.recv() => {
                    match cmd {
                        Some(cmd) => reel.handle(cmd, &mut in_flight),
                        None => break,
                    }
                }
                // Only the winning branch may take the transition; the motion
                // future must survive a command arriving first.
                _ = async {
                    match in_flight.as_mut() {
                        Some(t) => (&mut t.motion).await,
                        None => futures::future::pending().await,
                    }
                } => {
                    if let Some(done) = in_flight.take() {
                        in_flight = reel.complete(done);
                    }
                }
            }
        }
        debug!(wheel = %reel.id, "all handles dropped; wheel task ending");
    }
}

/// Build a wheel and run it on the current tokio runtime.
pub fn spawn<A: Animator>(
    id: WheelId,
    geometry: ReelGeometry,
    config: WheelConfig,
    animator: A,
    events: UnboundedSender<WheelEvent>,
) -> Result<(WheelHandle, tokio::task::JoinHandle<()>), WheelError> {
    let (controller, handle) = WheelController::new(id, geometry, config, animator, events)?;
    let join = tokio::spawn(controller.run());
    Ok((handle, join))
}

impl<A: Animator> Reel<A> {
    fn handle(&mut self, cmd: WheelCommand, in_flight: &mut Option<Transition>) {
        match cmd {
            WheelCommand::Start => self.start(in_flight),
            WheelCommand::Stop => self.stop(in_flight),
            WheelCommand::Faster => {
                self.faster();
                self.publish();
            }
            WheelCommand::Slower => {
                self.slower();
                self.publish();
            }
        }
    }

    fn start(&mut self, in_flight: &mut Option<Transition>) {
        if !matches!(self.status, Status::Ready | Status::Stopped) {
            self.reject(WheelError::InvalidOperation {
                op: Operation::Start,
                status: self.status,
            });
            return;
        }

        if self.config.reset_duration_on_start {
            self.spinning_duration = self.config.spinning_duration;
        }
        self.items_to_stop_to_go = None;
        self.enter(Status::Starting);
        *in_flight = Some(self.issue(
            Leg::Starting,
            self.spinning_duration,
            self.config.spinning_easing,
        ));
    }

    fn stop(&mut self, in_flight: &mut Option<Transition>) {
        if self.status != Status::Spinning {
            self.reject(WheelError::InvalidOperation {
                op: Operation::Stop,
                status: self.status,
            });
            return;
        }

        let roll_out = match in_flight.take() {
            Some(t) if t.leg == Leg::RollOut => {
                *in_flight = Some(t);
                self.reject(WheelError::AlreadyStopping);
                return;
            }
            Some(interrupted) => {
                let remaining = interrupted
                    .duration
                    .saturating_sub(interrupted.started.elapsed());
                // Dropping the motion halts the strip where it is; the roll-out
                // carries it on to the same target.
                drop(interrupted.motion);
                let (step, easing) = (interrupted.step, interrupted.easing);
                debug!(
                    wheel = %self.id,
                    remaining_ms = remaining.as_millis() as u64,
                    "interrupting transition for stop"
                );
                self.issue_step(Leg::RollOut, step, remaining, easing)
            }
            None => self.issue(
                Leg::RollOut,
                self.spinning_duration,
                self.config.spinning_easing,
            ),
        };
        *in_flight = Some(roll_out);
    }

    fn faster(&mut self) {
        self.spinning_duration =
            scale(self.spinning_duration, 1.0 / self.config.spinning_acceleration);
    }

    fn slower(&mut self) {
        self.spinning_duration = scale(self.spinning_duration, self.config.spinning_brake);
    }

    /// Land a finished transition and decide what comes next.
    fn complete(&mut self, done: Transition) -> Option<Transition> {
        self.position = done.step.position;
        if done.step.wrapped() {
            self.animator
                .assign(self.geometry.offset_for(self.position as isize));
        }
        self.emit(WheelEvent::Advanced {
            wheel: self.id,
            position: self.position,
            duration: done.duration,
        });

        let next = match done.leg {
            Leg::Starting | Leg::Spin => Some(self.spin()),
            Leg::RollOut => {
                self.items_to_stop_to_go = Some(self.config.items_to_stop);
                Some(self.decelerate())
            }
            Leg::Brake => {
                self.items_to_stop_to_go = self.items_to_stop_to_go.map(|n| n.saturating_sub(1));
                Some(self.decelerate())
            }
            Leg::Settle => {
                self.items_to_stop_to_go = self.items_to_stop_to_go.map(|n| n.saturating_sub(1));
                self.enter(Status::Stopped);
                None
            }
        };
        self.publish();
        next
    }

    fn spin(&mut self) -> Transition {
        if self.status != Status::Spinning {
            self.enter(Status::Spinning);
        }
        self.issue(Leg::Spin, self.spinning_duration, self.config.spinning_easing)
    }

    fn decelerate(&mut self) -> Transition {
        if self.status != Status::Stopping {
            self.enter(Status::Stopping);
        }
        self.slower();
        if self.items_to_stop_to_go.unwrap_or(1) > 1 {
            self.issue(Leg::Brake, self.spinning_duration, self.config.spinning_easing)
        } else {
            self.issue(
                Leg::Settle,
                scale(self.spinning_duration, 2.0),
                self.config.settle_easing,
            )
        }
    }

    fn issue(&self, leg: Leg, duration: Duration, easing: Easing) -> Transition {
        let step = self.geometry.step(self.position, self.config.direction);
        self.issue_step(leg, step, duration, easing)
    }

    fn issue_step(&self, leg: Leg, step: Step, duration: Duration, easing: Easing) -> Transition {
        let target = self.geometry.offset_for(step.target);
        debug!(
            wheel = %self.id,
            ?leg,
            target,
            duration_ms = duration.as_millis() as u64,
            easing = easing.name(),
            "issuing transition"
        );
        Transition {
            motion: self.animator.animate(target, duration, easing),
            leg,
            step,
            easing,
            duration,
            started: Instant::now(),
        }
    }

    fn enter(&mut self, status: Status) {
        self.status = status;
        info!(wheel = %self.id, %status, position = self.position, "wheel state");
        let event = match status {
            Status::Init => None,
            Status::Ready => Some(WheelEvent::Ready {
                wheel: self.id,
                position: self.position,
            }),
            Status::Starting => Some(WheelEvent::Starting { wheel: self.id }),
            Status::Spinning => Some(WheelEvent::Spinning { wheel: self.id }),
            Status::Stopping => Some(WheelEvent::Stopping { wheel: self.id }),
            Status::Stopped => Some(WheelEvent::Stopped {
                wheel: self.id,
                position: self.position,
            }),
        };
        self.publish();
        if let Some(event) = event {
            self.emit(event);
        }
    }

    fn reject(&self, error: WheelError) {
        warn!(wheel = %self.id, status = %self.status, "{error}; ignoring");
        self.emit(WheelEvent::Ignored {
            wheel: self.id,
            error,
        });
    }

    fn publish(&self) {
        self.snapshot.send_replace(WheelSnapshot {
            status: self.status,
            position: self.position,
            spinning_duration: self.spinning_duration,
            items_to_stop_to_go: self.items_to_stop_to_go,
        });
    }

    fn emit(&self, event: WheelEvent) {
        // Hosts may stop listening; the wheel keeps its own state regardless.
        let _ = self.events.send(event);
    }
}

fn scale(duration: Duration, factor: f64) -> Duration {
    Duration::try_from_secs_f64(duration.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}
