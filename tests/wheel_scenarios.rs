use slot_wheel::engine::HeadlessAnimator;
use slot_wheel::{
    wheel, Easing, ReelGeometry, Status, WheelConfig, WheelEvent, WheelHandle, WheelId,
};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

const STEP: Duration = Duration::from_millis(100);

fn config() -> WheelConfig {
    WheelConfig {
        spinning_duration: STEP,
        spinning_brake: 1.5,
        spinning_acceleration: 1.5,
        items_to_stop: 3,
        ..Default::default()
    }
}

fn spawn_wheel(
    items: usize,
    config: WheelConfig,
) -> (WheelHandle, HeadlessAnimator, UnboundedReceiver<WheelEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let animator = HeadlessAnimator::new();
    let geometry = ReelGeometry::new(items, 20.0).unwrap();
    let (handle, _task) = wheel::spawn(WheelId(7), geometry, config, animator.clone(), tx).unwrap();
    (handle, animator, rx)
}

async fn recv(rx: &mut UnboundedReceiver<WheelEvent>) -> WheelEvent {
    rx.recv().await.expect("wheel task ended")
}

async fn wait_for(rx: &mut UnboundedReceiver<WheelEvent>, status: Status) {
    while recv(rx).await.entered() != Some(status) {}
}

fn approx(a: Duration, b: Duration) -> bool {
    (a.as_secs_f64() - b.as_secs_f64()).abs() < 1e-6
}

#[tokio::test(start_paused = true)]
async fn five_items_cycle_in_order() {
    let (handle, _animator, mut rx) = spawn_wheel(5, config());
    assert!(matches!(
        recv(&mut rx).await,
        WheelEvent::Ready { position: 0, wheel: WheelId(7) }
    ));

    handle.start();
    assert!(matches!(recv(&mut rx).await, WheelEvent::Starting { .. }));
    assert!(matches!(
        recv(&mut rx).await,
        WheelEvent::Advanced { position: 1, .. }
    ));
    assert!(matches!(recv(&mut rx).await, WheelEvent::Spinning { .. }));

    let mut positions = Vec::new();
    while positions.len() < 8 {
        match recv(&mut rx).await {
            WheelEvent::Advanced { position, .. } => positions.push(position),
            other => panic!("unexpected event while spinning: {other:?}"),
        }
    }
    assert_eq!(positions, [2, 3, 4, 0, 1, 2, 3, 4]);
    assert_eq!(handle.status(), Status::Spinning);
}

#[tokio::test(start_paused = true)]
async fn full_cycle_returns_to_start_position() {
    for items in 2..7 {
        let cfg = WheelConfig {
            initial_position: Some(1),
            ..config()
        };
        let (handle, _animator, mut rx) = spawn_wheel(items, cfg);
        handle.start();

        let mut completed = 0;
        let mut last = None;
        while completed < items {
            if let WheelEvent::Advanced { position, .. } = recv(&mut rx).await {
                completed += 1;
                last = Some(position);
            }
        }
        assert_eq!(last, Some(1), "{items} items");
    }
}

#[tokio::test(start_paused = true)]
async fn start_while_spinning_changes_nothing() {
    let (handle, animator, mut rx) = spawn_wheel(5, config());
    handle.start();
    wait_for(&mut rx, Status::Spinning).await;

    let before = handle.snapshot();
    let issued = animator.animations().len();
    handle.start();
    match recv(&mut rx).await {
        WheelEvent::Ignored { .. } => {}
        other => panic!("expected the start to be ignored, got {other:?}"),
    }
    assert_eq!(handle.snapshot(), before);
    assert_eq!(animator.animations().len(), issued);
}

#[tokio::test(start_paused = true)]
async fn stop_at_two_settles_four_items_later() {
    let (handle, animator, mut rx) = spawn_wheel(5, config());
    handle.start();
    wait_for(&mut rx, Status::Spinning).await;
    loop {
        if let WheelEvent::Advanced { position: 2, .. } = recv(&mut rx).await {
            break;
        }
    }

    // Half way through the 2 -> 3 transition.
    tokio::time::sleep(STEP / 2).await;
    handle.stop();

    let mut stopping_events = 0;
    let mut advanced = Vec::new();
    let final_position = loop {
        match recv(&mut rx).await {
            WheelEvent::Advanced {
                position, duration, ..
            } => advanced.push((position, duration)),
            WheelEvent::Stopping { .. } => stopping_events += 1,
            WheelEvent::Stopped { position, .. } => break position,
            other => panic!("unexpected event while stopping: {other:?}"),
        }
    };

    assert_eq!(stopping_events, 1);
    assert_eq!(final_position, (2 + 4) % 5);
    assert_eq!(handle.status(), Status::Stopped);
    assert_eq!(handle.position(), final_position);
    assert_eq!(handle.items_to_stop_to_go(), Some(0));

    let positions: Vec<usize> = advanced.iter().map(|(p, _)| *p).collect();
    assert_eq!(positions, [3, 4, 0, 1]);

    // The interrupted transition only runs for what was left of it.
    assert!(approx(advanced[0].1, STEP / 2));

    let braking: Vec<Duration> = advanced[1..].iter().map(|(_, d)| *d).collect();
    assert!(approx(braking[0], STEP.mul_f64(1.5)));
    assert!(approx(braking[1], STEP.mul_f64(1.5 * 1.5)));
    assert!(approx(braking[2], STEP.mul_f64(1.5 * 1.5 * 1.5 * 2.0)));
    assert!(braking.windows(2).all(|w| w[1] > w[0]));

    let animations = animator.animations();
    let (_, settle_duration, settle_easing) = animations[animations.len() - 1];
    assert_eq!(settle_easing, Easing::EaseOutBack);
    assert!(approx(settle_duration, braking[2]));
    for (_, _, easing) in &animations[..animations.len() - 1] {
        assert_eq!(*easing, Easing::Linear);
    }
}

#[tokio::test(start_paused = true)]
async fn stop_while_stopping_is_ignored() {
    let (handle, _animator, mut rx) = spawn_wheel(5, config());
    handle.start();
    wait_for(&mut rx, Status::Spinning).await;
    handle.stop();
    wait_for(&mut rx, Status::Stopping).await;

    handle.stop();
    loop {
        match recv(&mut rx).await {
            WheelEvent::Ignored { .. } => break,
            WheelEvent::Stopped { .. } => panic!("second stop was not rejected"),
            _ => {}
        }
    }
    assert_eq!(handle.status(), Status::Stopping);
    wait_for(&mut rx, Status::Stopped).await;
}

#[tokio::test(start_paused = true)]
async fn wheel_can_be_restarted_after_stopping() {
    let (handle, _animator, mut rx) = spawn_wheel(4, config());
    for _ in 0..2 {
        handle.start();
        wait_for(&mut rx, Status::Spinning).await;
        handle.stop();
        wait_for(&mut rx, Status::Stopped).await;
    }
    assert_eq!(handle.status(), Status::Stopped);
}

#[tokio::test(start_paused = true)]
async fn faster_then_slower_restores_duration() {
    let (mut handle, _animator, mut rx) = spawn_wheel(5, config());
    wait_for(&mut rx, Status::Ready).await;
    // Mark the `ready` snapshot as seen.
    assert!(handle.changed().await);

    handle.faster();
    assert!(handle.changed().await);
    assert!(handle.spinning_duration() < STEP);

    handle.slower();
    assert!(handle.changed().await);
    assert!(approx(handle.spinning_duration(), STEP));
}

#[tokio::test(start_paused = true)]
async fn faster_does_not_touch_the_transition_in_flight() {
    let (handle, animator, mut rx) = spawn_wheel(5, config());
    handle.start();
    wait_for(&mut rx, Status::Spinning).await;

    handle.faster();
    // The spin leg issued on entering `spinning` keeps its nominal duration.
    match recv(&mut rx).await {
        WheelEvent::Advanced { duration, .. } => assert!(approx(duration, STEP)),
        other => panic!("unexpected {other:?}"),
    }
    let (_, next, _) = *animator.animations().last().unwrap();
    assert!(approx(next, STEP.div_f64(1.5)));
}
