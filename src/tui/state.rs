use crate::text_summary::{evaluate_payline, Payline};
use slot_wheel::{Status, WheelEvent};
use std::collections::VecDeque;
use std::time::Duration;

/// What the UI knows about one wheel, rebuilt from its events.
#[derive(Debug, Clone)]
pub struct WheelView {
    pub status: Status,
    pub position: usize,
    pub last_duration: Option<Duration>,
    pub items_passed: u64,
}

impl Default for WheelView {
    fn default() -> Self {
        Self {
            status: Status::Init,
            position: 0,
            last_duration: None,
            items_passed: 0,
        }
    }
}

pub struct UiState {
    pub tab: usize,
    pub info: String,
    pub items: Vec<String>,
    pub wheels: Vec<WheelView>,
    pub log: VecDeque<String>,
    pub spins: u64,
    pub jackpots: u64,
    pub last_payline: Option<Payline>,
}

impl UiState {
    const LOG_MAX: usize = 200;

    pub fn new(items: Vec<String>, wheels: usize) -> Self {
        Self {
            tab: 0,
            info: "Press s or space to spin".into(),
            items,
            wheels: vec![WheelView::default(); wheels],
            log: VecDeque::new(),
            spins: 0,
            jackpots: 0,
            last_payline: None,
        }
    }

    fn push_log(&mut self, line: String) {
        self.log.push_back(line);
        while self.log.len() > Self::LOG_MAX {
            self.log.pop_front();
        }
    }

    pub fn all_idle(&self) -> bool {
        self.wheels.iter().all(|w| !w.status.is_moving())
    }

    pub fn apply_event(&mut self, ev: WheelEvent) {
        let idx = ev.wheel().0;
        if idx >= self.wheels.len() {
            return;
        }
        let was_idle = self.all_idle();

        match &ev {
            WheelEvent::Ready { position, .. } => {
                self.wheels[idx].status = Status::Ready;
                self.wheels[idx].position = *position;
            }
            WheelEvent::Advanced {
                position, duration, ..
            } => {
                let view = &mut self.wheels[idx];
                view.position = *position;
                view.last_duration = Some(*duration);
                view.items_passed += 1;
                // Per-item events would flood the log.
                return;
            }
            WheelEvent::Stopped { position, .. } => {
                self.wheels[idx].status = Status::Stopped;
                self.wheels[idx].position = *position;
            }
            WheelEvent::Ignored { .. } => {
                self.info = ev.to_message();
            }
            other => {
                if let Some(status) = other.entered() {
                    self.wheels[idx].status = status;
                }
            }
        }

        if was_idle && !self.all_idle() {
            self.spins += 1;
            self.last_payline = None;
            self.info = "Spinning… press x or enter to stop".into();
        }
        if matches!(ev, WheelEvent::Stopped { .. }) && self.all_idle() {
            self.settle_payline();
        }
        self.push_log(ev.to_message());
    }

    fn settle_payline(&mut self) {
        let shown: Vec<&str> = self
            .wheels
            .iter()
            .map(|w| self.items.get(w.position).map(String::as_str).unwrap_or("?"))
            .collect();
        let payline = evaluate_payline(&shown);
        if matches!(payline, Payline::Jackpot(_)) {
            self.jackpots += 1;
        }
        self.info = payline.describe();
        self.last_payline = Some(payline);
    }
}

/// Short label for a status, fitting a reel title.
pub fn status_label(status: Status) -> &'static str {
    match status {
        Status::Init | Status::Ready => "READY",
        Status::Starting => "START",
        Status::Spinning => "SPIN",
        Status::Stopping => "BRAKE",
        Status::Stopped => "STOP",
    }
}
