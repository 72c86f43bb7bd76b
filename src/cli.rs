use crate::orchestrator::{self, UiCommand};
use anyhow::{Context, Result};
use clap::Parser;
use slot_wheel::engine::HeadlessAnimator;
use slot_wheel::{Easing, SpinDirection, WheelConfig, WheelEvent};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

const DEFAULT_ITEMS: &str = "7,BAR,CHERRY,LEMON,BELL,PLUM,STAR";

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
///
/// Locks are taken per line: the log subscriber writes to stderr from
/// other threads.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let mut out = std::io::stdout().lock();
                    let _ = writeln!(out, "{}", msg);
                    let _ = out.flush();
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(std::io::stderr().lock(), "{}", msg);
                }
            }
        }
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "slot-wheel",
    version,
    about = "Terminal slot machine with eased, wrap-around reels"
)]
pub struct Cli {
    /// Comma separated reel items, shared by every wheel
    #[arg(long, default_value = DEFAULT_ITEMS, value_delimiter = ',')]
    pub items: Vec<String>,

    /// Number of independent wheels
    #[arg(long, default_value_t = 3)]
    pub wheels: usize,

    /// Duration of one single-item transition while spinning
    #[arg(long)]
    pub spinning_duration: Option<humantime::Duration>,

    /// Factor (>1) the item duration grows by on each braking step
    #[arg(long)]
    pub spinning_brake: Option<f64>,

    /// Divisor (>1) applied by "faster"
    #[arg(long)]
    pub spinning_acceleration: Option<f64>,

    /// Braking steps after the interrupted item
    #[arg(long)]
    pub items_to_stop: Option<u32>,

    /// Direction the reels turn
    #[arg(long, value_enum)]
    pub direction: Option<SpinDirection>,

    /// Easing of the final settle step
    #[arg(long, value_enum)]
    pub settle_easing: Option<Easing>,

    /// Keep the braked speed when a wheel is restarted
    #[arg(long)]
    pub keep_braked_speed: bool,

    /// Start every wheel on a random item
    #[arg(long)]
    pub random_start: bool,

    /// Delay between stopping consecutive wheels
    #[arg(long, default_value = "400ms")]
    pub stop_stagger: humantime::Duration,

    /// How long the wheels spin before stopping (text/JSON modes)
    #[arg(long, default_value = "2s")]
    pub spin_for: humantime::Duration,

    /// Print JSON event lines and a JSON summary, then exit (no TUI)
    #[arg(long, conflicts_with = "text")]
    pub json: bool,

    /// Print event messages and a text summary, then exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Wheel configuration file (JSON). Defaults to <config dir>/slot-wheel/config.json
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write logs to this file (logs go to stderr in text/JSON modes)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn is_headless(&self) -> bool {
        self.json || self.text || !cfg!(feature = "tui")
    }
}

/// Everything the orchestrator needs to build and drive a bank of wheels.
#[derive(Debug, Clone)]
pub struct ReelPlan {
    pub wheel: WheelConfig,
    pub items: Vec<String>,
    pub wheels: usize,
    /// Abstract item extent; one terminal row per item.
    pub item_height: f64,
    pub random_start: bool,
    pub stop_stagger: Duration,
    pub spin_for: Duration,
}

pub async fn run(args: Cli) -> Result<()> {
    let plan = build_plan(&args)?;

    if !args.json && !args.text {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(plan).await;
        }
    }

    run_headless(plan, args.json).await
}

/// Default location of the wheel configuration file.
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("slot-wheel").join("config.json"))
}

fn load_config(path: &Path) -> Result<WheelConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
}

/// Build a `ReelPlan` from the config file (if any) and CLI overrides.
pub fn build_plan(args: &Cli) -> Result<ReelPlan> {
    let mut wheel = match args.config.as_deref() {
        Some(path) => load_config(path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => load_config(&path)?,
            None => WheelConfig::default(),
        },
    };

    if let Some(d) = args.spinning_duration {
        wheel.spinning_duration = Duration::from(d);
    }
    if let Some(b) = args.spinning_brake {
        wheel.spinning_brake = b;
    }
    if let Some(a) = args.spinning_acceleration {
        wheel.spinning_acceleration = a;
    }
    if let Some(n) = args.items_to_stop {
        wheel.items_to_stop = n;
    }
    if let Some(d) = args.direction {
        wheel.direction = d;
    }
    if let Some(e) = args.settle_easing {
        wheel.settle_easing = e;
    }
    if args.keep_braked_speed {
        wheel.reset_duration_on_start = false;
    }
    wheel.validate().context("invalid wheel configuration")?;

    let items: Vec<String> = args
        .items
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        return Err(anyhow::anyhow!("--items must name at least one item"));
    }
    if args.wheels == 0 {
        return Err(anyhow::anyhow!("--wheels must be at least 1"));
    }

    Ok(ReelPlan {
        wheel,
        items,
        wheels: args.wheels,
        item_height: 1.0,
        random_start: args.random_start,
        stop_stagger: Duration::from(args.stop_stagger),
        spin_for: Duration::from(args.spin_for),
    })
}

/// Spin every wheel once without a TUI, printing events as they arrive.
async fn run_headless(plan: ReelPlan, json: bool) -> Result<()> {
    let (out_tx, out_handle) = spawn_output_writer();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<WheelEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // Nothing reads the transition records here.
    let animators: Vec<HeadlessAnimator> = (0..plan.wheels)
        .map(|_| HeadlessAnimator::with_history(0))
        .collect();
    let bank = orchestrator::spawn_bank(&plan, animators, event_tx)?;
    let ctl_plan = plan.clone();
    let controller =
        tokio::spawn(async move { orchestrator::run_controller(&ctl_plan, bank, cmd_rx).await });

    let _ = cmd_tx.send(UiCommand::StartAll);
    let stop_at = tokio::time::Instant::now() + plan.spin_for;
    let mut stop_sent = false;
    let mut finals: BTreeMap<usize, usize> = BTreeMap::new();

    loop {
        tokio::select! {
            ev = event_rx.recv() => {
                let Some(ev) = ev else { break };
                if json {
                    let line = serde_json::json!({
                        "timestamp_utc": timestamp_utc(),
                        "event": ev,
                    });
                    let _ = out_tx.send(OutputLine::Stdout(line.to_string()));
                } else if !matches!(ev, WheelEvent::Advanced { .. }) {
                    let _ = out_tx.send(OutputLine::Stderr(ev.to_message()));
                }

                if let WheelEvent::Stopped { wheel, position } = ev {
                    finals.insert(wheel.0, position);
                    if finals.len() == plan.wheels {
                        break;
                    }
                }
            }
            _ = tokio::time::sleep_until(stop_at), if !stop_sent => {
                stop_sent = true;
                let _ = cmd_tx.send(UiCommand::StopAll);
            }
            _ = tokio::signal::ctrl_c() => {
                let _ = out_tx.send(OutputLine::Stderr("Interrupted".into()));
                break;
            }
        }
    }

    let _ = cmd_tx.send(UiCommand::Quit);
    controller
        .await
        .context("wheel controller task failed")?
        .context("wheel controller failed")?;

    let finals: Vec<usize> = finals.into_values().collect();
    if json {
        let summary = crate::text_summary::build_json_summary(&plan.items, &finals);
        let _ = out_tx.send(OutputLine::Stdout(serde_json::to_string_pretty(&summary)?));
    } else {
        let summary = crate::text_summary::build_text_summary(&plan.items, &finals);
        for line in summary.lines {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    }

    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

fn timestamp_utc() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "now".into())
}
