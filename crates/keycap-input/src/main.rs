//! Keycap monitor entry point.
//!
//! Picks a keyboard backend for the running session and logs every key
//! transition with its label until Ctrl-C.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config() + KEYCAP_BACKEND override
//!  └─ create_key_input()        -- session detection + tier walk
//!  └─ poll loop (tokio interval)
//!       ├─ KeyStateTracker      -- real transitions only
//!       ├─ configured bindings  -- "binding triggered" log lines
//!       └─ BindingRecorder      -- only with --record
//! ```
//!
//! # Usage
//!
//! ```text
//! keycap-monitor                  log key transitions
//! keycap-monitor --record ACTION  record one binding and save it as ACTION
//! ```

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{bail, Context};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use keycap_input::application::key_state::KeyStateTracker;
use keycap_input::application::record_binding::BindingRecorder;
use keycap_input::create_key_input;
use keycap_input::infrastructure::storage::config::{
    apply_env_overrides, load_config, save_config, BindingEntry,
};

enum Mode {
    Monitor,
    Record { action: String },
}

fn parse_mode() -> anyhow::Result<Mode> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None => Ok(Mode::Monitor),
        Some("--record") => {
            let action = args.next().context("--record needs an action name")?;
            Ok(Mode::Record { action })
        }
        Some(other) => bail!("unknown argument {other:?} (expected --record ACTION)"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mode = parse_mode()?;

    let mut config = load_config().context("failed to load configuration")?;
    apply_env_overrides(&mut config)?;

    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level)),
        )
        .init();

    info!(backend = %config.input.backend, "Keycap monitor starting");

    let mut input = create_key_input(&config.input).context("no keyboard backend available")?;
    info!(kind = %input.kind(), "capturing keyboard");

    // Shutdown flag.
    let running = Arc::new(AtomicBool::new(true));

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_clone.store(false, Ordering::Relaxed);
        }
    });

    // ── Poll loop ─────────────────────────────────────────────────────────────
    let mut tracker = KeyStateTracker::new();
    let mut recorder = BindingRecorder::new();
    let mut ticker = tokio::time::interval(config.input.poll_interval());
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    if let Mode::Record { action } = &mode {
        info!("press the key (or modifier + key) to bind to {action:?}");
    }

    while running.load(Ordering::Relaxed) {
        ticker.tick().await;

        let events = input.get_events();
        let transitions = tracker.apply_batch(&events);

        for event in &transitions {
            let label = input.convert_scan_code_to_string(event.key);
            info!(
                key = %event.key,
                label,
                pressed = event.pressed,
                "key transition"
            );

            if event.pressed {
                for entry in &config.bindings {
                    if entry.binding.key == event.key && tracker.is_active(&entry.binding) {
                        info!(action = %entry.action, binding = %entry.binding, "binding triggered");
                    }
                }
            }
        }

        if let Mode::Record { action } = &mode {
            if let Some(binding) = recorder.feed_batch(&transitions) {
                info!(action = %action, binding = %binding, "binding recorded");
                config.bindings.retain(|entry| entry.action != *action);
                config.bindings.push(BindingEntry {
                    action: action.clone(),
                    binding,
                });
                if let Err(e) = save_config(&config) {
                    warn!("failed to save configuration: {e}");
                }
                break;
            }
        }
    }

    input.dispose();
    let held = tracker.release_all();
    debug!(held = held.len(), "released keys still held at shutdown");
    info!("Keycap monitor stopped");
    Ok(())
}
