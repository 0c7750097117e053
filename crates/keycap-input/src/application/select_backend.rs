//! SelectBackendUseCase: picks one capture backend for the running session.
//!
//! Selection walks an ordered list of [`Tier`]s and the first tier that both
//! applies to the [`SessionFacts`] and constructs successfully wins.
//!
//! # Default tier order (for beginners)
//!
//! ```text
//! 1. native-hook      Windows
//! 2. compositor       Wayland session, compositor reachable
//! 3. raw-device       X11 session inside a Wayland compositor (XWayland),
//!                     root, device directory present; labels from the
//!                     compositor keymap
//! 4. legacy-display   X11 session, display available
//! 5. raw-device       console video driver that reads /dev/input
//! 6. raw-device       root, device directory present
//! ```
//!
//! Why does XWayland prefer raw devices over X11 polling?  Under XWayland the
//! X server only learns about keys while one of its own windows has focus, so
//! polling its keymap misses most input.  The kernel devices see everything.
//!
//! A constructor that fails is logged and the walk continues with the next
//! tier.  If nothing is left, selection returns
//! [`CaptureError::UnsupportedPlatform`].

use tracing::{debug, info, warn};

use crate::infrastructure::input_capture::{BackendKind, CaptureError, KeyInput};
use crate::infrastructure::session::{SessionFacts, SessionType, TargetOs};
use crate::infrastructure::storage::config::{BackendPreference, InputConfig};

/// Builds a backend for one tier.
pub type Constructor = Box<dyn Fn(&InputConfig) -> Result<Box<dyn KeyInput>, CaptureError>>;

/// One entry of the selection policy.
pub struct Tier {
    /// Short name used in logs.
    pub name: &'static str,
    /// Kind of backend the constructor returns.
    pub kind: BackendKind,
    /// Whether the tier applies to a session.
    pub applies: fn(&SessionFacts) -> bool,
    pub construct: Constructor,
}

impl Tier {
    pub fn new(
        name: &'static str,
        kind: BackendKind,
        applies: fn(&SessionFacts) -> bool,
        construct: impl Fn(&InputConfig) -> Result<Box<dyn KeyInput>, CaptureError> + 'static,
    ) -> Self {
        Self {
            name,
            kind,
            applies,
            construct: Box::new(construct),
        }
    }
}

impl std::fmt::Debug for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tier")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

// ── Tier predicates ───────────────────────────────────────────────────────────

pub fn is_windows(facts: &SessionFacts) -> bool {
    facts.os == TargetOs::Windows
}

pub fn wayland_compositor(facts: &SessionFacts) -> bool {
    facts.os == TargetOs::Linux
        && facts.session == SessionType::Wayland
        && facts.compositor_reachable
}

/// X11 client of a Wayland compositor with access to the kernel devices.
pub fn xwayland_raw_device(facts: &SessionFacts) -> bool {
    facts.os == TargetOs::Linux
        && facts.session == SessionType::X11
        && facts.compositor_reachable
        && facts.elevated
        && facts.device_dir_available
}

pub fn x11_display(facts: &SessionFacts) -> bool {
    facts.os == TargetOs::Linux && facts.session == SessionType::X11 && facts.display_available
}

/// Console video drivers read `/dev/input` themselves, so the devices are
/// normally accessible without root.
pub fn raw_input_console(facts: &SessionFacts) -> bool {
    facts.os == TargetOs::Linux
        && facts.session.is_raw_input_console()
        && facts.device_dir_available
}

pub fn elevated_raw_device(facts: &SessionFacts) -> bool {
    facts.os == TargetOs::Linux && facts.elevated && facts.device_dir_available
}

// ── Selection ─────────────────────────────────────────────────────────────────

/// Tiers that the preference allows and whose predicate matches, in order.
pub fn matching_tiers<'a>(
    facts: &'a SessionFacts,
    preference: BackendPreference,
    tiers: &'a [Tier],
) -> impl Iterator<Item = &'a Tier> + 'a {
    tiers
        .iter()
        .filter(move |tier| preference.allows(tier.kind) && (tier.applies)(facts))
}

/// Walks `tiers` and returns the first backend that constructs.
///
/// # Errors
///
/// [`CaptureError::UnsupportedPlatform`] when no tier applies or every
/// applicable constructor failed.
pub fn select_backend(
    facts: &SessionFacts,
    preference: BackendPreference,
    tiers: &[Tier],
    config: &InputConfig,
) -> Result<Box<dyn KeyInput>, CaptureError> {
    let mut failures = Vec::new();

    for tier in matching_tiers(facts, preference, tiers) {
        debug!(tier = tier.name, "trying backend tier");
        match (tier.construct)(config) {
            Ok(input) => {
                info!(tier = tier.name, kind = %input.kind(), "keyboard backend selected");
                return Ok(input);
            }
            Err(e) => {
                warn!(tier = tier.name, "backend construction failed: {e}");
                failures.push(format!("{}: {e}", tier.name));
            }
        }
    }

    let detail = if failures.is_empty() {
        format!(
            "no backend applies (os {:?}, session {:?}, backend preference {preference})",
            facts.os, facts.session
        )
    } else {
        format!("every applicable backend failed ({})", failures.join("; "))
    };
    Err(CaptureError::UnsupportedPlatform(detail))
}

/// The production tier list for this platform.
pub fn default_tiers() -> Vec<Tier> {
    #[allow(unused_mut)]
    let mut tiers = Vec::new();

    #[cfg(target_os = "windows")]
    {
        use crate::infrastructure::input_capture::windows::RawKeyInput;

        tiers.push(Tier::new("raw-input-window", BackendKind::NativeHook, is_windows, |_| {
            Ok(Box::new(RawKeyInput::new()?) as Box<dyn KeyInput>)
        }));
    }

    #[cfg(target_os = "linux")]
    {
        use crate::infrastructure::input_capture::evdev::EvdevKeyInput;
        use crate::infrastructure::input_capture::wayland::{self, WaylandKeyInput};
        use crate::infrastructure::input_capture::x11::X11KeyInput;
        use crate::infrastructure::input_capture::LabelTable;

        tiers.push(Tier::new("wayland", BackendKind::Compositor, wayland_compositor, |config| {
            Ok(Box::new(WaylandKeyInput::new(config)?) as Box<dyn KeyInput>)
        }));
        tiers.push(Tier::new(
            "xwayland-evdev",
            BackendKind::RawDevice,
            xwayland_raw_device,
            |config| {
                let labels = wayland::fetch_keymap_labels(config).unwrap_or_else(|e| {
                    warn!("compositor keymap unavailable, using static labels: {e}");
                    LabelTable::new()
                });
                Ok(Box::new(EvdevKeyInput::new(config)?.with_labels(labels)) as Box<dyn KeyInput>)
            },
        ));
        tiers.push(Tier::new("x11", BackendKind::LegacyDisplay, x11_display, |config| {
            Ok(Box::new(X11KeyInput::new(config)?) as Box<dyn KeyInput>)
        }));
        tiers.push(Tier::new(
            "console-evdev",
            BackendKind::RawDevice,
            raw_input_console,
            |config| Ok(Box::new(EvdevKeyInput::new(config)?) as Box<dyn KeyInput>),
        ));
        tiers.push(Tier::new("evdev", BackendKind::RawDevice, elevated_raw_device, |config| {
            Ok(Box::new(EvdevKeyInput::new(config)?) as Box<dyn KeyInput>)
        }));
    }

    tiers
}

/// Detects the session and builds the best backend for it.
///
/// # Errors
///
/// See [`select_backend`].
pub fn create_key_input(config: &InputConfig) -> Result<Box<dyn KeyInput>, CaptureError> {
    let facts = SessionFacts::detect(config);
    select_backend(&facts, config.backend, &default_tiers(), config)
}
