//! Keyboard capture backends.
//!
//! Every backend implements [`KeyInput`]: a non-blocking poll that returns the
//! key transitions seen since the previous poll, plus a label lookup for
//! binding dialogs.  Which backend runs is decided once at start-up by
//! [`crate::application::select_backend`].
//!
//! | Backend                           | Module    | Platform               |
//! |-----------------------------------|-----------|------------------------|
//! | Raw kernel devices (`/dev/input`) | `evdev`   | Linux, root or console |
//! | Wayland compositor client         | `wayland` | Linux, Wayland session |
//! | Xlib keymap snapshot polling      | `x11`     | Linux, X11 session     |
//! | Raw Input message window          | `windows` | Windows                |
//!
//! # Lifecycle (for beginners)
//!
//! A backend is only handed out once its constructor has fully succeeded, so
//! there is no "half-initialized" state to poll.  `dispose()` releases every
//! OS resource and is safe to call more than once; `Drop` calls it too, so
//! forgetting to dispose never leaks a file descriptor or a window.
//!
//! # Testability
//!
//! [`mock::MockKeyInput`] lets application-layer tests inject synthetic
//! transitions without any OS input device.

use std::fmt;

use keycap_core::{KeyEvent, ScanCode};
use thiserror::Error;

pub mod labels;
pub mod mock;
pub mod x11;

#[cfg(target_os = "linux")]
pub mod evdev;
#[cfg(target_os = "linux")]
pub mod wayland;
#[cfg(target_os = "windows")]
pub mod windows;

pub use labels::LabelTable;

/// Which kind of backend a [`KeyInput`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Raw kernel input devices (evdev).
    RawDevice,
    /// Wayland compositor protocol client.
    Compositor,
    /// Legacy X11 display-server polling.
    LegacyDisplay,
    /// Windows Raw Input message window.
    NativeHook,
    /// Scripted backend used in tests.
    Mock,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::RawDevice => "raw-device",
            BackendKind::Compositor => "compositor",
            BackendKind::LegacyDisplay => "legacy-display",
            BackendKind::NativeHook => "native-hook",
            BackendKind::Mock => "mock",
        };
        f.write_str(name)
    }
}

/// Error type for backend construction and selection.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),

    #[error("failed to watch device directory: {0}")]
    DeviceWatch(String),

    #[cfg(target_os = "linux")]
    #[error("compositor connection failed: {0}")]
    Compositor(#[from] wayland::WaylandError),

    #[error("display connection failed: {0}")]
    Display(String),

    #[error("native input hook setup failed: {0}")]
    NativeHook(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Background keyboard capture.
///
/// Implementations are polled from a single thread and are not required to be
/// `Send`; several of them wrap thread-affine OS handles.
pub trait KeyInput {
    /// Returns the key transitions observed since the previous call.
    ///
    /// Never blocks.  An empty batch is normal.
    fn get_events(&mut self) -> Vec<KeyEvent>;

    /// Returns a short display label for `key`, or `""` if nothing is known.
    ///
    /// Layout-aware where the backend has layout data.
    fn convert_scan_code_to_string(&self, key: ScanCode) -> &'static str;

    /// Releases every OS resource held by the backend.  Idempotent.
    fn dispose(&mut self);

    /// Which backend this is.
    fn kind(&self) -> BackendKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_display_matches_config_names() {
        assert_eq!(BackendKind::RawDevice.to_string(), "raw-device");
        assert_eq!(BackendKind::Compositor.to_string(), "compositor");
        assert_eq!(BackendKind::LegacyDisplay.to_string(), "legacy-display");
        assert_eq!(BackendKind::NativeHook.to_string(), "native-hook");
    }

    #[test]
    fn test_unsupported_platform_error_message() {
        let err = CaptureError::UnsupportedPlatform("no tier matched".to_string());
        assert_eq!(err.to_string(), "platform not supported: no tier matched");
    }
}
