//! Session detection: the facts backend selection decides on.
//!
//! Everything the selection policy needs to know about the running session is
//! gathered once into a [`SessionFacts`] value.  The policy itself never reads
//! the environment, which keeps every tier testable with hand-built facts.
//!
//! # Session type resolution
//!
//! 1. `SDL_VIDEODRIVER` if set: `wayland`, `x11`, anything else is a console
//!    video driver (`kmsdrm`, `evdev`, ...).
//! 2. `XDG_SESSION_TYPE`: `wayland` or `x11`.
//! 3. `WAYLAND_DISPLAY` set → Wayland, else `DISPLAY` set → X11.
//! 4. Otherwise unknown.

use std::ffi::OsString;

use tracing::debug;

use crate::infrastructure::storage::config::InputConfig;

/// Operating system family the process runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOs {
    Windows,
    Linux,
    Other,
}

impl TargetOs {
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            TargetOs::Windows
        } else if cfg!(target_os = "linux") {
            TargetOs::Linux
        } else {
            TargetOs::Other
        }
    }
}

/// Kind of graphical (or non-graphical) session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionType {
    Wayland,
    X11,
    /// A console video driver such as `kmsdrm`; the name is lower-cased.
    Console(String),
    Unknown,
}

impl SessionType {
    /// Console drivers that read keyboards straight from `/dev/input`.
    pub const RAW_INPUT_CONSOLE_DRIVERS: [&'static str; 4] = ["evdev", "kmsdrm", "rpi", "vivante"];

    /// Returns `true` for a console driver that reads raw input devices.
    pub fn is_raw_input_console(&self) -> bool {
        match self {
            SessionType::Console(driver) => {
                Self::RAW_INPUT_CONSOLE_DRIVERS.contains(&driver.as_str())
            }
            _ => false,
        }
    }
}

/// Everything backend selection needs to know about the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFacts {
    pub os: TargetOs,
    pub session: SessionType,
    /// Effective user is root.
    pub elevated: bool,
    /// The configured device directory exists.
    pub device_dir_available: bool,
    /// A Wayland compositor socket accepted a connection.
    pub compositor_reachable: bool,
    /// `DISPLAY` names an X server.
    pub display_available: bool,
}

impl SessionFacts {
    /// Probes the running session.
    pub fn detect(config: &InputConfig) -> Self {
        let facts = Self {
            os: TargetOs::current(),
            session: session_type_from(|key| std::env::var_os(key)),
            elevated: is_elevated(),
            device_dir_available: config.device_dir.is_dir(),
            compositor_reachable: compositor_reachable(),
            display_available: std::env::var_os("DISPLAY").is_some_and(|v| !v.is_empty()),
        };
        debug!(?facts, "session facts detected");
        facts
    }
}

/// Resolves the session type from environment lookups.
pub fn session_type_from(env: impl Fn(&str) -> Option<OsString>) -> SessionType {
    let var = |key: &str| {
        env(key)
            .map(|v| v.to_string_lossy().trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty())
    };

    if let Some(driver) = var("SDL_VIDEODRIVER") {
        return match driver.as_str() {
            "wayland" => SessionType::Wayland,
            "x11" => SessionType::X11,
            _ => SessionType::Console(driver),
        };
    }

    match var("XDG_SESSION_TYPE").as_deref() {
        Some("wayland") => return SessionType::Wayland,
        Some("x11") => return SessionType::X11,
        _ => {}
    }

    if var("WAYLAND_DISPLAY").is_some() {
        SessionType::Wayland
    } else if var("DISPLAY").is_some() {
        SessionType::X11
    } else {
        SessionType::Unknown
    }
}

#[cfg(target_os = "linux")]
fn is_elevated() -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(not(target_os = "linux"))]
fn is_elevated() -> bool {
    false
}

#[cfg(target_os = "linux")]
fn compositor_reachable() -> bool {
    use crate::infrastructure::input_capture::wayland::connection::{resolve_socket, SocketTarget};

    match resolve_socket(|key| std::env::var_os(key)) {
        Ok(SocketTarget::Inherited(_)) => true,
        Ok(SocketTarget::Path(path)) => std::os::unix::net::UnixStream::connect(path).is_ok(),
        Err(_) => false,
    }
}

#[cfg(not(target_os = "linux"))]
fn compositor_reachable() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_sdl_video_driver_takes_precedence() {
        // Arrange
        let env = env_of(&[("SDL_VIDEODRIVER", "KMSDRM"), ("XDG_SESSION_TYPE", "wayland")]);

        // Act
        let session = session_type_from(env);

        // Assert
        assert_eq!(session, SessionType::Console("kmsdrm".to_string()));
        assert!(session.is_raw_input_console());
    }

    #[test]
    fn test_sdl_video_driver_can_name_display_servers() {
        assert_eq!(session_type_from(env_of(&[("SDL_VIDEODRIVER", "wayland")])), SessionType::Wayland);
        assert_eq!(session_type_from(env_of(&[("SDL_VIDEODRIVER", "x11")])), SessionType::X11);
    }

    #[test]
    fn test_xdg_session_type_is_used_next() {
        assert_eq!(
            session_type_from(env_of(&[("XDG_SESSION_TYPE", "x11"), ("WAYLAND_DISPLAY", "wayland-0")])),
            SessionType::X11
        );
    }

    #[test]
    fn test_display_variables_are_the_last_resort() {
        assert_eq!(
            session_type_from(env_of(&[("XDG_SESSION_TYPE", "tty"), ("WAYLAND_DISPLAY", "wayland-1")])),
            SessionType::Wayland
        );
        assert_eq!(session_type_from(env_of(&[("DISPLAY", ":0")])), SessionType::X11);
        assert_eq!(session_type_from(env_of(&[])), SessionType::Unknown);
    }

    #[test]
    fn test_blank_variables_are_ignored() {
        assert_eq!(
            session_type_from(env_of(&[("SDL_VIDEODRIVER", " "), ("DISPLAY", ":1")])),
            SessionType::X11
        );
    }

    #[test]
    fn test_only_known_console_drivers_read_raw_input() {
        assert!(SessionType::Console("rpi".to_string()).is_raw_input_console());
        assert!(!SessionType::Console("directfb".to_string()).is_raw_input_console());
        assert!(!SessionType::Wayland.is_raw_input_console());
    }

    #[test]
    fn test_detect_reports_missing_device_dir() {
        let config = InputConfig {
            device_dir: "/nonexistent/keycap/input".into(),
            ..InputConfig::default()
        };
        let facts = SessionFacts::detect(&config);
        assert!(!facts.device_dir_available);
        assert_eq!(facts.os, TargetOs::current());
    }
}
