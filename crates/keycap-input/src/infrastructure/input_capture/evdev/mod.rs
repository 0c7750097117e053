//! Raw kernel device backend (`/dev/input/event*`).
//!
//! Reads keyboards directly from the kernel, bypassing any display server, so
//! keys are seen no matter which window has focus.  Opening the nodes normally
//! requires root (or membership of the `input` group); console sessions
//! without a display server are the other common user.
//!
//! # Polling (for beginners)
//!
//! Each device node is opened non-blocking.  A poll first applies pending
//! hot-plug notifications, then reads every device until the kernel answers
//! `EAGAIN` ("nothing more for now").  A device that answers `ENODEV` was
//! unplugged and is dropped once the sweep over all devices is finished.
//!
//! ```text
//!   notify thread ──mpsc──▶ drain_hotplug()  ─┐
//!                                              ├─▶ get_events()
//!   /dev/input/event* ───▶ drain_devices()  ──┘
//! ```

pub mod device;
pub mod hotplug;

use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError};

use keycap_core::keymap::evdev_to_scan_code;
use keycap_core::{KeyEvent, ScanCode};
use notify::RecommendedWatcher;
use tracing::{debug, info, warn};

use self::device::{
    probe_keyboard, DeviceIdentity, DeviceOpener, DeviceReadError, InputDevice, SystemDeviceOpener,
    EV_KEY,
};
use self::hotplug::{scan_device_dir, watch_device_dir, HotplugEvent};
use super::{BackendKind, CaptureError, KeyInput, LabelTable};
use crate::infrastructure::storage::config::InputConfig;

/// `input_event.value` for a key press.
const KEY_PRESSED: i32 = 1;
/// `input_event.value` for a key release.
const KEY_RELEASED: i32 = 0;
/// `input_event.value` for kernel auto-repeat.
const KEY_REPEAT: i32 = 2;

struct TrackedDevice {
    identity: DeviceIdentity,
    handle: Box<dyn InputDevice>,
}

/// Keyboard capture straight from evdev nodes.
pub struct EvdevKeyInput {
    opener: Box<dyn DeviceOpener>,
    devices: Vec<TrackedDevice>,
    hotplug: Option<Receiver<HotplugEvent>>,
    watcher: Option<RecommendedWatcher>,
    labels: LabelTable,
    disposed: bool,
}

impl EvdevKeyInput {
    /// Scans and watches `config.device_dir` using real device nodes.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Io`] if the directory cannot be listed and
    /// [`CaptureError::DeviceWatch`] if the watch cannot be installed.
    pub fn new(config: &InputConfig) -> Result<Self, CaptureError> {
        let dir = config.device_dir.as_path();
        let (watcher, rx) = watch_device_dir(dir)?;
        let initial = scan_device_dir(dir)?;

        let mut input = Self::with_parts(Box::new(SystemDeviceOpener), initial, rx);
        input.watcher = Some(watcher);
        info!(
            dir = %dir.display(),
            keyboards = input.devices.len(),
            "raw-device keyboard capture started"
        );
        Ok(input)
    }

    /// Builds the backend from explicit parts.  Paths in `initial` are probed
    /// immediately; later changes arrive through `hotplug`.
    pub fn with_parts(
        opener: Box<dyn DeviceOpener>,
        initial: impl IntoIterator<Item = PathBuf>,
        hotplug: Receiver<HotplugEvent>,
    ) -> Self {
        let mut input = Self {
            opener,
            devices: Vec::new(),
            hotplug: Some(hotplug),
            watcher: None,
            labels: LabelTable::new(),
            disposed: false,
        };
        for path in initial {
            input.add_device(&path);
        }
        input
    }

    /// Replaces the label table, e.g. with labels from a compositor keymap.
    pub fn with_labels(mut self, labels: LabelTable) -> Self {
        self.labels = labels;
        self
    }

    /// Identities of the keyboards currently tracked.
    pub fn devices(&self) -> impl Iterator<Item = &DeviceIdentity> {
        self.devices.iter().map(|d| &d.identity)
    }

    fn add_device(&mut self, path: &Path) {
        if self.devices.iter().any(|d| d.identity.path == path) {
            return;
        }

        let handle = match self.opener.open(path) {
            Ok(handle) => handle,
            Err(e) => {
                debug!(path = %path.display(), "cannot open input device: {e}");
                return;
            }
        };

        // A rejected handle is dropped here, which closes it.
        match probe_keyboard(handle.as_ref(), path) {
            Ok(identity) => {
                info!("keyboard added: {identity}");
                self.devices.push(TrackedDevice { identity, handle });
            }
            Err(e) => debug!(path = %path.display(), "ignoring input device: {e}"),
        }
    }

    fn remove_device(&mut self, path: &Path) {
        if let Some(pos) = self.devices.iter().position(|d| d.identity.path == path) {
            let removed = self.devices.remove(pos);
            info!("keyboard removed: {}", removed.identity);
        }
    }

    fn drain_hotplug(&mut self) {
        loop {
            let change = match self.hotplug.as_ref().map(Receiver::try_recv) {
                Some(Ok(change)) => change,
                Some(Err(TryRecvError::Empty)) | None => return,
                Some(Err(TryRecvError::Disconnected)) => {
                    warn!("device directory watch stopped; hot-plug disabled");
                    self.hotplug = None;
                    return;
                }
            };
            match change {
                HotplugEvent::Added(path) => self.add_device(&path),
                HotplugEvent::Removed(path) => self.remove_device(&path),
            }
        }
    }

    fn drain_devices(&mut self, events: &mut Vec<KeyEvent>) {
        let mut gone = Vec::new();

        for device in &mut self.devices {
            loop {
                match device.handle.read_event() {
                    Ok(raw) => {
                        if raw.type_ == EV_KEY {
                            if let Some(event) = translate_key(raw.code, raw.value) {
                                events.push(event);
                            }
                        }
                    }
                    Err(DeviceReadError::WouldBlock) => break,
                    Err(DeviceReadError::Gone) => {
                        gone.push(device.identity.path.clone());
                        break;
                    }
                    Err(e) => {
                        warn!("read from {} failed: {e}", device.identity);
                        break;
                    }
                }
            }
        }

        for path in gone {
            self.remove_device(&path);
        }
    }
}

/// Translates one `EV_KEY` record.
fn translate_key(code: u16, value: i32) -> Option<KeyEvent> {
    let pressed = match value {
        KEY_PRESSED => true,
        KEY_RELEASED => false,
        KEY_REPEAT => return None,
        other => {
            debug!(code, value = other, "unexpected EV_KEY value");
            return None;
        }
    };
    evdev_to_scan_code(code).map(|sc| KeyEvent::new(sc, pressed))
}

impl KeyInput for EvdevKeyInput {
    fn get_events(&mut self) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        if self.disposed {
            return events;
        }
        self.drain_hotplug();
        self.drain_devices(&mut events);
        events
    }

    fn convert_scan_code_to_string(&self, key: ScanCode) -> &'static str {
        self.labels.lookup(key)
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        // Stop the watch thread before closing the devices it reports on.
        self.watcher = None;
        self.hotplug = None;
        self.devices.clear();
        debug!("raw-device keyboard capture disposed");
    }

    fn kind(&self) -> BackendKind {
        BackendKind::RawDevice
    }
}

impl Drop for EvdevKeyInput {
    fn drop(&mut self) {
        self.dispose();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
