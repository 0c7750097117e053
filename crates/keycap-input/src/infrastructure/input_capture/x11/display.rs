//! Xlib side of the legacy display backend.
//!
//! Every Xlib call goes through a [`DisplayLock`] so the connection can be
//! shared with other threads of the host application that also talk to the
//! same display.

use std::ffi::c_int;
use std::os::raw::c_char;
use std::ptr::{self, NonNull};
use std::sync::Once;

use keycap_core::{KeyEvent, ScanCode};
use tracing::{debug, info, warn};
use x11::xlib;

use super::{diff_snapshots, KeyAlias, KeyName, KeyNames, KeycodeMap, KEYMAP_BYTES};
use crate::infrastructure::input_capture::{BackendKind, CaptureError, KeyInput, LabelTable};
use crate::infrastructure::storage::config::InputConfig;

/// `XkbAllComponentsMask` restricted to the names components.
const XKB_ALL_NAMES_MASK: u32 = 0x3FF;

static XLIB_THREADS: Once = Once::new();

// ── Display connection ────────────────────────────────────────────────────────

/// Owned Xlib display connection, closed on drop.
struct DisplayHandle(NonNull<xlib::Display>);

impl DisplayHandle {
    /// Opens the display named by `$DISPLAY`.
    fn open() -> Result<Self, CaptureError> {
        XLIB_THREADS.call_once(|| {
            // SAFETY: XInitThreads must run before any other Xlib call in the
            // process; the Once makes this the first call from this crate.
            unsafe {
                xlib::XInitThreads();
            }
        });

        // SAFETY: a null name makes Xlib read $DISPLAY.
        let raw = unsafe { xlib::XOpenDisplay(ptr::null()) };
        NonNull::new(raw)
            .map(Self)
            .ok_or_else(|| CaptureError::Display("XOpenDisplay failed".to_string()))
    }

    fn as_ptr(&self) -> *mut xlib::Display {
        self.0.as_ptr()
    }

    fn lock(&self) -> DisplayLock<'_> {
        // SAFETY: the display pointer is valid for the life of `self`.
        unsafe { xlib::XLockDisplay(self.as_ptr()) };
        DisplayLock { display: self }
    }
}

impl Drop for DisplayHandle {
    fn drop(&mut self) {
        // SAFETY: the handle owns the connection and is dropped once.
        unsafe {
            xlib::XCloseDisplay(self.as_ptr());
        }
    }
}

/// Holds `XLockDisplay` until dropped.
struct DisplayLock<'a> {
    display: &'a DisplayHandle,
}

impl Drop for DisplayLock<'_> {
    fn drop(&mut self) {
        // SAFETY: paired with the XLockDisplay in `DisplayHandle::lock`.
        unsafe { xlib::XUnlockDisplay(self.display.as_ptr()) };
    }
}

// ── Keymap discovery ──────────────────────────────────────────────────────────

fn xkb_available(dpy: *mut xlib::Display) -> bool {
    let (mut opcode, mut event, mut error) = (0, 0, 0);
    let (mut major, mut minor): (c_int, c_int) = (1, 0);
    // SAFETY: all out-pointers reference live locals.
    let supported = unsafe {
        xlib::XkbQueryExtension(dpy, &mut opcode, &mut event, &mut error, &mut major, &mut minor)
    };
    supported != 0
}

fn key_name(raw: &[c_char; 4]) -> KeyName {
    raw.map(|c| c as u8)
}

/// Reads Xkb key names and aliases.
///
/// # Safety
///
/// `dpy` must be a valid, locked display with the Xkb extension.
unsafe fn read_key_names(dpy: *mut xlib::Display) -> Result<KeyNames, CaptureError> {
    let xkb = xlib::XkbAllocKeyboard();
    if xkb.is_null() {
        return Err(CaptureError::Display("XkbAllocKeyboard failed".to_string()));
    }

    let result = (|| {
        let status = xlib::XkbGetNames(dpy, XKB_ALL_NAMES_MASK, xkb);
        if status != 0 {
            return Err(CaptureError::Display(format!("XkbGetNames failed with status {status}")));
        }

        let desc = &*xkb;
        let mut names = KeyNames {
            min_keycode: desc.min_key_code,
            max_keycode: desc.max_key_code,
            ..KeyNames::default()
        };
        let Some(rec) = desc.names.as_ref() else {
            return Ok(names);
        };

        if !rec.keys.is_null() {
            for keycode in desc.min_key_code..=desc.max_key_code {
                let entry = &*rec.keys.add(usize::from(keycode));
                names.names.push(key_name(&entry.name));
            }
        }
        if !rec.key_aliases.is_null() {
            for i in 0..usize::from(rec.num_key_aliases) {
                let entry = &*rec.key_aliases.add(i);
                names.aliases.push(KeyAlias {
                    real: key_name(&entry.real),
                    alias: key_name(&entry.alias),
                });
            }
        }
        Ok(names)
    })();

    xlib::XkbFreeKeyboard(xkb, 0, xlib::True);
    result
}

/// Resolves every keycode to a ScanCode and a label.
///
/// # Safety
///
/// `dpy` must be a valid, locked display.
unsafe fn build_keycode_map(
    dpy: *mut xlib::Display,
) -> Result<(KeycodeMap, LabelTable), CaptureError> {
    let (mut map, min, max) = if xkb_available(dpy) {
        // Suppresses synthetic releases between auto-repeat presses; failure is harmless.
        let mut supported = 0;
        xlib::XkbSetDetectableAutoRepeat(dpy, xlib::True, &mut supported);

        let names = read_key_names(dpy)?;
        debug!(
            min = names.min_keycode,
            max = names.max_keycode,
            aliases = names.aliases.len(),
            "read Xkb key names"
        );
        (KeycodeMap::from_key_names(&names), names.min_keycode, names.max_keycode)
    } else {
        debug!("Xkb extension unavailable, mapping by keysym only");
        let (mut min, mut max): (c_int, c_int) = (0, 0);
        xlib::XDisplayKeycodes(dpy, &mut min, &mut max);
        let clamp = |v: c_int| u8::try_from(v.clamp(0, 255)).unwrap_or(u8::MAX);
        (KeycodeMap::new(), clamp(min), clamp(max))
    };

    if max < min {
        return Err(CaptureError::Display(format!("invalid keycode range {min}..={max}")));
    }

    let count = c_int::from(max - min) + 1;
    let mut per_keycode: c_int = 0;
    let keysyms = xlib::XGetKeyboardMapping(dpy, min, count, &mut per_keycode);
    if keysyms.is_null() {
        return Err(CaptureError::Display("XGetKeyboardMapping failed".to_string()));
    }

    let per_keycode = usize::try_from(per_keycode).unwrap_or(0);
    let total = per_keycode * count as usize;
    // Keysyms occupy the low 29 bits.
    let syms: Vec<u32> = std::slice::from_raw_parts(keysyms, total)
        .iter()
        .map(|&s| s as u32)
        .collect();
    xlib::XFree(keysyms.cast());

    let mut labels = LabelTable::new();
    map.apply_keysyms(&mut labels, min, per_keycode, &syms);
    Ok((map, labels))
}

// ── Backend ───────────────────────────────────────────────────────────────────

/// Keyboard capture by polling the X server's keymap.
///
/// Sees keys regardless of which window has focus, without grabbing them.
pub struct X11KeyInput {
    display: Option<DisplayHandle>,
    keycodes: KeycodeMap,
    labels: LabelTable,
    last: [u8; KEYMAP_BYTES],
}

impl X11KeyInput {
    /// Opens the display and builds the keycode table.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Display`] if the display cannot be opened or queried.
    /// The connection is closed again on failure.
    pub fn new(_config: &InputConfig) -> Result<Self, CaptureError> {
        let display = DisplayHandle::open()?;
        let (keycodes, labels) = {
            let _lock = display.lock();
            // SAFETY: the display is open and locked for the duration.
            unsafe { build_keycode_map(display.as_ptr())? }
        };

        if keycodes.mapped() == 0 {
            warn!("no X keycode could be mapped to a scan code");
        }
        info!(
            keycodes = keycodes.mapped(),
            labels = labels.len(),
            "display keyboard capture started"
        );

        Ok(Self {
            display: Some(display),
            keycodes,
            labels,
            last: [0; KEYMAP_BYTES],
        })
    }
}

impl KeyInput for X11KeyInput {
    fn get_events(&mut self) -> Vec<KeyEvent> {
        let Some(display) = self.display.as_ref() else {
            return Vec::new();
        };

        let mut next = [0u8; KEYMAP_BYTES];
        {
            let _lock = display.lock();
            // SAFETY: `next` is exactly the 32 bytes XQueryKeymap writes.
            unsafe {
                xlib::XQueryKeymap(display.as_ptr(), next.as_mut_ptr().cast());
            }
        }

        let events = diff_snapshots(&self.last, &next, &self.keycodes);
        self.last = next;
        events
    }

    fn convert_scan_code_to_string(&self, key: ScanCode) -> &'static str {
        self.labels.lookup(key)
    }

    fn dispose(&mut self) {
        if self.display.take().is_some() {
            debug!("display keyboard capture disposed");
        }
    }

    fn kind(&self) -> BackendKind {
        BackendKind::LegacyDisplay
    }
}

impl Drop for X11KeyInput {
    fn drop(&mut self) {
        self.dispose();
    }
}
