//! Compositor keymap: mapping the shared fd, compiling it with xkbcommon and
//! deriving per-key labels.

use std::fs::File;
use std::os::fd::OwnedFd;

use keycap_core::keymap::evdev::XKB_EVDEV_OFFSET;
use keycap_core::keymap::{evdev_to_scan_code, keysym_label};
use memmap2::MmapOptions;
use xkbcommon::xkb;

use super::WaylandError;
use crate::infrastructure::input_capture::LabelTable;

/// Highest xkb keycode considered when building labels.
const MAX_LABEL_KEYCODE: u32 = 256;

/// Maps the keymap fd privately and returns its text without trailing NULs.
pub fn map_keymap(fd: OwnedFd, size: u32) -> Result<String, WaylandError> {
    if size == 0 {
        return Err(WaylandError::NoKeymap);
    }
    let file = File::from(fd);
    // SAFETY: the compositor sends a sealed or private copy of the keymap;
    // the mapping is private and read-only and dropped before returning.
    let map = unsafe {
        MmapOptions::new()
            .len(size as usize)
            .map_copy_read_only(&file)
    }?;

    let end = map.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    Ok(String::from_utf8_lossy(&map[..end]).into_owned())
}

/// A compiled keymap plus a fresh state to query unmodified symbols.
pub struct CompiledKeymap {
    keymap: xkb::Keymap,
    state: xkb::State,
}

impl CompiledKeymap {
    /// Compiles `text` in `XKB_KEYMAP_FORMAT_TEXT_V1`.
    pub fn compile(text: String) -> Result<Self, WaylandError> {
        let context = xkb::Context::new(xkb::CONTEXT_NO_FLAGS);
        let keymap = xkb::Keymap::new_from_string(
            &context,
            text,
            xkb::KEYMAP_FORMAT_TEXT_V1,
            xkb::COMPILE_NO_FLAGS,
        )
        .ok_or(WaylandError::KeymapCompile)?;
        let state = xkb::State::new(&keymap);
        Ok(Self { keymap, state })
    }

    /// Unmodified keysym for an xkb keycode.
    pub fn keysym(&self, keycode: u32) -> u32 {
        self.state.key_get_one_sym(xkb::Keycode::new(keycode)).raw()
    }

    /// Labels every key in the keymap that has a ScanCode.
    pub fn labels(&self) -> LabelTable {
        build_keymap_labels(
            self.keymap.min_keycode().raw(),
            self.keymap.max_keycode().raw(),
            |keycode| self.keysym(keycode),
        )
    }
}

/// Builds a label table over `[max(min, 8), min(max, 256)]` using `sym_for` to
/// resolve each xkb keycode's unmodified keysym.
pub fn build_keymap_labels(min: u32, max: u32, sym_for: impl Fn(u32) -> u32) -> LabelTable {
    let mut labels = LabelTable::new();
    let first = min.max(XKB_EVDEV_OFFSET);
    let last = max.min(MAX_LABEL_KEYCODE);

    for keycode in first..=last {
        let Ok(code) = u16::try_from(keycode - XKB_EVDEV_OFFSET) else {
            continue;
        };
        let Some(sc) = evdev_to_scan_code(code) else {
            continue;
        };
        if let Some(label) = keysym_label(sym_for(keycode)) {
            labels.set(sc, label);
        }
    }
    labels
}
