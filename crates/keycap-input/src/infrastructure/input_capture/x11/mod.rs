//! Legacy X11 backend: keymap snapshot polling.
//!
//! X11 has no "global key event" request without grabbing, but
//! `XQueryKeymap` returns a 256-bit map of which keycodes are down right now.
//! The backend polls that map and reports the bits that changed since the
//! previous poll.  Keycodes are resolved to [`ScanCode`]s once at start-up:
//!
//! 1. By Xkb key name (`AE01`, `AC01`, ...), which is layout-independent.
//!    A name missing from the table is looked up through the alias list.
//! 2. Otherwise by the key's first keysym (second when it is a keypad
//!    digit), which assumes a US-like layout.
//!
//! Everything in this file is plain data handling; the Xlib calls live in
//! `display`.

#[cfg(target_os = "linux")]
mod display;

#[cfg(target_os = "linux")]
pub use display::X11KeyInput;

use keycap_core::keymap::keysym::is_keypad_value_keysym;
use keycap_core::keymap::xkb_names::XKB_KEY_NAME_LENGTH;
use keycap_core::keymap::{keysym_label, keysym_to_scan_code, xkb_key_name_to_scan_code};
use keycap_core::{KeyEvent, ScanCode};

use super::LabelTable;

/// Size of the `XQueryKeymap` bitmap in bytes.
pub const KEYMAP_BYTES: usize = 32;

/// A 4-byte Xkb key name, NUL-padded.
pub type KeyName = [u8; XKB_KEY_NAME_LENGTH];

/// One `XkbKeyAliasRec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyAlias {
    pub real: KeyName,
    pub alias: KeyName,
}

/// Key names read from the server, indexed by keycode.
#[derive(Debug, Clone, Default)]
pub struct KeyNames {
    pub min_keycode: u8,
    pub max_keycode: u8,
    /// `names[keycode - min_keycode]`.
    pub names: Vec<KeyName>,
    pub aliases: Vec<KeyAlias>,
}

/// X keycode → [`ScanCode`] table.
#[derive(Clone, PartialEq, Eq)]
pub struct KeycodeMap {
    entries: [Option<ScanCode>; 256],
}

impl KeycodeMap {
    pub const fn new() -> Self {
        Self {
            entries: [None; 256],
        }
    }

    pub fn get(&self, keycode: u8) -> Option<ScanCode> {
        self.entries[usize::from(keycode)]
    }

    pub fn set(&mut self, keycode: u8, sc: ScanCode) {
        self.entries[usize::from(keycode)] = Some(sc);
    }

    /// Number of keycodes with a ScanCode.
    pub fn mapped(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// Builds the table from Xkb key names, falling back to aliases.
    pub fn from_key_names(names: &KeyNames) -> Self {
        let mut map = Self::new();
        for (offset, name) in names.names.iter().enumerate() {
            let Some(keycode) = usize::from(names.min_keycode)
                .checked_add(offset)
                .and_then(|kc| u8::try_from(kc).ok())
            else {
                break;
            };
            if keycode > names.max_keycode {
                break;
            }

            let resolved = xkb_key_name_to_scan_code(name).or_else(|| {
                names
                    .aliases
                    .iter()
                    .filter(|a| a.real == *name)
                    .find_map(|a| xkb_key_name_to_scan_code(&a.alias))
            });
            if let Some(sc) = resolved {
                map.set(keycode, sc);
            }
        }
        map
    }

    /// Fills unmapped keycodes from keysyms and records a label for every
    /// mapped keycode.
    ///
    /// `keysyms` is the `XGetKeyboardMapping` result for keycodes starting at
    /// `min_keycode`, `per_keycode` entries each.
    pub fn apply_keysyms(
        &mut self,
        labels: &mut LabelTable,
        min_keycode: u8,
        per_keycode: usize,
        keysyms: &[u32],
    ) {
        if per_keycode == 0 {
            return;
        }
        for (offset, syms) in keysyms.chunks_exact(per_keycode).enumerate() {
            let Some(keycode) = usize::from(min_keycode)
                .checked_add(offset)
                .and_then(|kc| u8::try_from(kc).ok())
            else {
                break;
            };
            let keysym = choose_keysym(syms);

            if self.get(keycode).is_none() {
                if let Some(sc) = keysym_to_scan_code(keysym) {
                    self.set(keycode, sc);
                }
            }
            if let (Some(sc), Some(label)) = (self.get(keycode), keysym_label(keysym)) {
                labels.set(sc, label);
            }
        }
    }
}

impl Default for KeycodeMap {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KeycodeMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .enumerate()
                    .filter_map(|(kc, sc)| sc.map(|sc| (kc, sc))),
            )
            .finish()
    }
}

/// Picks the keysym that identifies a key: the first, or the second when it
/// is a keypad value (NumLock-on symbol of a keypad key).
pub fn choose_keysym(syms: &[u32]) -> u32 {
    match syms {
        [_, second, ..] if is_keypad_value_keysym(*second) => *second,
        [first, ..] => *first,
        [] => 0,
    }
}

/// Compares two keymap snapshots and reports each mapped keycode whose bit
/// changed, in keycode order.
pub fn diff_snapshots(
    prev: &[u8; KEYMAP_BYTES],
    next: &[u8; KEYMAP_BYTES],
    map: &KeycodeMap,
) -> Vec<KeyEvent> {
    let mut events = Vec::new();
    for (byte, (old, new)) in prev.iter().zip(next.iter()).enumerate() {
        let changed = old ^ new;
        if changed == 0 {
            continue;
        }
        for bit in 0..8u8 {
            if changed & (1 << bit) == 0 {
                continue;
            }
            let keycode = (byte as u8) * 8 + bit;
            if let Some(sc) = map.get(keycode) {
                events.push(KeyEvent::new(sc, new & (1 << bit) != 0));
            }
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use keycap_core::keymap::keysym::{XK_KP_0, XK_KP_END, XK_NUM_LOCK};

    fn name(s: &str) -> KeyName {
        let mut out = [0u8; XKB_KEY_NAME_LENGTH];
        out[..s.len()].copy_from_slice(s.as_bytes());
        out
    }

    #[test]
    fn test_key_name_resolves_without_keysyms() {
        // Arrange
        let names = KeyNames {
            min_keycode: 8,
            max_keycode: 10,
            names: vec![name(""), name("ESC"), name("AE01")],
            aliases: Vec::new(),
        };

        // Act
        let map = KeycodeMap::from_key_names(&names);

        // Assert
        assert_eq!(map.get(10), Some(ScanCode::DIGIT1));
        assert_eq!(map.get(9), Some(ScanCode::ESCAPE));
        assert_eq!(map.get(8), None);
        assert_eq!(map.mapped(), 2);
    }

    #[test]
    fn test_unknown_name_resolves_through_its_alias() {
        let names = KeyNames {
            min_keycode: 8,
            max_keycode: 9,
            names: vec![name("I999"), name("XXXX")],
            aliases: vec![
                KeyAlias {
                    real: name("YYYY"),
                    alias: name("AC02"),
                },
                KeyAlias {
                    real: name("XXXX"),
                    alias: name("AC01"),
                },
            ],
        };

        let map = KeycodeMap::from_key_names(&names);

        assert_eq!(map.get(9), Some(ScanCode::A));
        assert_eq!(map.get(8), None);
    }

    #[test]
    fn test_keysyms_fill_gaps_and_label_every_mapped_key() {
        // Arrange: keycode 10 is named AE01 but carries 'a'; keycode 11 has
        // no usable name and carries 'q'.
        let mut map = KeycodeMap::new();
        map.set(10, ScanCode::DIGIT1);
        let mut labels = LabelTable::new();
        let keysyms = [0x61, 0x41, 0x71, 0x51];

        // Act
        map.apply_keysyms(&mut labels, 10, 2, &keysyms);

        // Assert
        assert_eq!(map.get(11), Some(ScanCode::Q));
        assert_eq!(labels.get(ScanCode::DIGIT1), Some("A"));
        assert_eq!(labels.get(ScanCode::Q), Some("Q"));
    }

    #[test]
    fn test_keypad_keys_use_their_numlock_symbol() {
        assert_eq!(choose_keysym(&[XK_KP_END, XK_KP_0 + 1]), XK_KP_0 + 1);
        assert_eq!(choose_keysym(&[XK_NUM_LOCK, 0]), XK_NUM_LOCK);
        assert_eq!(choose_keysym(&[0x61]), 0x61);
        assert_eq!(choose_keysym(&[]), 0);
    }

    #[test]
    fn test_snapshot_diff_reports_single_bit_change() {
        // Arrange
        let mut map = KeycodeMap::new();
        map.set(38, ScanCode::A);
        let prev = [0u8; KEYMAP_BYTES];
        let mut next = prev;
        next[38 / 8] |= 1 << (38 % 8);

        // Act / Assert
        assert_eq!(diff_snapshots(&prev, &next, &map), vec![KeyEvent::press(ScanCode::A)]);
        assert_eq!(diff_snapshots(&next, &prev, &map), vec![KeyEvent::release(ScanCode::A)]);
        assert!(diff_snapshots(&next, &next, &map).is_empty());
    }

    #[test]
    fn test_snapshot_diff_ignores_unmapped_keycodes() {
        let map = KeycodeMap::new();
        let prev = [0u8; KEYMAP_BYTES];
        let next = [0xFFu8; KEYMAP_BYTES];
        assert!(diff_snapshots(&prev, &next, &map).is_empty());
    }

    #[test]
    fn test_snapshot_diff_covers_highest_keycode() {
        let mut map = KeycodeMap::new();
        map.set(255, ScanCode::F13);
        let prev = [0u8; KEYMAP_BYTES];
        let mut next = prev;
        next[31] = 0x80;
        assert_eq!(diff_snapshots(&prev, &next, &map), vec![KeyEvent::press(ScanCode::F13)]);
    }
}
