//! Per-backend label table built once at construction.
//!
//! Backends with layout data (compositor keymap, X11 keysyms, the Windows
//! keyboard layout) resolve a label for each [`ScanCode`] up front and store it
//! here.  Lookups fall back to the static hardware-position table for keys the
//! layout did not name.

use std::fmt;

use keycap_core::keymap::scan_code_label;
use keycap_core::keymap::windows_vk::{
    map_virtual_key_input, scan_code_label_override, virtual_key_label,
};
use keycap_core::ScanCode;

/// Layout-derived labels indexed by ScanCode byte.
#[derive(Clone, PartialEq, Eq)]
pub struct LabelTable {
    entries: [Option<&'static str>; 256],
}

impl LabelTable {
    /// An empty table: every lookup falls back to the static table.
    pub const fn new() -> Self {
        Self {
            entries: [None; 256],
        }
    }

    /// Records the layout label for `sc`.  Later calls overwrite earlier ones.
    pub fn set(&mut self, sc: ScanCode, label: &'static str) {
        self.entries[usize::from(sc.as_u8())] = Some(label);
    }

    /// Returns the layout label for `sc`, if one was recorded.
    pub fn get(&self, sc: ScanCode) -> Option<&'static str> {
        self.entries[usize::from(sc.as_u8())]
    }

    /// Returns the layout label, else the static label, else `""`.
    pub fn lookup(&self, sc: ScanCode) -> &'static str {
        self.get(sc).unwrap_or_else(|| scan_code_label(sc))
    }

    /// Number of keys with a layout label.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds a table from a keyboard layout's scan code → virtual key
    /// mapping.
    ///
    /// `vk_for` receives the `MapVirtualKeyExW` scan code argument (see
    /// [`map_virtual_key_input`]) and returns the virtual key, or 0.  Keys
    /// with a fixed override never consult the layout.
    pub fn from_virtual_keys(vk_for: impl Fn(u32) -> u32) -> Self {
        let mut table = Self::new();
        for byte in 1..=u8::MAX {
            let sc = ScanCode::from_u8(byte);
            let label = scan_code_label_override(sc)
                .or_else(|| virtual_key_label(vk_for(map_virtual_key_input(sc))));
            if let Some(label) = label {
                table.set(sc, label);
            }
        }
        table
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LabelTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .enumerate()
                    .filter_map(|(i, e)| e.map(|label| (ScanCode::from_u8(i as u8), label))),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_falls_back_to_static_labels() {
        let table = LabelTable::new();
        assert!(table.is_empty());
        assert_eq!(table.lookup(ScanCode::A), "A");
        assert_eq!(table.lookup(ScanCode::from_u8(0x55)), "");
    }

    #[test]
    fn test_layout_label_overrides_static_label() {
        // Arrange: an AZERTY layout puts "A" on the QWERTY "Q" key.
        let mut table = LabelTable::new();

        // Act
        table.set(ScanCode::Q, "A");

        // Assert
        assert_eq!(table.lookup(ScanCode::Q), "A");
        assert_eq!(table.lookup(ScanCode::W), "W");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_virtual_key_table_uses_layout_and_overrides() {
        // Arrange: a layout that swaps the Q and A positions (VK_A = 0x41,
        // VK_Q = 0x51) and also claims Numpad Enter is plain Enter.
        let vk_for = |input: u32| match input {
            0x10 => 0x41,
            0x1E => 0x51,
            0xE01C => 0x0D,
            _ => 0,
        };

        // Act
        let table = LabelTable::from_virtual_keys(vk_for);

        // Assert
        assert_eq!(table.get(ScanCode::Q), Some("A"));
        assert_eq!(table.get(ScanCode::A), Some("Q"));
        assert_eq!(table.get(ScanCode::NUMPADENTER), Some("Numpad Enter"));
        assert_eq!(table.get(ScanCode::W), None);
        assert_eq!(table.lookup(ScanCode::W), "W");
    }

    #[test]
    fn test_extended_codes_index_their_own_slot() {
        let mut table = LabelTable::new();
        table.set(ScanCode::RIGHTALT, "AltGr");
        assert_eq!(table.get(ScanCode::RIGHTALT), Some("AltGr"));
        assert_eq!(table.get(ScanCode::LEFTALT), None);
    }
}
