//! Windows Raw Input translation and virtual-key label tables.
//!
//! Raw Input reports a keyboard packet as `(MakeCode, Flags, VKey)`.  The make
//! code is already a Set 1 byte, so translating to a [`ScanCode`] is mostly a
//! matter of folding the `E0` flag into bit 7.
//!
//! Labels on Windows go the other way: the native backend asks the active
//! keyboard layout which virtual key sits at each scan code
//! (`MapVirtualKeyExW`), then names that virtual key with
//! [`virtual_key_label`].  A few keys are reported wrongly by that API, so
//! [`scan_code_label_override`] pins their names.
//!
//! Everything here is plain data so it can be tested on any host.

use super::scancode::{KeyEvent, ScanCode, EXTENDED_BIT};

/// `RAWKEYBOARD.Flags`: key released.
pub const RI_KEY_BREAK: u16 = 0x01;
/// `RAWKEYBOARD.Flags`: `E0` prefix.
pub const RI_KEY_E0: u16 = 0x02;
/// `RAWKEYBOARD.Flags`: `E1` prefix (only sent for the legacy Pause sequence).
pub const RI_KEY_E1: u16 = 0x04;

/// Virtual key reported for "no mapping" (`VK__none_`).
pub const VK_NONE: u16 = 0xFF;

/// Translates one Raw Input keyboard packet.
///
/// Returns `None` for packets carrying flags other than `E0`/`BREAK` (the
/// `E1` half of the Pause sequence, terminal-server fake keys).
pub fn translate_raw_keyboard(make_code: u16, flags: u16, vkey: u16) -> Option<KeyEvent> {
    if flags & !(RI_KEY_E0 | RI_KEY_BREAK) != 0 {
        return None;
    }

    let extended = if flags & RI_KEY_E0 != 0 { EXTENDED_BIT } else { 0 };
    let mut sc = ScanCode::from_u8((make_code as u8) | extended);

    // Pause arrives as NumLock with no virtual key.
    if sc == ScanCode::NUMLOCK && vkey == VK_NONE {
        sc = ScanCode::PAUSE;
    }

    Some(KeyEvent::new(sc, flags & RI_KEY_BREAK == 0))
}

/// The scan code argument `MapVirtualKeyExW(MAPVK_VSC_TO_VK_EX)` expects:
/// extended codes are passed as `0xE000 | low7`.
pub fn map_virtual_key_input(sc: ScanCode) -> u32 {
    let raw = u32::from(sc.as_u8());
    if sc.is_extended() {
        0xE000 | (raw & 0x7F)
    } else {
        raw
    }
}

/// Fixed labels for keys `MapVirtualKeyExW` does not resolve reliably.
pub fn scan_code_label_override(sc: ScanCode) -> Option<&'static str> {
    let label = match sc {
        ScanCode::NUMPAD0 => "Numpad 0",
        ScanCode::NUMPAD1 => "Numpad 1",
        ScanCode::NUMPAD2 => "Numpad 2",
        ScanCode::NUMPAD3 => "Numpad 3",
        ScanCode::NUMPAD4 => "Numpad 4",
        ScanCode::NUMPAD5 => "Numpad 5",
        ScanCode::NUMPAD6 => "Numpad 6",
        ScanCode::NUMPAD7 => "Numpad 7",
        ScanCode::NUMPAD8 => "Numpad 8",
        ScanCode::NUMPAD9 => "Numpad 9",
        ScanCode::DECIMAL => "Decimal",
        ScanCode::NUMPADENTER => "Numpad Enter",
        ScanCode::PAUSE => "Pause",
        ScanCode::POWER => "Power",
        ScanCode::WAKE => "Wake",
        ScanCode::INTL2 => "Intl 2",
        ScanCode::INTL3 => "Intl 3",
        ScanCode::INTL4 => "Intl 4",
        ScanCode::LANG3 => "Lang 3",
        ScanCode::LANG4 => "Lang 4",
        _ => return None,
    };
    Some(label)
}

/// Names a Windows virtual-key code (`VK_*`).
pub fn virtual_key_label(vk: u32) -> Option<&'static str> {
    const LETTERS: [&str; 26] = [
        "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q",
        "R", "S", "T", "U", "V", "W", "X", "Y", "Z",
    ];
    const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
    const NUMPAD: [&str; 10] = [
        "Numpad 0", "Numpad 1", "Numpad 2", "Numpad 3", "Numpad 4", "Numpad 5", "Numpad 6",
        "Numpad 7", "Numpad 8", "Numpad 9",
    ];
    const FUNCTION: [&str; 24] = [
        "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10", "F11", "F12", "F13", "F14",
        "F15", "F16", "F17", "F18", "F19", "F20", "F21", "F22", "F23", "F24",
    ];

    let label = match vk {
        0x03 => "Cancel",
        0x08 => "Backspace",
        0x09 => "Tab",
        0x0C => "Clear",
        0x0D => "Enter",
        0x13 => "Pause",
        0x14 => "Caps Lock",
        0x15 => "Kana",
        0x16 => "Ime On",
        0x17 => "Junja",
        0x18 => "Final",
        0x19 => "Kanji",
        0x1A => "Ime Off",
        0x1B => "Escape",
        0x1C => "Ime Convert",
        0x1D => "Ime Nonconvert",
        0x1E => "Ime Accept",
        0x1F => "Ime Mode Change",
        0x20 => "Spacebar",
        0x21 => "Page Up",
        0x22 => "Page Down",
        0x23 => "End",
        0x24 => "Home",
        0x25 => "Left",
        0x26 => "Up",
        0x27 => "Right",
        0x28 => "Down",
        0x29 => "Select",
        0x2A => "Print",
        0x2B => "Execute",
        0x2C => "Print Screen",
        0x2D => "Insert",
        0x2E => "Delete",
        0x2F => "Help",
        0x30..=0x39 => DIGITS[(vk - 0x30) as usize],
        0x41..=0x5A => LETTERS[(vk - 0x41) as usize],
        0x5B => "Left Windows",
        0x5C => "Right Windows",
        0x5D => "Applications",
        0x5F => "Sleep",
        0x60..=0x69 => NUMPAD[(vk - 0x60) as usize],
        0x6A => "Multiply",
        0x6B => "Add",
        0x6C => "Separator",
        0x6D => "Substract",
        0x6E => "Decimal",
        0x6F => "Divide",
        0x70..=0x87 => FUNCTION[(vk - 0x70) as usize],
        0x90 => "NumLock",
        0x91 => "ScrollLock",
        0xA0 => "Left Shift",
        0xA1 => "Right Shift",
        0xA2 => "Left Control",
        0xA3 => "Right Control",
        0xA4 => "Left Alt",
        0xA5 => "Right Alt",
        0xA6 => "Back",
        0xA7 => "Forward",
        0xA8 => "Refresh",
        0xA9 => "Browser Stop",
        0xAA => "Search",
        0xAB => "Favorites",
        0xAC => "Browser Home",
        0xAD => "Mute",
        0xAE => "Volume Down",
        0xAF => "Volume Up",
        0xB0 => "Next Track",
        0xB1 => "Prev Track",
        0xB2 => "Media Stop",
        0xB3 => "Play/Pause",
        0xB4 => "Mail",
        0xB5 => "Media",
        0xB6 => "App1",
        0xB7 => "App2",
        0xBA => "Semicolon",
        0xBB => "Equals",
        0xBC => "Comma",
        0xBD => "Minus",
        0xBE => "Period",
        0xBF => "Question",
        0xC0 => "Tilde",
        0xC1 => "Abnt C1",
        0xC2 => "Abnt C2",
        0xDB => "Left Bracket",
        0xDC => "Pipe",
        0xDD => "Right Bracket",
        0xDE => "Quotes",
        0xDF => "Section",
        0xE1 => "Ax",
        0xE2 => "Oem 102",
        0xE5 => "Process",
        0xF6 => "Attn",
        0xFA => "Play",
        0xFB => "Zoom",
        0xFE => "Oem Clear",
        _ => return None,
    };
    Some(label)
}
