//! X11/xkb KeySym to [`ScanCode`] and KeySym to label tables.
//!
//! KeySym values are defined in `X11/keysymdef.h` (xkbcommon uses the same
//! numbering in `xkbcommon-keysyms.h`).
//!
//! # Why two tables?
//!
//! The legacy display backend uses [`keysym_to_scan_code`] to place keys that
//! have no canonical Xkb key name.  Both display backends use
//! [`keysym_label`] to name a key after the symbol the *active* layout puts on
//! it, so an AZERTY user sees "A" on the key a QWERTY user calls "Q".
//!
//! Shifted punctuation resolves to the key that produces it on a US layout
//! (`XK_exclam` is on the `1` key), which is what makes the label table useful
//! when a layout's unshifted level is a symbol.

use super::scancode::ScanCode;

pub const XK_BACKSPACE: u32 = 0xFF08;
pub const XK_TAB: u32 = 0xFF09;
pub const XK_RETURN: u32 = 0xFF0D;
pub const XK_PAUSE: u32 = 0xFF13;
pub const XK_SCROLL_LOCK: u32 = 0xFF14;
pub const XK_SYS_REQ: u32 = 0xFF15;
pub const XK_ESCAPE: u32 = 0xFF1B;
pub const XK_HOME: u32 = 0xFF50;
pub const XK_LEFT: u32 = 0xFF51;
pub const XK_UP: u32 = 0xFF52;
pub const XK_RIGHT: u32 = 0xFF53;
pub const XK_DOWN: u32 = 0xFF54;
pub const XK_PAGE_UP: u32 = 0xFF55;
pub const XK_PAGE_DOWN: u32 = 0xFF56;
pub const XK_END: u32 = 0xFF57;
pub const XK_PRINT: u32 = 0xFF61;
pub const XK_INSERT: u32 = 0xFF63;
pub const XK_MENU: u32 = 0xFF67;
pub const XK_BREAK: u32 = 0xFF6B;
pub const XK_MODE_SWITCH: u32 = 0xFF7E;
pub const XK_NUM_LOCK: u32 = 0xFF7F;
pub const XK_KP_ENTER: u32 = 0xFF8D;
pub const XK_KP_HOME: u32 = 0xFF95;
pub const XK_KP_LEFT: u32 = 0xFF96;
pub const XK_KP_UP: u32 = 0xFF97;
pub const XK_KP_RIGHT: u32 = 0xFF98;
pub const XK_KP_DOWN: u32 = 0xFF99;
pub const XK_KP_PAGE_UP: u32 = 0xFF9A;
pub const XK_KP_PAGE_DOWN: u32 = 0xFF9B;
pub const XK_KP_END: u32 = 0xFF9C;
pub const XK_KP_INSERT: u32 = 0xFF9E;
pub const XK_KP_DELETE: u32 = 0xFF9F;
pub const XK_KP_MULTIPLY: u32 = 0xFFAA;
pub const XK_KP_ADD: u32 = 0xFFAB;
pub const XK_KP_SEPARATOR: u32 = 0xFFAC;
pub const XK_KP_SUBTRACT: u32 = 0xFFAD;
pub const XK_KP_DECIMAL: u32 = 0xFFAE;
pub const XK_KP_DIVIDE: u32 = 0xFFAF;
pub const XK_KP_0: u32 = 0xFFB0;
pub const XK_KP_9: u32 = 0xFFB9;
pub const XK_KP_EQUAL: u32 = 0xFFBD;
pub const XK_F1: u32 = 0xFFBE;
pub const XK_F24: u32 = 0xFFD5;
pub const XK_SHIFT_L: u32 = 0xFFE1;
pub const XK_SHIFT_R: u32 = 0xFFE2;
pub const XK_CONTROL_L: u32 = 0xFFE3;
pub const XK_CONTROL_R: u32 = 0xFFE4;
pub const XK_CAPS_LOCK: u32 = 0xFFE5;
pub const XK_META_L: u32 = 0xFFE7;
pub const XK_META_R: u32 = 0xFFE8;
pub const XK_ALT_L: u32 = 0xFFE9;
pub const XK_ALT_R: u32 = 0xFFEA;
pub const XK_SUPER_L: u32 = 0xFFEB;
pub const XK_SUPER_R: u32 = 0xFFEC;
pub const XK_DELETE: u32 = 0xFFFF;
pub const XK_ISO_LEVEL3_SHIFT: u32 = 0xFE03;

/// `true` for the numeric keypad symbols that the legacy display backend
/// prefers from a keycode's second symbol slot.
pub fn is_keypad_value_keysym(keysym: u32) -> bool {
    matches!(
        keysym,
        XK_KP_0..=XK_KP_9 | XK_KP_SEPARATOR | XK_KP_DECIMAL | XK_KP_EQUAL | XK_KP_ENTER
    )
}

/// Translates a KeySym to the [`ScanCode`] of the key that carries it on a
/// US layout.
///
/// Returns `None` for symbols with no fixed key (dead keys, Latin-1 letters
/// outside ASCII, ...).
pub fn keysym_to_scan_code(keysym: u32) -> Option<ScanCode> {
    let sc = match keysym {
        // Letters, both cases (XK_A..XK_Z, XK_a..XK_z)
        0x41..=0x5A => letter_scan_code(keysym - 0x41),
        0x61..=0x7A => letter_scan_code(keysym - 0x61),
        // Digits XK_0..XK_9
        0x30 => ScanCode::DIGIT0,
        0x31..=0x39 => ScanCode::from_u8((keysym - 0x31) as u8 + ScanCode::DIGIT1.as_u8()),
        // Shifted digits on a US layout
        0x29 => ScanCode::DIGIT0, // XK_parenright
        0x21 => ScanCode::DIGIT1, // XK_exclam
        0x40 => ScanCode::DIGIT2, // XK_at
        0x23 => ScanCode::DIGIT3, // XK_numbersign
        0x24 => ScanCode::DIGIT4, // XK_dollar
        0x25 => ScanCode::DIGIT5, // XK_percent
        0x5E => ScanCode::DIGIT6, // XK_asciicircum
        0x26 => ScanCode::DIGIT7, // XK_ampersand
        0x2A => ScanCode::DIGIT8, // XK_asterisk
        0x28 => ScanCode::DIGIT9, // XK_parenleft
        // Punctuation, unshifted and shifted
        0x2D | 0x5F => ScanCode::MINUS,        // XK_minus, XK_underscore
        0x3D | 0x2B => ScanCode::EQUALS,       // XK_equal, XK_plus
        0x5B | 0x7B => ScanCode::LEFTBRACKET,  // XK_bracketleft, XK_braceleft
        0x5D | 0x7D => ScanCode::RIGHTBRACKET, // XK_bracketright, XK_braceright
        0x5C | 0x7C => ScanCode::BACKSLASH,    // XK_backslash, XK_bar
        0x3B | 0x3A => ScanCode::SEMICOLON,    // XK_semicolon, XK_colon
        0x27 | 0x22 => ScanCode::APOSTROPHE,   // XK_apostrophe, XK_quotedbl
        0x60 | 0x7E => ScanCode::GRAVE,        // XK_grave, XK_asciitilde
        0x2C | 0x3C => ScanCode::COMMA,        // XK_comma, XK_less
        0x2E | 0x3E => ScanCode::PERIOD,       // XK_period, XK_greater
        0x2F | 0x3F => ScanCode::SLASH,        // XK_slash, XK_question
        0x20 => ScanCode::SPACEBAR,            // XK_space
        // TTY function keys
        XK_ESCAPE => ScanCode::ESCAPE,
        XK_RETURN => ScanCode::ENTER,
        XK_BACKSPACE => ScanCode::BACKSPACE,
        XK_TAB => ScanCode::TAB,
        XK_PAUSE | XK_BREAK => ScanCode::PAUSE,
        XK_SCROLL_LOCK => ScanCode::SCROLLLOCK,
        XK_PRINT | XK_SYS_REQ => ScanCode::PRINTSCREEN,
        XK_DELETE => ScanCode::DELETE,
        XK_INSERT => ScanCode::INSERT,
        XK_HOME => ScanCode::HOME,
        XK_END => ScanCode::END,
        XK_PAGE_UP => ScanCode::PAGEUP,
        XK_PAGE_DOWN => ScanCode::PAGEDOWN,
        XK_LEFT => ScanCode::LEFT,
        XK_RIGHT => ScanCode::RIGHT,
        XK_UP => ScanCode::UP,
        XK_DOWN => ScanCode::DOWN,
        // Modifiers and locks
        XK_SHIFT_L => ScanCode::LEFTSHIFT,
        XK_SHIFT_R => ScanCode::RIGHTSHIFT,
        XK_CONTROL_L => ScanCode::LEFTCONTROL,
        XK_CONTROL_R => ScanCode::RIGHTCONTROL,
        XK_ALT_L | XK_META_L => ScanCode::LEFTALT,
        XK_ALT_R | XK_META_R | XK_MODE_SWITCH | XK_ISO_LEVEL3_SHIFT => ScanCode::RIGHTALT,
        XK_SUPER_L => ScanCode::LEFTGUI,
        XK_SUPER_R => ScanCode::RIGHTGUI,
        XK_MENU => ScanCode::APPS,
        XK_CAPS_LOCK => ScanCode::CAPSLOCK,
        XK_NUM_LOCK => ScanCode::NUMLOCK,
        // Function keys XK_F1..XK_F24
        XK_F1..=XK_F24 => function_key_scan_code(keysym - XK_F1),
        // Keypad
        XK_KP_0..=XK_KP_9 => keypad_digit_scan_code(keysym - XK_KP_0),
        XK_KP_INSERT => ScanCode::NUMPAD0,
        XK_KP_END => ScanCode::NUMPAD1,
        XK_KP_DOWN => ScanCode::NUMPAD2,
        XK_KP_PAGE_DOWN => ScanCode::NUMPAD3,
        XK_KP_LEFT => ScanCode::NUMPAD4,
        XK_KP_RIGHT => ScanCode::NUMPAD6,
        XK_KP_HOME => ScanCode::NUMPAD7,
        XK_KP_UP => ScanCode::NUMPAD8,
        XK_KP_PAGE_UP => ScanCode::NUMPAD9,
        XK_KP_DELETE | XK_KP_DECIMAL => ScanCode::DECIMAL,
        XK_KP_ENTER => ScanCode::NUMPADENTER,
        XK_KP_ADD => ScanCode::ADD,
        XK_KP_SUBTRACT => ScanCode::SUBSTRACT,
        XK_KP_MULTIPLY => ScanCode::MULTIPLY,
        XK_KP_DIVIDE => ScanCode::DIVIDE,
        XK_KP_SEPARATOR => ScanCode::SEPARATOR,
        _ => return None,
    };
    Some(sc)
}

/// Returns the display label for the key carrying `keysym`.
///
/// Returns `None` when the symbol has no label; callers then fall back to the
/// hardware-position table.
pub fn keysym_label(keysym: u32) -> Option<&'static str> {
    const LETTERS: [&str; 26] = [
        "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q",
        "R", "S", "T", "U", "V", "W", "X", "Y", "Z",
    ];
    const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
    const KEYPAD: [&str; 10] = [
        "Numpad 0", "Numpad 1", "Numpad 2", "Numpad 3", "Numpad 4", "Numpad 5", "Numpad 6",
        "Numpad 7", "Numpad 8", "Numpad 9",
    ];
    const FUNCTION: [&str; 24] = [
        "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10", "F11", "F12", "F13", "F14",
        "F15", "F16", "F17", "F18", "F19", "F20", "F21", "F22", "F23", "F24",
    ];

    let label = match keysym {
        0x41..=0x5A => LETTERS[(keysym - 0x41) as usize],
        0x61..=0x7A => LETTERS[(keysym - 0x61) as usize],
        0x30..=0x39 => DIGITS[(keysym - 0x30) as usize],
        0x29 => "0", // XK_parenright
        0x21 => "1", // XK_exclam
        0x40 => "2", // XK_at
        0x23 => "3", // XK_numbersign
        0x24 => "4", // XK_dollar
        0x25 => "5", // XK_percent
        0x5E => "6", // XK_asciicircum
        0x26 => "7", // XK_ampersand
        0x2A => "8", // XK_asterisk
        0x28 => "9", // XK_parenleft
        0x2D | 0x5F => "Minus",
        0x3D | 0x2B => "Equals",
        0x5B | 0x7B => "Left Bracket",
        0x5D | 0x7D => "Right Bracket",
        0x5C | 0x7C => "Pipe",
        0x3B | 0x3A => "Semicolon",
        0x27 | 0x22 => "Quotes",
        0x60 | 0x7E => "Tilde",
        0x2C | 0x3C => "Comma",
        0x2E | 0x3E => "Period",
        0x2F | 0x3F => "Question",
        0x20 => "Spacebar",
        XK_ESCAPE => "Escape",
        XK_RETURN => "Enter",
        XK_BACKSPACE => "Backspace",
        XK_TAB => "Tab",
        XK_PAUSE | XK_BREAK => "Pause",
        XK_SCROLL_LOCK => "Scroll Lock",
        XK_PRINT | XK_SYS_REQ => "Print Screen",
        XK_DELETE => "Delete",
        XK_INSERT => "Insert",
        XK_HOME => "Home",
        XK_END => "End",
        XK_PAGE_UP => "Page Up",
        XK_PAGE_DOWN => "Page Down",
        XK_LEFT => "Left",
        XK_RIGHT => "Right",
        XK_UP => "Up",
        XK_DOWN => "Down",
        XK_SHIFT_L => "Left Shift",
        XK_SHIFT_R => "Right Shift",
        XK_CONTROL_L => "Left Control",
        XK_CONTROL_R => "Right Control",
        XK_ALT_L | XK_META_L => "Left Alt",
        XK_ALT_R | XK_META_R | XK_MODE_SWITCH | XK_ISO_LEVEL3_SHIFT => "Right Alt",
        XK_SUPER_L => "Left Super",
        XK_SUPER_R => "Right Super",
        XK_MENU => "Menu",
        XK_CAPS_LOCK => "Caps Lock",
        XK_NUM_LOCK => "Num Lock",
        XK_F1..=XK_F24 => FUNCTION[(keysym - XK_F1) as usize],
        XK_KP_0..=XK_KP_9 => KEYPAD[(keysym - XK_KP_0) as usize],
        XK_KP_INSERT => "Numpad 0",
        XK_KP_END => "Numpad 1",
        XK_KP_DOWN => "Numpad 2",
        XK_KP_PAGE_DOWN => "Numpad 3",
        XK_KP_LEFT => "Numpad 4",
        XK_KP_RIGHT => "Numpad 6",
        XK_KP_HOME => "Numpad 7",
        XK_KP_UP => "Numpad 8",
        XK_KP_PAGE_UP => "Numpad 9",
        XK_KP_DELETE | XK_KP_DECIMAL => "Decimal",
        XK_KP_ENTER => "Numpad Enter",
        XK_KP_ADD => "Add",
        XK_KP_SUBTRACT => "Subtract",
        XK_KP_MULTIPLY => "Multiply",
        XK_KP_DIVIDE => "Divide",
        _ => return None,
    };
    Some(label)
}

fn letter_scan_code(index: u32) -> ScanCode {
    const QWERTY: [ScanCode; 26] = [
        ScanCode::A,
        ScanCode::B,
        ScanCode::C,
        ScanCode::D,
        ScanCode::E,
        ScanCode::F,
        ScanCode::G,
        ScanCode::H,
        ScanCode::I,
        ScanCode::J,
        ScanCode::K,
        ScanCode::L,
        ScanCode::M,
        ScanCode::N,
        ScanCode::O,
        ScanCode::P,
        ScanCode::Q,
        ScanCode::R,
        ScanCode::S,
        ScanCode::T,
        ScanCode::U,
        ScanCode::V,
        ScanCode::W,
        ScanCode::X,
        ScanCode::Y,
        ScanCode::Z,
    ];
    QWERTY[index as usize]
}

fn function_key_scan_code(index: u32) -> ScanCode {
    // F1..F10, F11/F12 and F13..F24 live in three separate Set 1 ranges.
    match index {
        0..=9 => ScanCode::from_u8(ScanCode::F1.as_u8() + index as u8),
        10 => ScanCode::F11,
        11 => ScanCode::F12,
        12..=22 => ScanCode::from_u8(ScanCode::F13.as_u8() + (index - 12) as u8),
        _ => ScanCode::F24,
    }
}

fn keypad_digit_scan_code(digit: u32) -> ScanCode {
    const KEYPAD: [ScanCode; 10] = [
        ScanCode::NUMPAD0,
        ScanCode::NUMPAD1,
        ScanCode::NUMPAD2,
        ScanCode::NUMPAD3,
        ScanCode::NUMPAD4,
        ScanCode::NUMPAD5,
        ScanCode::NUMPAD6,
        ScanCode::NUMPAD7,
        ScanCode::NUMPAD8,
        ScanCode::NUMPAD9,
    ];
    KEYPAD[digit as usize]
}
