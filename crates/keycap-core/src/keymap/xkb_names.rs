//! Xkb canonical key name to [`ScanCode`] table.
//!
//! The X server describes each keycode with a four-character name taken from
//! the `xkb_keycodes` section of the keymap (`AE01` is the key that carries
//! `1` on a US layout, `AC01` is the one that carries `A`).  The names are
//! position-based, so they give the same answer whatever layout is active.
//!
//! Names shorter than four characters are NUL-padded (`ESC\0`).

use super::scancode::ScanCode;

/// Length of an Xkb key name in bytes (`XkbKeyNameLength`).
pub const XKB_KEY_NAME_LENGTH: usize = 4;

/// Translates a four-byte Xkb key name to a [`ScanCode`].
pub fn xkb_key_name_to_scan_code(name: &[u8; XKB_KEY_NAME_LENGTH]) -> Option<ScanCode> {
    let end = name.iter().position(|&b| b == 0).unwrap_or(XKB_KEY_NAME_LENGTH);
    let name = std::str::from_utf8(&name[..end]).ok()?;
    key_name_str_to_scan_code(name)
}

/// Same as [`xkb_key_name_to_scan_code`] for an already-trimmed name.
pub fn key_name_str_to_scan_code(name: &str) -> Option<ScanCode> {
    let sc = match name {
        "TLDE" => ScanCode::GRAVE,
        "AE01" => ScanCode::DIGIT1,
        "AE02" => ScanCode::DIGIT2,
        "AE03" => ScanCode::DIGIT3,
        "AE04" => ScanCode::DIGIT4,
        "AE05" => ScanCode::DIGIT5,
        "AE06" => ScanCode::DIGIT6,
        "AE07" => ScanCode::DIGIT7,
        "AE08" => ScanCode::DIGIT8,
        "AE09" => ScanCode::DIGIT9,
        "AE10" => ScanCode::DIGIT0,
        "AE11" => ScanCode::MINUS,
        "AE12" => ScanCode::EQUALS,
        "AD01" => ScanCode::Q,
        "AD02" => ScanCode::W,
        "AD03" => ScanCode::E,
        "AD04" => ScanCode::R,
        "AD05" => ScanCode::T,
        "AD06" => ScanCode::Y,
        "AD07" => ScanCode::U,
        "AD08" => ScanCode::I,
        "AD09" => ScanCode::O,
        "AD10" => ScanCode::P,
        "AD11" => ScanCode::LEFTBRACKET,
        "AD12" => ScanCode::RIGHTBRACKET,
        "AC01" => ScanCode::A,
        "AC02" => ScanCode::S,
        "AC03" => ScanCode::D,
        "AC04" => ScanCode::F,
        "AC05" => ScanCode::G,
        "AC06" => ScanCode::H,
        "AC07" => ScanCode::J,
        "AC08" => ScanCode::K,
        "AC09" => ScanCode::L,
        "AC10" => ScanCode::SEMICOLON,
        "AC11" => ScanCode::APOSTROPHE,
        "AB01" => ScanCode::Z,
        "AB02" => ScanCode::X,
        "AB03" => ScanCode::C,
        "AB04" => ScanCode::V,
        "AB05" => ScanCode::B,
        "AB06" => ScanCode::N,
        "AB07" => ScanCode::M,
        "AB08" => ScanCode::COMMA,
        "AB09" => ScanCode::PERIOD,
        "AB10" => ScanCode::SLASH,
        // The ISO 102nd key shares the backslash slot.
        "BKSL" | "LSGT" => ScanCode::BACKSLASH,
        "SPCE" => ScanCode::SPACEBAR,
        "ESC" => ScanCode::ESCAPE,
        "RTRN" => ScanCode::ENTER,
        "TAB" => ScanCode::TAB,
        "BKSP" => ScanCode::BACKSPACE,
        "INS" => ScanCode::INSERT,
        "DELE" => ScanCode::DELETE,
        "RGHT" => ScanCode::RIGHT,
        "LEFT" => ScanCode::LEFT,
        "DOWN" => ScanCode::DOWN,
        "UP" => ScanCode::UP,
        "PGUP" => ScanCode::PAGEUP,
        "PGDN" => ScanCode::PAGEDOWN,
        "HOME" => ScanCode::HOME,
        "END" => ScanCode::END,
        "CAPS" => ScanCode::CAPSLOCK,
        "SCLK" => ScanCode::SCROLLLOCK,
        "NMLK" => ScanCode::NUMLOCK,
        "PRSC" => ScanCode::PRINTSCREEN,
        "PAUS" => ScanCode::PAUSE,
        "FK01" => ScanCode::F1,
        "FK02" => ScanCode::F2,
        "FK03" => ScanCode::F3,
        "FK04" => ScanCode::F4,
        "FK05" => ScanCode::F5,
        "FK06" => ScanCode::F6,
        "FK07" => ScanCode::F7,
        "FK08" => ScanCode::F8,
        "FK09" => ScanCode::F9,
        "FK10" => ScanCode::F10,
        "FK11" => ScanCode::F11,
        "FK12" => ScanCode::F12,
        "FK13" => ScanCode::F13,
        "FK14" => ScanCode::F14,
        "FK15" => ScanCode::F15,
        "FK16" => ScanCode::F16,
        "FK17" => ScanCode::F17,
        "FK18" => ScanCode::F18,
        "FK19" => ScanCode::F19,
        "FK20" => ScanCode::F20,
        "FK21" => ScanCode::F21,
        "FK22" => ScanCode::F22,
        "FK23" => ScanCode::F23,
        "FK24" => ScanCode::F24,
        "KP0" => ScanCode::NUMPAD0,
        "KP1" => ScanCode::NUMPAD1,
        "KP2" => ScanCode::NUMPAD2,
        "KP3" => ScanCode::NUMPAD3,
        "KP4" => ScanCode::NUMPAD4,
        "KP5" => ScanCode::NUMPAD5,
        "KP6" => ScanCode::NUMPAD6,
        "KP7" => ScanCode::NUMPAD7,
        "KP8" => ScanCode::NUMPAD8,
        "KP9" => ScanCode::NUMPAD9,
        "KPDL" => ScanCode::DECIMAL,
        "KPDV" => ScanCode::DIVIDE,
        "KPMU" => ScanCode::MULTIPLY,
        "KPSU" => ScanCode::SUBSTRACT,
        "KPAD" => ScanCode::ADD,
        "KPEN" => ScanCode::NUMPADENTER,
        "KPEQ" => ScanCode::NUMPADEQUALS,
        "LFSH" => ScanCode::LEFTSHIFT,
        "LCTL" => ScanCode::LEFTCONTROL,
        "LALT" => ScanCode::LEFTALT,
        "LWIN" => ScanCode::LEFTGUI,
        "RTSH" => ScanCode::RIGHTSHIFT,
        "RCTL" => ScanCode::RIGHTCONTROL,
        "RALT" | "LVL3" | "MDSW" => ScanCode::RIGHTALT,
        "RWIN" => ScanCode::RIGHTGUI,
        "MENU" => ScanCode::APPS,
        _ => return None,
    };
    Some(sc)
}
