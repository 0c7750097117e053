//! Linux input-event key code to [`ScanCode`] translation table.
//!
//! Kernel key codes are defined in `linux/input-event-codes.h`.  The first
//! 0x53 codes (`KEY_ESC` .. `KEY_KPDOT`) were assigned to match Set 1 make
//! codes, so most of the table is the identity.  Everything above that range
//! is remapped to the extended (`E0`) byte the same key produces on a PC.
//!
//! The compositor protocol reports the same codes offset by
//! [`XKB_EVDEV_OFFSET`], so both the raw-device and compositor backends share
//! this one table.

use super::scancode::ScanCode;

/// Offset between xkb keycodes and kernel key codes.
pub const XKB_EVDEV_OFFSET: u32 = 8;

/// Highest kernel key code (`KEY_MAX`).
pub const KEY_MAX: u16 = 0x2FF;

/// Translates a kernel key code to a [`ScanCode`].
///
/// Returns `None` for codes with no PC keyboard equivalent (mouse buttons,
/// brightness keys, ...).
pub fn evdev_to_scan_code(code: u16) -> Option<ScanCode> {
    let sc = match code {
        // KEY_ESC .. KEY_KPDOT share their value with the Set 1 make code.
        0x01..=0x53 => ScanCode::from_u8(code as u8),
        0x55 => ScanCode::F24,              // KEY_ZENKAKUHANKAKU
        0x56 => ScanCode::EUROPE2,          // KEY_102ND
        0x57 => ScanCode::F11,              // KEY_F11
        0x58 => ScanCode::F12,              // KEY_F12
        0x59 => ScanCode::INTL1,            // KEY_RO
        0x5A => ScanCode::LANG3,            // KEY_KATAKANA
        0x5B => ScanCode::LANG4,            // KEY_HIRAGANA
        0x5C => ScanCode::INTL4,            // KEY_HENKAN
        0x5D => ScanCode::INTL2,            // KEY_KATAKANAHIRAGANA
        0x5E => ScanCode::INTL5,            // KEY_MUHENKAN
        0x5F => ScanCode::INTL6,            // KEY_KPJPCOMMA
        0x60 => ScanCode::NUMPADENTER,      // KEY_KPENTER
        0x61 => ScanCode::RIGHTCONTROL,     // KEY_RIGHTCTRL
        0x62 => ScanCode::DIVIDE,           // KEY_KPSLASH
        0x63 => ScanCode::PRINTSCREEN,      // KEY_SYSRQ
        0x64 => ScanCode::RIGHTALT,         // KEY_RIGHTALT
        0x66 => ScanCode::HOME,             // KEY_HOME
        0x67 => ScanCode::UP,               // KEY_UP
        0x68 => ScanCode::PAGEUP,           // KEY_PAGEUP
        0x69 => ScanCode::LEFT,             // KEY_LEFT
        0x6A => ScanCode::RIGHT,            // KEY_RIGHT
        0x6B => ScanCode::END,              // KEY_END
        0x6C => ScanCode::DOWN,             // KEY_DOWN
        0x6D => ScanCode::PAGEDOWN,         // KEY_PAGEDOWN
        0x6E => ScanCode::INSERT,           // KEY_INSERT
        0x6F => ScanCode::DELETE,           // KEY_DELETE
        0x71 => ScanCode::MUTE,             // KEY_MUTE
        0x72 => ScanCode::VOLUMEDOWN,       // KEY_VOLUMEDOWN
        0x73 => ScanCode::VOLUMEUP,         // KEY_VOLUMEUP
        0x74 => ScanCode::POWER,            // KEY_POWER
        0x75 => ScanCode::NUMPADEQUALS,     // KEY_KPEQUAL
        0x77 => ScanCode::PAUSE,            // KEY_PAUSE
        0x79 => ScanCode::SEPARATOR,        // KEY_KPCOMMA
        0x7C => ScanCode::INTL3,            // KEY_YEN
        0x7D => ScanCode::LEFTGUI,          // KEY_LEFTMETA
        0x7E => ScanCode::RIGHTGUI,         // KEY_RIGHTMETA
        0x80 => ScanCode::STOP,             // KEY_STOP
        0x8B => ScanCode::APPS,             // KEY_MENU
        0x8C => ScanCode::CALCULATOR,       // KEY_CALC
        0x8E => ScanCode::SLEEP,            // KEY_SLEEP
        0x8F => ScanCode::WAKE,             // KEY_WAKEUP
        0x9B => ScanCode::MAIL,             // KEY_MAIL
        0x9C => ScanCode::BROWSERFAVORITES, // KEY_BOOKMARKS
        0x9D => ScanCode::MYCOMPUTER,       // KEY_COMPUTER
        0x9E => ScanCode::BROWSERBACK,      // KEY_BACK
        0x9F => ScanCode::BROWSERFORWARD,   // KEY_FORWARD
        0xA3 => ScanCode::NEXTTRACK,        // KEY_NEXTSONG
        0xA4 => ScanCode::PLAYPAUSE,        // KEY_PLAYPAUSE
        0xA5 => ScanCode::PREVTRACK,        // KEY_PREVIOUSSONG
        0xAC => ScanCode::BROWSERHOME,      // KEY_HOMEPAGE
        0xAD => ScanCode::BROWSERREFRESH,   // KEY_REFRESH
        0xB7 => ScanCode::F13,              // KEY_F13
        0xB8 => ScanCode::F14,              // KEY_F14
        0xB9 => ScanCode::F15,              // KEY_F15
        0xBA => ScanCode::F16,              // KEY_F16
        0xBB => ScanCode::F17,              // KEY_F17
        0xBC => ScanCode::F18,              // KEY_F18
        0xBD => ScanCode::F19,              // KEY_F19
        0xBE => ScanCode::F20,              // KEY_F20
        0xBF => ScanCode::F21,              // KEY_F21
        0xC0 => ScanCode::F22,              // KEY_F22
        0xC1 => ScanCode::F23,              // KEY_F23
        0xC2 => ScanCode::F24,              // KEY_F24
        0xD9 => ScanCode::BROWSERSEARCH,    // KEY_SEARCH
        0xE2 => ScanCode::MEDIASELECT,      // KEY_MEDIA
        _ => return None,
    };
    Some(sc)
}

/// Translates an xkb keycode (as sent by the compositor) to a [`ScanCode`].
pub fn xkb_keycode_to_scan_code(keycode: u32) -> Option<ScanCode> {
    let code = keycode.checked_sub(XKB_EVDEV_OFFSET)?;
    u16::try_from(code).ok().and_then(evdev_to_scan_code)
}
