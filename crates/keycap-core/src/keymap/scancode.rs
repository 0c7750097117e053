//! Canonical physical-key identity shared by every capture backend.
//!
//! A [`ScanCode`] is a single byte modeled on the PC/AT "Set 1" scan-code
//! space.  Keys that the hardware sends with an `E0` prefix (right-hand
//! modifiers, the navigation cluster, numpad Enter, media keys) are folded
//! into the same byte by setting bit 7.
//!
//! # What is a scan code? (for beginners)
//!
//! When you press a key, the keyboard does not send the *character* printed on
//! the keycap.  It sends a number that identifies the key's **position**.  The
//! operating system later turns that number into a character using the active
//! keyboard layout (QWERTY, AZERTY, Dvorak, ...).
//!
//! | Key              | Set 1 make code | ScanCode byte |
//! |------------------|-----------------|---------------|
//! | Escape           | `01`            | `0x01`        |
//! | Letter A (QWERTY)| `1E`            | `0x1E`        |
//! | Left Control     | `1D`            | `0x1D`        |
//! | Right Control    | `E0 1D`         | `0x9D`        |
//!
//! Because the value names a position, a binding stored as "ScanCode 0x1E"
//! keeps working when the user switches from QWERTY to AZERTY: it is still
//! the key to the right of Caps Lock.
//!
//! # Persistence
//!
//! ScanCode values are written verbatim into user configuration files.  The
//! numeric identity of every named constant below is therefore frozen: new
//! keys may be added, existing ones must never be renumbered.
//!
//! `ScanCode` is a newtype rather than an enum so that codes reported by a
//! backend without a named constant (an unusual vendor key on Windows, for
//! example) survive a save/load cycle unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bit marking an `E0`-prefixed (extended) key.
pub const EXTENDED_BIT: u8 = 0x80;

/// Physical key identity.
///
/// Value `0` ([`ScanCode::UNSET`]) means "no key".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanCode(u8);

macro_rules! scan_codes {
    ($($name:ident = $value:literal,)*) => {
        impl ScanCode {
            $(pub const $name: ScanCode = ScanCode($value);)*

            /// Every named scan code, in ascending numeric order.
            pub const ALL: &'static [ScanCode] = &[$(ScanCode::$name,)*];

            /// Returns the identifier of a named scan code (e.g. `"LEFTCONTROL"`).
            ///
            /// Returns `None` for [`ScanCode::UNSET`] and for unnamed bytes.
            pub fn name(self) -> Option<&'static str> {
                match self.0 {
                    $($value => Some(stringify!($name)),)*
                    _ => None,
                }
            }
        }
    };
}

scan_codes! {
    ESCAPE = 0x01,
    DIGIT1 = 0x02,
    DIGIT2 = 0x03,
    DIGIT3 = 0x04,
    DIGIT4 = 0x05,
    DIGIT5 = 0x06,
    DIGIT6 = 0x07,
    DIGIT7 = 0x08,
    DIGIT8 = 0x09,
    DIGIT9 = 0x0A,
    DIGIT0 = 0x0B,
    MINUS = 0x0C,
    EQUALS = 0x0D,
    BACKSPACE = 0x0E,
    TAB = 0x0F,
    Q = 0x10,
    W = 0x11,
    E = 0x12,
    R = 0x13,
    T = 0x14,
    Y = 0x15,
    U = 0x16,
    I = 0x17,
    O = 0x18,
    P = 0x19,
    LEFTBRACKET = 0x1A,
    RIGHTBRACKET = 0x1B,
    ENTER = 0x1C,
    LEFTCONTROL = 0x1D,
    A = 0x1E,
    S = 0x1F,
    D = 0x20,
    F = 0x21,
    G = 0x22,
    H = 0x23,
    J = 0x24,
    K = 0x25,
    L = 0x26,
    SEMICOLON = 0x27,
    APOSTROPHE = 0x28,
    GRAVE = 0x29,
    LEFTSHIFT = 0x2A,
    BACKSLASH = 0x2B,
    Z = 0x2C,
    X = 0x2D,
    C = 0x2E,
    V = 0x2F,
    B = 0x30,
    N = 0x31,
    M = 0x32,
    COMMA = 0x33,
    PERIOD = 0x34,
    SLASH = 0x35,
    RIGHTSHIFT = 0x36,
    MULTIPLY = 0x37,
    LEFTALT = 0x38,
    SPACEBAR = 0x39,
    CAPSLOCK = 0x3A,
    F1 = 0x3B,
    F2 = 0x3C,
    F3 = 0x3D,
    F4 = 0x3E,
    F5 = 0x3F,
    F6 = 0x40,
    F7 = 0x41,
    F8 = 0x42,
    F9 = 0x43,
    F10 = 0x44,
    NUMLOCK = 0x45,
    SCROLLLOCK = 0x46,
    NUMPAD7 = 0x47,
    NUMPAD8 = 0x48,
    NUMPAD9 = 0x49,
    SUBSTRACT = 0x4A,
    NUMPAD4 = 0x4B,
    NUMPAD5 = 0x4C,
    NUMPAD6 = 0x4D,
    ADD = 0x4E,
    NUMPAD1 = 0x4F,
    NUMPAD2 = 0x50,
    NUMPAD3 = 0x51,
    NUMPAD0 = 0x52,
    DECIMAL = 0x53,
    EUROPE2 = 0x56,
    F11 = 0x57,
    F12 = 0x58,
    NUMPADEQUALS = 0x59,
    INTL6 = 0x5C,
    F13 = 0x64,
    F14 = 0x65,
    F15 = 0x66,
    F16 = 0x67,
    F17 = 0x68,
    F18 = 0x69,
    F19 = 0x6A,
    F20 = 0x6B,
    F21 = 0x6C,
    F22 = 0x6D,
    F23 = 0x6E,
    INTL2 = 0x70,
    INTL1 = 0x73,
    F24 = 0x76,
    LANG4 = 0x77,
    LANG3 = 0x78,
    INTL4 = 0x79,
    INTL5 = 0x7B,
    INTL3 = 0x7D,
    SEPARATOR = 0x7E,
    PREVTRACK = 0x90,
    NEXTTRACK = 0x97,
    NUMPADENTER = 0x9C,
    RIGHTCONTROL = 0x9D,
    MUTE = 0xA0,
    CALCULATOR = 0xA1,
    PLAYPAUSE = 0xA2,
    STOP = 0xA4,
    VOLUMEDOWN = 0xAE,
    VOLUMEUP = 0xB0,
    BROWSERHOME = 0xB2,
    DIVIDE = 0xB5,
    PRINTSCREEN = 0xB7,
    RIGHTALT = 0xB8,
    PAUSE = 0xC5,
    HOME = 0xC7,
    UP = 0xC8,
    PAGEUP = 0xC9,
    LEFT = 0xCB,
    RIGHT = 0xCD,
    END = 0xCF,
    DOWN = 0xD0,
    PAGEDOWN = 0xD1,
    INSERT = 0xD2,
    DELETE = 0xD3,
    LEFTGUI = 0xDB,
    RIGHTGUI = 0xDC,
    APPS = 0xDD,
    POWER = 0xDE,
    SLEEP = 0xDF,
    WAKE = 0xE3,
    BROWSERSEARCH = 0xE5,
    BROWSERFAVORITES = 0xE6,
    BROWSERREFRESH = 0xE7,
    BROWSERSTOP = 0xE8,
    BROWSERFORWARD = 0xE9,
    BROWSERBACK = 0xEA,
    MYCOMPUTER = 0xEB,
    MAIL = 0xEC,
    MEDIASELECT = 0xED,
}

impl ScanCode {
    /// "No key".
    pub const UNSET: ScanCode = ScanCode(0);

    /// Wraps a raw byte.  Every byte is a valid `ScanCode`.
    pub const fn from_u8(value: u8) -> Self {
        ScanCode(value)
    }

    /// Returns the raw byte.
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    pub const fn is_unset(self) -> bool {
        self.0 == 0
    }

    /// `true` for keys sent with an `E0` prefix by the hardware.
    pub const fn is_extended(self) -> bool {
        self.0 & EXTENDED_BIT != 0
    }
}

impl fmt::Debug for ScanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "ScanCode::{name}"),
            None => write!(f, "ScanCode({:#04x})", self.0),
        }
    }
}

/// Formats as the binding serialization label, e.g. `SC 30`.
impl fmt::Display for ScanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SC {}", self.0)
    }
}

/// Error returned when a `SC n` label cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid scan code label {0:?}: expected \"SC <0-255>\"")]
pub struct ScanCodeParseError(pub String);

impl FromStr for ScanCode {
    type Err = ScanCodeParseError;

    /// Parses `SC 30` (the space is optional, as older configs omitted it).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("SC")
            .map(str::trim_start)
            .ok_or_else(|| ScanCodeParseError(s.to_string()))?;
        digits
            .parse::<u8>()
            .map(ScanCode)
            .map_err(|_| ScanCodeParseError(s.to_string()))
    }
}

/// One press/release transition observed at poll time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: ScanCode,
    pub pressed: bool,
}

impl KeyEvent {
    pub const fn new(key: ScanCode, pressed: bool) -> Self {
        Self { key, pressed }
    }

    pub const fn press(key: ScanCode) -> Self {
        Self::new(key, true)
    }

    pub const fn release(key: ScanCode) -> Self {
        Self::new(key, false)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
