//! Key code translation and label tables.
//!
//! The canonical representation is [`ScanCode`] (PC/AT Set 1 with the `E0`
//! prefix folded into bit 7).  Platform codes are translated to it at the
//! capture boundary:
//!
//! | Source                         | Module         |
//! |--------------------------------|----------------|
//! | Linux kernel key codes         | [`evdev`]      |
//! | xkb keycodes (compositor)      | [`evdev`]      |
//! | X11/xkb KeySyms                | [`keysym`]     |
//! | Xkb canonical key names        | [`xkb_names`]  |
//! | Windows Raw Input packets      | [`windows_vk`] |
//!
//! All tables are `match` functions over constants: pure, allocation-free
//! and safe to call from any thread.

pub mod evdev;
pub mod keysym;
pub mod labels;
pub mod scancode;
pub mod windows_vk;
pub mod xkb_names;

pub use evdev::{evdev_to_scan_code, xkb_keycode_to_scan_code};
pub use keysym::{keysym_label, keysym_to_scan_code};
pub use labels::scan_code_label;
pub use scancode::{KeyEvent, ScanCode, ScanCodeParseError};
pub use windows_vk::translate_raw_keyboard;
pub use xkb_names::xkb_key_name_to_scan_code;
