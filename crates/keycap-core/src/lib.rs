//! # keycap-core
//!
//! Shared library for Keycap containing the canonical physical-key model,
//! the platform translation tables, and key binding labels.
//!
//! This crate has zero dependencies on OS APIs.  Every capture backend in
//! `keycap-input` translates its native codes through the tables here, so the
//! same physical key always comes out as the same [`ScanCode`].
//!
//! # Architecture overview (for beginners)
//!
//! Keycap reads the keyboard "in the background": it keeps seeing key presses
//! even when its own window does not have focus.  Each operating system (and,
//! on Linux, each kind of desktop session) offers a different way to do that,
//! and each reports keys with its own numbering.
//!
//! This crate (`keycap-core`) is the shared foundation.  It defines:
//!
//! - **`keymap`** – The [`ScanCode`] / [`KeyEvent`] model plus translation
//!   tables from Linux kernel key codes, X11 KeySyms, Xkb key names and
//!   Windows Raw Input packets, and the display-label tables.
//!
//! - **`binding`** – [`KeyBinding`]: a key with an optional modifier, stored in
//!   configuration files as a label like `SC 29+SC 25`.

pub mod binding;
pub mod keymap;

// Re-export the most-used types at the crate root so callers can write
// `keycap_core::ScanCode` instead of `keycap_core::keymap::scancode::ScanCode`.
pub use binding::{BindingParseError, KeyBinding};
pub use keymap::scancode::{KeyEvent, ScanCode, ScanCodeParseError};
