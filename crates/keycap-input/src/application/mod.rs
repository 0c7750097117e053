//! Application layer use cases for background keyboard capture.
//!
//! # What is the "application" layer? (for beginners)
//!
//! The *application* layer sits on top of the infrastructure backends and
//! decides what to do with them.  Code here:
//!
//! - **Depends on the [`KeyInput`] trait**, never on a concrete backend, so
//!   every use case can be tested with `MockKeyInput`.
//! - **Makes no OS calls** of its own; session probing and device I/O live in
//!   `infrastructure`.
//!
//! # Sub-modules
//!
//! - **`select_backend`** – The ordered tier list that picks one backend for
//!   the running session, plus the `create_key_input` factory.
//!
//! - **`key_state`** – Tracks which keys are held and whether a configured
//!   binding is currently active.
//!
//! - **`record_binding`** – Turns the next key presses into a `KeyBinding`
//!   for a "press the keys you want to use" dialog.
//!
//! [`KeyInput`]: crate::infrastructure::input_capture::KeyInput

pub mod key_state;
pub mod record_binding;
pub mod select_backend;
