//! keycap-input library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.

pub mod application;
pub mod infrastructure;

pub use application::select_backend::create_key_input;
pub use infrastructure::input_capture::{BackendKind, CaptureError, KeyInput};
