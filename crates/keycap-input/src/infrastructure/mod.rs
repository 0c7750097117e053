//! Infrastructure layer for keyboard capture.
//!
//! Contains OS-facing adapters: the four capture backends, session
//! detection, and file-system storage.
//!
//! **Dependency rule**: this layer may depend on `keycap_core`, but MUST NOT
//! import anything from the `application` layer.

pub mod input_capture;
pub mod session;
pub mod storage;
