//! Mock keyboard backend for unit testing.
//!
//! Allows tests to inject synthetic [`KeyEvent`]s without a kernel device,
//! compositor, display server or Windows message loop.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use keycap_core::{KeyEvent, ScanCode};

use super::{BackendKind, KeyInput, LabelTable};

/// A scripted implementation of [`KeyInput`].
///
/// Events injected through [`MockKeyInput::inject_event`] (or a
/// [`MockKeyHandle`]) are returned by the next `get_events` call.
pub struct MockKeyInput {
    queue: Arc<Mutex<VecDeque<KeyEvent>>>,
    labels: LabelTable,
    dispose_count: Arc<Mutex<u32>>,
}

/// Cloneable handle for feeding a [`MockKeyInput`] after it has been boxed.
#[derive(Clone)]
pub struct MockKeyHandle {
    queue: Arc<Mutex<VecDeque<KeyEvent>>>,
    dispose_count: Arc<Mutex<u32>>,
}

impl MockKeyInput {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            labels: LabelTable::new(),
            dispose_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Overrides the label returned for `sc`.
    pub fn with_label(mut self, sc: ScanCode, label: &'static str) -> Self {
        self.labels.set(sc, label);
        self
    }

    /// Returns a handle that stays valid after `self` is moved into a `Box`.
    pub fn handle(&self) -> MockKeyHandle {
        MockKeyHandle {
            queue: Arc::clone(&self.queue),
            dispose_count: Arc::clone(&self.dispose_count),
        }
    }

    /// Injects a synthetic event, as if captured from hardware.
    pub fn inject_event(&self, event: KeyEvent) {
        self.handle().inject_event(event);
    }
}

impl MockKeyHandle {
    pub fn inject_event(&self, event: KeyEvent) {
        self.queue.lock().expect("lock poisoned").push_back(event);
    }

    pub fn inject_events(&self, events: &[KeyEvent]) {
        self.queue
            .lock()
            .expect("lock poisoned")
            .extend(events.iter().copied());
    }

    /// Returns how many times `dispose` was called.
    pub fn dispose_count(&self) -> u32 {
        *self.dispose_count.lock().expect("lock poisoned")
    }
}

impl Default for MockKeyInput {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyInput for MockKeyInput {
    fn get_events(&mut self) -> Vec<KeyEvent> {
        self.queue.lock().expect("lock poisoned").drain(..).collect()
    }

    fn convert_scan_code_to_string(&self, key: ScanCode) -> &'static str {
        self.labels.lookup(key)
    }

    fn dispose(&mut self) {
        *self.dispose_count.lock().expect("lock poisoned") += 1;
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Mock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_returns_injected_events_once() {
        // Arrange
        let mut input = MockKeyInput::new();
        input.inject_event(KeyEvent::press(ScanCode::A));
        input.inject_event(KeyEvent::release(ScanCode::A));

        // Act
        let first = input.get_events();
        let second = input.get_events();

        // Assert
        assert_eq!(
            first,
            vec![KeyEvent::press(ScanCode::A), KeyEvent::release(ScanCode::A)]
        );
        assert!(second.is_empty());
    }

    #[test]
    fn test_handle_feeds_boxed_mock() {
        // Arrange
        let mock = MockKeyInput::new();
        let handle = mock.handle();
        let mut boxed: Box<dyn KeyInput> = Box::new(mock);

        // Act
        handle.inject_events(&[KeyEvent::press(ScanCode::ENTER)]);

        // Assert
        assert_eq!(boxed.get_events(), vec![KeyEvent::press(ScanCode::ENTER)]);
        assert_eq!(boxed.kind(), BackendKind::Mock);
    }

    #[test]
    fn test_labels_fall_back_to_static_table() {
        let input = MockKeyInput::new().with_label(ScanCode::Q, "A");
        assert_eq!(input.convert_scan_code_to_string(ScanCode::Q), "A");
        assert_eq!(input.convert_scan_code_to_string(ScanCode::W), "W");
    }

    #[test]
    fn test_dispose_is_counted() {
        let mut input = MockKeyInput::new();
        let handle = input.handle();
        input.dispose();
        input.dispose();
        assert_eq!(handle.dispose_count(), 2);
    }
}
