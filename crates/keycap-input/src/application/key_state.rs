//! TrackKeyStateUseCase: which keys are held right now.
//!
//! Backends report transitions, but not all of them report only *real*
//! transitions: a press can be seen twice when a key is held on two devices,
//! and a release can arrive for a key pressed before capture started.
//! [`KeyStateTracker`] folds every batch into a held-key set and passes on only
//! the events that actually changed it.

use std::collections::BTreeSet;

use keycap_core::{KeyBinding, KeyEvent, ScanCode};

/// Held-key set fed from [`KeyInput::get_events`] batches.
///
/// [`KeyInput::get_events`]: crate::infrastructure::input_capture::KeyInput::get_events
#[derive(Debug, Default, Clone)]
pub struct KeyStateTracker {
    pressed: BTreeSet<ScanCode>,
}

impl KeyStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event; returns `true` if it changed the held set.
    pub fn apply(&mut self, event: KeyEvent) -> bool {
        if event.key.is_unset() {
            return false;
        }
        if event.pressed {
            self.pressed.insert(event.key)
        } else {
            self.pressed.remove(&event.key)
        }
    }

    /// Applies a batch and returns the events that were real transitions, in
    /// order.
    pub fn apply_batch(&mut self, events: &[KeyEvent]) -> Vec<KeyEvent> {
        events.iter().copied().filter(|&e| self.apply(e)).collect()
    }

    pub fn is_pressed(&self, key: ScanCode) -> bool {
        self.pressed.contains(&key)
    }

    /// `true` while the binding's main key is held together with its modifier
    /// (if it has one).
    pub fn is_active(&self, binding: &KeyBinding) -> bool {
        self.is_pressed(binding.key) && binding.modifier.map_or(true, |m| self.is_pressed(m))
    }

    /// Held keys in ScanCode order.
    pub fn pressed_keys(&self) -> impl Iterator<Item = ScanCode> + '_ {
        self.pressed.iter().copied()
    }

    /// Forgets every held key and returns the releases that implies.
    ///
    /// Used when the backend is replaced or disposed so nothing stays stuck.
    pub fn release_all(&mut self) -> Vec<KeyEvent> {
        std::mem::take(&mut self.pressed)
            .into_iter()
            .map(KeyEvent::release)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_press_is_not_a_transition() {
        // Arrange
        let mut tracker = KeyStateTracker::new();
        let batch = [
            KeyEvent::press(ScanCode::A),
            KeyEvent::press(ScanCode::A),
            KeyEvent::release(ScanCode::A),
        ];

        // Act
        let transitions = tracker.apply_batch(&batch);

        // Assert
        assert_eq!(transitions, vec![KeyEvent::press(ScanCode::A), KeyEvent::release(ScanCode::A)]);
        assert!(!tracker.is_pressed(ScanCode::A));
    }

    #[test]
    fn test_release_of_unknown_key_is_ignored() {
        let mut tracker = KeyStateTracker::new();
        assert!(!tracker.apply(KeyEvent::release(ScanCode::B)));
    }

    #[test]
    fn test_unset_scan_code_is_ignored() {
        let mut tracker = KeyStateTracker::new();
        assert!(!tracker.apply(KeyEvent::press(ScanCode::UNSET)));
        assert_eq!(tracker.pressed_keys().count(), 0);
    }

    #[test]
    fn test_binding_with_modifier_needs_both_keys() {
        // Arrange
        let mut tracker = KeyStateTracker::new();
        let binding = KeyBinding::with_modifier(ScanCode::LEFTCONTROL, ScanCode::P);

        // Act / Assert
        tracker.apply(KeyEvent::press(ScanCode::P));
        assert!(!tracker.is_active(&binding));

        tracker.apply(KeyEvent::press(ScanCode::LEFTCONTROL));
        assert!(tracker.is_active(&binding));

        tracker.apply(KeyEvent::release(ScanCode::LEFTCONTROL));
        assert!(!tracker.is_active(&binding));
    }

    #[test]
    fn test_single_key_binding() {
        let mut tracker = KeyStateTracker::new();
        let binding = KeyBinding::single(ScanCode::F5);
        tracker.apply(KeyEvent::press(ScanCode::F5));
        assert!(tracker.is_active(&binding));
    }

    #[test]
    fn test_release_all_releases_in_scan_code_order() {
        // Arrange
        let mut tracker = KeyStateTracker::new();
        tracker.apply_batch(&[KeyEvent::press(ScanCode::S), KeyEvent::press(ScanCode::A)]);

        // Act
        let released = tracker.release_all();

        // Assert: A (0x1E) sorts before S (0x1F)
        assert_eq!(released, vec![KeyEvent::release(ScanCode::A), KeyEvent::release(ScanCode::S)]);
        assert_eq!(tracker.pressed_keys().count(), 0);
    }
}
