//! RecordBindingUseCase: "press the keys you want to use".
//!
//! A binding dialog feeds every captured event into a [`BindingRecorder`]
//! until it yields a [`KeyBinding`]:
//!
//! ```text
//! press X                    → X becomes the candidate
//!   press Y (X still held)   → binding X+Y
//!   release X                → binding X
//! ```
//!
//! Releases of any other key are ignored, as is auto-repeat of the candidate.

use keycap_core::{KeyBinding, KeyEvent, ScanCode};

/// Builds a [`KeyBinding`] from the next key presses.
#[derive(Debug, Default, Clone)]
pub struct BindingRecorder {
    candidate: Option<ScanCode>,
}

impl BindingRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first key pressed so far, if any.
    pub fn candidate(&self) -> Option<ScanCode> {
        self.candidate
    }

    /// Discards a partial recording.
    pub fn reset(&mut self) {
        self.candidate = None;
    }

    /// Feeds one event.  Returns the finished binding and resets, or `None`
    /// while recording is still in progress.
    pub fn feed(&mut self, event: KeyEvent) -> Option<KeyBinding> {
        if event.key.is_unset() {
            return None;
        }

        match (self.candidate, event.pressed) {
            (None, true) => {
                self.candidate = Some(event.key);
                None
            }
            (Some(first), true) if first != event.key => {
                self.candidate = None;
                Some(KeyBinding::with_modifier(first, event.key))
            }
            (Some(first), false) if first == event.key => {
                self.candidate = None;
                Some(KeyBinding::single(first))
            }
            _ => None,
        }
    }

    /// Feeds a batch, stopping at the first finished binding.
    pub fn feed_batch(&mut self, events: &[KeyEvent]) -> Option<KeyBinding> {
        events.iter().find_map(|&e| self.feed(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_then_release_records_single_key() {
        // Arrange
        let mut recorder = BindingRecorder::new();

        // Act
        let first = recorder.feed(KeyEvent::press(ScanCode::F5));
        let second = recorder.feed(KeyEvent::release(ScanCode::F5));

        // Assert
        assert_eq!(first, None);
        assert_eq!(second, Some(KeyBinding::single(ScanCode::F5)));
        assert_eq!(recorder.candidate(), None);
    }

    #[test]
    fn test_two_presses_record_modifier_and_key() {
        // Arrange
        let mut recorder = BindingRecorder::new();
        let batch = [
            KeyEvent::press(ScanCode::LEFTCONTROL),
            KeyEvent::press(ScanCode::P),
            KeyEvent::release(ScanCode::P),
        ];

        // Act
        let binding = recorder.feed_batch(&batch);

        // Assert
        assert_eq!(binding, Some(KeyBinding::with_modifier(ScanCode::LEFTCONTROL, ScanCode::P)));
        assert_eq!(binding.map(|b| b.label()), Some("SC 29+SC 25".to_string()));
    }

    #[test]
    fn test_auto_repeat_of_candidate_is_ignored() {
        let mut recorder = BindingRecorder::new();
        recorder.feed(KeyEvent::press(ScanCode::A));
        assert_eq!(recorder.feed(KeyEvent::press(ScanCode::A)), None);
        assert_eq!(recorder.candidate(), Some(ScanCode::A));
    }

    #[test]
    fn test_stray_releases_are_ignored() {
        // A key held before recording started is released first.
        let mut recorder = BindingRecorder::new();
        assert_eq!(recorder.feed(KeyEvent::release(ScanCode::B)), None);
        recorder.feed(KeyEvent::press(ScanCode::A));
        assert_eq!(recorder.feed(KeyEvent::release(ScanCode::B)), None);
        assert_eq!(recorder.candidate(), Some(ScanCode::A));
    }

    #[test]
    fn test_reset_discards_candidate() {
        let mut recorder = BindingRecorder::new();
        recorder.feed(KeyEvent::press(ScanCode::A));
        recorder.reset();
        assert_eq!(recorder.feed(KeyEvent::release(ScanCode::A)), None);
    }
}
