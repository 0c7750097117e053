//! Backend selection against hand-built session facts.

use std::cell::RefCell;
use std::rc::Rc;

use keycap_core::{KeyEvent, ScanCode};
use keycap_input::application::select_backend::{
    default_tiers, matching_tiers, select_backend, wayland_compositor, Tier,
};
use keycap_input::infrastructure::input_capture::mock::MockKeyInput;
use keycap_input::infrastructure::session::{SessionFacts, SessionType, TargetOs};
use keycap_input::infrastructure::storage::config::{BackendPreference, InputConfig};
use keycap_input::{BackendKind, CaptureError, KeyInput};

fn wayland_user_session() -> SessionFacts {
    SessionFacts {
        os: TargetOs::Linux,
        session: SessionType::Wayland,
        elevated: false,
        device_dir_available: true,
        compositor_reachable: true,
        display_available: true,
    }
}

#[cfg(target_os = "linux")]
#[test]
fn test_wayland_session_without_root_picks_compositor_never_raw_device() {
    // Arrange
    let facts = wayland_user_session();
    let tiers = default_tiers();

    // Act
    let kinds: Vec<BackendKind> = matching_tiers(&facts, BackendPreference::Auto, &tiers)
        .map(|tier| tier.kind)
        .collect();

    // Assert
    assert_eq!(kinds.first(), Some(&BackendKind::Compositor));
    assert!(!kinds.contains(&BackendKind::RawDevice));
}

#[cfg(target_os = "linux")]
#[test]
fn test_xwayland_root_session_prefers_raw_device_over_display_polling() {
    let facts = SessionFacts {
        session: SessionType::X11,
        elevated: true,
        ..wayland_user_session()
    };
    let tiers = default_tiers();

    let first = matching_tiers(&facts, BackendPreference::Auto, &tiers)
        .next()
        .map(|tier| tier.kind);

    assert_eq!(first, Some(BackendKind::RawDevice));
}

#[test]
fn test_compositor_failure_falls_back_to_next_tier() {
    // Arrange: a Wayland tier that cannot connect, then a catch-all tier.
    let attempts = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&attempts);
    let tiers = vec![
        Tier::new("wayland", BackendKind::Compositor, wayland_compositor, move |_| {
            log.borrow_mut().push("wayland");
            Err(CaptureError::UnsupportedPlatform("socket refused".to_string()))
        }),
        Tier::new("fallback", BackendKind::Mock, |_| true, |_| {
            Ok(Box::new(MockKeyInput::new()) as Box<dyn KeyInput>)
        }),
    ];

    // Act
    let result = select_backend(
        &wayland_user_session(),
        BackendPreference::Auto,
        &tiers,
        &InputConfig::default(),
    );

    // Assert
    assert_eq!(result.expect("fallback backend").kind(), BackendKind::Mock);
    assert_eq!(*attempts.borrow(), vec!["wayland"]);
}

#[test]
fn test_selected_mock_backend_delivers_events() {
    // Arrange
    let mock = MockKeyInput::new().with_label(ScanCode::Q, "A");
    let handle = mock.handle();
    let slot = RefCell::new(Some(mock));
    let tiers = vec![Tier::new(
        "mock",
        BackendKind::Mock,
        |_| true,
        move |_| {
            let mock = slot.borrow_mut().take().expect("constructed once");
            Ok(Box::new(mock) as Box<dyn KeyInput>)
        },
    )];

    // Act
    let mut input = select_backend(
        &wayland_user_session(),
        BackendPreference::Auto,
        &tiers,
        &InputConfig::default(),
    )
    .expect("backend");
    handle.inject_event(KeyEvent::press(ScanCode::Q));

    // Assert
    assert_eq!(input.get_events(), vec![KeyEvent::press(ScanCode::Q)]);
    assert_eq!(input.convert_scan_code_to_string(ScanCode::Q), "A");
    input.dispose();
    assert_eq!(handle.dispose_count(), 1);
}

#[test]
fn test_preference_for_unavailable_backend_is_unsupported() {
    let tiers = vec![Tier::new("mock", BackendKind::Mock, |_| true, |_| {
        Ok(Box::new(MockKeyInput::new()) as Box<dyn KeyInput>)
    })];

    let result = select_backend(
        &wayland_user_session(),
        BackendPreference::NativeHook,
        &tiers,
        &InputConfig::default(),
    );

    assert!(matches!(result, Err(CaptureError::UnsupportedPlatform(_))));
}
