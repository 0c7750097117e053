//! Integration tests for the keycap-core translation tables.
//!
//! These tests check the tables against each other through the public API:
//! every backend must agree on the identity of a physical key, and every key
//! a backend can report must have something to show in a binding dialog.

use keycap_core::keymap::evdev::KEY_MAX;
use keycap_core::keymap::{
    evdev_to_scan_code, keysym_to_scan_code, scan_code_label, translate_raw_keyboard,
    xkb_key_name_to_scan_code, xkb_keycode_to_scan_code,
};
use keycap_core::{KeyBinding, KeyEvent, ScanCode};
use serde::{Deserialize, Serialize};

#[test]
fn test_every_evdev_key_has_a_static_label() {
    for code in 0..=KEY_MAX {
        if let Some(sc) = evdev_to_scan_code(code) {
            if sc == ScanCode::EUROPE2 {
                continue;
            }
            assert!(
                !scan_code_label(sc).is_empty(),
                "kernel code {code:#x} maps to {sc:?} which has no label"
            );
        }
    }
}

#[test]
fn test_compositor_keycode_and_kernel_code_agree() {
    for code in 0..=KEY_MAX {
        assert_eq!(
            xkb_keycode_to_scan_code(u32::from(code) + 8),
            evdev_to_scan_code(code)
        );
    }
}

#[test]
fn test_backends_agree_on_the_same_physical_key() {
    // Right Control as seen by each backend.
    let from_evdev = evdev_to_scan_code(0x61);
    let from_keysym = keysym_to_scan_code(0xFFE4);
    let from_key_name = xkb_key_name_to_scan_code(b"RCTL");
    let from_raw_input = translate_raw_keyboard(0x1D, 0x02, 0xA3).map(|ev| ev.key);

    assert_eq!(from_evdev, Some(ScanCode::RIGHTCONTROL));
    assert_eq!(from_keysym, from_evdev);
    assert_eq!(from_key_name, from_evdev);
    assert_eq!(from_raw_input, from_evdev);
}

#[test]
fn test_key_name_table_agrees_with_keysyms_for_us_layout() {
    let pairs: &[(&[u8; 4], u32)] = &[
        (b"AC01", 0x61),   // a
        (b"AE01", 0x31),   // 1
        (b"TLDE", 0x60),   // grave
        (b"SPCE", 0x20),   // space
        (b"RTRN", 0xFF0D), // Return
        (b"KP7\0", 0xFFB7),
        (b"FK13", 0xFFCA),
        (b"LWIN", 0xFFEB),
    ];
    for (name, keysym) in pairs {
        assert_eq!(
            xkb_key_name_to_scan_code(name),
            keysym_to_scan_code(*keysym),
            "mismatch for {:?}",
            String::from_utf8_lossy(&name[..])
        );
    }
}

#[test]
fn test_bindings_persist_through_config_file() {
    // Arrange
    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Bindings {
        bindings: Vec<Entry>,
    }
    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Entry {
        action: String,
        binding: KeyBinding,
    }
    let original = Bindings {
        bindings: vec![
            Entry {
                action: "pause".to_string(),
                binding: KeyBinding::with_modifier(ScanCode::LEFTCONTROL, ScanCode::P),
            },
            Entry {
                action: "turbo".to_string(),
                // Unnamed byte: must survive unchanged.
                binding: KeyBinding::single(ScanCode::from_u8(0x55)),
            },
        ],
    };

    // Act
    let text = toml::to_string(&original).expect("serialize");
    let restored: Bindings = toml::from_str(&text).expect("deserialize");

    // Assert
    assert!(text.contains(r#"binding = "SC 29+SC 25""#));
    assert!(text.contains(r#"binding = "SC 85""#));
    assert_eq!(restored, original);
}

#[test]
fn test_raw_input_press_release_pair() {
    let down = translate_raw_keyboard(0x1E, 0, 0x41);
    let up = translate_raw_keyboard(0x1E, 0x01, 0x41);
    assert_eq!(down, Some(KeyEvent::press(ScanCode::A)));
    assert_eq!(up, Some(KeyEvent::release(ScanCode::A)));
}
