//! Criterion benchmarks for the key code translation tables.
//!
//! Every backend runs one of these lookups per key event, and the compositor
//! and display backends run the label tables once per keycode at start-up.
//!
//! Run with:
//! ```bash
//! cargo bench --package keycap-core --bench keymap_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keycap_core::keymap::{
    evdev_to_scan_code, keysym_label, keysym_to_scan_code, scan_code_label,
    translate_raw_keyboard, xkb_key_name_to_scan_code,
};
use keycap_core::ScanCode;

// ── Representative codes for benchmarking ─────────────────────────────────────

/// Kernel key codes covering the identity range, the remapped range and a miss.
const BENCH_EVDEV_CODES: &[u16] = &[
    0x01,  // KEY_ESC
    0x1E,  // KEY_A
    0x2C,  // KEY_Z
    0x1C,  // KEY_ENTER
    0x39,  // KEY_SPACE
    0x3B,  // KEY_F1
    0x58,  // KEY_F12
    0x61,  // KEY_RIGHTCTRL
    0x64,  // KEY_RIGHTALT
    0x67,  // KEY_UP
    0x6C,  // KEY_DOWN
    0x7D,  // KEY_LEFTMETA
    0xA4,  // KEY_PLAYPAUSE
    0x110, // BTN_LEFT (unmapped)
];

/// KeySyms covering letters, shifted punctuation, keypad and function keys.
const BENCH_KEYSYMS: &[u32] = &[
    0x61,   // XK_a
    0x41,   // XK_A
    0x21,   // XK_exclam
    0x7C,   // XK_bar
    0xFF0D, // XK_Return
    0xFF1B, // XK_Escape
    0xFF95, // XK_KP_Home
    0xFFB5, // XK_KP_5
    0xFFBE, // XK_F1
    0xFFD5, // XK_F24
    0xFFE1, // XK_Shift_L
    0xFE03, // XK_ISO_Level3_Shift
    0x00E9, // XK_eacute (unmapped)
];

const BENCH_KEY_NAMES: &[&[u8; 4]] = &[b"AC01", b"AE01", b"ESC\0", b"RTRN", b"LFSH", b"KPEN", b"I123"];

// ── Benchmarks: kernel key codes ──────────────────────────────────────────────

fn bench_evdev_to_scan_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_evdev");

    group.bench_function("evdev_single", |b| {
        b.iter(|| evdev_to_scan_code(black_box(0x1E)))
    });

    group.bench_function("evdev_batch_14", |b| {
        b.iter(|| {
            BENCH_EVDEV_CODES
                .iter()
                .map(|&code| evdev_to_scan_code(black_box(code)))
                .collect::<Vec<_>>()
        })
    });

    group.finish();
}

// ── Benchmarks: KeySyms ───────────────────────────────────────────────────────

fn bench_keysym_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_keysym");

    group.bench_function("keysym_to_scan_code_batch_13", |b| {
        b.iter(|| {
            BENCH_KEYSYMS
                .iter()
                .map(|&sym| keysym_to_scan_code(black_box(sym)))
                .collect::<Vec<_>>()
        })
    });

    group.bench_function("keysym_label_batch_13", |b| {
        b.iter(|| {
            BENCH_KEYSYMS
                .iter()
                .map(|&sym| keysym_label(black_box(sym)))
                .collect::<Vec<_>>()
        })
    });

    group.finish();
}

// ── Benchmarks: Xkb key names ─────────────────────────────────────────────────

fn bench_xkb_key_names(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_xkb_names");

    for name in BENCH_KEY_NAMES {
        let id = String::from_utf8_lossy(&name[..]).trim_end_matches('\0').to_string();
        group.bench_with_input(BenchmarkId::new("key_name", id), name, |b, name| {
            b.iter(|| xkb_key_name_to_scan_code(black_box(name)))
        });
    }

    group.finish();
}

// ── Benchmarks: Windows Raw Input and labels ──────────────────────────────────

fn bench_raw_input_and_labels(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_labels");

    group.bench_function("raw_keyboard_single", |b| {
        b.iter(|| translate_raw_keyboard(black_box(0x1D), black_box(0x02), black_box(0xA3)))
    });

    // Building a full 256-entry label table, as every backend does once.
    group.bench_function("scan_code_label_full_table", |b| {
        b.iter(|| {
            (0..=u8::MAX)
                .map(|byte| scan_code_label(black_box(ScanCode::from_u8(byte))))
                .collect::<Vec<_>>()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_evdev_to_scan_code,
    bench_keysym_tables,
    bench_xkb_key_names,
    bench_raw_input_and_labels,
);
criterion_main!(benches);
