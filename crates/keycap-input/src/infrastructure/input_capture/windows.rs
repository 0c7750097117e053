//! Windows Raw Input backend.
//!
//! Creates a hidden message-only window, registers it for keyboard Raw Input
//! with `RIDEV_INPUTSINK` (so packets arrive while another application has
//! focus), and pumps its message queue from [`KeyInput::get_events`].
//!
//! Unlike a low-level hook, Raw Input never delays other applications' input:
//! Windows copies the packet to our queue and moves on.  The trade-off is
//! that packets only reach us when the owning thread pumps messages, so
//! `get_events` must be called from the thread that created the backend.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

use std::ffi::c_void;
use std::mem::size_of;
use std::sync::OnceLock;

use keycap_core::keymap::translate_raw_keyboard;
use keycap_core::{KeyEvent, ScanCode};
use tracing::{debug, info, warn};
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{
    GetLastError, ERROR_INSUFFICIENT_BUFFER, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetKeyboardLayout, MapVirtualKeyExW, MAPVK_VSC_TO_VK_EX,
};
use windows::Win32::UI::Input::{
    GetRawInputBuffer, GetRawInputData, RegisterRawInputDevices, HRAWINPUT, RAWINPUT,
    RAWINPUTDEVICE, RAWINPUTDEVICE_FLAGS, RAWINPUTHEADER, RIDEV_INPUTSINK, RIDEV_REMOVE,
    RID_INPUT, RIM_TYPEKEYBOARD,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetWindowLongPtrW,
    PeekMessageW, RegisterClassW, SetWindowLongPtrW, TranslateMessage, GWLP_USERDATA,
    HWND_MESSAGE, MSG, PM_REMOVE, WINDOW_EX_STYLE, WM_INPUT, WNDCLASSW, WS_CHILD,
};

use super::{BackendKind, CaptureError, KeyInput, LabelTable};

/// HID usage page "Generic Desktop".
const USAGE_PAGE_GENERIC: u16 = 0x01;
/// HID usage "Keyboard" on the Generic Desktop page.
const USAGE_GENERIC_KEYBOARD: u16 = 0x06;

/// Packets the drain buffer holds before it has to grow.
const INITIAL_BUFFER_PACKETS: usize = 16;

const CLASS_NAME: PCWSTR = w!("RawKeyInputClass");

/// Atom of the registered window class, shared by every instance.
static WINDOW_CLASS: OnceLock<Result<u16, String>> = OnceLock::new();

/// Labels built from the active keyboard layout at first use.
static LABELS: OnceLock<LabelTable> = OnceLock::new();

/// State the window procedure writes to.  Heap-allocated so its address stays
/// valid while the backend value itself moves.
#[derive(Default)]
struct WindowState {
    events: Vec<KeyEvent>,
    /// Drain buffer for `GetRawInputBuffer`, kept between messages.
    buffer: Vec<RAWINPUT>,
}

impl WindowState {
    fn push_packet(&mut self, input: &RAWINPUT) {
        if input.header.dwType != RIM_TYPEKEYBOARD.0 {
            return;
        }
        // SAFETY: the header says this packet carries keyboard data.
        let kb = unsafe { input.data.keyboard };
        if let Some(event) = translate_raw_keyboard(kb.MakeCode, kb.Flags, kb.VKey) {
            self.events.push(event);
        }
    }

    /// Reads the packet named by a `WM_INPUT` message.
    fn read_message(&mut self, handle: HRAWINPUT) {
        let header_size = size_of::<RAWINPUTHEADER>() as u32;
        let mut input = RAWINPUT::default();
        let mut size = size_of::<RAWINPUT>() as u32;
        // SAFETY: `input` is a full RAWINPUT and `size` says so.
        let copied = unsafe {
            GetRawInputData(
                handle,
                RID_INPUT,
                Some(&mut input as *mut RAWINPUT as *mut c_void),
                &mut size,
                header_size,
            )
        };
        if copied == u32::MAX {
            debug!("GetRawInputData failed");
            return;
        }
        self.push_packet(&input);
    }

    /// Drains packets that queued up behind the current message.
    fn drain_buffer(&mut self) {
        let header_size = size_of::<RAWINPUTHEADER>() as u32;
        if self.buffer.is_empty() {
            self.buffer.resize(INITIAL_BUFFER_PACKETS, RAWINPUT::default());
        }

        loop {
            let mut size = (self.buffer.len() * size_of::<RAWINPUT>()) as u32;
            // SAFETY: the buffer is `size` bytes of RAWINPUT-aligned storage.
            let count = unsafe {
                GetRawInputBuffer(Some(self.buffer.as_mut_ptr()), &mut size, header_size)
            };

            if count == u32::MAX {
                // SAFETY: reads the calling thread's last-error value.
                if unsafe { GetLastError() } == ERROR_INSUFFICIENT_BUFFER {
                    let doubled = self.buffer.len() * 2;
                    self.buffer.resize(doubled, RAWINPUT::default());
                    continue;
                }
                debug!("GetRawInputBuffer failed");
                return;
            }
            if count == 0 {
                return;
            }

            let base = self.buffer.as_ptr() as *const u8;
            let end = self.buffer.len() * size_of::<RAWINPUT>();
            let mut offset = 0usize;
            for _ in 0..count {
                if offset + size_of::<RAWINPUTHEADER>() > end {
                    break;
                }
                // SAFETY: `offset` is within the buffer and pointer-aligned;
                // Windows wrote `count` packets back to back.
                let packet = unsafe { &*(base.add(offset) as *const RAWINPUT) };
                let packet_size = packet.header.dwSize as usize;
                if packet_size == 0 || offset + packet_size > end {
                    break;
                }
                self.push_packet(packet);
                offset = align_packet(offset + packet_size);
            }
        }
    }
}

/// Rounds a packet offset up the way `NEXTRAWINPUTBLOCK` does.
fn align_packet(offset: usize) -> usize {
    let align = size_of::<usize>();
    (offset + align - 1) & !(align - 1)
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if msg == WM_INPUT {
        // SAFETY: GWLP_USERDATA holds the WindowState pointer set at
        // construction, or 0 before that / after dispose.
        let state = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut WindowState;
        if let Some(state) = state.as_mut() {
            state.read_message(HRAWINPUT(l_param.0 as *mut c_void));
            state.drain_buffer();
        }
    }
    // WM_INPUT still needs DefWindowProc so Windows frees the packet.
    DefWindowProcW(hwnd, msg, w_param, l_param)
}

fn module_instance() -> Result<HINSTANCE, CaptureError> {
    // SAFETY: a null module name returns the current executable's handle.
    let module = unsafe { GetModuleHandleW(None) }
        .map_err(|e| CaptureError::NativeHook(format!("GetModuleHandleW failed: {e}")))?;
    Ok(module.into())
}

fn register_window_class() -> Result<(), CaptureError> {
    WINDOW_CLASS
        .get_or_init(|| {
            let instance = module_instance().map_err(|e| e.to_string())?;
            let class = WNDCLASSW {
                lpfnWndProc: Some(window_proc),
                hInstance: instance,
                lpszClassName: CLASS_NAME,
                ..Default::default()
            };
            // SAFETY: `class` is fully initialised and the name is static.
            let atom = unsafe { RegisterClassW(&class) };
            if atom == 0 {
                Err("RegisterClassW failed".to_string())
            } else {
                Ok(atom)
            }
        })
        .clone()
        .map(|_| ())
        .map_err(CaptureError::NativeHook)
}

fn keyboard_device(flags: RAWINPUTDEVICE_FLAGS, target: HWND) -> RAWINPUTDEVICE {
    RAWINPUTDEVICE {
        usUsagePage: USAGE_PAGE_GENERIC,
        usUsage: USAGE_GENERIC_KEYBOARD,
        dwFlags: flags,
        hwndTarget: target,
    }
}

fn layout_labels() -> &'static LabelTable {
    LABELS.get_or_init(|| {
        // SAFETY: 0 selects the calling thread's layout; MapVirtualKeyExW is
        // a pure lookup.
        let layout = unsafe { GetKeyboardLayout(0) };
        LabelTable::from_virtual_keys(|input| unsafe {
            MapVirtualKeyExW(input, MAPVK_VSC_TO_VK_EX, Some(layout))
        })
    })
}

/// Keyboard capture through a Raw Input sink window.
pub struct RawKeyInput {
    hwnd: Option<HWND>,
    state: *mut WindowState,
}

impl RawKeyInput {
    /// Creates the message window and registers it for keyboard input.
    ///
    /// # Errors
    ///
    /// [`CaptureError::NativeHook`] if the class, the window or the device
    /// registration fails.  The window is destroyed again on failure.
    pub fn new() -> Result<Self, CaptureError> {
        register_window_class()?;
        let instance = module_instance()?;

        // SAFETY: the class is registered; HWND_MESSAGE makes the window
        // invisible and excluded from broadcast messages.
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(0),
                CLASS_NAME,
                w!("RawKeyInput"),
                WS_CHILD,
                0,
                0,
                1,
                1,
                Some(HWND_MESSAGE),
                None,
                Some(instance),
                None,
            )
        }
        .map_err(|e| CaptureError::NativeHook(format!("CreateWindowExW failed: {e}")))?;

        let device = keyboard_device(RIDEV_INPUTSINK, hwnd);
        // SAFETY: `device` is a valid RAWINPUTDEVICE targeting our window.
        if let Err(e) =
            unsafe { RegisterRawInputDevices(&[device], size_of::<RAWINPUTDEVICE>() as u32) }
        {
            // SAFETY: the window was created above and is not yet shared.
            unsafe { DestroyWindow(hwnd) }.ok();
            return Err(CaptureError::NativeHook(format!(
                "RegisterRawInputDevices failed: {e}"
            )));
        }

        let state = Box::into_raw(Box::new(WindowState::default()));
        // SAFETY: `state` stays valid until dispose clears the slot and frees it.
        unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, state as isize) };

        let labels = layout_labels();
        info!(labels = labels.len(), "raw input keyboard capture started");

        Ok(Self {
            hwnd: Some(hwnd),
            state,
        })
    }

    fn pump_messages(&self, hwnd: HWND) {
        let mut msg = MSG::default();
        // SAFETY: standard non-blocking Win32 message pump for our window.
        unsafe {
            while PeekMessageW(&mut msg, Some(hwnd), 0, 0, PM_REMOVE).as_bool() {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }
}

impl KeyInput for RawKeyInput {
    fn get_events(&mut self) -> Vec<KeyEvent> {
        let Some(hwnd) = self.hwnd else {
            return Vec::new();
        };
        self.pump_messages(hwnd);
        // SAFETY: the pump has returned, so the window procedure holds no
        // reference to the state.
        unsafe { std::mem::take(&mut (*self.state).events) }
    }

    fn convert_scan_code_to_string(&self, key: ScanCode) -> &'static str {
        layout_labels().lookup(key)
    }

    fn dispose(&mut self) {
        let Some(hwnd) = self.hwnd.take() else {
            return;
        };

        let device = keyboard_device(RIDEV_REMOVE, HWND::default());
        // SAFETY: removing our registration; the target must be null.
        if let Err(e) =
            unsafe { RegisterRawInputDevices(&[device], size_of::<RAWINPUTDEVICE>() as u32) }
        {
            warn!("failed to unregister raw keyboard input: {e}");
        }

        // SAFETY: clear the pointer before destroying so no late message can
        // reach freed state, then free the box we allocated in `new`.
        unsafe {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
            DestroyWindow(hwnd).ok();
            drop(Box::from_raw(self.state));
        }
        self.state = std::ptr::null_mut();
        debug!("raw input keyboard capture disposed");
    }

    fn kind(&self) -> BackendKind {
        BackendKind::NativeHook
    }
}

impl Drop for RawKeyInput {
    fn drop(&mut self) {
        self.dispose();
    }
}
