//! Minimal Wayland client: just enough protocol to receive keyboard events.
//!
//! The client speaks five interfaces: `wl_display`, `wl_registry`,
//! `wl_callback`, `wl_seat` (bound at version 1) and the `wl_keyboard`
//! created from it.  Every object it creates lives in an id → [`Object`]
//! table owned by the client, and incoming events are routed through that
//! table; an event for an id that is not in the table is skipped.
//!
//! # Start-up sequence (for beginners)
//!
//! ```text
//!   client                              compositor
//!   wl_display.get_registry(2)   ──▶
//!   wl_display.sync(3)           ──▶
//!                                ◀──   wl_registry.global(..., "wl_seat", v)
//!                                ◀──   wl_callback.done        (round-trip 1)
//!   wl_registry.bind(seat, 1, 4) ──▶
//!   wl_display.sync(5)           ──▶
//!                                ◀──   wl_seat.capabilities(keyboard)
//!                                ◀──   wl_callback.done        (round-trip 2)
//!   wl_seat.get_keyboard(6)      ──▶
//!   wl_display.sync(7)           ──▶
//!                                ◀──   wl_keyboard.keymap(XKB_V1, fd, size)
//!                                ◀──   wl_callback.done        (round-trip 3)
//! ```

use std::collections::HashMap;
use std::mem;
use std::os::fd::OwnedFd;
use std::time::{Duration, Instant};

use keycap_core::keymap::evdev::KEY_MAX;
use keycap_core::keymap::evdev_to_scan_code;
use keycap_core::KeyEvent;
use tracing::{debug, trace};

use super::connection::Connection;
use super::wire::{MessageReader, MessageWriter};
use super::WaylandError;

pub const DISPLAY_ID: u32 = 1;

/// `wl_seat` version requested at bind time.
pub const SEAT_VERSION: u32 = 1;
/// `wl_keyboard.release` exists from this version on.
pub const KEYBOARD_RELEASE_SINCE: u32 = 3;
/// `wl_keyboard.keymap_format.xkb_v1`.
pub const KEYMAP_FORMAT_XKB_V1: u32 = 1;
/// `wl_seat.capability.keyboard`.
pub const SEAT_CAPABILITY_KEYBOARD: u32 = 2;

// Request opcodes.
const DISPLAY_SYNC: u16 = 0;
const DISPLAY_GET_REGISTRY: u16 = 1;
const REGISTRY_BIND: u16 = 0;
const SEAT_GET_KEYBOARD: u16 = 1;
const KEYBOARD_RELEASE: u16 = 0;

// Event opcodes.
const DISPLAY_ERROR: u16 = 0;
const DISPLAY_DELETE_ID: u16 = 1;
const REGISTRY_GLOBAL: u16 = 0;
const REGISTRY_GLOBAL_REMOVE: u16 = 1;
const CALLBACK_DONE: u16 = 0;
const SEAT_CAPABILITIES: u16 = 0;
const KEYBOARD_KEYMAP: u16 = 0;
const KEYBOARD_KEY: u16 = 3;

/// `wl_keyboard.key_state` values the client reports.
const KEY_STATE_RELEASED: u32 = 0;
const KEY_STATE_PRESSED: u32 = 1;

/// A protocol object created by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Object {
    Display,
    Registry,
    Callback { done: bool },
    Seat,
    Keyboard,
}

/// The keymap announced by `wl_keyboard.keymap`.
#[derive(Debug)]
pub struct KeymapFd {
    pub format: u32,
    pub fd: OwnedFd,
    pub size: u32,
}

/// Protocol state for one compositor connection.
#[derive(Debug)]
pub struct WaylandClient {
    conn: Connection,
    objects: HashMap<u32, Object>,
    next_id: u32,
    seat_global: Option<u32>,
    seat: Option<u32>,
    capabilities: Option<u32>,
    keyboard: Option<u32>,
    keyboard_version: u32,
    keymap: Option<KeymapFd>,
    keys: Vec<KeyEvent>,
}

impl WaylandClient {
    pub fn new(conn: Connection) -> Self {
        let mut objects = HashMap::new();
        objects.insert(DISPLAY_ID, Object::Display);
        Self {
            conn,
            objects,
            next_id: DISPLAY_ID + 1,
            seat_global: None,
            seat: None,
            capabilities: None,
            keyboard: None,
            keyboard_version: 0,
            keymap: None,
            keys: Vec::new(),
        }
    }

    /// Runs the start-up sequence and returns the client with its keymap.
    ///
    /// Each round-trip may take at most `timeout`.
    pub fn bootstrap(conn: Connection, timeout: Duration) -> Result<(Self, KeymapFd), WaylandError> {
        let mut client = Self::new(conn);

        let registry = client.create(Object::Registry);
        client.send(MessageWriter::new(DISPLAY_ID, DISPLAY_GET_REGISTRY).new_id(registry))?;
        client.roundtrip(timeout)?;

        let seat_name = client.seat_global.ok_or(WaylandError::NoSeat)?;
        let seat = client.create(Object::Seat);
        client.send(
            MessageWriter::new(registry, REGISTRY_BIND)
                .uint(seat_name)
                .string("wl_seat")
                .uint(SEAT_VERSION)
                .new_id(seat),
        )?;
        client.seat = Some(seat);
        client.roundtrip(timeout)?;

        let caps = client.capabilities.unwrap_or(0);
        if caps & SEAT_CAPABILITY_KEYBOARD == 0 {
            return Err(WaylandError::NoKeyboard);
        }
        let keyboard = client.create(Object::Keyboard);
        client.send(MessageWriter::new(seat, SEAT_GET_KEYBOARD).new_id(keyboard))?;
        client.keyboard = Some(keyboard);
        client.keyboard_version = SEAT_VERSION;
        client.roundtrip(timeout)?;

        let keymap = client.keymap.take().ok_or(WaylandError::NoKeymap)?;
        if keymap.format != KEYMAP_FORMAT_XKB_V1 {
            return Err(WaylandError::UnsupportedKeymapFormat(keymap.format));
        }
        debug!(seat, keyboard, size = keymap.size, "compositor keyboard bound");
        Ok((client, keymap))
    }

    fn create(&mut self, object: Object) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.objects.insert(id, object);
        id
    }

    fn send(&mut self, message: MessageWriter) -> Result<(), WaylandError> {
        let bytes = message.finish()?;
        self.conn.queue(&bytes);
        Ok(())
    }

    /// Sends `wl_display.sync` and dispatches until its callback fires.
    pub fn roundtrip(&mut self, timeout: Duration) -> Result<(), WaylandError> {
        let deadline = Instant::now() + timeout;
        let callback = self.create(Object::Callback { done: false });
        self.send(MessageWriter::new(DISPLAY_ID, DISPLAY_SYNC).new_id(callback))?;
        self.conn.flush()?;

        loop {
            self.dispatch_pending()?;
            if !matches!(self.objects.get(&callback), Some(Object::Callback { done: false })) {
                self.objects.remove(&callback);
                return Ok(());
            }
            self.conn.read_until(deadline)?;
        }
    }

    /// One poll step: dispatch what is queued, flush requests, read once
    /// without blocking, dispatch again.
    pub fn poll(&mut self) -> Result<(), WaylandError> {
        self.dispatch_pending()?;
        self.conn.flush()?;
        self.conn.read_nonblocking()?;
        self.dispatch_pending()
    }

    /// Swaps out the key events collected so far.
    pub fn take_keys(&mut self) -> Vec<KeyEvent> {
        mem::take(&mut self.keys)
    }

    /// Releases the keyboard if the bound version allows it and flushes.
    pub fn release_keyboard(&mut self) -> Result<(), WaylandError> {
        if let Some(keyboard) = self.keyboard.take() {
            if self.keyboard_version >= KEYBOARD_RELEASE_SINCE {
                self.send(MessageWriter::new(keyboard, KEYBOARD_RELEASE))?;
                self.conn.flush()?;
            }
            self.objects.remove(&keyboard);
        }
        Ok(())
    }

    /// Dispatches every complete message in the receive buffer.
    pub fn dispatch_pending(&mut self) -> Result<(), WaylandError> {
        while let Some((header, body)) = self.conn.next_message()? {
            let Some(object) = self.objects.get(&header.object_id).copied() else {
                trace!(id = header.object_id, opcode = header.opcode, "event for unknown object");
                continue;
            };
            let mut args = MessageReader::new(&body);
            match object {
                Object::Display => self.on_display(header.opcode, &mut args)?,
                Object::Registry => self.on_registry(header.opcode, &mut args)?,
                Object::Callback { .. } => {
                    if header.opcode == CALLBACK_DONE {
                        self.objects
                            .insert(header.object_id, Object::Callback { done: true });
                    }
                }
                Object::Seat => {
                    if header.opcode == SEAT_CAPABILITIES {
                        self.capabilities = Some(args.uint()?);
                    }
                }
                Object::Keyboard => self.on_keyboard(header.opcode, &mut args)?,
            }
        }
        Ok(())
    }

    fn on_display(&mut self, opcode: u16, args: &mut MessageReader<'_>) -> Result<(), WaylandError> {
        match opcode {
            DISPLAY_ERROR => {
                let object = args.uint()?;
                let code = args.uint()?;
                let message = args.string()?;
                Err(WaylandError::Protocol {
                    object,
                    code,
                    message,
                })
            }
            DISPLAY_DELETE_ID => {
                let id = args.uint()?;
                // Callbacks are removed by `roundtrip` once observed.
                if !matches!(self.objects.get(&id), Some(Object::Callback { .. })) {
                    self.objects.remove(&id);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn on_registry(&mut self, opcode: u16, args: &mut MessageReader<'_>) -> Result<(), WaylandError> {
        match opcode {
            REGISTRY_GLOBAL => {
                let name = args.uint()?;
                let interface = args.string()?;
                let version = args.uint()?;
                trace!(name, %interface, version, "global");
                if interface == "wl_seat" && self.seat_global.is_none() {
                    self.seat_global = Some(name);
                }
            }
            REGISTRY_GLOBAL_REMOVE => {
                let name = args.uint()?;
                if self.seat_global == Some(name) && self.seat.is_none() {
                    self.seat_global = None;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_keyboard(&mut self, opcode: u16, args: &mut MessageReader<'_>) -> Result<(), WaylandError> {
        match opcode {
            KEYBOARD_KEYMAP => {
                let format = args.uint()?;
                let size = args.uint()?;
                let fd = self.conn.take_fd().ok_or(WaylandError::NoKeymap)?;
                self.keymap = Some(KeymapFd { format, fd, size });
            }
            KEYBOARD_KEY => {
                let _serial = args.uint()?;
                let _time = args.uint()?;
                let key = args.uint()?;
                let state = args.uint()?;
                if let Some(event) = translate_key(key, state) {
                    self.keys.push(event);
                }
            }
            // enter, leave, modifiers, repeat_info
            _ => {}
        }
        Ok(())
    }
}

fn translate_key(key: u32, state: u32) -> Option<KeyEvent> {
    let pressed = match state {
        KEY_STATE_PRESSED => true,
        KEY_STATE_RELEASED => false,
        _ => return None,
    };
    let code = u16::try_from(key).ok().filter(|&c| c <= KEY_MAX)?;
    evdev_to_scan_code(code).map(|sc| KeyEvent::new(sc, pressed))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use keycap_core::ScanCode;
    use std::os::fd::AsRawFd;
    use std::os::unix::net::UnixStream;
    use std::thread;

    pub(crate) const TIMEOUT: Duration = Duration::from_secs(2);

    /// Scripted compositor on the far end of a socket pair.
    pub(crate) struct FakeCompositor {
        conn: Connection,
    }

    impl FakeCompositor {
        pub(crate) fn pair() -> (Connection, FakeCompositor) {
            let (client, server) = UnixStream::pair().expect("socketpair");
            (
                Connection::from_stream(client),
                FakeCompositor {
                    conn: Connection::from_stream(server),
                },
            )
        }

        /// Waits for the next request from the client.
        pub(crate) fn expect_request(&mut self, object_id: u32, opcode: u16) -> Vec<u8> {
            loop {
                if let Some((header, body)) = self.conn.next_message().expect("valid request") {
                    assert_eq!(
                        (header.object_id, header.opcode),
                        (object_id, opcode),
                        "unexpected request {header:?}"
                    );
                    return body;
                }
                self.conn
                    .read_until(Instant::now() + TIMEOUT)
                    .expect("client request");
            }
        }

        /// Reads a `wl_display.sync` and returns the callback id.
        pub(crate) fn expect_sync(&mut self) -> u32 {
            let body = self.expect_request(DISPLAY_ID, DISPLAY_SYNC);
            MessageReader::new(&body).uint().expect("callback id")
        }

        pub(crate) fn send(&mut self, message: MessageWriter) {
            self.conn.queue(&message.finish().expect("encode"));
            self.conn.flush().expect("send");
        }

        pub(crate) fn send_with_fd(&mut self, message: MessageWriter, fd: &OwnedFd) {
            self.conn.queue(&message.finish().expect("encode"));
            self.conn.send_with_fds(&[fd.as_raw_fd()]).expect("send with fd");
        }

        pub(crate) fn done(&mut self, callback: u32) {
            self.send(MessageWriter::new(callback, CALLBACK_DONE).uint(0));
            self.send(MessageWriter::new(DISPLAY_ID, DISPLAY_DELETE_ID).uint(callback));
        }

        pub(crate) fn key(&mut self, keyboard: u32, key: u32, state: u32) {
            self.send(
                MessageWriter::new(keyboard, KEYBOARD_KEY)
                    .uint(1)
                    .uint(0)
                    .uint(key)
                    .uint(state),
            );
        }

        /// Plays the compositor side of the start-up sequence and returns the
        /// keyboard object id.
        pub(crate) fn serve_bootstrap(&mut self, capabilities: u32, keymap: &OwnedFd, size: u32) -> u32 {
            self.serve_bootstrap_with_format(capabilities, KEYMAP_FORMAT_XKB_V1, keymap, size)
        }

        pub(crate) fn serve_bootstrap_with_format(
            &mut self,
            capabilities: u32,
            format: u32,
            keymap: &OwnedFd,
            size: u32,
        ) -> u32 {
            let body = self.expect_request(DISPLAY_ID, DISPLAY_GET_REGISTRY);
            let registry = MessageReader::new(&body).uint().expect("registry id");
            let cb = self.expect_sync();
            self.send(
                MessageWriter::new(registry, REGISTRY_GLOBAL)
                    .uint(1)
                    .string("wl_compositor")
                    .uint(4),
            );
            self.send(
                MessageWriter::new(registry, REGISTRY_GLOBAL)
                    .uint(7)
                    .string("wl_seat")
                    .uint(7),
            );
            self.done(cb);

            let body = self.expect_request(registry, REGISTRY_BIND);
            let mut args = MessageReader::new(&body);
            assert_eq!(args.uint().expect("name"), 7);
            assert_eq!(args.string().expect("interface"), "wl_seat");
            assert_eq!(args.uint().expect("version"), SEAT_VERSION);
            let seat = args.uint().expect("seat id");
            let cb = self.expect_sync();
            self.send(MessageWriter::new(seat, SEAT_CAPABILITIES).uint(capabilities));
            self.done(cb);
            if capabilities & SEAT_CAPABILITY_KEYBOARD == 0 {
                return 0;
            }

            let body = self.expect_request(seat, SEAT_GET_KEYBOARD);
            let keyboard = MessageReader::new(&body).uint().expect("keyboard id");
            let cb = self.expect_sync();
            self.send_with_fd(
                MessageWriter::new(keyboard, KEYBOARD_KEYMAP)
                    .uint(format)
                    .uint(size),
                keymap,
            );
            self.done(cb);
            keyboard
        }
    }

    fn devnull() -> OwnedFd {
        OwnedFd::from(std::fs::File::open("/dev/null").expect("open /dev/null"))
    }

    #[test]
    fn test_bootstrap_binds_seat_and_receives_keymap() {
        // Arrange
        let (conn, mut compositor) = FakeCompositor::pair();
        let server = thread::spawn(move || {
            let fd = devnull();
            let keyboard = compositor.serve_bootstrap(3, &fd, 1234);
            (compositor, keyboard)
        });

        // Act
        let result = WaylandClient::bootstrap(conn, TIMEOUT);
        let (_compositor, keyboard) = server.join().expect("compositor thread");

        // Assert
        let (client, keymap) = result.expect("bootstrap");
        assert_eq!(keymap.format, KEYMAP_FORMAT_XKB_V1);
        assert_eq!(keymap.size, 1234);
        assert_eq!(client.keyboard, Some(keyboard));
        // Only display, registry, seat and keyboard remain; callbacks are gone.
        assert_eq!(client.objects.len(), 4);
    }

    #[test]
    fn test_seat_without_keyboard_fails() {
        let (conn, mut compositor) = FakeCompositor::pair();
        let server = thread::spawn(move || {
            let fd = devnull();
            compositor.serve_bootstrap(1, &fd, 0);
            compositor
        });

        let result = WaylandClient::bootstrap(conn, TIMEOUT);
        let _compositor = server.join().expect("compositor thread");

        assert!(matches!(result, Err(WaylandError::NoKeyboard)));
    }

    #[test]
    fn test_registry_without_seat_fails() {
        let (conn, mut compositor) = FakeCompositor::pair();
        let server = thread::spawn(move || {
            compositor.expect_request(DISPLAY_ID, DISPLAY_GET_REGISTRY);
            let cb = compositor.expect_sync();
            compositor.done(cb);
            compositor
        });

        let result = WaylandClient::bootstrap(conn, TIMEOUT);
        let _compositor = server.join().expect("compositor thread");

        assert!(matches!(result, Err(WaylandError::NoSeat)));
    }

    #[test]
    fn test_display_error_is_reported() {
        let (conn, mut compositor) = FakeCompositor::pair();
        let server = thread::spawn(move || {
            compositor.expect_request(DISPLAY_ID, DISPLAY_GET_REGISTRY);
            compositor.expect_sync();
            compositor.send(
                MessageWriter::new(DISPLAY_ID, DISPLAY_ERROR)
                    .uint(2)
                    .uint(1)
                    .string("invalid method"),
            );
            compositor
        });

        let result = WaylandClient::bootstrap(conn, TIMEOUT);
        let _compositor = server.join().expect("compositor thread");

        match result {
            Err(WaylandError::Protocol { object, code, message }) => {
                assert_eq!((object, code), (2, 1));
                assert_eq!(message, "invalid method");
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[test]
    fn test_silent_compositor_times_out() {
        let (conn, _compositor) = FakeCompositor::pair();
        let result = WaylandClient::bootstrap(conn, Duration::from_millis(50));
        assert!(matches!(result, Err(WaylandError::Timeout)));
    }

    #[test]
    fn test_poll_translates_key_events() {
        // Arrange
        let (conn, mut compositor) = FakeCompositor::pair();
        let server = thread::spawn(move || {
            let fd = devnull();
            let keyboard = compositor.serve_bootstrap(2, &fd, 16);
            (compositor, keyboard)
        });
        let (mut client, _keymap) = WaylandClient::bootstrap(conn, TIMEOUT).expect("bootstrap");
        let (mut compositor, keyboard) = server.join().expect("compositor thread");

        compositor.key(keyboard, 30, 1); // KEY_A pressed
        compositor.key(keyboard, 30, 2); // unknown state
        compositor.key(keyboard, 0x300, 1); // above KEY_MAX
        compositor.key(keyboard, 0x1D, 1); // KEY_LEFTCTRL
        compositor.key(keyboard, 30, 0); // KEY_A released

        // Act: a socket pair delivers everything written above in one read.
        let mut events = Vec::new();
        let deadline = Instant::now() + TIMEOUT;
        while events.len() < 3 && Instant::now() < deadline {
            client.poll().expect("poll");
            events.extend(client.take_keys());
        }

        // Assert
        assert_eq!(
            events,
            vec![
                KeyEvent::press(ScanCode::A),
                KeyEvent::press(ScanCode::LEFTCONTROL),
                KeyEvent::release(ScanCode::A),
            ]
        );
        assert!(client.take_keys().is_empty());
    }

    #[test]
    fn test_release_is_skipped_for_version_one_keyboard() {
        // Arrange
        let (conn, mut compositor) = FakeCompositor::pair();
        let server = thread::spawn(move || {
            let fd = devnull();
            compositor.serve_bootstrap(2, &fd, 16);
            compositor
        });
        let (mut client, _keymap) = WaylandClient::bootstrap(conn, TIMEOUT).expect("bootstrap");
        let mut compositor = server.join().expect("compositor thread");

        // Act
        client.release_keyboard().expect("release");
        client.release_keyboard().expect("second release");

        // Assert: nothing was written to the socket.
        assert_eq!(compositor.conn.read_nonblocking().ok(), Some(0));
        assert!(client.keyboard.is_none());
    }

    #[test]
    fn test_events_for_unknown_objects_are_skipped() {
        let (conn, mut compositor) = FakeCompositor::pair();
        let mut client = WaylandClient::new(conn);
        compositor.send(MessageWriter::new(42, 0).uint(1));

        client.poll().expect("poll");

        assert!(client.take_keys().is_empty());
    }

    #[test]
    fn test_translate_key_bounds() {
        assert_eq!(translate_key(30, 1), Some(KeyEvent::press(ScanCode::A)));
        assert_eq!(translate_key(30, 3), None);
        assert_eq!(translate_key(u32::from(KEY_MAX) + 1, 1), None);
        assert_eq!(translate_key(0x110, 1), None); // BTN_LEFT
    }
}
