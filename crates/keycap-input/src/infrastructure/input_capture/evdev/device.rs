//! Kernel input device access: identity queries, capability probing and
//! non-blocking event reads.
//!
//! The backend never touches a file descriptor directly.  It goes through the
//! [`InputDevice`] and [`DeviceOpener`] traits so the probing and polling logic
//! can be exercised in tests with scripted devices.
//!
//! # ioctl cheat sheet (for beginners)
//!
//! | Request            | Returns                                           |
//! |--------------------|---------------------------------------------------|
//! | `EVIOCGVERSION`    | evdev driver version (`0x010001` = 1.0.1)         |
//! | `EVIOCGID`         | bus type, vendor, product, version                |
//! | `EVIOCGNAME(len)`  | NUL-terminated device name                        |
//! | `EVIOCGBIT(ev,len)`| bitmap of supported codes for event type `ev`     |

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::mem;
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use thiserror::Error;

/// `EV_SYN` event type.
pub const EV_SYN: u16 = 0x00;
/// `EV_KEY` event type.
pub const EV_KEY: u16 = 0x01;
/// Highest event type (`EV_MAX`).
pub const EV_MAX: u16 = 0x1F;
/// Length passed to `EVIOCGNAME`.
pub const NAME_LEN: usize = 256;

/// Bytes needed for a bitmap of `max + 1` bits.
pub const fn bitmap_len(max: u16) -> usize {
    max as usize / 8 + 1
}

/// One `struct input_event` without its timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub type_: u16,
    pub code: u16,
    pub value: i32,
}

/// `struct input_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputId {
    pub bustype: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

/// Identity of an accepted keyboard device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub path: PathBuf,
    pub name: String,
    pub driver_version: u32,
    pub id: InputId,
}

/// Formats as `"{name} ({major}.{minor}.{rev} {bus}/{vendor}/{product}/{version})"`.
impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.driver_version;
        write!(
            f,
            "{} ({}.{}.{} {:04X}/{:04X}/{:04X}/{:04X})",
            self.name,
            v >> 16,
            (v >> 8) & 0xFF,
            v & 0xFF,
            self.id.bustype,
            self.id.vendor,
            self.id.product,
            self.id.version,
        )
    }
}

/// Why a read from a device did not yield an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeviceReadError {
    /// No more queued events (`EAGAIN`).  Not an error.
    #[error("no pending events")]
    WouldBlock,

    /// The device was unplugged (`ENODEV`).
    #[error("device is gone")]
    Gone,

    /// The kernel returned fewer bytes than one `input_event`.
    #[error("short read of {0} bytes")]
    Truncated(usize),

    #[error("read failed: {0}")]
    Os(Errno),
}

impl From<Errno> for DeviceReadError {
    fn from(errno: Errno) -> Self {
        match errno {
            Errno::EAGAIN => DeviceReadError::WouldBlock,
            Errno::ENODEV => DeviceReadError::Gone,
            other => DeviceReadError::Os(other),
        }
    }
}

/// Why a device was not accepted as a keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("EVIOCGVERSION failed: {0}")]
    Version(Errno),

    #[error("EVIOCGID failed: {0}")]
    Id(Errno),

    #[error("EVIOCGNAME failed: {0}")]
    Name(Errno),

    #[error("EVIOCGBIT failed: {0}")]
    EventBits(Errno),

    #[error("device does not report EV_KEY")]
    NoKeyEvents,

    #[error("device reports no keys")]
    NoKeys,

    #[error("{0:?} does not look like a keyboard")]
    NotAKeyboard(String),
}

/// An open input device.
pub trait InputDevice {
    fn driver_version(&self) -> Result<u32, Errno>;
    fn input_id(&self) -> Result<InputId, Errno>;
    fn name(&self) -> Result<String, Errno>;

    /// Fills `buf` with the `EVIOCGBIT(ev_type)` bitmap; returns bytes written.
    fn event_bits(&self, ev_type: u16, buf: &mut [u8]) -> Result<usize, Errno>;

    /// Reads one queued event without blocking.
    fn read_event(&mut self) -> Result<RawEvent, DeviceReadError>;
}

/// Opens device nodes.  Separated out so tests can hand back scripted devices.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceOpener {
    fn open(&self, path: &Path) -> io::Result<Box<dyn InputDevice>>;
}

/// Runs every identity and capability check on `device`.
///
/// The device is accepted only if all identity queries succeed, it reports
/// `EV_KEY` with at least one key, and its name contains "keyboard" (ASCII
/// case-insensitive).
pub fn probe_keyboard(device: &dyn InputDevice, path: &Path) -> Result<DeviceIdentity, ProbeError> {
    let driver_version = device.driver_version().map_err(ProbeError::Version)?;
    let id = device.input_id().map_err(ProbeError::Id)?;
    let name = device.name().map_err(ProbeError::Name)?;

    let mut ev_bits = [0u8; bitmap_len(EV_MAX)];
    let written = device
        .event_bits(EV_SYN, &mut ev_bits)
        .map_err(ProbeError::EventBits)?;
    if !test_bit(&ev_bits[..written.min(ev_bits.len())], EV_KEY) {
        return Err(ProbeError::NoKeyEvents);
    }

    let mut key_bits = [0u8; bitmap_len(keycap_core::keymap::evdev::KEY_MAX)];
    let written = device
        .event_bits(EV_KEY, &mut key_bits)
        .map_err(ProbeError::EventBits)?;
    if key_bits[..written.min(key_bits.len())].iter().all(|&b| b == 0) {
        return Err(ProbeError::NoKeys);
    }

    // Composite HID receivers often expose their keyboard interface under a
    // vendor name; those are missed here.
    if !name.to_ascii_lowercase().contains("keyboard") {
        return Err(ProbeError::NotAKeyboard(name));
    }

    Ok(DeviceIdentity {
        path: path.to_path_buf(),
        name,
        driver_version,
        id,
    })
}

fn test_bit(bitmap: &[u8], bit: u16) -> bool {
    bitmap
        .get(usize::from(bit / 8))
        .is_some_and(|byte| byte & (1 << (bit % 8)) != 0)
}

// ── Kernel-backed implementation ──────────────────────────────────────────────

mod ioctl {
    use libc::{c_int, input_id};

    nix::ioctl_read!(eviocgversion, b'E', 0x01, c_int);
    nix::ioctl_read!(eviocgid, b'E', 0x02, input_id);
    nix::ioctl_read_buf!(eviocgname, b'E', 0x06, u8);
}

/// An `/dev/input/event*` node opened read-only and non-blocking.
pub struct EvdevDevice {
    file: File,
}

impl EvdevDevice {
    /// Opens `path` with `O_RDONLY | O_NONBLOCK | O_CLOEXEC`.
    pub fn open(path: &Path) -> io::Result<Self> {
        // std always adds O_CLOEXEC.
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)?;
        Ok(Self { file })
    }
}

impl InputDevice for EvdevDevice {
    fn driver_version(&self) -> Result<u32, Errno> {
        let mut version: libc::c_int = 0;
        // SAFETY: `version` is a valid c_int the kernel writes into.
        unsafe { ioctl::eviocgversion(self.file.as_raw_fd(), &mut version) }?;
        Ok(version as u32)
    }

    fn input_id(&self) -> Result<InputId, Errno> {
        // SAFETY: input_id is plain old data; all-zero is a valid value.
        let mut raw: libc::input_id = unsafe { mem::zeroed() };
        // SAFETY: `raw` is a valid input_id the kernel writes into.
        unsafe { ioctl::eviocgid(self.file.as_raw_fd(), &mut raw) }?;
        Ok(InputId {
            bustype: raw.bustype,
            vendor: raw.vendor,
            product: raw.product,
            version: raw.version,
        })
    }

    fn name(&self) -> Result<String, Errno> {
        let mut buf = [0u8; NAME_LEN];
        // SAFETY: the request length is taken from the slice, so the kernel
        // never writes past `buf`.
        unsafe { ioctl::eviocgname(self.file.as_raw_fd(), &mut buf) }?;
        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
    }

    fn event_bits(&self, ev_type: u16, buf: &mut [u8]) -> Result<usize, Errno> {
        let request = nix::request_code_read!(b'E', 0x20 + ev_type, buf.len());
        // SAFETY: the encoded length equals `buf.len()`, so the kernel writes
        // at most that many bytes into `buf`.
        let written = unsafe { libc::ioctl(self.file.as_raw_fd(), request as _, buf.as_mut_ptr()) };
        Errno::result(written).map(|n| n as usize)
    }

    fn read_event(&mut self) -> Result<RawEvent, DeviceReadError> {
        const EVENT_SIZE: usize = mem::size_of::<libc::input_event>();
        let mut buf = [0u8; EVENT_SIZE];
        let n = nix::unistd::read(self.file.as_raw_fd(), &mut buf)?;
        if n != EVENT_SIZE {
            return Err(DeviceReadError::Truncated(n));
        }
        // SAFETY: `buf` holds exactly one input_event as written by the kernel;
        // read_unaligned copes with the byte array's alignment.
        let event: libc::input_event =
            unsafe { std::ptr::read_unaligned(buf.as_ptr().cast::<libc::input_event>()) };
        Ok(RawEvent {
            type_: event.type_,
            code: event.code,
            value: event.value,
        })
    }
}

/// Opens real device nodes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDeviceOpener;

impl DeviceOpener for SystemDeviceOpener {
    fn open(&self, path: &Path) -> io::Result<Box<dyn InputDevice>> {
        Ok(Box::new(EvdevDevice::open(path)?))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
