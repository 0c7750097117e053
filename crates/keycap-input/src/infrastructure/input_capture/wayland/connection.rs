//! Compositor socket I/O: byte and file-descriptor queues.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::io::{IoSlice, IoSliceMut};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::sys::socket::{recvmsg, sendmsg, ControlMessage, ControlMessageOwned, MsgFlags};

use super::wire::{MessageHeader, HEADER_SIZE};
use super::WaylandError;

/// Most descriptors libwayland passes in one `sendmsg`.
const MAX_FDS_OUT: usize = 28;
const READ_CHUNK: usize = 4096;

/// Where the compositor socket comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketTarget {
    /// An already-connected descriptor handed down by the parent process.
    Inherited(RawFd),
    Path(PathBuf),
}

/// Resolves the compositor socket from `WAYLAND_SOCKET`, else
/// `WAYLAND_DISPLAY` (default `wayland-0`), which is either absolute or
/// relative to `XDG_RUNTIME_DIR`.
pub fn resolve_socket(
    env: impl Fn(&str) -> Option<OsString>,
) -> Result<SocketTarget, WaylandError> {
    if let Some(raw) = env("WAYLAND_SOCKET") {
        let text = raw.to_string_lossy();
        return text
            .trim()
            .parse::<RawFd>()
            .ok()
            .filter(|fd| *fd >= 0)
            .map(SocketTarget::Inherited)
            .ok_or_else(|| {
                WaylandError::NoSocket(format!("WAYLAND_SOCKET={text:?} is not a descriptor"))
            });
    }

    let display = env("WAYLAND_DISPLAY")
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| OsString::from("wayland-0"));
    let display = PathBuf::from(display);
    if display.is_absolute() {
        return Ok(SocketTarget::Path(display));
    }

    let runtime_dir = env("XDG_RUNTIME_DIR")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| WaylandError::NoSocket("XDG_RUNTIME_DIR is not set".to_string()))?;
    Ok(SocketTarget::Path(PathBuf::from(runtime_dir).join(display)))
}

/// A connected compositor socket plus its receive queues.
#[derive(Debug)]
pub struct Connection {
    stream: UnixStream,
    incoming: Vec<u8>,
    fds: VecDeque<OwnedFd>,
    outgoing: Vec<u8>,
}

impl Connection {
    /// Connects to `target`.
    pub fn connect(target: &SocketTarget) -> Result<Self, WaylandError> {
        let stream = match target {
            // SAFETY: the parent process handed this descriptor to us for
            // exclusive use; nothing else in this process owns it.
            SocketTarget::Inherited(fd) => unsafe { UnixStream::from_raw_fd(*fd) },
            SocketTarget::Path(path) => UnixStream::connect(path).map_err(|source| {
                WaylandError::Connect {
                    path: path.clone(),
                    source,
                }
            })?,
        };
        Ok(Self::from_stream(stream))
    }

    pub fn from_stream(stream: UnixStream) -> Self {
        Self {
            stream,
            incoming: Vec::new(),
            fds: VecDeque::new(),
            outgoing: Vec::new(),
        }
    }

    /// Appends an encoded message to the send buffer.
    pub fn queue(&mut self, message: &[u8]) {
        self.outgoing.extend_from_slice(message);
    }

    /// Writes the send buffer to the socket.
    pub fn flush(&mut self) -> Result<(), WaylandError> {
        self.send_with_fds(&[])
    }

    /// Writes the send buffer, attaching `fds` to the first chunk.
    pub fn send_with_fds(&mut self, fds: &[RawFd]) -> Result<(), WaylandError> {
        let fd = self.stream.as_raw_fd();
        let mut pending_fds = fds;
        while !self.outgoing.is_empty() || !pending_fds.is_empty() {
            let iov = [IoSlice::new(&self.outgoing)];
            let batch = &pending_fds[..pending_fds.len().min(MAX_FDS_OUT)];
            let rights = [ControlMessage::ScmRights(batch)];
            let cmsgs: &[ControlMessage] = if pending_fds.is_empty() { &[] } else { &rights };
            match sendmsg::<()>(fd, &iov, cmsgs, MsgFlags::MSG_NOSIGNAL, None) {
                Ok(sent) => {
                    self.outgoing.drain(..sent);
                    pending_fds = &pending_fds[batch.len()..];
                    if sent == 0 {
                        break;
                    }
                }
                Err(Errno::EINTR) => continue,
                Err(Errno::EPIPE) => return Err(WaylandError::ConnectionClosed),
                Err(e) => return Err(WaylandError::Os(e)),
            }
        }
        Ok(())
    }

    /// One non-blocking read.  Returns the number of bytes received; zero
    /// means nothing was pending.
    pub fn read_nonblocking(&mut self) -> Result<usize, WaylandError> {
        match self.recv(MsgFlags::MSG_DONTWAIT) {
            Err(WaylandError::Os(Errno::EAGAIN)) => Ok(0),
            other => other,
        }
    }

    /// Blocks until data arrives or `deadline` passes.
    pub fn read_until(&mut self, deadline: Instant) -> Result<usize, WaylandError> {
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(WaylandError::Timeout);
            }
            // A zero read timeout would mean "block forever".
            self.stream
                .set_read_timeout(Some(remaining.max(Duration::from_millis(1))))?;
            let result = self.recv(MsgFlags::empty());
            self.stream.set_read_timeout(None)?;
            match result {
                Err(WaylandError::Os(Errno::EAGAIN)) => return Err(WaylandError::Timeout),
                Err(WaylandError::Os(Errno::EINTR)) => continue,
                other => return other,
            }
        }
    }

    fn recv(&mut self, flags: MsgFlags) -> Result<usize, WaylandError> {
        let mut buf = [0u8; READ_CHUNK];
        let mut cmsg_buf = nix::cmsg_space!([RawFd; MAX_FDS_OUT]);

        let (bytes, received_fds) = {
            let mut iov = [IoSliceMut::new(&mut buf)];
            let msg = recvmsg::<()>(
                self.stream.as_raw_fd(),
                &mut iov,
                Some(&mut cmsg_buf),
                flags | MsgFlags::MSG_CMSG_CLOEXEC,
            )
            .map_err(WaylandError::Os)?;

            let mut received = Vec::new();
            for cmsg in msg.cmsgs() {
                if let ControlMessageOwned::ScmRights(fds) = cmsg {
                    received.extend(fds);
                }
            }
            (msg.bytes, received)
        };

        for raw in received_fds {
            // SAFETY: the kernel just installed this descriptor for us.
            self.fds.push_back(unsafe { OwnedFd::from_raw_fd(raw) });
        }

        if bytes == 0 {
            return Err(WaylandError::ConnectionClosed);
        }
        self.incoming.extend_from_slice(&buf[..bytes]);
        Ok(bytes)
    }

    /// Pops one complete message (header and body) from the receive buffer.
    pub fn next_message(&mut self) -> Result<Option<(MessageHeader, Vec<u8>)>, WaylandError> {
        let Some(header) = MessageHeader::parse(&self.incoming)? else {
            return Ok(None);
        };
        let size = usize::from(header.size);
        if self.incoming.len() < size {
            return Ok(None);
        }
        let body = self.incoming[HEADER_SIZE..size].to_vec();
        self.incoming.drain(..size);
        Ok(Some((header, body)))
    }

    /// Takes the oldest received descriptor.
    pub fn take_fd(&mut self) -> Option<OwnedFd> {
        self.fds.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::input_capture::wayland::wire::MessageWriter;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_resolve_defaults_to_wayland_0_in_runtime_dir() {
        let target = resolve_socket(env_of(&[("XDG_RUNTIME_DIR", "/run/user/1000")]));
        assert_eq!(
            target.ok(),
            Some(SocketTarget::Path(PathBuf::from("/run/user/1000/wayland-0")))
        );
    }

    #[test]
    fn test_resolve_uses_display_name_and_absolute_paths() {
        let relative = resolve_socket(env_of(&[
            ("XDG_RUNTIME_DIR", "/run/user/1000"),
            ("WAYLAND_DISPLAY", "wayland-1"),
        ]));
        assert_eq!(
            relative.ok(),
            Some(SocketTarget::Path(PathBuf::from("/run/user/1000/wayland-1")))
        );

        let absolute = resolve_socket(env_of(&[("WAYLAND_DISPLAY", "/tmp/compositor.sock")]));
        assert_eq!(
            absolute.ok(),
            Some(SocketTarget::Path(PathBuf::from("/tmp/compositor.sock")))
        );
    }

    #[test]
    fn test_resolve_prefers_inherited_socket() {
        let target = resolve_socket(env_of(&[("WAYLAND_SOCKET", "5"), ("WAYLAND_DISPLAY", "wayland-1")]));
        assert_eq!(target.ok(), Some(SocketTarget::Inherited(5)));

        assert!(matches!(
            resolve_socket(env_of(&[("WAYLAND_SOCKET", "nope")])),
            Err(WaylandError::NoSocket(_))
        ));
    }

    #[test]
    fn test_resolve_without_runtime_dir_fails() {
        assert!(matches!(
            resolve_socket(env_of(&[("WAYLAND_DISPLAY", "wayland-0")])),
            Err(WaylandError::NoSocket(_))
        ));
    }

    #[test]
    fn test_messages_are_split_at_header_size() {
        // Arrange
        let (a, mut b) = UnixStream::pair().expect("socketpair");
        let mut conn = Connection::from_stream(a);
        let first = MessageWriter::new(2, 0).uint(9).finish().expect("encode");
        let second = MessageWriter::new(3, 1).finish().expect("encode");
        b.write_all(&first).expect("write");
        b.write_all(&second[..4]).expect("write");

        // Act
        conn.read_until(Instant::now() + Duration::from_secs(1)).expect("read");
        let got_first = conn.next_message().expect("valid");
        let got_partial = conn.next_message().expect("valid");

        // Assert
        let (header, body) = got_first.expect("complete message");
        assert_eq!((header.object_id, header.opcode), (2, 0));
        assert_eq!(body, 9u32.to_ne_bytes().to_vec());
        assert!(got_partial.is_none());

        b.write_all(&second[4..]).expect("write");
        conn.read_until(Instant::now() + Duration::from_secs(1)).expect("read");
        let (header, body) = conn.next_message().expect("valid").expect("complete");
        assert_eq!((header.object_id, header.opcode), (3, 1));
        assert!(body.is_empty());
    }

    #[test]
    fn test_nonblocking_read_with_nothing_pending_returns_zero() {
        let (a, _b) = UnixStream::pair().expect("socketpair");
        let mut conn = Connection::from_stream(a);
        assert_eq!(conn.read_nonblocking().ok(), Some(0));
    }

    #[test]
    fn test_blocking_read_times_out() {
        let (a, _b) = UnixStream::pair().expect("socketpair");
        let mut conn = Connection::from_stream(a);
        let result = conn.read_until(Instant::now() + Duration::from_millis(20));
        assert!(matches!(result, Err(WaylandError::Timeout)));
    }

    #[test]
    fn test_peer_hangup_is_connection_closed() {
        let (a, b) = UnixStream::pair().expect("socketpair");
        drop(b);
        let mut conn = Connection::from_stream(a);
        assert!(matches!(conn.read_nonblocking(), Err(WaylandError::ConnectionClosed)));
    }

    #[test]
    fn test_descriptors_travel_with_data() {
        // Arrange
        let (a, b) = UnixStream::pair().expect("socketpair");
        let mut sender = Connection::from_stream(a);
        let mut receiver = Connection::from_stream(b);
        let file = std::fs::File::open("/dev/null").expect("open /dev/null");

        // Act
        sender.queue(&MessageWriter::new(4, 0).uint(1).finish().expect("encode"));
        sender.send_with_fds(&[file.as_raw_fd()]).expect("send");
        receiver.read_until(Instant::now() + Duration::from_secs(1)).expect("read");

        // Assert
        assert!(receiver.next_message().expect("valid").is_some());
        assert!(receiver.take_fd().is_some());
        assert!(receiver.take_fd().is_none());
    }
}
