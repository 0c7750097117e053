//! Wayland compositor backend.
//!
//! Talks the Wayland wire protocol directly over the compositor socket: no
//! client library, no toolkit, no window.  The compositor only sends key
//! events to a client whose surface has keyboard focus, so this backend sees
//! keys while the application's own window is focused and nothing otherwise.
//!
//! | Module       | Responsibility                                      |
//! |--------------|-----------------------------------------------------|
//! | `wire`       | Message framing and argument encoding               |
//! | `connection` | Socket resolution, non-blocking I/O, fd passing     |
//! | `client`     | Object table, start-up round-trips, event dispatch  |
//! | `keymap`     | Keymap fd mapping, xkbcommon compilation, labels    |

pub mod client;
pub mod connection;
pub mod keymap;
pub mod wire;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use keycap_core::{KeyEvent, ScanCode};
use nix::errno::Errno;
use thiserror::Error;
use tracing::{debug, info, warn};

use self::client::WaylandClient;
use self::connection::{resolve_socket, Connection};
use self::keymap::{map_keymap, CompiledKeymap};
use self::wire::WireError;
use super::{BackendKind, KeyInput, LabelTable};
use crate::infrastructure::storage::config::InputConfig;

/// Errors from the compositor connection.
#[derive(Debug, Error)]
pub enum WaylandError {
    #[error("no compositor socket: {0}")]
    NoSocket(String),

    #[error("cannot connect to {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("socket error: {0}")]
    Os(Errno),

    #[error("malformed message: {0}")]
    Wire(#[from] WireError),

    #[error("compositor error on object {object} (code {code}): {message}")]
    Protocol {
        object: u32,
        code: u32,
        message: String,
    },

    #[error("compositor did not answer in time")]
    Timeout,

    #[error("compositor closed the connection")]
    ConnectionClosed,

    #[error("compositor advertises no wl_seat")]
    NoSeat,

    #[error("seat has no keyboard capability")]
    NoKeyboard,

    #[error("compositor sent no keymap")]
    NoKeymap,

    #[error("unsupported keymap format {0}")]
    UnsupportedKeymapFormat(u32),

    #[error("keymap failed to compile")]
    KeymapCompile,
}

/// Keyboard capture through a compositor connection.
pub struct WaylandKeyInput {
    client: Option<WaylandClient>,
    labels: LabelTable,
}

impl WaylandKeyInput {
    /// Connects to the session compositor and binds its keyboard.
    ///
    /// # Errors
    ///
    /// Any failure of socket resolution, the start-up round-trips or keymap
    /// compilation.  Nothing stays open on failure.
    pub fn new(config: &InputConfig) -> Result<Self, WaylandError> {
        let conn = connect_session()?;
        let input = Self::from_connection(conn, config.roundtrip_timeout())?;
        info!(labels = input.labels.len(), "compositor keyboard capture started");
        Ok(input)
    }

    /// Runs the start-up sequence on an already-connected socket.
    pub fn from_connection(conn: Connection, timeout: Duration) -> Result<Self, WaylandError> {
        let (client, keymap_fd) = WaylandClient::bootstrap(conn, timeout)?;
        let text = map_keymap(keymap_fd.fd, keymap_fd.size)?;
        let labels = CompiledKeymap::compile(text)?.labels();
        Ok(Self {
            client: Some(client),
            labels,
        })
    }
}

fn connect_session() -> Result<Connection, WaylandError> {
    let target = resolve_socket(|key| std::env::var_os(key))?;
    debug!(?target, "connecting to compositor");
    Connection::connect(&target)
}

/// Connects just long enough to read the compositor keymap and returns its
/// labels.  Used to label raw-device events inside an XWayland session.
pub fn fetch_keymap_labels(config: &InputConfig) -> Result<LabelTable, WaylandError> {
    let mut input = WaylandKeyInput::from_connection(connect_session()?, config.roundtrip_timeout())?;
    let labels = std::mem::take(&mut input.labels);
    input.dispose();
    Ok(labels)
}

impl KeyInput for WaylandKeyInput {
    fn get_events(&mut self) -> Vec<KeyEvent> {
        let Some(client) = self.client.as_mut() else {
            return Vec::new();
        };
        if let Err(e) = client.poll() {
            warn!("compositor connection lost: {e}");
            // Keys dispatched before the failure are still delivered.
            let keys = client.take_keys();
            self.client = None;
            return keys;
        }
        client.take_keys()
    }

    fn convert_scan_code_to_string(&self, key: ScanCode) -> &'static str {
        self.labels.lookup(key)
    }

    fn dispose(&mut self) {
        if let Some(mut client) = self.client.take() {
            if let Err(e) = client.release_keyboard() {
                debug!("keyboard release failed: {e}");
            }
            debug!("compositor keyboard capture disposed");
        }
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Compositor
    }
}

impl Drop for WaylandKeyInput {
    fn drop(&mut self) {
        self.dispose();
    }
}
