//! Device directory scanning and hot-plug notifications.
//!
//! A `notify` watcher runs on its own thread and forwards `event*` node
//! additions and removals into an unbounded channel.  The backend drains the
//! channel on every poll, so no notification is ever processed concurrently
//! with a device read.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};

use notify::event::{CreateKind, ModifyKind, RemoveKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::warn;

use crate::infrastructure::input_capture::CaptureError;

/// A change in the set of device nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotplugEvent {
    Added(PathBuf),
    Removed(PathBuf),
}

/// Returns `true` for `event<N>` node names.
pub fn is_event_node(path: &Path) -> bool {
    path.file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|name| name.starts_with("event"))
}

/// Maps one watcher notification onto hot-plug events for `event*` nodes.
///
/// Creation and modification (udev fixing permissions after creation) both
/// count as "added"; the backend ignores paths it already tracks.
pub fn classify(event: &Event) -> Vec<HotplugEvent> {
    let make: fn(PathBuf) -> HotplugEvent = match event.kind {
        EventKind::Create(CreateKind::File | CreateKind::Any | CreateKind::Other) => {
            HotplugEvent::Added
        }
        EventKind::Modify(ModifyKind::Metadata(_) | ModifyKind::Any) => HotplugEvent::Added,
        EventKind::Remove(RemoveKind::File | RemoveKind::Any | RemoveKind::Other) => {
            HotplugEvent::Removed
        }
        _ => return Vec::new(),
    };

    event
        .paths
        .iter()
        .filter(|p| is_event_node(p))
        .cloned()
        .map(make)
        .collect()
}

/// Lists existing `event*` nodes in `dir`, sorted by path.
pub fn scan_device_dir(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut nodes: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| is_event_node(p))
        .collect();
    nodes.sort();
    Ok(nodes)
}

/// Starts watching `dir`.  The watcher must be kept alive for notifications to
/// keep flowing; dropping it stops the watch thread.
pub fn watch_device_dir(
    dir: &Path,
) -> Result<(RecommendedWatcher, Receiver<HotplugEvent>), CaptureError> {
    let (tx, rx) = mpsc::channel();

    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        match res {
            Ok(event) => {
                for change in classify(&event) {
                    // The receiver is gone once the backend is disposed.
                    if tx.send(change).is_err() {
                        return;
                    }
                }
            }
            Err(e) => warn!("device directory watch error: {e}"),
        }
    })
    .map_err(|e| CaptureError::DeviceWatch(e.to_string()))?;

    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .map_err(|e| CaptureError::DeviceWatch(format!("{}: {e}", dir.display())))?;

    Ok((watcher, rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::MetadataKind;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_create_of_event_node_is_added() {
        // Arrange
        let ev = event(EventKind::Create(CreateKind::File), "/dev/input/event7");

        // Act
        let changes = classify(&ev);

        // Assert
        assert_eq!(changes, vec![HotplugEvent::Added(PathBuf::from("/dev/input/event7"))]);
    }

    #[test]
    fn test_permission_change_counts_as_added() {
        let ev = event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
            "/dev/input/event2",
        );
        assert_eq!(classify(&ev), vec![HotplugEvent::Added(PathBuf::from("/dev/input/event2"))]);
    }

    #[test]
    fn test_remove_of_event_node_is_removed() {
        let ev = event(EventKind::Remove(RemoveKind::File), "/dev/input/event7");
        assert_eq!(classify(&ev), vec![HotplugEvent::Removed(PathBuf::from("/dev/input/event7"))]);
    }

    #[test]
    fn test_non_event_nodes_are_ignored() {
        assert!(classify(&event(EventKind::Create(CreateKind::File), "/dev/input/mouse0")).is_empty());
        assert!(classify(&event(EventKind::Create(CreateKind::Folder), "/dev/input/by-id")).is_empty());
        assert!(classify(&event(EventKind::Access(notify::event::AccessKind::Any), "/dev/input/event1"))
            .is_empty());
    }

    #[test]
    fn test_scan_lists_event_nodes_sorted() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("keycap_scan_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create dir");
        for name in ["event3", "mouse0", "event1", "js0"] {
            std::fs::write(dir.join(name), b"").expect("create node");
        }

        // Act
        let nodes = scan_device_dir(&dir).expect("scan");

        // Assert
        assert_eq!(nodes, vec![dir.join("event1"), dir.join("event3")]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_scan_of_missing_dir_is_an_error() {
        assert!(scan_device_dir(Path::new("/nonexistent/keycap/input")).is_err());
    }
}
