//! # Scene file watching
//!
//! Watches the directory holding the scene file rather than the file itself,
//! since many editors save by writing a new file and renaming it over the
//! old one, which would end a watch on the original inode. Events for other
//! files in the directory are ignored.

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use tracing::{error, info};

/// Starts watching `path`.
///
/// Every modification or creation of the file sends a `()` on the returned
/// channel. The caller must keep the returned [`RecommendedWatcher`] alive;
/// dropping it stops the watch and disconnects the channel.
///
/// # Errors
///
/// Returns an error if `path` does not name an existing file or the watcher
/// cannot be started.
pub fn watch_file(path: &Path) -> Result<(RecommendedWatcher, Receiver<()>)> {
    let target = path
        .canonicalize()
        .with_context(|| format!("Cannot watch {}", path.display()))?;
    let directory = target
        .parent()
        .with_context(|| format!("{} has no parent directory", target.display()))?
        .to_path_buf();
    let file_name: OsString = target
        .file_name()
        .with_context(|| format!("{} is not a file", target.display()))?
        .to_owned();

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| match result {
        Ok(event) => {
            if is_change_to(&event, &file_name) {
                // The receiver is gone once the watch loop has exited.
                let _ = tx.send(());
            }
        }
        Err(e) => error!("File watcher error: {e:?}"),
    })
    .context("Failed to create file watcher")?;

    watcher
        .watch(&directory, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", directory.display()))?;
    info!("Watching {} for changes", target.display());
    Ok((watcher, rx))
}

/// Returns `true` if `event` modifies or creates a file called `file_name`.
fn is_change_to(event: &Event, file_name: &OsStr) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && event.paths.iter().any(|p| p.file_name() == Some(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, EventKind, ModifyKind};
    use std::path::PathBuf;
    use std::time::Duration;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn only_changes_to_the_scene_file_count() {
        let name = OsStr::new("scene.json");
        let modify = EventKind::Modify(ModifyKind::Data(DataChange::Content));
        assert!(is_change_to(&event(modify, "/tmp/a/scene.json"), name));
        assert!(is_change_to(&event(EventKind::Create(CreateKind::File), "/tmp/a/scene.json"), name));
        assert!(!is_change_to(&event(modify, "/tmp/a/other.json"), name));
        assert!(!is_change_to(&event(EventKind::Access(AccessKind::Any), "/tmp/a/scene.json"), name));
    }

    #[test]
    fn missing_file_cannot_be_watched() {
        let dir = tempfile::tempdir().unwrap();
        assert!(watch_file(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn writing_the_file_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        std::fs::write(&path, "{}").unwrap();
        let (_watcher, rx) = watch_file(&path).unwrap();
        // Give the backend a moment to register before the write.
        std::thread::sleep(Duration::from_millis(100));
        std::fs::write(&path, r#"{ "width": 4 }"#).unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }
}
