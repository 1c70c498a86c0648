//! Input folder watching: a start-up scan plus filesystem notifications.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::error::{AppError, Result};
use crate::infrastructure::csv::is_supported;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Created(PathBuf),
    Removed(PathBuf),
}

/// Maps one notification to the events the pipeline cares about.
fn classify_event(event: &Event) -> Vec<WatchEvent> {
    let supported = event.paths.iter().filter(|path| is_supported(path));
    match event.kind {
        EventKind::Create(_)
        | EventKind::Modify(ModifyKind::Name(RenameMode::To))
        | EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => {
            supported.cloned().map(WatchEvent::Created).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            // paths = [from, to]
            let mut events = Vec::new();
            if let Some(from) = event.paths.first().filter(|path| is_supported(path)) {
                events.push(WatchEvent::Removed(from.clone()));
            }
            if let Some(to) = event.paths.get(1).filter(|path| is_supported(path)) {
                events.push(WatchEvent::Created(to.clone()));
            }
            events
        }
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            supported.cloned().map(WatchEvent::Removed).collect()
        }
        _ => Vec::new(),
    }
}

/// Supported files already present in `dir`, sorted by name.
pub fn initial_scan(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| AppError::IoError(format!("Failed to read {}: {}", dir.display(), e)))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_supported(path))
        .collect();
    files.sort();
    Ok(files)
}

/// Starts watching `dir`. Keep the returned watcher alive for as long as
/// events are wanted; dropping it stops the stream.
pub fn watch(dir: &Path) -> Result<(RecommendedWatcher, mpsc::UnboundedReceiver<WatchEvent>)> {
    let (tx, rx) = mpsc::unbounded_channel();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            for watch_event in classify_event(&event) {
                let _ = tx.send(watch_event);
            }
        }
        Err(err) => warn!(error = %err, "Watcher error"),
    })
    .map_err(|e| AppError::IoError(format!("Failed to start watcher: {}", e)))?;

    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .map_err(|e| AppError::IoError(format!("Failed to watch {}: {}", dir.display(), e)))?;

    debug!(dir = %dir.display(), "Watching input folder");
    Ok((watcher, rx))
}

/// Ensures each file triggers one batch, even when the OS reports it twice.
/// A removed file is forgotten, so putting it back processes it again.
/// Paths must come from the same (absolute) watch root to compare equal.
#[derive(Debug, Default)]
pub struct InputQueue {
    seen: HashSet<PathBuf>,
}

impl InputQueue {
    /// True the first time a path is offered.
    pub fn admit(&mut self, path: &Path) -> bool {
        self.seen.insert(path.to_path_buf())
    }

    pub fn forget(&mut self, path: &Path) {
        self.seen.remove(path);
    }
}
