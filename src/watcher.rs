use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use spdlog::{debug, error, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::ConfigHandle;

const DEBOUNCE: Duration = Duration::from_millis(500);

/// Keeps the filesystem watcher and its reload task alive. Dropping it stops both.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// What to watch and which changes count.
#[derive(Debug, Clone)]
pub struct WatchTargets {
    pub cfg_path: Option<PathBuf>,
    pub content_dirs: Vec<PathBuf>,
}

impl WatchTargets {
    pub fn config_only(cfg_path: PathBuf) -> Self {
        WatchTargets {
            cfg_path: Some(cfg_path),
            content_dirs: vec![],
        }
    }

    fn is_relevant(&self, event: &Event) -> bool {
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            return false;
        }

        event.paths.iter().any(|path| {
            let is_cfg = match (&self.cfg_path, path.file_name()) {
                (Some(cfg_path), Some(name)) => cfg_path.file_name() == Some(name),
                _ => false,
            };
            is_cfg || self.content_dirs.iter().any(|dir| path.starts_with(dir))
        })
    }
}

/// Starts watching `targets`. Bursts of changes are debounced and followed by a
/// configuration reload into `config`.
pub fn start_watcher(config: Arc<ConfigHandle>, targets: WatchTargets) -> notify::Result<ConfigWatcher> {
    let (tx, rx) = mpsc::channel::<()>(64);

    let filter = targets.clone();
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        match res {
            Ok(event) if filter.is_relevant(&event) => {
                // Callback runs on the watcher thread
                let _ = tx.blocking_send(());
            }
            Ok(_) => {}
            Err(e) => warn!("Watch error: {}", e),
        }
    })?;

    if let Some(ref cfg_path) = targets.cfg_path {
        let cfg_dir = match cfg_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        watcher.watch(cfg_dir, RecursiveMode::NonRecursive)?;
        info!("Watching configuration file {}", cfg_path.display());
    }

    for dir in targets.content_dirs.iter() {
        match watcher.watch(dir, RecursiveMode::Recursive) {
            Ok(()) => info!("Watching {}", dir.display()),
            Err(e) => warn!("Could not watch {}: {}", dir.display(), e),
        }
    }

    let task = spawn_reload_task(rx, config, targets.cfg_path);

    Ok(ConfigWatcher {
        _watcher: watcher,
        task,
    })
}

fn spawn_reload_task(mut rx: mpsc::Receiver<()>, config: Arc<ConfigHandle>, cfg_path: Option<PathBuf>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            loop {
                match tokio::time::timeout(DEBOUNCE, rx.recv()).await {
                    Ok(Some(())) => continue,
                    Ok(None) => return,
                    Err(_) => break,
                }
            }

            match cfg_path {
                Some(ref cfg_path) => match config.reload_from(cfg_path) {
                    Ok(()) => info!("Configuration reloaded from {}", cfg_path.display()),
                    Err(e) => error!("Keeping previous configuration: {}", e),
                },
                None => debug!("Change detected, content is re-read on the next request"),
            }
        }
    })
}
