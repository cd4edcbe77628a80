//! Watch mode
//!
//! Monitors a context root for files appearing and disappearing, batches the events
//! into [`GraphDelta`]s and recompiles the context module after each batch. The
//! recompile goes through [`ContextResolutionService::transform_context_module`], so
//! every batch after the first is applied as a patch.
//!
//! Directory events are resolved against the filesystem: a directory that appears is
//! expanded into the files below it, and a directory that disappears is handed on as a
//! removal, which drops everything the baseline holds below it.

use crate::error::ContextError;
use crate::matcher::in_ignored_dir;
use crate::service::ContextResolutionService;
use crate::transform::CompiledModule;
use crate::types::{ContextCriteria, DeltaHint, GraphDelta};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Watch mode configuration
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Batch window in milliseconds
    pub batch_window_ms: u64,
    /// Maximum events per batch
    pub max_batch_size: usize,
    /// Directory names below the context root whose contents never produce events
    pub ignore_dirs: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            batch_window_ms: 50,
            max_batch_size: 100,
            ignore_dirs: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                "target".to_string(),
            ],
        }
    }
}

/// Membership-relevant filesystem change
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeEvent {
    Created(PathBuf),
    Removed(PathBuf),
    Renamed { from: PathBuf, to: PathBuf },
}

/// Convert a notify event. Content modifications are dropped since they never change
/// which files a context contains.
pub fn convert_event(event: &Event) -> Option<ChangeEvent> {
    let first = event.paths.first().cloned();
    match event.kind {
        EventKind::Create(_) => first.map(ChangeEvent::Created),
        EventKind::Remove(_) => first.map(ChangeEvent::Removed),
        EventKind::Modify(ModifyKind::Name(mode)) => {
            if event.paths.len() >= 2 {
                return Some(ChangeEvent::Renamed {
                    from: event.paths[0].clone(),
                    to: event.paths[1].clone(),
                });
            }
            let path = first?;
            match mode {
                RenameMode::From => Some(ChangeEvent::Removed(path)),
                RenameMode::To => Some(ChangeEvent::Created(path)),
                // single-path rename with unknown direction
                _ if path.exists() => Some(ChangeEvent::Created(path)),
                _ => Some(ChangeEvent::Removed(path)),
            }
        }
        _ => None,
    }
}

/// Accumulates change events under one context root into one delta
#[derive(Debug)]
pub struct EventBatcher {
    root: PathBuf,
    config: WatchConfig,
    pending: DeltaHint,
    events: usize,
}

impl EventBatcher {
    pub fn new(root: impl Into<PathBuf>, config: WatchConfig) -> Self {
        Self {
            root: root.into(),
            config,
            pending: DeltaHint::default(),
            events: 0,
        }
    }

    /// Add an event. Returns true once the batch is full.
    pub fn add_event(&mut self, event: ChangeEvent) -> bool {
        let delta = match event {
            ChangeEvent::Created(path) => DeltaHint::new(self.created_files(path), vec![]),
            ChangeEvent::Removed(path) if !self.should_ignore(&path) => {
                DeltaHint::new(vec![], vec![path])
            }
            ChangeEvent::Removed(_) => return false,
            ChangeEvent::Renamed { from, to } => {
                let removed = (!self.should_ignore(&from)).then_some(from);
                DeltaHint::new(self.created_files(to), removed)
            }
        };
        if delta.is_empty() {
            return false;
        }
        self.pending.merge(delta);
        self.events += 1;
        self.events >= self.config.max_batch_size
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take the accumulated delta and start a new batch.
    pub fn take_batch(&mut self) -> GraphDelta {
        let pending = std::mem::take(&mut self.pending);
        self.events = 0;
        GraphDelta {
            added_files: pending.added,
            deleted_files: pending.removed.into_iter().collect(),
        }
    }

    /// Files a creation brings into view. A directory is walked, since its contents
    /// may have arrived in one move without events of their own.
    fn created_files(&self, path: PathBuf) -> Vec<PathBuf> {
        if !path.is_dir() {
            return if self.should_ignore(&path) {
                Vec::new()
            } else {
                vec![path]
            };
        }

        let ignore_dirs = &self.config.ignore_dirs;
        let files: Vec<PathBuf> = WalkDir::new(&path)
            .into_iter()
            .filter_entry(|entry| {
                !(entry.file_type().is_dir()
                    && ignore_dirs
                        .iter()
                        .any(|dir| entry.file_name() == dir.as_str()))
            })
            // entries can vanish mid-walk; their removal events follow
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|file| !self.should_ignore(file))
            .collect();
        debug!(dir = %path.display(), files = files.len(), "Expanded created directory");
        files
    }

    fn should_ignore(&self, path: &Path) -> bool {
        match path.strip_prefix(&self.root) {
            Ok(rel) => in_ignored_dir(rel, &self.config.ignore_dirs),
            // outside the root; the service scopes these away
            Err(_) => false,
        }
    }
}

/// One recompilation of the watched context module
#[derive(Debug, Clone)]
pub struct WatchUpdate {
    /// Batch number, 0 for the initial resolution
    pub batch: usize,
    pub delta: GraphDelta,
    pub compiled: CompiledModule,
}

/// Watches one context root and keeps its module current
pub struct ContextWatcher {
    service: Arc<ContextResolutionService>,
    criteria: ContextCriteria,
    config: WatchConfig,
    running: Arc<RwLock<bool>>,
}

impl ContextWatcher {
    pub fn new(
        service: Arc<ContextResolutionService>,
        criteria: ContextCriteria,
        config: WatchConfig,
    ) -> Self {
        Self {
            service,
            criteria,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Handle that stops [`run`](Self::run) after its current wait.
    pub fn stop_handle(&self) -> Arc<RwLock<bool>> {
        Arc::clone(&self.running)
    }

    /// Resolve once, then watch until stopped or the watcher channel closes.
    ///
    /// Blocks the calling thread; `runtime` drives the async resolutions.
    pub fn run<F>(&self, runtime: &Handle, mut on_update: F) -> Result<(), ContextError>
    where
        F: FnMut(&WatchUpdate),
    {
        *self.running.write() = true;
        let root = self.criteria.root.clone();

        let initial = runtime.block_on(self.service.transform_context_module(&root, &self.criteria))?;
        on_update(&WatchUpdate {
            batch: 0,
            delta: GraphDelta::default(),
            compiled: initial,
        });

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            if let Err(e) = tx.send(res) {
                error!("Error sending watch event: {}", e);
            }
        })?;
        let mode = if self.criteria.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(&root, mode)?;
        info!(root = %root.display(), "Watching context root");

        let mut batcher = EventBatcher::new(root.clone(), self.config.clone());
        let batch_window = Duration::from_millis(self.config.batch_window_ms);
        let mut last_batch_time = Instant::now();
        let mut batch = 0;

        while *self.running.read() {
            let timeout = batch_window.saturating_sub(last_batch_time.elapsed());
            let mut flush = false;
            match rx.recv_timeout(timeout.max(Duration::from_millis(1))) {
                Ok(Ok(event)) => {
                    if let Some(change) = convert_event(&event) {
                        flush = batcher.add_event(change);
                    }
                }
                Ok(Err(e)) => {
                    warn!("Watch error: {}", e);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    error!("Watcher channel disconnected");
                    break;
                }
            }

            if batcher.is_empty() {
                last_batch_time = Instant::now();
                continue;
            }
            if flush || last_batch_time.elapsed() >= batch_window {
                batch += 1;
                let delta = batcher.take_batch();
                let affected = self.service.record_graph_delta(&delta);
                info!(batch, affected, "Applying watch batch");
                let compiled = runtime
                    .block_on(self.service.transform_context_module(&root, &self.criteria))?;
                on_update(&WatchUpdate {
                    batch,
                    delta,
                    compiled,
                });
                last_batch_time = Instant::now();
            }
        }

        Ok(())
    }

    pub fn stop(&self) {
        *self.running.write() = false;
    }
}
