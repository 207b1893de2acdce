//! Polling change detection.
//!
//! [`Watcher`] snapshots the modification time of every file under a set of
//! paths and reports what differs on each [`poll`](Watcher::poll). Created,
//! modified and deleted files all count as changes. Paths that do not exist
//! yet are watched too and show up once created.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tracing::{debug, trace};

use crate::error::BuildError;
use crate::walk;

type Snapshot = BTreeMap<PathBuf, SystemTime>;

#[derive(Debug)]
pub struct Watcher {
    paths: Vec<PathBuf>,
    interval: Duration,
    snapshot: Snapshot,
}

impl Watcher {
    /// Starts watching `paths`, taking the initial snapshot immediately.
    pub fn new(paths: Vec<PathBuf>, interval: Duration) -> Result<Self, BuildError> {
        let snapshot = take_snapshot(&paths)?;
        debug!(paths = paths.len(), files = snapshot.len(), "watching");
        Ok(Self {
            paths,
            interval,
            snapshot,
        })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Returns the files that changed since the previous snapshot, sorted.
    pub fn poll(&mut self) -> Result<Vec<PathBuf>, BuildError> {
        let current = take_snapshot(&self.paths)?;
        let mut changed = BTreeSet::new();
        for (path, modified) in &current {
            if self.snapshot.get(path) != Some(modified) {
                changed.insert(path.clone());
            }
        }
        for path in self.snapshot.keys() {
            if !current.contains_key(path) {
                changed.insert(path.clone());
            }
        }
        self.snapshot = current;
        Ok(changed.into_iter().collect())
    }

    /// Sleeps in `interval` steps until something changes.
    pub fn wait(&mut self) -> Result<Vec<PathBuf>, BuildError> {
        loop {
            std::thread::sleep(self.interval);
            let changed = self.poll()?;
            if !changed.is_empty() {
                return Ok(changed);
            }
            trace!("no changes");
        }
    }
}

fn take_snapshot(paths: &[PathBuf]) -> Result<Snapshot, BuildError> {
    let mut snapshot = Snapshot::new();
    for path in paths {
        for entry in walk::entries(path)? {
            if !entry.is_dir {
                snapshot.insert(entry.path, entry.modified);
            }
        }
    }
    Ok(snapshot)
}
