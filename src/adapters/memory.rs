use crate::domain::ports::{SnapshotPath, SnapshotSource};
use crate::utils::error::{DashboardError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// In-process snapshot store that records every fetch it serves.
///
/// Files can be published or withdrawn while tasks are reading from it.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: Mutex<HashMap<SnapshotPath, Vec<u8>>>,
    calls: Mutex<Vec<SnapshotPath>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: SnapshotPath, bytes: Vec<u8>) {
        lock(&self.files).insert(path, bytes);
    }

    pub fn insert_json(&self, path: SnapshotPath, value: &serde_json::Value) {
        self.insert(path, value.to_string().into_bytes());
    }

    pub fn remove(&self, path: &SnapshotPath) {
        lock(&self.files).remove(path);
    }

    /// Every path requested so far, in request order.
    pub fn calls(&self) -> Vec<SnapshotPath> {
        lock(&self.calls).clone()
    }

    pub fn calls_to(&self, path: &SnapshotPath) -> usize {
        lock(&self.calls).iter().filter(|p| *p == path).count()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }
}

#[async_trait]
impl SnapshotSource for MemorySource {
    async fn fetch(&self, path: &SnapshotPath) -> Result<Vec<u8>> {
        lock(&self.calls).push(path.clone());
        lock(&self.files)
            .get(path)
            .cloned()
            .ok_or_else(|| DashboardError::NotFound {
                resource: path.to_string(),
            })
    }
}
