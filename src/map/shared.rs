//! Map handle shared between threads.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::MapModel;

/// A [`MapModel`] behind a read-write lock.
///
/// Readers see either the state before or after an edit, never a
/// half-applied resize.
#[derive(Debug, Clone)]
pub struct SharedMap(Arc<RwLock<MapModel>>);

impl SharedMap {
    pub fn new(map: MapModel) -> Self {
        Self(Arc::new(RwLock::new(map)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, MapModel> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, MapModel> {
        self.0.write()
    }

    /// Resize under the write lock.
    pub fn resize(&self, width: i32, height: i32) {
        self.0.write().resize(width, height);
    }
}
