use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Backend, OrderedMap};
use crate::{KvError, Result};

/// A tree that can be shared between request handlers.
///
/// Structural changes (`put`, `delete`) take the write lock. Lookups and
/// walks take the read lock, so they never see a tree halfway through a
/// rotation.
#[derive(Clone)]
pub struct SharedTree {
    backend: Backend,
    tree: Arc<RwLock<Box<dyn OrderedMap>>>,
}

impl SharedTree {
    pub fn new(backend: Backend) -> SharedTree {
        SharedTree {
            backend,
            tree: Arc::new(RwLock::new(backend.build())),
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Box<dyn OrderedMap>>> {
        self.tree.read().map_err(|_| KvError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Box<dyn OrderedMap>>> {
        self.tree.write().map_err(|_| KvError::Poisoned)
    }

    pub fn put(&self, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        self.write()?.put(key, value)
    }

    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        let tree = self.read()?;
        tree.get(key).map(<[u8]>::to_vec)
    }

    pub fn delete(&self, key: &[u8]) -> Result<()> {
        self.write()?.delete(key)
    }

    /// Walks the whole tree under the read lock.
    pub fn walk(&self, sink: &mut dyn FnMut(&[u8], &[u8])) -> Result<()> {
        self.read()?.walk(sink);
        Ok(())
    }

    /// Copies out every entry in key order.
    pub fn entries(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let tree = self.read()?;
        Ok(tree.iter().map(|(k, v)| (k.to_vec(), v.to_vec())).collect())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    pub fn height(&self) -> Result<usize> {
        Ok(self.read()?.height())
    }

    pub fn validate(&self) -> Result<()> {
        self.read()?.validate()
    }
}
