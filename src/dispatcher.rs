use log::{debug, log_enabled, trace, Level};

use crate::{
    engine::{Backend, SharedTree},
    transport::{Request, Response},
    KvError, Result,
};

/// Routes requests onto the one tree the server was started with.
#[derive(Clone)]
pub struct Dispatcher {
    tree: SharedTree,
}

impl Dispatcher {
    pub fn new(backend: Backend) -> Dispatcher {
        Dispatcher::with_tree(SharedTree::new(backend))
    }

    pub fn with_tree(tree: SharedTree) -> Dispatcher {
        Dispatcher { tree }
    }

    pub fn tree(&self) -> &SharedTree {
        &self.tree
    }

    pub fn handle_put(&self, key: String, value: String) -> Result<()> {
        debug!("put {:?}", key);
        self.tree.put(key.into_bytes(), value.into_bytes())?;

        if log_enabled!(Level::Trace) {
            self.tree.walk(&mut |k: &[u8], v: &[u8]| {
                trace!(
                    "  {} => {}",
                    String::from_utf8_lossy(k),
                    String::from_utf8_lossy(v)
                )
            })?;
        }
        Ok(())
    }

    pub fn handle_get(&self, key: &str) -> Result<String> {
        debug!("get {:?}", key);
        let value = self.tree.get(key.as_bytes())?;
        Ok(String::from_utf8(value)?)
    }

    pub fn handle_delete(&self, key: &str) -> Result<()> {
        debug!("del {:?}", key);
        self.tree.delete(key.as_bytes())
    }

    pub fn handle_walk(&self) -> Result<Vec<(String, String)>> {
        debug!("walk");
        self.tree
            .entries()?
            .into_iter()
            .map(|(k, v)| -> Result<(String, String)> {
                Ok((String::from_utf8(k)?, String::from_utf8(v)?))
            })
            .collect()
    }

    /// Runs one request and turns the outcome into a response.
    pub fn handle(&self, req: Request) -> Response {
        let result = match req {
            Request::Put { key, value } => self.handle_put(key, value).map(|_| Response::Ok(None)),
            Request::Get { key } => self.handle_get(&key).map(|v| Response::Ok(Some(v))),
            Request::Del { key } => self.handle_delete(&key).map(|_| Response::Ok(None)),
            Request::Walk => self.handle_walk().map(Response::Entries),
        };

        match result {
            Ok(resp) => resp,
            Err(KvError::KeyNotFound) => Response::NotFound,
            Err(e) => Response::Err(e.to_string()),
        }
    }
}
