use std::{fmt, str::FromStr};

use crate::{KvError, Result};

mod binary;
mod node;
mod redblack;
mod shared;

pub use self::binary::BinaryTree;
pub use self::node::Iter;
pub use self::redblack::RedBlackTree;
pub use self::shared::SharedTree;

/// Ordered map over byte-string keys, compared lexicographically.
///
/// Every strategy keeps at most one entry per key: `put` on an existing key
/// replaces its value in place.
pub trait OrderedMap: Send + Sync + 'static {
    /// Inserts `key`, or overwrites its value if the key is already present.
    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<()>;

    /// Returns the value stored under `key`.
    ///
    /// # Error
    ///
    /// It returns `KvError::KeyNotFound` if the given key is not found.
    fn get(&self, key: &[u8]) -> Result<&[u8]>;

    /// Removes `key` and its value.
    ///
    /// # Error
    ///
    /// It returns `KvError::KeyNotFound` if the given key is not found.
    fn delete(&mut self, key: &[u8]) -> Result<()>;

    /// Lazy in-order traversal, smallest key first.
    fn iter(&self) -> Iter<'_>;

    /// Feeds every entry, in key order, to `sink`.
    fn walk(&self, sink: &mut dyn FnMut(&[u8], &[u8])) {
        for (key, value) in self.iter() {
            sink(key, value);
        }
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of nodes on the longest root-to-leaf path.
    fn height(&self) -> usize;

    /// Runs a full consistency check over the tree.
    ///
    /// Returns `KvError::InvariantViolation` describing the first broken
    /// invariant. A failure here is a bug in the tree code.
    fn validate(&self) -> Result<()>;
}

/// The tree strategy a server is started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Plain binary search tree, no rebalancing.
    Binary,
    /// Red-black tree, height stays within 2*log2(n+1).
    #[default]
    RedBlack,
}

impl Backend {
    pub const NAMES: [&'static str; 2] = ["binary", "redblack"];

    pub fn name(self) -> &'static str {
        match self {
            Backend::Binary => "binary",
            Backend::RedBlack => "redblack",
        }
    }

    /// Creates an empty tree of this kind.
    pub fn build(self) -> Box<dyn OrderedMap> {
        match self {
            Backend::Binary => Box::new(BinaryTree::new()),
            Backend::RedBlack => Box::new(RedBlackTree::new()),
        }
    }
}

impl FromStr for Backend {
    type Err = KvError;

    fn from_str(name: &str) -> Result<Backend> {
        match name {
            "binary" => Ok(Backend::Binary),
            "redblack" => Ok(Backend::RedBlack),
            other => Err(KvError::UnknownBackend(other.to_owned())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
