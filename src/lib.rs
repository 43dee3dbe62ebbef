//! An in-memory ordered key/value store.
//!
//! Values live in one search tree, picked at startup: a plain binary search
//! tree or a red-black tree. `kvd` serves the tree over TCP and `kvctl`
//! talks to it.
pub mod client;
pub mod dispatcher;
pub mod engine;
mod error;
pub mod server;
pub mod thread_pool;
pub mod transport;

pub use client::KvClient;
pub use dispatcher::Dispatcher;
pub use engine::{Backend, BinaryTree, OrderedMap, RedBlackTree, SharedTree};
pub use error::{KvError, Result};
pub use server::KvServer;
