//! Pools that run one job per client connection.
use crate::Result;

mod naive;
mod rayon_pool;
mod shared_queue;

pub use self::naive::NaiveThreadPool;
pub use self::rayon_pool::RayonThreadPool;
pub use self::shared_queue::SharedQueueThreadPool;

pub trait ThreadPool {
    /// Starts `threads` workers.
    fn new(threads: u32) -> Result<Self>
    where
        Self: Sized;

    /// Queues `job` for execution on one of the workers.
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static;
}
