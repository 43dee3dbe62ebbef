use log::error;

use super::ThreadPool;
use crate::{KvError, Result};

/// Thin wrapper over a rayon pool. Panicking jobs are logged instead of
/// aborting the process.
pub struct RayonThreadPool {
    pool: rayon::ThreadPool,
}

impl ThreadPool for RayonThreadPool {
    fn new(threads: u32) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1) as usize)
            .thread_name(|i| format!("kvd-rayon-{}", i))
            .panic_handler(|_| error!("a job panicked on the rayon pool"))
            .build()
            .map_err(|e| KvError::Pooling(e.to_string()))?;
        Ok(RayonThreadPool { pool })
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool.spawn(job);
    }
}
