use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error};

use super::ThreadPool;
use crate::Result;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Workers share one channel. A worker whose job panicked is replaced by a
/// fresh thread, so the pool keeps its size.
pub struct SharedQueueThreadPool {
    tx: Sender<Job>,
}

impl ThreadPool for SharedQueueThreadPool {
    fn new(threads: u32) -> Result<Self> {
        let (tx, rx) = unbounded::<Job>();
        for _ in 0..threads.max(1) {
            let rx = JobReceiver(rx.clone());
            thread::Builder::new().spawn(move || run_jobs(rx))?;
        }
        Ok(SharedQueueThreadPool { tx })
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Err(e) = self.tx.send(Box::new(job)) {
            error!("no worker left to take the job, err: {}", e);
        }
    }
}

#[derive(Clone)]
struct JobReceiver(Receiver<Job>);

impl Drop for JobReceiver {
    fn drop(&mut self) {
        if thread::panicking() {
            let rx = self.clone();
            if let Err(e) = thread::Builder::new().spawn(move || run_jobs(rx)) {
                error!("failed to replace a panicked worker, err: {}", e);
            }
        }
    }
}

fn run_jobs(rx: JobReceiver) {
    loop {
        match rx.0.recv() {
            Ok(job) => job(),
            Err(_) => {
                debug!("worker exits, the pool is gone");
                break;
            }
        }
    }
}
