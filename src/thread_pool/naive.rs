use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_queue::SegQueue;
use log::{debug, error};

use super::ThreadPool;

type Job = Box<dyn FnOnce() + Send + 'static>;

const IDLE_SLEEP: Duration = Duration::from_millis(1);

struct Worker {
    jh: Option<JoinHandle<()>>,
}

impl Worker {
    fn new(queue: Arc<SegQueue<Job>>, shutdown: Arc<AtomicBool>) -> crate::Result<Worker> {
        let jh = thread::Builder::new().spawn(move || loop {
            match queue.pop() {
                Some(job) => job(),
                None if shutdown.load(Ordering::Acquire) => break,
                None => thread::sleep(IDLE_SLEEP),
            }
        })?;
        Ok(Worker { jh: Some(jh) })
    }
}

/// Workers poll a lock-free queue. A job that panics takes its worker down
/// with it, so the pool shrinks; prefer [`SharedQueueThreadPool`] for
/// serving.
///
/// [`SharedQueueThreadPool`]: super::SharedQueueThreadPool
pub struct NaiveThreadPool {
    queue: Arc<SegQueue<Job>>,
    shutdown: Arc<AtomicBool>,
    workers: Vec<Worker>,
}

impl ThreadPool for NaiveThreadPool {
    fn new(threads: u32) -> crate::Result<Self>
    where
        Self: Sized,
    {
        let queue = Arc::new(SegQueue::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut workers: Vec<Worker> = Vec::with_capacity(threads as usize);
        for _ in 0..threads.max(1) {
            workers.push(Worker::new(queue.clone(), shutdown.clone())?)
        }

        Ok(NaiveThreadPool {
            queue,
            shutdown,
            workers,
        })
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.push(Box::new(job));
    }
}

impl Drop for NaiveThreadPool {
    // drains the queue, then joins
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        for worker in &mut self.workers {
            if let Some(jh) = worker.jh.take() {
                if jh.join().is_err() {
                    error!("naive pool worker died from a panicking job");
                }
            }
        }
        debug!("naive pool stopped");
    }
}
