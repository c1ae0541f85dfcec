//! Off-thread shape sampling.
//!
//! Sampling is pure, so it is the one piece of work allowed off the frame
//! loop. The result comes back through a channel and is consumed by a later
//! tick; nothing is shared with the hot loop except a cancel flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use super::{ShapeId, ShapePoint};
use crate::api::config::SamplingMode;

/// Outcome of polling a task.
#[derive(Debug, PartialEq)]
pub enum TaskPoll {
    Pending,
    Ready(Vec<ShapePoint>),
    /// Cancelled, or the worker died without delivering.
    Cancelled,
}

#[derive(Debug)]
enum TaskState {
    Ready(Vec<ShapePoint>),
    Waiting(Receiver<Vec<ShapePoint>>),
    Finished,
}

/// A sampling job for one (shape, count) pair.
#[derive(Debug)]
pub struct SampleTask {
    shape: ShapeId,
    count: usize,
    cancelled: Arc<AtomicBool>,
    state: TaskState,
}

impl SampleTask {
    /// Start sampling. `Background` uses a worker thread where threads exist.
    pub fn spawn(shape: ShapeId, count: usize, mode: SamplingMode) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let state = match mode {
            SamplingMode::Inline => TaskState::Ready(shape.sample(count)),
            SamplingMode::Background => spawn_worker(shape, count, Arc::clone(&cancelled)),
        };
        Self { shape, count, cancelled, state }
    }

    pub fn shape(&self) -> ShapeId {
        self.shape
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Non-blocking check for the result. Yields `Ready` at most once.
    pub fn poll(&mut self) -> TaskPoll {
        if self.cancelled.load(Ordering::Acquire) {
            self.state = TaskState::Finished;
            return TaskPoll::Cancelled;
        }
        match std::mem::replace(&mut self.state, TaskState::Finished) {
            TaskState::Ready(points) => TaskPoll::Ready(points),
            TaskState::Waiting(rx) => match rx.try_recv() {
                Ok(points) => TaskPoll::Ready(points),
                Err(TryRecvError::Empty) => {
                    self.state = TaskState::Waiting(rx);
                    TaskPoll::Pending
                }
                Err(TryRecvError::Disconnected) => TaskPoll::Cancelled,
            },
            TaskState::Finished => TaskPoll::Cancelled,
        }
    }

    /// Abandon the task. A worker still running drops its result.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Drop for SampleTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_worker(shape: ShapeId, count: usize, cancelled: Arc<AtomicBool>) -> TaskState {
    let (tx, rx) = mpsc::channel();
    let spawned = std::thread::Builder::new()
        .name(format!("sample-{}", shape))
        .spawn(move || {
            let points = shape.sample(count);
            if !cancelled.load(Ordering::Acquire) {
                // Receiver gone means the engine moved on; nothing to do.
                let _ = tx.send(points);
            }
        });
    match spawned {
        Ok(_) => TaskState::Waiting(rx),
        Err(err) => {
            log::warn!("sampler thread unavailable ({err}); sampling {shape} inline");
            TaskState::Ready(shape.sample(count))
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn spawn_worker(shape: ShapeId, count: usize, _cancelled: Arc<AtomicBool>) -> TaskState {
    let (tx, rx) = mpsc::channel();
    let _ = tx.send(shape.sample(count));
    TaskState::Waiting(rx)
}
