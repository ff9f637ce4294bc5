//! Task queues used by audio device modules
//!
//! A module receives a [`TaskQueueFactory`] at creation and uses it to move
//! work off the real-time audio callbacks. The default factory runs each
//! queue on its own named thread.

use crossbeam_channel::{unbounded, Sender};
use std::thread::{self, JoinHandle};

/// Unit of work posted to a queue
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Serial executor: tasks run one at a time in post order
pub trait TaskQueue: Send + Sync {
    /// Queue a task. Tasks posted after the queue shuts down are dropped.
    fn post_task(&self, task: Task);
}

/// Creates task queues
pub trait TaskQueueFactory: Send + Sync {
    fn create_task_queue(&self, name: &str) -> Box<dyn TaskQueue>;
}

/// Factory for thread-backed task queues
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTaskQueueFactory;

impl TaskQueueFactory for DefaultTaskQueueFactory {
    fn create_task_queue(&self, name: &str) -> Box<dyn TaskQueue> {
        Box::new(ThreadTaskQueue::new(name))
    }
}

/// Task queue backed by a dedicated thread
pub struct ThreadTaskQueue {
    /// Queue name (also the thread name)
    name: String,

    /// Task sender; dropped on shutdown to end the worker loop
    sender: Option<Sender<Task>>,

    /// Worker thread handle
    thread_handle: Option<JoinHandle<()>>,
}

impl ThreadTaskQueue {
    /// Start a queue with a worker thread named `name`.
    pub fn new(name: &str) -> Self {
        let (sender, receiver) = unbounded::<Task>();

        let thread_handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                while let Ok(task) = receiver.recv() {
                    task();
                }
            });

        let thread_handle = match thread_handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!("Failed to spawn task queue thread {}: {}", name, e);
                None
            }
        };

        Self {
            name: name.to_string(),
            sender: thread_handle.as_ref().map(|_| sender),
            thread_handle,
        }
    }

    /// Queue name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl TaskQueue for ThreadTaskQueue {
    fn post_task(&self, task: Task) {
        match &self.sender {
            Some(sender) => {
                if sender.send(task).is_err() {
                    tracing::warn!("Task queue {} is closed, dropping task", self.name);
                }
            }
            None => tracing::warn!("Task queue {} has no worker, dropping task", self.name),
        }
    }
}

impl Drop for ThreadTaskQueue {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain what is queued and exit
        self.sender.take();

        if let Some(handle) = self.thread_handle.take() {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_tasks_run_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));

        {
            let queue = DefaultTaskQueueFactory.create_task_queue("test-queue");
            for i in 0..10 {
                let log = log.clone();
                queue.post_task(Box::new(move || log.lock().push(i)));
            }
            // Dropping the queue drains and joins the worker
        }

        assert_eq!(*log.lock(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_tasks_run_on_named_thread() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let queue = ThreadTaskQueue::new("adm-named");
        assert_eq!(queue.name(), "adm-named");

        queue.post_task(Box::new(move || {
            let _ = tx.send(thread::current().name().map(str::to_string));
        }));

        let name = rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some("adm-named"));
    }
}
