// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A queue of deferred work executed on the loop thread.

type Task<C> = Box<dyn FnOnce(&mut C) + Send + 'static>;

/// Collects closures posted from any thread and runs them against a context
/// owned by the loop thread.
///
/// Workers never touch loop-owned state directly: they hold a [`TaskSender`]
/// and the owner calls [`TaskQueue::drain`] at a well defined point between
/// ticks, so every task observes a consistent world.
pub struct TaskQueue<C> {
    sender: flume::Sender<Task<C>>,
    receiver: flume::Receiver<Task<C>>,
}

/// A cloneable, thread-safe handle used to post tasks to a [`TaskQueue`].
pub struct TaskSender<C> {
    sender: flume::Sender<Task<C>>,
}

impl<C> Clone for TaskSender<C> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<C> TaskSender<C> {
    /// Posts a task. Returns `false` if the queue no longer exists.
    pub fn post(&self, task: impl FnOnce(&mut C) + Send + 'static) -> bool {
        self.sender.send(Box::new(task)).is_ok()
    }
}

impl<C> TaskQueue<C> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Returns a handle other threads can post through.
    pub fn sender(&self) -> TaskSender<C> {
        TaskSender {
            sender: self.sender.clone(),
        }
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Runs every task queued at the time of the call, in posting order.
    ///
    /// Tasks posted while draining run on the next drain. Returns the number
    /// of tasks run.
    pub fn drain(&self, context: &mut C) -> usize {
        let queued = self.receiver.len();
        let mut ran = 0;
        while ran < queued {
            match self.receiver.try_recv() {
                Ok(task) => {
                    task(context);
                    ran += 1;
                }
                Err(_) => break,
            }
        }
        if ran > 0 {
            log::trace!("Drained {ran} deferred task(s).");
        }
        ran
    }
}

impl<C> Default for TaskQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}
