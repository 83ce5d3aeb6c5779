use std::collections::VecDeque;
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use std::time::{Duration, Instant};

use futures_timer::Delay;

/// How a debounced submission behaves inside its coalescing window.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DebounceMode {
    /// Run once after the window elapses; resubmitting under the same key
    /// cancels the pending task and restarts the window.
    Trailing,
    /// Run immediately, then suppress resubmissions until the window elapses.
    Leading,
}

struct Pending<T> {
    key: String,
    /// `None` marks a leading-mode suppression window with nothing to run.
    task: Option<T>,
    due: Instant,
}

struct QueueState<T> {
    deferred: VecDeque<T>,
    pending: Vec<Pending<T>>,
}

/// Single-threaded cooperative task queue with keyed, coalescing debounce
/// windows. Tasks never run from inside `defer`/`debounce`; the owner drains
/// ready work explicitly, so every entry point gets a chance to re-check its
/// own guards.
pub struct Scheduler<T> {
    state: Arc<RwLock<QueueState<T>>>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(QueueState {
                deferred: VecDeque::new(),
                pending: Vec::new(),
            })),
        }
    }

    /// Queue a task for the next drain.
    pub fn defer(&self, task: T) {
        self.write().deferred.push_back(task);
    }

    /// Coalesce submissions sharing `key` within `window`.
    pub fn debounce(&self, key: impl Into<String>, window: Duration, mode: DebounceMode, task: T) {
        let key = key.into();
        let mut state = self.write();
        match mode {
            DebounceMode::Trailing => {
                state.pending.retain(|pending| pending.key != key);
                state.pending.push(Pending {
                    key,
                    task: Some(task),
                    due: Instant::now() + window,
                });
            }
            DebounceMode::Leading => {
                if state.pending.iter().any(|pending| pending.key == key) {
                    return;
                }
                state.deferred.push_back(task);
                state.pending.push(Pending {
                    key,
                    task: None,
                    due: Instant::now() + window,
                });
            }
        }
    }

    /// Every deferred task plus every debounced task whose window elapsed,
    /// in submission order.
    pub fn take_ready(&self) -> Vec<T> {
        let now = Instant::now();
        let mut state = self.write();
        let mut ready: Vec<T> = state.deferred.drain(..).collect();
        let mut index = 0;
        while index < state.pending.len() {
            if state.pending[index].due <= now {
                if let Some(task) = state.pending.remove(index).task {
                    ready.push(task);
                }
            } else {
                index += 1;
            }
        }
        ready
    }

    /// Deadline of the nearest pending window, if any.
    pub fn next_due(&self) -> Option<Instant> {
        self.write().pending.iter().map(|pending| pending.due).min()
    }

    pub fn is_idle(&self) -> bool {
        let state = self.write();
        state.deferred.is_empty() && state.pending.is_empty()
    }

    /// Wait out the nearest pending window so a subsequent drain can run it.
    /// Returns false when nothing is pending.
    pub async fn wait_next(&self) -> bool {
        let Some(due) = self.next_due() else {
            return false;
        };
        let now = Instant::now();
        if due > now {
            Delay::new(due - now).await;
        }
        true
    }

    fn write(&self) -> RwLockWriteGuard<'_, QueueState<T>> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<T> Clone for Scheduler<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
