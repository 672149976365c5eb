//! One-shot initialization with an explicit state field.
//!
//! The first caller moves the guard from `Uninitialized` to `Initializing` and
//! runs the initializer. Concurrent callers wait on a [`Notify`] and then
//! observe the stored result, so the initializer never runs twice for a
//! successful or failed outcome.

use crate::error::{CoreError, SessionError};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitState<T> {
    Uninitialized,
    Initializing,
    Ready(T),
    Failed(String),
}

#[derive(Debug)]
pub struct InitGuard<T> {
    state: Mutex<InitState<T>>,
    notify: Notify,
}

impl<T: Clone> Default for InitGuard<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> InitGuard<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InitState::Uninitialized),
            notify: Notify::new(),
        }
    }

    pub fn state(&self) -> InitState<T> {
        self.lock().clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.lock(), InitState::Ready(_))
    }

    /// Returns the ready value, running `init` only if nobody has yet.
    pub async fn get_or_init<F, Fut>(&self, init: F) -> Result<T, CoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        loop {
            let notified = {
                let mut state = self.lock();
                match &*state {
                    InitState::Ready(value) => return Ok(value.clone()),
                    InitState::Failed(reason) => {
                        return Err(SessionError::InitFailed {
                            reason: reason.clone(),
                        }
                        .into())
                    }
                    InitState::Uninitialized => {
                        *state = InitState::Initializing;
                        break;
                    }
                    // Registered while the lock is held so the wakeup cannot be missed.
                    InitState::Initializing => self.notify.notified(),
                }
            };
            notified.await;
        }

        let mut reset = ResetOnDrop {
            guard: self,
            armed: true,
        };
        let result = init().await;
        reset.armed = false;

        {
            let mut state = self.lock();
            *state = match &result {
                Ok(value) => InitState::Ready(value.clone()),
                Err(e) => InitState::Failed(e.to_string()),
            };
        }
        self.notify.notify_waiters();

        result
    }

    fn lock(&self) -> MutexGuard<'_, InitState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Puts the guard back to `Uninitialized` if the initializing future is dropped.
struct ResetOnDrop<'a, T: Clone> {
    guard: &'a InitGuard<T>,
    armed: bool,
}

impl<T: Clone> Drop for ResetOnDrop<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            *self.guard.lock() = InitState::Uninitialized;
            self.guard.notify.notify_waiters();
        }
    }
}
