//! Single-slot event bridge
//!
//! Marshals work from non-modal UI callbacks onto the host's
//! document-modification thread. The caller sets an action, raises the
//! host event and awaits the returned [`BridgeCompletion`]; the host later
//! calls [`EventBridge::execute`] on its own thread.
//!
//! One bridge holds one pending continuation. Raising again resets the
//! completion flag and abandons the previous completion, so callers must
//! serialize their use of a bridge instance.

use crate::error::HostError;
use futures::channel::oneshot;
use futures::FutureExt;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Host-side event that schedules a later call to [`EventBridge::execute`]
#[cfg_attr(test, mockall::automock)]
pub trait ExternalEvent: Send + Sync {
    /// Ask the host to run the bridge on its modification thread
    ///
    /// # Errors
    /// Host refused to schedule the event
    fn raise(&self) -> Result<(), HostError>;
}

type Action<C> = Box<dyn FnMut(&mut C) + Send>;

struct BridgeState<C> {
    action: Option<Action<C>>,
    completed: bool,
    done: Option<oneshot::Sender<()>>,
}

/// Awaitable bridge between caller code and the host event loop
pub struct EventBridge<C> {
    name: String,
    event: Arc<dyn ExternalEvent>,
    state: Mutex<BridgeState<C>>,
}

impl<C> EventBridge<C> {
    /// Create a bridge over a host event
    ///
    /// # Errors
    /// [`HostError::InvalidArgument`] if `name` is blank
    pub fn new(name: impl Into<String>, event: Arc<dyn ExternalEvent>) -> Result<Self, HostError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(HostError::invalid_argument(
                "name",
                "external event name cannot be blank",
            ));
        }

        Ok(Self {
            name,
            event,
            state: Mutex::new(BridgeState {
                action: None,
                completed: false,
                done: None,
            }),
        })
    }

    /// Event name reported to the host
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the action run by [`EventBridge::execute`]
    pub fn set_action(&self, action: impl FnMut(&mut C) + Send + 'static) -> &Self {
        self.state.lock().action = Some(Box::new(action));
        self
    }

    /// Returns true once the most recent raise has been executed
    #[inline]
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state.lock().completed
    }

    /// Raise the host event
    ///
    /// Resets completion. A completion returned by an earlier raise that has
    /// not run yet resolves to [`HostError::EventAbandoned`].
    ///
    /// # Errors
    /// Host refused to schedule the event
    pub fn raise(&self) -> Result<BridgeCompletion, HostError> {
        let (done, receiver) = oneshot::channel();
        {
            let mut state = self.state.lock();
            state.completed = false;
            state.done = Some(done);
        }
        if let Err(err) = self.event.raise() {
            self.state.lock().done = None;
            return Err(err);
        }
        tracing::trace!(bridge = %self.name, "external event raised");

        Ok(BridgeCompletion {
            name: self.name.clone(),
            receiver,
        })
    }

    /// Run the action; called by the host on its modification thread
    ///
    /// Completion is signalled even if the action panics.
    pub fn execute(&self, context: &mut C) {
        let action = self.state.lock().action.take();
        let mut guard = CompletionGuard {
            bridge: self,
            action,
        };

        if let Some(action) = guard.action.as_mut() {
            action(context);
        }
    }
}

impl<C> fmt::Debug for EventBridge<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBridge")
            .field("name", &self.name)
            .field("completed", &self.is_completed())
            .finish_non_exhaustive()
    }
}

struct CompletionGuard<'a, C> {
    bridge: &'a EventBridge<C>,
    action: Option<Action<C>>,
}

impl<C> Drop for CompletionGuard<'_, C> {
    fn drop(&mut self) {
        let done = {
            let mut state = self.bridge.state.lock();
            // Keep an action installed while this one was running.
            if state.action.is_none() {
                state.action = self.action.take();
            }
            state.completed = true;
            state.done.take()
        };
        // Receiver gone means nobody is waiting.
        if let Some(done) = done {
            let _ = done.send(());
        }
    }
}

/// Future resolved when the host has executed the bridge
#[derive(Debug)]
#[must_use = "futures do nothing unless awaited"]
pub struct BridgeCompletion {
    name: String,
    receiver: oneshot::Receiver<()>,
}

impl Future for BridgeCompletion {
    type Output = Result<(), HostError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.receiver
            .poll_unpin(cx)
            .map(|done| done.map_err(|_| HostError::EventAbandoned(self.name.clone())))
    }
}
