//! Named message delivery.
//!
//! Besides signals, a gesture can announce what happened by sending a named
//! message such as `"OnPress"` to a [`MessageTarget`]. A target that has no
//! handler for a name silently ignores it.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use horizon_touch_core::NodeId;
use horizon_touch_core::logging::targets;
use horizon_touch_core::signal::panic_message;
use parking_lot::RwLock;

use crate::error::MessageError;
use crate::gesture::GestureId;
use crate::state::GestureState;

/// Sent by a press gesture when it recognizes.
pub const ON_PRESS: &str = "OnPress";
/// Sent on every committed transition when state change messages are enabled.
pub const ON_GESTURE_STATE_CHANGE: &str = "OnGestureStateChange";

/// Describes the gesture that sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSender {
    /// Sending gesture.
    pub gesture: GestureId,
    /// Node the gesture is attached to.
    pub node: NodeId,
    /// Gesture state at send time.
    pub state: GestureState,
}

/// Receiver of named messages.
pub trait MessageTarget: Send + Sync {
    /// Deliver `name` from `sender`.
    ///
    /// Unknown names must be ignored rather than reported as errors.
    fn send_message(&self, name: &str, sender: &MessageSender) -> Result<(), MessageError>;
}

type Handler = Arc<dyn Fn(&MessageSender) + Send + Sync>;

/// A string-keyed table of message handlers.
///
/// Handlers registered under one name run in registration order. A
/// panicking handler is caught and logged and the remaining handlers still
/// run; the send then reports [`MessageError::HandlerPanicked`].
///
/// # Example
///
/// ```
/// use horizon_touch::message::{MessageHandlers, MessageTarget, ON_PRESS};
///
/// let handlers = MessageHandlers::new();
/// handlers.on(ON_PRESS, |sender| println!("pressed on {:?}", sender.node));
/// assert!(handlers.has_receiver(ON_PRESS));
/// assert!(!handlers.has_receiver("OnRelease"));
/// ```
#[derive(Default)]
pub struct MessageHandlers {
    handlers: RwLock<HashMap<String, Vec<Handler>>>,
}

impl MessageHandlers {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `name`.
    pub fn on<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&MessageSender) + Send + Sync + 'static,
    {
        self.handlers
            .write()
            .entry(name.into())
            .or_default()
            .push(Arc::new(handler));
    }

    /// Remove every handler registered for `name`.
    pub fn remove(&self, name: &str) -> bool {
        self.handlers.write().remove(name).is_some()
    }

    /// Whether at least one handler is registered for `name`.
    pub fn has_receiver(&self, name: &str) -> bool {
        self.handlers
            .read()
            .get(name)
            .is_some_and(|handlers| !handlers.is_empty())
    }
}

impl MessageTarget for MessageHandlers {
    fn send_message(&self, name: &str, sender: &MessageSender) -> Result<(), MessageError> {
        let handlers = match self.handlers.read().get(name) {
            Some(handlers) => handlers.clone(),
            None => {
                tracing::trace!(target: targets::MESSAGE, message_name = name, "no receiver for message");
                return Ok(());
            }
        };

        let mut failures = 0;
        for handler in handlers {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| handler(sender))) {
                failures += 1;
                tracing::error!(
                    target: targets::MESSAGE,
                    message_name = name,
                    panic = panic_message(payload.as_ref()),
                    "message handler panicked"
                );
            }
        }

        if failures > 0 {
            Err(MessageError::HandlerPanicked {
                name: name.to_string(),
                failures,
            })
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Debug for MessageHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handlers = self.handlers.read();
        let mut names: Vec<&String> = handlers.keys().collect();
        names.sort();
        f.debug_struct("MessageHandlers")
            .field("names", &names)
            .finish()
    }
}

static_assertions::assert_impl_all!(MessageHandlers: Send, Sync);
