//! Signal/slot system for Horizon Touch.
//!
//! Gestures publish their notifications through signals. A [`Signal`] keeps
//! an ordered table of connected slots; emitting walks that table in
//! connection order and calls every slot synchronously.
//!
//! Delivery is isolated per slot: a slot that panics is caught, logged to the
//! `horizon_touch_core::signal` target and skipped, and the remaining slots
//! still run. A misbehaving listener therefore cannot abort input dispatch.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The signal type for emitting notifications
//! - [`ConnectionId`] - Identifier returned when connecting a slot
//! - [`ConnectionGuard`] - RAII guard that disconnects when dropped
//!
//! # Example
//!
//! ```
//! use horizon_touch_core::Signal;
//!
//! let recognized = Signal::<u32>::new();
//! let conn_id = recognized.connect(|count| {
//!     println!("recognized with {} pointers", count);
//! });
//!
//! recognized.emit(1);
//! recognized.disconnect(conn_id);
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Connection table: slots by ID plus their connection order.
struct ConnectionTable<Args> {
    slots: SlotMap<ConnectionId, Slot<Args>>,
    order: Vec<ConnectionId>,
}

impl<Args> ConnectionTable<Args> {
    fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    fn remove(&mut self, id: ConnectionId) -> bool {
        if self.slots.remove(id).is_some() {
            self.order.retain(|&other| other != id);
            true
        } else {
            false
        }
    }

    fn snapshot(&self) -> Vec<Slot<Args>> {
        self.order
            .iter()
            .filter_map(|id| self.slots.get(*id).cloned())
            .collect()
    }
}

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a tuple for multiple arguments.
///
/// # Ordering
///
/// Slots are invoked in the order they were connected. Disconnecting a slot
/// does not reorder the others.
///
/// # Re-entrancy
///
/// The connection table is not locked while slots run, so a slot may connect
/// or disconnect slots on the signal that is invoking it. Such changes take
/// effect from the next emission.
pub struct Signal<Args> {
    connections: Arc<Mutex<ConnectionTable<Args>>>,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Arc::new(Mutex::new(ConnectionTable::new())),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let mut table = self.connections.lock();
        let id = table.slots.insert(Arc::new(slot));
        table.order.push(id);
        id
    }

    /// Connect a slot that is disconnected when the returned guard is dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use horizon_touch_core::Signal;
    ///
    /// let signal = Signal::<i32>::new();
    /// {
    ///     let _guard = signal.connect_scoped(|n| println!("{}", n));
    ///     assert_eq!(signal.connection_count(), 1);
    /// }
    /// assert_eq!(signal.connection_count(), 0);
    /// ```
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard {
            connections: Arc::downgrade(&self.connections),
            id,
        }
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id)
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        let mut table = self.connections.lock();
        table.slots.clear();
        table.order.clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().slots.len()
    }

    /// Emit the signal, invoking all connected slots in connection order.
    ///
    /// Returns the number of slots that panicked. Panics are logged and do
    /// not stop delivery to the remaining slots.
    #[tracing::instrument(skip_all, target = "horizon_touch_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) -> usize {
        let slots = self.connections.lock().snapshot();
        tracing::trace!(target: "horizon_touch_core::signal", connection_count = slots.len(), "emitting signal");

        let mut failures = 0;
        for slot in slots {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| slot(&args))) {
                failures += 1;
                tracing::error!(
                    target: "horizon_touch_core::signal",
                    panic = panic_message(payload.as_ref()),
                    "slot panicked during emit; continuing with remaining slots"
                );
            }
        }
        failures
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().slots.len())
            .finish()
    }
}

/// Extract a readable message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

/// A connection guard that automatically disconnects when dropped.
///
/// Created via [`Signal::connect_scoped`]. The guard does not keep the signal
/// alive; dropping it after the signal is gone is a no-op.
pub struct ConnectionGuard<Args> {
    connections: Weak<Mutex<ConnectionTable<Args>>>,
    id: ConnectionId,
}

impl<Args> ConnectionGuard<Args> {
    /// Get the connection ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        if let Some(connections) = self.connections.upgrade() {
            connections.lock().remove(self.id);
        }
    }
}

static_assertions::assert_impl_all!(Signal<u32>: Send, Sync);
static_assertions::assert_impl_all!(ConnectionGuard<u32>: Send, Sync);
