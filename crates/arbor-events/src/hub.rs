use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::node::NodeEventList;
use crate::task::TaskEvent;

/// Receives batches of node events, in arrival order.
pub trait NodeEventListener: Send + Sync {
    fn on_events(&self, batch: &NodeEventList);
}

/// Receives task-progress events for one task scope, in arrival order.
pub trait TaskEventListener: Send + Sync {
    fn on_event(&self, event: &TaskEvent);
}

trait Unsubscribe: Send + Sync {
    fn remove(&self, id: u64) -> bool;
}

/// Handle to an active listener registration.
///
/// Unsubscribing (or dropping the owning hub) is the only way a listener
/// goes away; the registry holds strong references.
pub struct Subscription {
    id: u64,
    registry: Weak<dyn Unsubscribe>,
}

impl Subscription {
    /// Remove the listener. Returns `false` if it was already gone.
    pub fn unsubscribe(self) -> bool {
        self.registry
            .upgrade()
            .map(|r| r.remove(self.id))
            .unwrap_or(false)
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

struct Registry<L: ?Sized> {
    entries: Mutex<Vec<(u64, Arc<L>)>>,
    next_id: AtomicU64,
}

impl<L: ?Sized> Registry<L> {
    fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn insert(&self, listener: Arc<L>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries
            .lock()
            .expect("lock poisoned")
            .push((id, listener));
        id
    }

    fn snapshot(&self) -> Vec<Arc<L>> {
        self.entries
            .lock()
            .expect("lock poisoned")
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.lock().expect("lock poisoned").len()
    }

    fn clear(&self) {
        self.entries.lock().expect("lock poisoned").clear();
    }
}

impl<L: ?Sized + Send + Sync> Unsubscribe for Registry<L> {
    fn remove(&self, id: u64) -> bool {
        let mut entries = self.entries.lock().expect("lock poisoned");
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }
}

/// Registry of node-event listeners for one store connection.
///
/// The socket glue calls [`dispatch`](NodeEventHub::dispatch) with each
/// delivered batch; listeners see batches in arrival order and, within a
/// dispatch, are invoked in registration order.
pub struct NodeEventHub {
    registry: Arc<Registry<dyn NodeEventListener>>,
}

impl NodeEventHub {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry::new()),
        }
    }

    pub fn subscribe(&self, listener: Arc<dyn NodeEventListener>) -> Subscription {
        let id = self.registry.insert(listener);
        tracing::debug!(id, "node event listener subscribed");
        let registry: Arc<dyn Unsubscribe> = Arc::clone(&self.registry) as Arc<dyn Unsubscribe>;
        let registry: Weak<dyn Unsubscribe> = Arc::downgrade(&registry);
        Subscription { id, registry }
    }

    pub fn dispatch(&self, batch: &NodeEventList) {
        tracing::debug!(events = batch.len(), "dispatching node event batch");
        for listener in self.registry.snapshot() {
            listener.on_events(batch);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.len()
    }

    /// Drop every registration at once.
    pub fn clear(&self) {
        self.registry.clear();
    }
}

impl Default for NodeEventHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of task-event listeners, keyed by task scope.
///
/// A scope is the identifier the caller used when subscribing (typically the
/// node the task runs for); an event is delivered only to the listeners of
/// its scope.
pub struct TaskEventHub {
    registry: Arc<Registry<ScopedTaskListener>>,
}

struct ScopedTaskListener {
    scope: String,
    listener: Arc<dyn TaskEventListener>,
}

impl TaskEventHub {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry::new()),
        }
    }

    pub fn subscribe(
        &self,
        scope: impl Into<String>,
        listener: Arc<dyn TaskEventListener>,
    ) -> Subscription {
        let scope = scope.into();
        tracing::debug!(%scope, "task event listener subscribed");
        let id = self
            .registry
            .insert(Arc::new(ScopedTaskListener { scope, listener }));
        let registry: Arc<dyn Unsubscribe> = Arc::clone(&self.registry) as Arc<dyn Unsubscribe>;
        let registry: Weak<dyn Unsubscribe> = Arc::downgrade(&registry);
        Subscription { id, registry }
    }

    pub fn dispatch(&self, scope: &str, event: &TaskEvent) {
        for scoped in self.registry.snapshot() {
            if scoped.scope == scope {
                scoped.listener.on_event(event);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.len()
    }

    pub fn clear(&self) {
        self.registry.clear();
    }
}

impl Default for TaskEventHub {
    fn default() -> Self {
        Self::new()
    }
}
