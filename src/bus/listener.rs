//! Listener registry.
//!
//! Keeps listeners in insertion order; priority ordering is computed on
//! every query so ties stay stable by registration order.

use crate::core::{ListenerId, Payload};
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

/// Result type for listener callbacks.
pub type ListenerResult<T> = std::result::Result<T, ListenerError>;

/// Error raised by a listener callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListenerError {
    /// Error message
    pub message: String,
}

impl ListenerError {
    /// Create a new error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ListenerError: {}", self.message)
    }
}

impl std::error::Error for ListenerError {}

/// What a listener hands back: a value now, or one later.
pub enum Reply {
    /// Immediate value
    Ready(Payload),
    /// Value produced by a future
    Deferred(BoxFuture<'static, ListenerResult<Payload>>),
}

impl Reply {
    /// Wrap a future as a deferred reply.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = ListenerResult<Payload>> + Send + 'static,
    {
        Reply::Deferred(future.boxed())
    }

    /// Whether the reply needs to be awaited.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Reply::Deferred(_))
    }

    /// Treat either kind of reply as a future.
    pub fn into_future(self) -> BoxFuture<'static, ListenerResult<Payload>> {
        match self {
            Reply::Ready(value) => futures::future::ready(Ok(value)).boxed(),
            Reply::Deferred(future) => future,
        }
    }
}

impl From<Payload> for Reply {
    fn from(value: Payload) -> Self {
        Reply::Ready(value)
    }
}

impl std::fmt::Debug for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reply::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Reply::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Shared listener callback.
pub type Callback = Arc<dyn Fn(Payload) -> ListenerResult<Reply> + Send + Sync>;

/// A registered listener.
#[derive(Clone)]
pub struct Listener {
    /// Bus-unique identifier
    pub id: ListenerId,
    /// Event key this listener is bound to
    pub mask: String,
    /// Higher runs first
    pub priority: i32,
    callback: Callback,
}

impl Listener {
    /// Invoke the callback.
    pub fn call(&self, data: Payload) -> ListenerResult<Reply> {
        (self.callback)(data)
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("mask", &self.mask)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// Removes the listener it was issued for.
///
/// Holds only a weak reference, so an outstanding disposer does not keep
/// a dropped bus alive.
#[derive(Clone, Debug)]
pub struct Disposer {
    registry: Weak<ListenerRegistry>,
    id: ListenerId,
}

impl Disposer {
    /// Id of the listener this disposer removes.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Remove the listener; returns how many were removed (1, then 0).
    pub fn dispose(&self) -> usize {
        match self.registry.upgrade() {
            Some(registry) => registry.remove(self.id),
            None => 0,
        }
    }
}

/// Ordered listener collection owned by one bus.
#[derive(Debug)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: RwLock<Vec<Listener>>,
    max_listeners: Option<usize>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new(max_listeners: Option<usize>) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: RwLock::new(Vec::new()),
            max_listeners,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Listener>> {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Listener>> {
        self.listeners.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_id(&self) -> ListenerId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn insert(self: &Arc<Self>, id: ListenerId, mask: &str, priority: i32, callback: Callback) -> Disposer {
        let count = {
            let mut listeners = self.write();
            listeners.push(Listener {
                id,
                mask: mask.to_string(),
                priority,
                callback,
            });
            listeners.iter().filter(|l| l.mask == mask).count()
        };

        tracing::debug!(listener = id, event = mask, priority, "listener registered");
        if let Some(max) = self.max_listeners {
            if count > max {
                tracing::warn!(event = mask, count, max, "listener limit exceeded, possible leak");
            }
        }

        Disposer {
            registry: Arc::downgrade(self),
            id,
        }
    }

    /// Register a listener.
    pub fn register(self: &Arc<Self>, mask: &str, priority: i32, callback: Callback) -> Disposer {
        let id = self.next_id();
        self.insert(id, mask, priority, callback)
    }

    /// Register a listener that removes itself after its first call.
    pub fn register_once(self: &Arc<Self>, mask: &str, priority: i32, callback: Callback) -> Disposer {
        let id = self.next_id();
        let registry = Arc::downgrade(self);
        let fired = AtomicBool::new(false);

        let wrapped: Callback = Arc::new(move |data| {
            // A stale snapshot may still reach us after disposal.
            if fired.swap(true, Ordering::SeqCst) {
                return Ok(Reply::Ready(data));
            }
            let reply = callback(data);
            if let Some(registry) = registry.upgrade() {
                registry.remove(id);
            }
            reply
        });

        self.insert(id, mask, priority, wrapped)
    }

    /// Remove a listener by id.
    pub fn remove(&self, id: ListenerId) -> usize {
        let mut listeners = self.write();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        let removed = before - listeners.len();
        if removed > 0 {
            tracing::debug!(listener = id, "listener removed");
        }
        removed
    }

    /// Remove every listener bound to `mask`.
    pub fn remove_matching(&self, mask: &str) -> usize {
        let mut listeners = self.write();
        let before = listeners.len();
        listeners.retain(|l| l.mask != mask);
        let removed = before - listeners.len();
        tracing::debug!(event = mask, removed, "listeners removed");
        removed
    }

    /// Snapshot of the listeners bound to `mask`.
    ///
    /// When `sorted`, ordered by descending priority with ties kept in
    /// registration order.
    pub fn query(&self, mask: &str, sorted: bool) -> Vec<Listener> {
        let mut matched: Vec<Listener> = self
            .read()
            .iter()
            .filter(|l| l.mask == mask)
            .cloned()
            .collect();

        if sorted {
            // sort_by is stable
            matched.sort_by(|a, b| b.priority.cmp(&a.priority));
        }
        matched
    }

    /// Whether any listener is bound to `mask`.
    pub fn has(&self, mask: &str) -> bool {
        self.read().iter().any(|l| l.mask == mask)
    }

    /// Total listener count.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Distinct event keys, in order of first registration.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for listener in self.read().iter() {
            if !names.contains(&listener.mask) {
                names.push(listener.mask.clone());
            }
        }
        names
    }

    /// Remove everything.
    pub fn clear(&self) {
        self.write().clear();
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}
