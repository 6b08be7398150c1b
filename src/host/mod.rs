//! Capabilities the manager needs from its host environment.
//!
//! A host supplies three collaborators: a key-value store for the persisted
//! mode, an ambient preference source (the system's light/dark signal), and a
//! document that carries the root marker attribute and the toggle controls.
//! Every listener handed to a host comes with the [`RevocationToken`] it is
//! scoped to; hosts should stop dispatching to it once that token is revoked.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::signal::RevocationToken;
use crate::storage::StorageResult;

pub mod memory;
pub mod system;

pub use memory::{ManualAmbient, MemoryDocument, MemoryElement, MemoryStore};
pub use system::SystemAmbient;

/// Receives the new "prefers dark" flag on every ambient change.
pub type AmbientListener = Arc<dyn Fn(bool) + Send + Sync>;

/// Invoked when a control element is activated.
pub type ActivationListener = Arc<dyn Fn() + Send + Sync>;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

pub trait AmbientPreference: Send + Sync {
    fn prefers_dark(&self) -> bool;
    fn subscribe(&self, listener: AmbientListener, token: &RevocationToken);
}

pub trait Element: Send + Sync {
    fn id(&self) -> &str;
    fn tag_name(&self) -> &str;
    fn add_activation_listener(&self, listener: ActivationListener, token: &RevocationToken);
}

pub trait Document: Send + Sync {
    fn set_root_attribute(&self, name: &str, value: &str);
    fn element_by_id(&self, id: &str) -> Option<Arc<dyn Element>>;
}

/// The capability bundle a manager is built against.
#[derive(Clone)]
pub struct Host {
    pub store: Arc<dyn KeyValueStore>,
    pub ambient: Arc<dyn AmbientPreference>,
    pub document: Arc<dyn Document>,
}

impl Host {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        ambient: Arc<dyn AmbientPreference>,
        document: Arc<dyn Document>,
    ) -> Self {
        Self {
            store,
            ambient,
            document,
        }
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}

struct ListenerEntry<L> {
    id: u64,
    listener: L,
    token: RevocationToken,
}

type Entries<L> = Arc<Mutex<Vec<ListenerEntry<L>>>>;

/// Token-scoped listener registry shared by the bundled hosts.
pub(crate) struct ListenerSet<L> {
    entries: Entries<L>,
    next_id: AtomicU64,
}

impl<L> Default for ListenerSet<L> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(0),
        }
    }
}

impl<L: Clone + Send + 'static> ListenerSet<L> {
    pub(crate) fn register(&self, listener: L, token: &RevocationToken) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock_entries(&self.entries).push(ListenerEntry {
            id,
            listener,
            token: token.clone(),
        });

        let entries = Arc::downgrade(&self.entries);
        token.on_revoke(move || {
            if let Some(entries) = entries.upgrade() {
                lock_entries(&entries).retain(|entry| entry.id != id);
            }
        });
    }

    /// Snapshot of listeners whose token is still live.
    pub(crate) fn live(&self) -> Vec<L> {
        let mut entries = lock_entries(&self.entries);
        entries.retain(|entry| !entry.token.is_revoked());
        entries.iter().map(|entry| entry.listener.clone()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.live().len()
    }
}

fn lock_entries<L>(
    entries: &Mutex<Vec<ListenerEntry<L>>>,
) -> MutexGuard<'_, Vec<ListenerEntry<L>>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}
