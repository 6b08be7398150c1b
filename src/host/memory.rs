use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::{
    ActivationListener, AmbientListener, AmbientPreference, Document, Element, KeyValueStore,
    ListenerSet,
};
use crate::signal::RevocationToken;
use crate::storage::StorageResult;

/// Process-local key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }

    pub fn snapshot(&self) -> HashMap<String, String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Ambient preference driven by the embedding application.
#[derive(Default)]
pub struct ManualAmbient {
    prefers_dark: AtomicBool,
    listeners: ListenerSet<AmbientListener>,
}

impl ManualAmbient {
    pub fn new(prefers_dark: bool) -> Self {
        Self {
            prefers_dark: AtomicBool::new(prefers_dark),
            listeners: ListenerSet::default(),
        }
    }

    /// Updates the preference and notifies every live subscriber, in registration order.
    pub fn set_prefers_dark(&self, prefers_dark: bool) {
        self.prefers_dark.store(prefers_dark, Ordering::Release);
        for listener in self.listeners.live() {
            listener(prefers_dark);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl AmbientPreference for ManualAmbient {
    fn prefers_dark(&self) -> bool {
        self.prefers_dark.load(Ordering::Acquire)
    }

    fn subscribe(&self, listener: AmbientListener, token: &RevocationToken) {
        self.listeners.register(listener, token);
    }
}

/// Headless document: a root attribute map plus id-addressable elements.
#[derive(Default)]
pub struct MemoryDocument {
    root_attributes: Mutex<HashMap<String, String>>,
    elements: Mutex<HashMap<String, Arc<MemoryElement>>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an element and returns a handle to it.
    pub fn insert_element(&self, id: &str, tag_name: &str) -> Arc<MemoryElement> {
        let element = Arc::new(MemoryElement::new(id, tag_name));
        self.elements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), Arc::clone(&element));
        element
    }

    pub fn root_attribute(&self, name: &str) -> Option<String> {
        self.root_attributes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

impl Document for MemoryDocument {
    fn set_root_attribute(&self, name: &str, value: &str) {
        self.root_attributes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), value.to_string());
    }

    fn element_by_id(&self, id: &str) -> Option<Arc<dyn Element>> {
        let elements = self.elements.lock().unwrap_or_else(PoisonError::into_inner);
        elements
            .get(id)
            .map(|element| Arc::clone(element) as Arc<dyn Element>)
    }
}

pub struct MemoryElement {
    id: String,
    tag_name: String,
    listeners: ListenerSet<ActivationListener>,
}

impl MemoryElement {
    pub fn new(id: &str, tag_name: &str) -> Self {
        Self {
            id: id.to_string(),
            tag_name: tag_name.to_string(),
            listeners: ListenerSet::default(),
        }
    }

    /// Simulates a click: runs every live activation listener.
    pub fn activate(&self) {
        for listener in self.listeners.live() {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Element for MemoryElement {
    fn id(&self) -> &str {
        &self.id
    }

    fn tag_name(&self) -> &str {
        &self.tag_name
    }

    fn add_activation_listener(&self, listener: ActivationListener, token: &RevocationToken) {
        self.listeners.register(listener, token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn memory_store_reads_back_writes() {
        let store = MemoryStore::with_entries([("other", "x")]);
        assert_eq!(store.get("theme").unwrap(), None);

        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(store.snapshot().len(), 2);
    }

    #[test]
    fn manual_ambient_broadcasts_until_revoked() {
        let ambient = ManualAmbient::new(false);
        let token = RevocationToken::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        ambient.subscribe(Arc::new(move |dark| sink.lock().unwrap().push(dark)), &token);
        assert_eq!(ambient.subscriber_count(), 1);

        ambient.set_prefers_dark(true);
        assert!(ambient.prefers_dark());

        token.revoke();
        ambient.set_prefers_dark(false);
        assert!(!ambient.prefers_dark());
        assert_eq!(*seen.lock().unwrap(), vec![true]);
        assert_eq!(ambient.subscriber_count(), 0);
    }

    #[test]
    fn document_looks_up_elements_by_id() {
        let document = MemoryDocument::new();
        document.insert_element("toggle", "button");

        let element = document.element_by_id("toggle").expect("element should exist");
        assert_eq!(element.id(), "toggle");
        assert_eq!(element.tag_name(), "button");
        assert!(document.element_by_id("missing").is_none());

        document.set_root_attribute("data-theme", "dark");
        assert_eq!(document.root_attribute("data-theme").as_deref(), Some("dark"));
    }

    #[test]
    fn element_activation_runs_each_listener() {
        let element = MemoryElement::new("toggle", "button");
        let token = RevocationToken::new();
        let calls = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let calls = Arc::clone(&calls);
            element.add_activation_listener(
                Arc::new(move || {
                    calls.fetch_add(1, Ordering::SeqCst);
                }),
                &token,
            );
        }

        element.activate();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        token.revoke();
        element.activate();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(element.listener_count(), 0);
    }
}
