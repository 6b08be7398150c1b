use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::ThemeConfig;
use crate::error::{BindError, BindResult};
use crate::host::Host;
use crate::selector::parse_id_selector;
use crate::signal::RevocationToken;
use crate::theme::{parse_persisted_mode, resolve_initial_mode, ThemeMode};

mod slot;

pub use slot::{init, instance, ManagerSlot};

/// Root attribute that downstream styles key off.
pub const THEME_ATTRIBUTE: &str = "data-theme";

const BUTTON_TAG: &str = "button";

/// Owns the current mode and every listener registered on its behalf.
pub struct ThemeManager {
    config: ThemeConfig,
    host: Host,
    mode: Mutex<ThemeMode>,
    token: RevocationToken,
}

impl ThemeManager {
    /// Resolves and applies the initial mode, then starts following the
    /// ambient preference when auto-detection is enabled.
    pub fn new(host: Host, config: ThemeConfig) -> Arc<Self> {
        let persisted = read_persisted_mode(&host, config.storage_key());
        let prefers_dark = config.auto_detect() && host.ambient.prefers_dark();
        let initial = resolve_initial_mode(
            persisted,
            config.auto_detect(),
            prefers_dark,
            config.default_mode(),
        );
        tracing::info!(
            mode = %initial,
            persisted = ?persisted,
            auto_detect = config.auto_detect(),
            storage_key = config.storage_key(),
            "creating theme manager"
        );

        let manager = Arc::new(Self {
            config,
            host,
            mode: Mutex::new(initial),
            token: RevocationToken::new(),
        });
        manager.apply_mode(initial);
        if manager.config.auto_detect() {
            manager.follow_ambient_preference();
        }
        manager
    }

    pub fn mode(&self) -> ThemeMode {
        *self.lock_mode()
    }

    pub fn config(&self) -> &ThemeConfig {
        &self.config
    }

    pub fn is_destroyed(&self) -> bool {
        self.token.is_revoked()
    }

    /// Sets the mode, writes the root marker, persists, then runs the
    /// change callback, in that order.
    ///
    /// A failed store write is logged and does not stop the callback. Panics
    /// raised by the callback propagate to the caller; by then the mode,
    /// marker and store are already updated.
    pub fn apply_mode(&self, mode: ThemeMode) {
        let previous = std::mem::replace(&mut *self.lock_mode(), mode);
        self.publish_mode(previous, mode);
    }

    /// Flips the mode. The read and the flip happen under one lock, so
    /// concurrent toggles never flip from the same mode. The host is meant
    /// to drive the manager from one thread; across threads the marker and
    /// store writes of concurrent calls may land in either order.
    pub fn toggle(&self) {
        let (previous, next) = {
            let mut current = self.lock_mode();
            let previous = *current;
            *current = previous.toggled();
            (previous, *current)
        };
        self.publish_mode(previous, next);
    }

    fn publish_mode(&self, previous: ThemeMode, mode: ThemeMode) {
        tracing::debug!(from = %previous, to = %mode, "apply theme mode");

        self.host
            .document
            .set_root_attribute(THEME_ATTRIBUTE, mode.as_str());
        if let Err(err) = self.host.store.set(self.config.storage_key(), mode.as_str()) {
            tracing::warn!(
                ?err,
                key = self.config.storage_key(),
                "failed to persist theme mode"
            );
        }
        self.config.notify_mode_change(mode);
    }

    /// Makes activating the button matched by `selector` toggle the mode.
    ///
    /// Bindings are additive; binding the same button twice makes one
    /// activation toggle twice.
    pub fn bind_toggle(self: &Arc<Self>, selector: &str) -> BindResult<()> {
        let id = parse_id_selector(selector)?;
        let element = self
            .host
            .document
            .element_by_id(id)
            .ok_or_else(|| BindError::ElementNotFound { id: id.to_string() })?;
        if !element.tag_name().eq_ignore_ascii_case(BUTTON_TAG) {
            return Err(BindError::NotAButtonElement { id: id.to_string() });
        }

        let manager = Arc::downgrade(self);
        let token = self.token.clone();
        element.add_activation_listener(
            Arc::new(move || {
                if token.is_revoked() {
                    return;
                }
                if let Some(manager) = manager.upgrade() {
                    manager.toggle();
                }
            }),
            &self.token,
        );
        tracing::debug!(id, "bound theme toggle");
        Ok(())
    }

    /// Revokes every listener this manager registered. Safe to call repeatedly.
    pub fn destroy(&self) {
        if self.token.revoke() {
            tracing::info!(mode = %self.mode(), "theme manager destroyed");
        }
    }

    fn follow_ambient_preference(self: &Arc<Self>) {
        let manager = Arc::downgrade(self);
        let token = self.token.clone();
        self.host.ambient.subscribe(
            Arc::new(move |prefers_dark| {
                if token.is_revoked() {
                    return;
                }
                if let Some(manager) = manager.upgrade() {
                    let mode = ThemeMode::from_prefers_dark(prefers_dark);
                    tracing::debug!(dark = mode.is_dark(), "ambient preference changed");
                    manager.apply_mode(mode);
                }
            }),
            &self.token,
        );
    }

    fn lock_mode(&self) -> MutexGuard<'_, ThemeMode> {
        self.mode.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ThemeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeManager")
            .field("mode", &self.mode())
            .field("config", &self.config)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

fn read_persisted_mode(host: &Host, key: &str) -> Option<ThemeMode> {
    let raw = host.store.get(key).unwrap_or_else(|err| {
        tracing::warn!(?err, key, "failed to read persisted theme mode");
        None
    });
    parse_persisted_mode(raw.as_deref())
}
