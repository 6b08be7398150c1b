use std::sync::{Arc, OnceLock};

use super::ThemeManager;
use crate::config::ThemeOptions;
use crate::host::Host;

static GLOBAL_MANAGER: ManagerSlot = ManagerSlot::new();

/// Holds at most one manager; the first successful request fills it for good.
#[derive(Debug, Default)]
pub struct ManagerSlot {
    cell: OnceLock<Arc<ThemeManager>>,
}

impl ManagerSlot {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    pub fn get(&self) -> Option<Arc<ThemeManager>> {
        self.cell.get().map(Arc::clone)
    }

    /// Returns the existing manager, or builds one from `host` and `options`.
    ///
    /// Once the slot is filled, later arguments are discarded entirely. The
    /// change callback must not call back into this slot while the first
    /// manager is still being built.
    pub fn get_or_init(&self, host: Host, options: ThemeOptions) -> Arc<ThemeManager> {
        if let Some(existing) = self.cell.get() {
            tracing::debug!(
                ?options,
                "theme manager already initialised; ignoring configuration"
            );
            return Arc::clone(existing);
        }
        let manager = self
            .cell
            .get_or_init(|| ThemeManager::new(host, options.resolve()));
        Arc::clone(manager)
    }
}

/// Returns the process-wide manager, creating it on first use.
pub fn init(host: Host, options: ThemeOptions) -> Arc<ThemeManager> {
    GLOBAL_MANAGER.get_or_init(host, options)
}

/// The process-wide manager, if [`init`] has run.
pub fn instance() -> Option<Arc<ThemeManager>> {
    GLOBAL_MANAGER.get()
}
