use std::sync::atomic::{AtomicBool, Ordering};

use super::{AmbientListener, AmbientPreference, ListenerSet};
use crate::signal::RevocationToken;

type Detector = fn() -> bool;

/// Ambient preference read from the operating system.
///
/// The OS offers no push notification we can rely on everywhere, so callers
/// poll with [`SystemAmbient::refresh`]; subscribers hear about flips only.
pub struct SystemAmbient {
    detector: Detector,
    last_seen: AtomicBool,
    listeners: ListenerSet<AmbientListener>,
}

impl SystemAmbient {
    pub fn new() -> Self {
        Self::with_detector(os_prefers_dark)
    }

    pub(crate) fn with_detector(detector: Detector) -> Self {
        Self {
            detector,
            last_seen: AtomicBool::new(detector()),
            listeners: ListenerSet::default(),
        }
    }

    /// Re-reads the OS preference; returns `true` and notifies subscribers if it changed.
    pub fn refresh(&self) -> bool {
        let prefers_dark = (self.detector)();
        let previous = self.last_seen.swap(prefers_dark, Ordering::AcqRel);
        if previous == prefers_dark {
            return false;
        }
        tracing::info!(prefers_dark, "system color scheme changed");
        for listener in self.listeners.live() {
            listener(prefers_dark);
        }
        true
    }
}

impl Default for SystemAmbient {
    fn default() -> Self {
        Self::new()
    }
}

impl AmbientPreference for SystemAmbient {
    fn prefers_dark(&self) -> bool {
        let prefers_dark = (self.detector)();
        self.last_seen.store(prefers_dark, Ordering::Release);
        prefers_dark
    }

    fn subscribe(&self, listener: AmbientListener, token: &RevocationToken) {
        self.listeners.register(listener, token);
    }
}

fn os_prefers_dark() -> bool {
    match dark_light::detect() {
        Ok(dark_light::Mode::Dark) => true,
        Ok(_) => false,
        Err(err) => {
            tracing::warn!(?err, "failed to detect system color scheme; assuming light");
            false
        }
    }
}
