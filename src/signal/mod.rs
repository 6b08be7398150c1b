use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

type RevokeHook = Box<dyn FnOnce() + Send>;

/// Shared cancellation handle for every listener a manager registers.
///
/// Revocation is one-way: once revoked, a token stays revoked and later
/// calls to [`RevocationToken::revoke`] do nothing.
#[derive(Clone, Default)]
pub struct RevocationToken {
    inner: Arc<TokenInner>,
}

#[derive(Default)]
struct TokenInner {
    revoked: AtomicBool,
    hooks: Mutex<Vec<RevokeHook>>,
}

impl RevocationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_revoked(&self) -> bool {
        self.inner.revoked.load(Ordering::Acquire)
    }

    /// Revokes the token and runs pending hooks. Returns `false` if it was already revoked.
    pub fn revoke(&self) -> bool {
        if self.inner.revoked.swap(true, Ordering::AcqRel) {
            return false;
        }
        let hooks = std::mem::take(
            &mut *self
                .inner
                .hooks
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        tracing::debug!(hooks = hooks.len(), "revocation token revoked");
        for hook in hooks {
            hook();
        }
        true
    }

    /// Runs `hook` once the token is revoked, or right away if it already is.
    pub fn on_revoke<F>(&self, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut hooks = self
                .inner
                .hooks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !self.is_revoked() {
                hooks.push(Box::new(hook));
                return;
            }
        }
        hook();
    }
}

impl fmt::Debug for RevocationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevocationToken")
            .field("revoked", &self.is_revoked())
            .finish()
    }
}
