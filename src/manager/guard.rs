use std::ops::{Deref, DerefMut};

use super::SessionManager;

/// Mutable borrow of a [`SessionManager`] that calls
/// [`write_close`](SessionManager::write_close) when it goes out of scope.
///
/// Errors during the drop-time flush cannot be returned and are logged. Call
/// [`WriteCloseGuard::commit`] to flush explicitly and observe the result.
pub struct WriteCloseGuard<'m> {
    manager: &'m mut SessionManager,
    armed: bool,
}

impl<'m> WriteCloseGuard<'m> {
    pub(super) fn new(manager: &'m mut SessionManager) -> Self {
        Self { manager, armed: true }
    }

    /// Flushes now and disarms the drop-time flush.
    pub fn commit(mut self) -> crate::errors::Result<()> {
        self.armed = false;
        self.manager.write_close()
    }
}

impl Deref for WriteCloseGuard<'_> {
    type Target = SessionManager;

    fn deref(&self) -> &SessionManager {
        self.manager
    }
}

impl DerefMut for WriteCloseGuard<'_> {
    fn deref_mut(&mut self) -> &mut SessionManager {
        self.manager
    }
}

impl Drop for WriteCloseGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(err) = self.manager.write_close() {
            log::warn!("Failed to flush session on scope exit: {err}");
        }
    }
}
