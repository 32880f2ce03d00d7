//! Cancellation handle for live feeds

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Detach = Box<dyn FnOnce() + Send>;

/// Handle to a live feed.
///
/// Cancelling marks the feed inactive before detaching it, so a snapshot that
/// is already being dispatched is not delivered afterwards. `cancel` is
/// idempotent and may be called from inside the feed's own callback. Dropping
/// the handle cancels it.
#[must_use = "dropping a Subscription cancels it"]
pub struct Subscription {
    active: Arc<AtomicBool>,
    detach: Mutex<Option<Detach>>,
}

impl Subscription {
    /// Create a handle sharing `active` with the delivering side
    pub fn new(active: Arc<AtomicBool>, detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            active,
            detach: Mutex::new(Some(Box::new(detach))),
        }
    }

    /// Stop delivery and detach from the source
    pub fn cancel(&self) {
        self.active.store(false, Ordering::SeqCst);
        let detach = self.detach.lock().take();
        if let Some(detach) = detach {
            detach();
        }
    }

    /// Check if the feed still delivers
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
