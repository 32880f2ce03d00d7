//! Stream of rebuilt forests for a watched partition

use super::model::Forest;
use crate::store::Subscription;
use futures::channel::mpsc;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Forests of one partition, one per store snapshot, in delivery order.
///
/// Ends when cancelled or dropped; forests still queued at that point are
/// discarded.
#[derive(Debug)]
pub struct ForestStream {
    receiver: mpsc::UnboundedReceiver<Forest>,
    subscription: Subscription,
}

impl ForestStream {
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<Forest>, subscription: Subscription) -> Self {
        Self {
            receiver,
            subscription,
        }
    }

    /// Detach from the store and end the stream
    pub fn cancel(&self) {
        self.subscription.cancel();
    }

    /// Check if the stream still receives forests
    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }
}

impl Stream for ForestStream {
    type Item = Forest;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Forest>> {
        let this = self.get_mut();
        if !this.subscription.is_active() {
            return Poll::Ready(None);
        }
        this.receiver.poll_next_unpin(cx)
    }
}
