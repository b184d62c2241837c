use tokio::sync::watch;

/// Checked by a producer thread between backend fetches.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    receiver: watch::Receiver<bool>,
}

/// Handle to trigger cancellation. Dropping it cancels as well, so a producer
/// whose owner went away stops on its next check.
#[derive(Debug)]
pub struct CancellationHandle {
    sender: watch::Sender<bool>,
}

impl CancellationToken {
    /// Create a new cancellation token and its handle
    pub fn new() -> (Self, CancellationHandle) {
        let (tx, rx) = watch::channel(false);
        (Self { receiver: rx }, CancellationHandle { sender: tx })
    }

    /// Check if cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        // `has_changed` only errors once the sender is gone
        *self.receiver.borrow() || self.receiver.has_changed().is_err()
    }
}

impl CancellationHandle {
    /// Signal cancellation to all associated tokens
    pub fn cancel(&self) {
        // Ignore the result - if receivers are gone, that's fine
        let _ = self.sender.send(true);
    }
}
