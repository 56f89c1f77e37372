//! Cooperative cancellation shared by the hub, connections and the game loop.

use tokio::sync::watch;

/// Sender side: `send_replace(true)` cancels every receiver.
pub type CancelSender = watch::Sender<bool>;
pub type CancelReceiver = watch::Receiver<bool>;

pub fn cancel_channel() -> (CancelSender, CancelReceiver) {
    watch::channel(false)
}

/// Resolve once the signal is set, or once its sender is gone.
pub async fn cancelled(rx: &mut CancelReceiver) {
    let _ = rx.wait_for(|cancelled| *cancelled).await;
}
