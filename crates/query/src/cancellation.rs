//! A best-effort cancellation signal for [`crate::QueryEngine::stream_billable_events`]
//! (§5 "Cancellation ... already-emitted rows are not retracted").

use tokio::sync::watch;

/// The caller-held half: call [`CancellationSource::cancel`] to request the
/// in-flight stream stop emitting further rows.
pub struct CancellationSource(watch::Sender<bool>);

/// The stream-held half, checked before each row is emitted.
#[derive(Clone)]
pub struct Cancellation(watch::Receiver<bool>);

impl CancellationSource {
    pub fn new() -> (Self, Cancellation) {
        let (tx, rx) = watch::channel(false);
        (Self(tx), Cancellation(rx))
    }

    pub fn cancel(&self) {
        let _ = self.0.send(true);
    }
}

impl Cancellation {
    pub fn none() -> Self {
        CancellationSource::new().1
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }
}
