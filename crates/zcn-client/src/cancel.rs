use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Caller side of a [`Cancellation`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Cancellation signal plus optional deadline observed by the broadcast and
/// poll steps. Cloning is cheap; all clones observe the same signal.
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
    deadline: Option<Instant>,
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::never()
    }
}

impl Cancellation {
    /// Never fires.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx, deadline: None }
    }

    pub fn new() -> (CancelHandle, Self) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, Self { rx, deadline: None })
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Keeps the earlier of the existing and the new deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolves once the signal fires or the deadline passes.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let signal = async move {
            loop {
                if *rx.borrow_and_update() {
                    return;
                }
                if rx.changed().await.is_err() {
                    // Sender gone without cancelling: this signal can never fire.
                    std::future::pending::<()>().await;
                }
            }
        };
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = signal => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => signal.await,
        }
    }
}
