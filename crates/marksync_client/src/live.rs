//! Transient "live" indicator lit by change feed activity.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Bumps a revision counter so watchers re-render.
pub(crate) fn bump(revision: &watch::Sender<u64>) {
    revision.send_modify(|r| *r = r.wrapping_add(1));
}

struct LiveInner {
    lit: AtomicBool,
    generation: AtomicU64,
    timer: Mutex<Option<JoinHandle<()>>>,
    revision: Arc<watch::Sender<u64>>,
}

/// Indicator that turns on for each feed event and switches itself off
/// after a fixed delay, unless another event re-arms it.
///
/// Purely observational; nothing reads it for correctness.
pub struct LiveIndicator {
    inner: Arc<LiveInner>,
    ttl: Duration,
}

impl LiveIndicator {
    /// Creates an unlit indicator that notifies `revision` on every change.
    pub fn new(ttl: Duration, revision: Arc<watch::Sender<u64>>) -> Self {
        Self {
            inner: Arc::new(LiveInner {
                lit: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                timer: Mutex::new(None),
                revision,
            }),
            ttl,
        }
    }

    /// Returns true while the indicator is lit.
    pub fn is_lit(&self) -> bool {
        self.inner.lit.load(Ordering::SeqCst)
    }

    /// Lights the indicator and restarts the clear timer.
    ///
    /// Without a tokio runtime the indicator stays lit until the next flash
    /// or [`cancel`](Self::cancel).
    pub fn flash(&self) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.lit.store(true, Ordering::SeqCst);
        bump(&self.inner.revision);

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };

        let inner = Arc::clone(&self.inner);
        let ttl = self.ttl;
        let timer = runtime.spawn(async move {
            tokio::time::sleep(ttl).await;
            if inner.generation.load(Ordering::SeqCst) == generation {
                inner.lit.store(false, Ordering::SeqCst);
                bump(&inner.revision);
            }
        });

        if let Some(previous) = self.inner.timer.lock().replace(timer) {
            previous.abort();
        }
    }

    /// Switches the indicator off and drops any pending timer.
    pub fn cancel(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(timer) = self.inner.timer.lock().take() {
            timer.abort();
        }
        if self.inner.lit.swap(false, Ordering::SeqCst) {
            bump(&self.inner.revision);
        }
    }
}

impl Drop for LiveIndicator {
    fn drop(&mut self) {
        if let Some(timer) = self.inner.timer.lock().take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicator(ttl_ms: u64) -> (LiveIndicator, watch::Receiver<u64>) {
        let (tx, rx) = watch::channel(0);
        (
            LiveIndicator::new(Duration::from_millis(ttl_ms), Arc::new(tx)),
            rx,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn clears_after_ttl() {
        let (live, _rx) = indicator(1500);
        assert!(!live.is_lit());

        live.flash();
        assert!(live.is_lit());

        tokio::time::sleep(Duration::from_millis(1499)).await;
        assert!(live.is_lit());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(!live.is_lit());
    }

    #[tokio::test(start_paused = true)]
    async fn reflash_extends_window() {
        let (live, _rx) = indicator(1500);

        live.flash();
        tokio::time::sleep(Duration::from_millis(1000)).await;
        live.flash();

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(live.is_lit());

        tokio::time::sleep(Duration::from_millis(501)).await;
        assert!(!live.is_lit());
    }

    #[tokio::test(start_paused = true)]
    async fn flash_notifies_watchers() {
        let (live, rx) = indicator(10);
        let before = *rx.borrow();
        live.flash();
        assert!(*rx.borrow() > before);
    }

    #[tokio::test]
    async fn cancel_turns_off() {
        let (live, _rx) = indicator(60_000);
        live.flash();
        live.cancel();
        assert!(!live.is_lit());
    }

    #[test]
    fn flash_without_runtime_stays_lit() {
        let (live, _rx) = indicator(1);
        live.flash();
        assert!(live.is_lit());
    }
}
