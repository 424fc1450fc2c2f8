//! Cancel-and-restart debounce.

use rustc_hash::FxHashSet;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

/// Collect changes from `rx` until `delay` passes without a new one, then
/// run `rebuild` with the distinct paths.
///
/// Every change restarts the timer. The rebuild is awaited in place, so
/// two rebuilds never overlap; changes arriving meanwhile queue up in the
/// channel and open the next window. Returns once the channel closes,
/// after flushing a pending window.
pub(super) async fn debounce<F, Fut>(mut rx: mpsc::Receiver<PathBuf>, delay: Duration, mut rebuild: F)
where
    F: FnMut(Vec<PathBuf>) -> Fut,
    Fut: Future<Output = ()>,
{
    while let Some(first) = rx.recv().await {
        let mut changes = FxHashSet::default();
        changes.insert(first);
        let mut deadline = Instant::now() + delay;
        let mut open = true;

        while open {
            tokio::select! {
                biased;
                next = rx.recv() => match next {
                    Some(path) => {
                        changes.insert(path);
                        deadline = Instant::now() + delay;
                    }
                    None => open = false,
                },
                _ = sleep_until(deadline) => break,
            }
        }

        let mut changes: Vec<_> = changes.into_iter().collect();
        changes.sort();
        crate::debug!("watch"; "debounced {} change(s)", changes.len());
        rebuild(changes).await;

        if !open {
            return;
        }
    }
}
