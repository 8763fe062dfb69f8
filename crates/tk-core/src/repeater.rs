//! Named recurring actions, at most one live task per feature.
//!
//! Each repeater runs as its own tokio task with a `CancellationToken`.
//! Starting a feature cancels and aborts whatever was running under that
//! feature first. Loops check the token at the top of every tick, so a
//! stopped repeater never sends again.

use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    Sticker,
    MediaResend,
    Nicknames,
}

#[derive(Clone, Default)]
pub struct Repeaters {
    inner: Arc<Mutex<RepeaterState>>,
}

#[derive(Default)]
struct RepeaterState {
    next_generation: u64,
    entries: HashMap<Feature, Entry>,
}

struct Entry {
    generation: u64,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Entry {
    fn shutdown(self) -> bool {
        let live = !self.handle.is_finished() && !self.cancel.is_cancelled();
        self.cancel.cancel();
        self.handle.abort();
        live
    }
}

/// Passed to a repeater body; owns its cancellation token.
#[derive(Clone)]
pub struct Tick {
    feature: Feature,
    token: CancellationToken,
}

impl Tick {
    pub fn feature(&self) -> Feature {
        self.feature
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Sleep for `d`. Returns `false` if the repeater was stopped meanwhile.
    pub async fn sleep(&self, d: Duration) -> bool {
        tokio::select! {
            _ = self.token.cancelled() => false,
            _ = tokio::time::sleep(d) => !self.token.is_cancelled(),
        }
    }
}

impl Repeaters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `feature`, replacing any repeater already running under it.
    ///
    /// Returns `true` if a previous repeater was replaced.
    pub async fn start<F, Fut>(&self, feature: Feature, body: F) -> bool
    where
        F: FnOnce(Tick) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut st = self.inner.lock().await;

        let replaced = st
            .entries
            .remove(&feature)
            .map(Entry::shutdown)
            .unwrap_or(false);

        st.next_generation += 1;
        let generation = st.next_generation;
        let cancel = CancellationToken::new();
        let fut = body(Tick {
            feature,
            token: cancel.clone(),
        });

        // The lock is held until the entry is inserted, so `finish` from a
        // body that completes immediately cannot run before the insert.
        let this = self.clone();
        let handle = tokio::spawn(async move {
            fut.await;
            this.finish(feature, generation).await;
        });

        st.entries.insert(
            feature,
            Entry {
                generation,
                cancel,
                handle,
            },
        );

        if replaced {
            tracing::info!(?feature, "repeater restarted");
        } else {
            tracing::info!(?feature, "repeater started");
        }
        replaced
    }

    /// Stop `feature`. Returns whether a repeater was actually running.
    pub async fn stop(&self, feature: Feature) -> bool {
        let entry = self.inner.lock().await.entries.remove(&feature);
        let was_running = entry.map(Entry::shutdown).unwrap_or(false);
        if was_running {
            tracing::info!(?feature, "repeater stopped");
        }
        was_running
    }

    pub async fn is_running(&self, feature: Feature) -> bool {
        let st = self.inner.lock().await;
        st.entries
            .get(&feature)
            .map(|e| !e.handle.is_finished() && !e.cancel.is_cancelled())
            .unwrap_or(false)
    }

    pub async fn stop_all(&self) {
        let mut st = self.inner.lock().await;
        for (_, entry) in st.entries.drain() {
            entry.shutdown();
        }
    }

    /// Drop the entry of a body that ended on its own, unless it was
    /// already replaced by a newer generation.
    async fn finish(&self, feature: Feature, generation: u64) {
        let mut st = self.inner.lock().await;
        if st
            .entries
            .get(&feature)
            .map(|e| e.generation == generation)
            .unwrap_or(false)
        {
            st.entries.remove(&feature);
            tracing::info!(?feature, "repeater finished");
        }
    }
}
