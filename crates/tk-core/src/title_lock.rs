use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::ThreadId;

/// Enforced group titles, keyed by thread.
#[derive(Default)]
pub struct TitleLocks {
    inner: Mutex<HashMap<ThreadId, String>>,
}

impl TitleLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, thread: ThreadId, title: String) {
        self.inner.lock().await.insert(thread, title);
    }

    /// Returns whether a lock was removed.
    pub async fn unlock(&self, thread: &ThreadId) -> bool {
        self.inner.lock().await.remove(thread).is_some()
    }

    pub async fn locked(&self, thread: &ThreadId) -> Option<String> {
        self.inner.lock().await.get(thread).cloned()
    }

    /// Title to restore after observing `observed`, if the thread is locked
    /// to something else.
    pub async fn correction(&self, thread: &ThreadId, observed: &str) -> Option<String> {
        self.inner
            .lock()
            .await
            .get(thread)
            .filter(|locked| locked.as_str() != observed)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn correction_only_when_title_differs() {
        let locks = TitleLocks::new();
        let t = ThreadId::from("t1");

        assert_eq!(locks.correction(&t, "anything").await, None);

        locks.lock(t.clone(), "Book Club".to_string()).await;
        assert_eq!(locks.correction(&t, "Book Club").await, None);
        assert_eq!(
            locks.correction(&t, "renamed").await.as_deref(),
            Some("Book Club")
        );

        assert!(locks.unlock(&t).await);
        assert!(!locks.unlock(&t).await);
        assert_eq!(locks.correction(&t, "renamed").await, None);
    }

    #[tokio::test]
    async fn locks_are_per_thread() {
        let locks = TitleLocks::new();
        locks.lock(ThreadId::from("a"), "A".to_string()).await;
        assert_eq!(locks.locked(&ThreadId::from("a")).await.as_deref(), Some("A"));
        assert_eq!(locks.locked(&ThreadId::from("b")).await, None);
        assert_eq!(locks.correction(&ThreadId::from("b"), "x").await, None);
    }
}
