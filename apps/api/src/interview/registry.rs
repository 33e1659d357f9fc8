use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::interview::engine::Interview;

/// How often the background sweep looks for idle interviews.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// An interview behind its own lock. The lock is held only for short
/// synchronous steps, never across an external call.
pub type SharedInterview = Arc<Mutex<Interview>>;

/// In-memory interviews keyed by id. Nothing is persisted; interviews idle
/// past the configured TTL are dropped by the sweep.
#[derive(Clone, Default)]
pub struct InterviewRegistry {
    interviews: Arc<RwLock<HashMap<Uuid, SharedInterview>>>,
}

impl InterviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, interview: Interview) -> SharedInterview {
        let id = interview.id();
        let shared = Arc::new(Mutex::new(interview));
        self.interviews.write().await.insert(id, Arc::clone(&shared));
        shared
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedInterview> {
        self.interviews.read().await.get(&id).cloned()
    }

    /// Returns `false` if no interview had that id.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.interviews.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.interviews.read().await.len()
    }

    /// Drops every interview idle for at least `ttl`, finished or not.
    /// Interviews that are locked or have an answer outstanding are kept.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut interviews = self.interviews.write().await;
        let before = interviews.len();

        interviews.retain(|_, shared| match shared.try_lock() {
            Ok(interview) => interview.answer_in_progress() || interview.idle_for(now) < ttl,
            Err(_) => true,
        });

        let evicted = before - interviews.len();
        if evicted > 0 {
            info!("Evicted {evicted} idle interview(s), {} remaining", interviews.len());
        }
        evicted
    }

    /// Runs `evict_idle` every `SWEEP_INTERVAL` until the task is aborted.
    pub fn spawn_sweeper(&self, ttl: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                registry.evict_idle(ttl).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::template::tests::sample_template;

    const TTL: Duration = Duration::from_secs(30 * 60);

    fn interview(name: &str) -> Interview {
        Interview::start(&sample_template(), name, 1).unwrap()
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let registry = InterviewRegistry::new();
        let interview = interview("Ada");
        let id = interview.id();

        registry.insert(interview).await;
        assert_eq!(registry.len().await, 1);

        let shared = registry.get(id).await.unwrap();
        assert_eq!(shared.lock().await.id(), id);

        assert!(registry.remove(id).await);
        assert!(!registry.remove(id).await);
        assert!(registry.get(id).await.is_none());
    }

    #[tokio::test]
    async fn test_interviews_are_independent() {
        let registry = InterviewRegistry::new();
        let a = registry.insert(interview("Ada")).await;
        let b = registry.insert(interview("Grace")).await;

        a.lock().await.end();

        assert!(a.lock().await.is_complete());
        assert!(!b.lock().await.is_complete());
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evict_idle_drops_only_stale_interviews() {
        let registry = InterviewRegistry::new();
        let stale = registry.insert(interview("Ada")).await;
        let stale_id = stale.lock().await.id();

        tokio::time::advance(Duration::from_secs(20 * 60)).await;
        let fresh = registry.insert(interview("Grace")).await;
        let fresh_id = fresh.lock().await.id();

        assert_eq!(registry.evict_idle(TTL).await, 0);

        tokio::time::advance(Duration::from_secs(11 * 60)).await;
        assert_eq!(registry.evict_idle(TTL).await, 1);
        assert!(registry.get(stale_id).await.is_none());
        assert!(registry.get(fresh_id).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ended_interview_is_kept_until_idle() {
        let registry = InterviewRegistry::new();
        let shared = registry.insert(interview("Ada")).await;

        tokio::time::advance(TTL - Duration::from_secs(60)).await;
        // ending counts as activity, so the report stays fetchable
        shared.lock().await.end();
        tokio::time::advance(Duration::from_secs(120)).await;
        assert_eq!(registry.evict_idle(TTL).await, 0);

        tokio::time::advance(TTL).await;
        assert_eq!(registry.evict_idle(TTL).await, 1);
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_locked_interview_is_not_evicted() {
        let registry = InterviewRegistry::new();
        let shared = registry.insert(interview("Ada")).await;

        tokio::time::advance(TTL * 2).await;
        let guard = shared.lock().await;
        assert_eq!(registry.evict_idle(TTL).await, 0);
        drop(guard);
        assert_eq!(registry.evict_idle(TTL).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_in_background() {
        let registry = InterviewRegistry::new();
        registry.insert(interview("Ada")).await;
        let sweeper = registry.spawn_sweeper(TTL);

        // paused clock auto-advances through the sweep ticks
        tokio::time::sleep(TTL + SWEEP_INTERVAL * 2).await;
        assert_eq!(registry.len().await, 0);

        sweeper.abort();
    }
}
