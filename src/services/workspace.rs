use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use uuid::Uuid;
use crate::models::{UploadSlot, Workspace};

struct Entry {
    workspace: Workspace,
    touched: Instant,
}

/// Server-side registry of quote workspaces, one per logged-in session.
/// Workspaces nobody has used for a while are evicted by the sweeper.
#[derive(Clone, Default)]
pub struct WorkspaceService {
    workspaces: Arc<Mutex<HashMap<String, Entry>>>,
}

impl WorkspaceService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, owner_id: &str) -> String {
        let id = Uuid::new_v4().to_string();
        let entry = Entry {
            workspace: Workspace::new(owner_id.to_string()),
            touched: Instant::now(),
        };
        self.workspaces.lock().await.insert(id.clone(), entry);
        tracing::debug!("Created workspace {} for account {}", id, owner_id);
        id
    }

    pub async fn get(&self, id: &str) -> Option<Workspace> {
        self.update(id, |workspace| workspace.clone()).await
    }

    pub async fn update<R>(&self, id: &str, apply: impl FnOnce(&mut Workspace) -> R) -> Option<R> {
        self.workspaces.lock().await.get_mut(id).map(|entry| {
            entry.touched = Instant::now();
            apply(&mut entry.workspace)
        })
    }

    pub async fn remove(&self, id: &str) {
        if self.workspaces.lock().await.remove(id).is_some() {
            tracing::debug!("Dropped workspace {}", id);
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.workspaces.lock().await.len()
    }

    /// Drops every workspace untouched for at least `idle`. Returns how many went.
    pub async fn evict_idle(&self, idle: Duration) -> usize {
        let mut workspaces = self.workspaces.lock().await;
        let before = workspaces.len();
        workspaces.retain(|_, entry| entry.touched.elapsed() < idle);
        before - workspaces.len()
    }

    /// Runs `evict_idle` every `every` until the runtime shuts down.
    pub fn spawn_sweeper(&self, idle: Duration, every: Duration) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = service.evict_idle(idle).await;
                if evicted > 0 {
                    tracing::info!("Evicted {} idle workspaces", evicted);
                }
            }
        })
    }

    pub async fn begin_upload(&self, id: &str, slot: UploadSlot) -> Option<u64> {
        self.update(id, |workspace| workspace.begin_upload(slot)).await
    }

    pub async fn cancel_upload(&self, id: &str, slot: UploadSlot, ticket: u64) {
        self.update(id, |workspace| workspace.cancel_upload(slot, ticket)).await;
    }

    /// Applies an upload result only if `ticket` is still the latest one for
    /// its slot. Returns `Some(false)` when the result was stale and dropped.
    pub async fn finish_upload(
        &self,
        id: &str,
        slot: UploadSlot,
        ticket: u64,
        apply: impl FnOnce(&mut Workspace),
    ) -> Option<bool> {
        self.update(id, |workspace| {
            if workspace.is_current(slot, ticket) {
                apply(workspace);
                true
            } else {
                tracing::debug!("Discarding stale {:?} upload (ticket {})", slot, ticket);
                false
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuoteField;

    #[tokio::test]
    async fn stale_upload_result_is_discarded() {
        let service = WorkspaceService::new();
        let id = service.create("1").await;

        let slow = service.begin_upload(&id, UploadSlot::Spreadsheet).await.unwrap();
        let fast = service.begin_upload(&id, UploadSlot::Spreadsheet).await.unwrap();

        let applied = service
            .finish_upload(&id, UploadSlot::Spreadsheet, fast, |w| w.quote.set(QuoteField::Model, "new"))
            .await;
        assert_eq!(applied, Some(true));

        // The earlier read resolves last and must not overwrite the newer result
        let applied = service
            .finish_upload(&id, UploadSlot::Spreadsheet, slow, |w| w.quote.set(QuoteField::Model, "old"))
            .await;
        assert_eq!(applied, Some(false));

        assert_eq!(service.get(&id).await.unwrap().quote.model, "new");
    }

    #[tokio::test]
    async fn removed_workspace_is_gone() {
        let service = WorkspaceService::new();
        let id = service.create("1").await;
        service.remove(&id).await;

        assert!(service.get(&id).await.is_none());
        assert_eq!(service.begin_upload(&id, UploadSlot::Logo).await, None);
    }

    #[tokio::test]
    async fn idle_workspace_is_evicted_and_used_one_kept() {
        let service = WorkspaceService::new();
        let idle = service.create("1").await;
        let busy = service.create("2").await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        service.update(&busy, |w| w.quote.set(QuoteField::Brand, "Fiat")).await;

        assert_eq!(service.evict_idle(Duration::from_millis(30)).await, 1);
        assert!(service.get(&idle).await.is_none());
        assert_eq!(service.get(&busy).await.unwrap().quote.brand, "Fiat");
    }

    #[tokio::test]
    async fn sweeper_clears_abandoned_workspaces() {
        let service = WorkspaceService::new();
        for owner in 0..5 {
            service.create(&owner.to_string()).await;
        }

        let sweeper = service.spawn_sweeper(Duration::from_millis(10), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        sweeper.abort();

        assert_eq!(service.len().await, 0);
    }
}
