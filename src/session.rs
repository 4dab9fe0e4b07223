use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

pub const SLOT_DISPLAY: &str = "plan_display";
pub const SLOT_DOWNLOAD: &str = "plan_download";
pub const SLOT_SAVE: &str = "plan_save";

/// Ephemeral per-user key-value store. Holds generated plans between the
/// generate call and the view/download/save calls so those paths never go
/// back to the generation service. Contents do not survive a restart.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, HashMap<String, Vec<String>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user_id: Uuid, key: &str) -> Option<Vec<String>> {
        let sessions = self.inner.read().await;
        sessions.get(&user_id).and_then(|slots| slots.get(key)).cloned()
    }

    pub async fn set(&self, user_id: Uuid, key: &str, value: Vec<String>) {
        let mut sessions = self.inner.write().await;
        sessions
            .entry(user_id)
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Overwrites all three plan slots under a single write lock so readers
    /// never observe a partially staged plan.
    pub async fn stage_plan(&self, user_id: Uuid, plan: &[String]) {
        let mut sessions = self.inner.write().await;
        let slots = sessions.entry(user_id).or_default();
        for key in [SLOT_DISPLAY, SLOT_DOWNLOAD, SLOT_SAVE] {
            slots.insert(key.to_string(), plan.to_vec());
        }
    }
}
