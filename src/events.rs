use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

/// Lifecycle notifications published by panel pages.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum PanelEvent {
    ResellerScriptStart,
    ResellerScriptEnd,
    #[serde(rename_all = "camelCase")]
    BeforeEditUser { user_id: i64 },
    #[serde(rename_all = "camelCase")]
    AfterEditUser { user_id: i64 },
}

pub trait EventDispatcher: Send + Sync {
    fn notify(&self, event: PanelEvent);
}

/// Fan-out bus; listeners subscribe and receive every event sent afterwards.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PanelEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventDispatcher for EventBus {
    fn notify(&self, event: PanelEvent) {
        debug!(?event, "dispatch");
        // no listeners is fine
        let _ = self.tx.send(event);
    }
}
