//! Per-tab viewer sessions.
//!
//! Each open page owns one Controller whose surfaces are CommandLogs. Every
//! request drains both logs and returns the batch for the page to apply.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use eventmap_core::{
    CommandLog, Controller, EventStore, MapCommand, MapOptions, UiEvent, ViewCommand,
};

pub type SessionController = Controller<CommandLog<ViewCommand>, CommandLog<MapCommand>>;

/// Commands accumulated since the previous request, in application order.
#[derive(Debug, Serialize)]
pub struct CommandBatch {
    pub view: Vec<ViewCommand>,
    pub map: Vec<MapCommand>,
}

impl CommandBatch {
    fn drain(controller: &mut SessionController) -> Self {
        Self {
            view: controller.view_mut().surface_mut().drain(),
            map: controller.map_mut().surface_mut().drain(),
        }
    }
}

struct SessionEntry {
    controller: SessionController,
    last_seen: Instant,
}

pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Create a populated session. Evicts the least recently used one when full.
    pub async fn open(&self, store: Arc<EventStore>, options: MapOptions) -> (Uuid, CommandBatch) {
        let mut controller = Controller::new(
            store,
            CommandLog::default(),
            CommandLog::default(),
            options,
        );
        controller.populate();
        let batch = CommandBatch::drain(&mut controller);

        let id = Uuid::new_v4();
        let mut sessions = self.sessions.lock().await;
        if sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            if let Some(oldest) = oldest {
                sessions.remove(&oldest);
                warn!(session_id = %oldest, "Evicted least recently used session");
            }
        }
        sessions.insert(
            id,
            SessionEntry {
                controller,
                last_seen: Instant::now(),
            },
        );
        debug!(session_id = %id, open = sessions.len(), "Session opened");
        (id, batch)
    }

    /// `None` when the session is unknown or was evicted.
    pub async fn dispatch(&self, id: Uuid, event: UiEvent) -> Option<CommandBatch> {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        entry.controller.dispatch(event);
        Some(CommandBatch::drain(&mut entry.controller))
    }

    pub async fn close(&self, id: Uuid) -> bool {
        let removed = self.sessions.lock().await.remove(&id).is_some();
        if removed {
            debug!(session_id = %id, "Session closed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
