mod availability;
mod conflict;
mod error;
mod mutations;
mod queries;

pub use availability::{reservation_conflicts, touched_dates};
pub use error::{EngineError, Fault};

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::model::*;
use crate::notify::NotifyHub;
use crate::store::Store;

/// The booking core: conflict resolution across both registries plus the
/// reservation lifecycle state machine.
///
/// All storage access goes through the injected [`Store`] capability. The
/// engine itself owns only the per-room locks that keep conflict-checked
/// writes from interleaving.
pub struct Engine {
    pub(super) store: Arc<dyn Store>,
    pub notify: Arc<NotifyHub>,
    /// One mutex per room: a decision's re-check and its writes form a
    /// critical section against other decisions for the same room.
    room_locks: DashMap<RoomId, Arc<Mutex<()>>>,
}

impl Engine {
    pub fn new(store: Arc<dyn Store>, notify: Arc<NotifyHub>) -> Self {
        Self {
            store,
            notify,
            room_locks: DashMap::new(),
        }
    }

    /// Lock guarding check-then-write sections for one room. Entries are
    /// created on first use and live for the life of the engine.
    pub(super) fn room_lock(&self, room_id: RoomId) -> Arc<Mutex<()>> {
        self.room_locks
            .entry(room_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub(super) async fn require_room_by_code(&self, code: &str) -> Result<RoomRow, EngineError> {
        self.store
            .room_by_code(code)
            .await?
            .ok_or_else(|| EngineError::RoomNotFound(code.to_owned()))
    }

    /// Best-effort display info for a user; lookup failures degrade to
    /// placeholders, they never fail the operation.
    pub(super) async fn user_info(&self, id: UserId) -> UserInfo {
        match self.store.profile_by_id(id).await {
            Ok(profile) => UserInfo::from_profile(id, profile),
            Err(e) => {
                tracing::warn!("profile lookup failed for {id}: {e}");
                UserInfo::from_profile(id, None)
            }
        }
    }
}
