use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::model::{RoomEvent, RoomId};

const CHANNEL_CAPACITY: usize = 256;

/// Broadcast hub for per-room lifecycle events, so an embedding layer can
/// push schedule changes without polling.
pub struct NotifyHub {
    channels: DashMap<RoomId, broadcast::Sender<RoomEvent>>,
}

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to events for a room. Creates the channel if needed.
    pub fn subscribe(&self, room_id: RoomId) -> broadcast::Receiver<RoomEvent> {
        let sender = self
            .channels
            .entry(room_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Send an event. No-op if nobody is listening.
    pub fn send(&self, room_id: RoomId, event: &RoomEvent) {
        if let Some(sender) = self.channels.get(&room_id) {
            let _ = sender.send(event.clone());
        }
    }

    /// Remove a channel (e.g. when a room is retired by its owning service).
    pub fn remove(&self, room_id: &RoomId) {
        self.channels.remove(room_id);
    }
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Slot;
    use ulid::Ulid;

    #[tokio::test]
    async fn subscribe_and_receive() {
        let hub = NotifyHub::new();
        let room_id = Ulid::new();
        let mut rx = hub.subscribe(room_id);

        let event = RoomEvent::ReservationRejected { id: Ulid::new() };
        hub.send(room_id, &event);

        let received = rx.recv().await.unwrap();
        assert_eq!(received, event);
    }

    #[tokio::test]
    async fn send_without_subscribers_is_noop() {
        let hub = NotifyHub::new();
        let room_id = Ulid::new();
        // No subscriber — should not panic
        hub.send(
            room_id,
            &RoomEvent::ScheduleAdded {
                id: Ulid::new(),
                slot: Slot::new(
                    "2025-06-10T09:00:00".parse().unwrap(),
                    "2025-06-10T10:00:00".parse().unwrap(),
                ),
            },
        );
    }
}
