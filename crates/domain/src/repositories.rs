//! Repository abstractions over the transactional store.
//!
//! Queue mutation methods are atomic: each call applies its status change
//! and every implied position shift in a single transaction, so no caller
//! ever observes a partially shifted queue. Callers serialize mutations per
//! hub; these methods only guarantee atomicity, not ordering.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use despacho_errors::DispatchResult;
use serde::Serialize;

use crate::entities::{
    Binding, HistoryEvent, Hub, NewBinding, NewHistoryEvent, NewHub, NewNotification,
    NewQueueEntry, Notification, QueueEntry,
};
use crate::value_objects::Coordinates;

#[async_trait]
pub trait HubRepository: Send + Sync {
    async fn create(&self, hub: &NewHub) -> DispatchResult<Hub>;
    async fn get_by_id(&self, id: i64) -> DispatchResult<Option<Hub>>;
    async fn list(&self) -> DispatchResult<Vec<Hub>>;
    async fn update(&self, hub: &Hub) -> DispatchResult<Hub>;
    async fn delete(&self, id: i64) -> DispatchResult<()>;
}

#[async_trait]
pub trait BindingRepository: Send + Sync {
    async fn create(&self, binding: &NewBinding) -> DispatchResult<Binding>;
    async fn find_active_by_professional(
        &self,
        professional_id: &str,
    ) -> DispatchResult<Option<Binding>>;
    async fn list_by_hub(&self, hub_id: i64) -> DispatchResult<Vec<Binding>>;
    async fn deactivate(&self, id: i64) -> DispatchResult<()>;
}

#[async_trait]
pub trait QueueRepository: Send + Sync {
    async fn find_by_professional(
        &self,
        professional_id: &str,
    ) -> DispatchResult<Option<QueueEntry>>;
    /// Waiting entries for a hub, ordered by position.
    async fn list_waiting(&self, hub_id: i64) -> DispatchResult<Vec<QueueEntry>>;
    async fn list_en_route(&self, hub_id: i64) -> DispatchResult<Vec<QueueEntry>>;
    /// Every entry of a hub in one consistent snapshot, waiting first in
    /// position order, then en-route by dispatch time.
    async fn list_by_hub(&self, hub_id: i64) -> DispatchResult<Vec<QueueEntry>>;
    async fn count_by_hub(&self, hub_id: i64) -> DispatchResult<i64>;

    /// Creates a WAITING entry at max(position)+1.
    async fn insert_tail(&self, entry: &NewQueueEntry) -> DispatchResult<QueueEntry>;
    /// WAITING → EN_ROUTE: clears position, closes the gap behind it, stamps
    /// dispatched_at; when `single_ride`, records the pre-dispatch position
    /// as original_position.
    async fn mark_en_route(
        &self,
        entry_id: i64,
        single_ride: bool,
        now: DateTime<Utc>,
    ) -> DispatchResult<QueueEntry>;
    /// EN_ROUTE → WAITING at the queue tail; clears the single-ride state.
    async fn reinsert_tail(
        &self,
        entry_id: i64,
        checkin: Coordinates,
        now: DateTime<Utc>,
    ) -> DispatchResult<QueueEntry>;
    /// EN_ROUTE → WAITING at `target_position`, shifting every waiting entry
    /// at or after that slot up by one; clears the single-ride state.
    async fn reinsert_at(
        &self,
        entry_id: i64,
        target_position: i32,
        checkin: Coordinates,
        now: DateTime<Utc>,
    ) -> DispatchResult<QueueEntry>;
    /// Sends a WAITING entry to the maximum position, closing its old slot.
    /// No-op when the entry already sits at the tail.
    async fn move_to_back(&self, entry_id: i64) -> DispatchResult<QueueEntry>;
    /// Deletes the entry; when it was WAITING, closes the position gap.
    async fn delete_entry(&self, entry_id: i64) -> DispatchResult<()>;
}

/// Per-day aggregates over the transition ledger.
#[derive(Debug, Clone, Serialize)]
pub struct DailyStats {
    pub hub_id: i64,
    pub date: NaiveDate,
    pub entrances: i64,
    pub dispatches: i64,
    pub single_ride_dispatches: i64,
    pub returns: i64,
    pub priority_returns: i64,
    pub removals: i64,
    pub voluntary_exits: i64,
    pub avg_wait_minutes: Option<f64>,
    pub avg_en_route_minutes: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfessionalRanking {
    pub professional_id: String,
    pub display_name: String,
    pub dispatches: i64,
    pub avg_wait_minutes: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HourlyCount {
    pub hour: u32,
    pub entrances: i64,
}

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn append(&self, event: &NewHistoryEvent) -> DispatchResult<HistoryEvent>;
    async fn list(
        &self,
        hub_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> DispatchResult<Vec<HistoryEvent>>;
    async fn count(
        &self,
        hub_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DispatchResult<i64>;
    async fn daily_stats(&self, hub_id: i64, date: NaiveDate) -> DispatchResult<DailyStats>;
    async fn ranking(
        &self,
        hub_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DispatchResult<Vec<ProfessionalRanking>>;
    async fn hourly_distribution(
        &self,
        hub_id: i64,
        date: NaiveDate,
    ) -> DispatchResult<Vec<HourlyCount>>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// One live row per professional; a new push overwrites the previous one.
    async fn upsert(&self, notification: &NewNotification) -> DispatchResult<Notification>;
    /// Returns the pending notification and marks it read, atomically.
    async fn drain(&self, professional_id: &str) -> DispatchResult<Option<Notification>>;
    /// Marks the pending notification read without returning it.
    async fn ack(&self, professional_id: &str) -> DispatchResult<bool>;
    async fn find_pending(&self, professional_id: &str) -> DispatchResult<Option<Notification>>;
}
