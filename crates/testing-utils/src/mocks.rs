//! Mock implementations of the repository and port traits.
//!
//! The queue mock reproduces the store's atomic-mutation semantics in
//! memory (each call applies its full position shift before returning), so
//! engine tests exercise the same contracts the SQL repositories honor.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use despacho_domain::entities::{
    Binding, EntryStatus, HistoryAction, HistoryEvent, Hub, NewBinding, NewHistoryEvent, NewHub,
    NewNotification, NewQueueEntry, Notification, QueueEntry, POSITION_REASON_MOVED_TO_BACK,
};
use despacho_domain::events::{QueueEvent, QueueEventPublisher};
use despacho_domain::ports::AuditSink;
use despacho_domain::repositories::{
    BindingRepository, DailyStats, HistoryRepository, HourlyCount, HubRepository,
    NotificationRepository, ProfessionalRanking, QueueRepository,
};
use despacho_domain::value_objects::Coordinates;
use despacho_errors::{DispatchError, DispatchResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct MockHubRepository {
    hubs: Arc<Mutex<HashMap<i64, Hub>>>,
    next_id: Arc<Mutex<i64>>,
}

impl MockHubRepository {
    pub fn new() -> Self {
        Self {
            hubs: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    pub fn with_hubs(hubs: Vec<Hub>) -> Self {
        let mut map = HashMap::new();
        let mut max_id = 0;
        for hub in hubs {
            max_id = max_id.max(hub.id);
            map.insert(hub.id, hub);
        }
        Self {
            hubs: Arc::new(Mutex::new(map)),
            next_id: Arc::new(Mutex::new(max_id + 1)),
        }
    }

    pub fn count(&self) -> usize {
        self.hubs.lock().unwrap().len()
    }
}

#[async_trait]
impl HubRepository for MockHubRepository {
    async fn create(&self, hub: &NewHub) -> DispatchResult<Hub> {
        let mut hubs = self.hubs.lock().unwrap();
        let mut next_id = self.next_id.lock().unwrap();

        let now = Utc::now();
        let created = Hub {
            id: *next_id,
            name: hub.name.clone(),
            address: hub.address.clone(),
            latitude: hub.latitude,
            longitude: hub.longitude,
            radius_meters: hub.radius_meters,
            active: hub.active,
            created_at: now,
            updated_at: now,
        };
        *next_id += 1;
        hubs.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> DispatchResult<Option<Hub>> {
        Ok(self.hubs.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self) -> DispatchResult<Vec<Hub>> {
        let mut hubs: Vec<Hub> = self.hubs.lock().unwrap().values().cloned().collect();
        hubs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(hubs)
    }

    async fn update(&self, hub: &Hub) -> DispatchResult<Hub> {
        let mut hubs = self.hubs.lock().unwrap();
        if !hubs.contains_key(&hub.id) {
            return Err(DispatchError::hub_not_found(hub.id));
        }
        let mut updated = hub.clone();
        updated.updated_at = Utc::now();
        hubs.insert(hub.id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> DispatchResult<()> {
        if self.hubs.lock().unwrap().remove(&id).is_none() {
            return Err(DispatchError::hub_not_found(id));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockBindingRepository {
    bindings: Arc<Mutex<HashMap<i64, Binding>>>,
    next_id: Arc<Mutex<i64>>,
}

impl MockBindingRepository {
    pub fn new() -> Self {
        Self {
            bindings: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    pub fn with_bindings(bindings: Vec<Binding>) -> Self {
        let mut map = HashMap::new();
        let mut max_id = 0;
        for binding in bindings {
            max_id = max_id.max(binding.id);
            map.insert(binding.id, binding);
        }
        Self {
            bindings: Arc::new(Mutex::new(map)),
            next_id: Arc::new(Mutex::new(max_id + 1)),
        }
    }
}

#[async_trait]
impl BindingRepository for MockBindingRepository {
    async fn create(&self, binding: &NewBinding) -> DispatchResult<Binding> {
        let mut bindings = self.bindings.lock().unwrap();
        let mut next_id = self.next_id.lock().unwrap();

        let created = Binding {
            id: *next_id,
            hub_id: binding.hub_id,
            professional_id: binding.professional_id.clone(),
            display_name: binding.display_name.clone(),
            active: true,
            created_at: Utc::now(),
        };
        *next_id += 1;
        bindings.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_active_by_professional(
        &self,
        professional_id: &str,
    ) -> DispatchResult<Option<Binding>> {
        Ok(self
            .bindings
            .lock()
            .unwrap()
            .values()
            .find(|b| b.active && b.professional_id == professional_id)
            .cloned())
    }

    async fn list_by_hub(&self, hub_id: i64) -> DispatchResult<Vec<Binding>> {
        let mut bindings: Vec<Binding> = self
            .bindings
            .lock()
            .unwrap()
            .values()
            .filter(|b| b.active && b.hub_id == hub_id)
            .cloned()
            .collect();
        bindings.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(bindings)
    }

    async fn deactivate(&self, id: i64) -> DispatchResult<()> {
        let mut bindings = self.bindings.lock().unwrap();
        match bindings.get_mut(&id) {
            Some(binding) if binding.active => {
                binding.active = false;
                Ok(())
            }
            _ => Err(DispatchError::database_error(format!(
                "binding {id} not found or already inactive"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockQueueRepository {
    entries: Arc<Mutex<HashMap<i64, QueueEntry>>>,
    next_id: Arc<Mutex<i64>>,
}

impl MockQueueRepository {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Rewinds an en-route entry's dispatch time, for overdue-alert tests.
    pub fn backdate_dispatch(&self, professional_id: &str, minutes: i64) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries
            .values_mut()
            .find(|e| e.professional_id == professional_id)
        {
            if let Some(dispatched_at) = entry.dispatched_at {
                entry.dispatched_at = Some(dispatched_at - chrono::Duration::minutes(minutes));
            }
        }
    }

    /// Rewinds entered_at, for wait-duration tests.
    pub fn backdate_entry(&self, professional_id: &str, minutes: i64) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries
            .values_mut()
            .find(|e| e.professional_id == professional_id)
        {
            entry.entered_at -= chrono::Duration::minutes(minutes);
        }
    }

    fn max_waiting_position(entries: &HashMap<i64, QueueEntry>, hub_id: i64) -> i32 {
        entries
            .values()
            .filter(|e| e.hub_id == hub_id && e.is_waiting())
            .filter_map(|e| e.position)
            .max()
            .unwrap_or(0)
    }

    fn shift_down_after(entries: &mut HashMap<i64, QueueEntry>, hub_id: i64, old_position: i32) {
        for entry in entries.values_mut() {
            if entry.hub_id == hub_id && entry.is_waiting() {
                if let Some(position) = entry.position {
                    if position > old_position {
                        entry.position = Some(position - 1);
                    }
                }
            }
        }
    }
}

#[async_trait]
impl QueueRepository for MockQueueRepository {
    async fn find_by_professional(
        &self,
        professional_id: &str,
    ) -> DispatchResult<Option<QueueEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .values()
            .find(|e| e.professional_id == professional_id)
            .cloned())
    }

    async fn list_waiting(&self, hub_id: i64) -> DispatchResult<Vec<QueueEntry>> {
        let mut waiting: Vec<QueueEntry> = self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.hub_id == hub_id && e.is_waiting())
            .cloned()
            .collect();
        waiting.sort_by_key(|e| e.position);
        Ok(waiting)
    }

    async fn list_en_route(&self, hub_id: i64) -> DispatchResult<Vec<QueueEntry>> {
        let mut en_route: Vec<QueueEntry> = self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.hub_id == hub_id && e.is_en_route())
            .cloned()
            .collect();
        en_route.sort_by_key(|e| e.dispatched_at);
        Ok(en_route)
    }

    async fn list_by_hub(&self, hub_id: i64) -> DispatchResult<Vec<QueueEntry>> {
        let mut entries: Vec<QueueEntry> = self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.hub_id == hub_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| (e.is_en_route(), e.position, e.dispatched_at));
        Ok(entries)
    }

    async fn count_by_hub(&self, hub_id: i64) -> DispatchResult<i64> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.hub_id == hub_id)
            .count() as i64)
    }

    async fn insert_tail(&self, entry: &NewQueueEntry) -> DispatchResult<QueueEntry> {
        let mut entries = self.entries.lock().unwrap();
        if entries
            .values()
            .any(|e| e.professional_id == entry.professional_id)
        {
            return Err(DispatchError::database_error(format!(
                "professional {} already has a queue entry",
                entry.professional_id
            )));
        }

        let mut next_id = self.next_id.lock().unwrap();
        let position = Self::max_waiting_position(&entries, entry.hub_id) + 1;
        let created = QueueEntry {
            id: *next_id,
            hub_id: entry.hub_id,
            professional_id: entry.professional_id.clone(),
            display_name: entry.display_name.clone(),
            status: EntryStatus::Waiting,
            position: Some(position),
            entered_at: entry.entered_at,
            dispatched_at: None,
            returned_at: None,
            checkin_latitude: entry.checkin.latitude,
            checkin_longitude: entry.checkin.longitude,
            single_ride: false,
            original_position: None,
            position_reason: None,
        };
        *next_id += 1;
        entries.insert(created.id, created.clone());
        Ok(created)
    }

    async fn mark_en_route(
        &self,
        entry_id: i64,
        single_ride: bool,
        now: DateTime<Utc>,
    ) -> DispatchResult<QueueEntry> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .get(&entry_id)
            .cloned()
            .ok_or_else(|| DispatchError::database_error(format!("queue entry {entry_id} not found")))?;

        let old_position = match (entry.status, entry.position) {
            (EntryStatus::Waiting, Some(position)) => position,
            _ => return Err(DispatchError::not_in_queue(entry.professional_id)),
        };

        let updated = {
            let stored = entries.get_mut(&entry_id).unwrap();
            stored.status = EntryStatus::EnRoute;
            stored.position = None;
            stored.dispatched_at = Some(now);
            stored.single_ride = single_ride;
            stored.original_position = single_ride.then_some(old_position);
            stored.position_reason = None;
            stored.clone()
        };
        Self::shift_down_after(&mut entries, entry.hub_id, old_position);
        Ok(updated)
    }

    async fn reinsert_tail(
        &self,
        entry_id: i64,
        checkin: Coordinates,
        now: DateTime<Utc>,
    ) -> DispatchResult<QueueEntry> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .get(&entry_id)
            .cloned()
            .ok_or_else(|| DispatchError::database_error(format!("queue entry {entry_id} not found")))?;
        if !entry.is_en_route() {
            return Err(DispatchError::not_in_queue(entry.professional_id));
        }

        let position = Self::max_waiting_position(&entries, entry.hub_id) + 1;
        let stored = entries.get_mut(&entry_id).unwrap();
        stored.status = EntryStatus::Waiting;
        stored.position = Some(position);
        stored.returned_at = Some(now);
        stored.checkin_latitude = checkin.latitude;
        stored.checkin_longitude = checkin.longitude;
        stored.single_ride = false;
        stored.original_position = None;
        stored.position_reason = None;
        Ok(stored.clone())
    }

    async fn reinsert_at(
        &self,
        entry_id: i64,
        target_position: i32,
        checkin: Coordinates,
        now: DateTime<Utc>,
    ) -> DispatchResult<QueueEntry> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .get(&entry_id)
            .cloned()
            .ok_or_else(|| DispatchError::database_error(format!("queue entry {entry_id} not found")))?;
        if !entry.is_en_route() {
            return Err(DispatchError::not_in_queue(entry.professional_id));
        }

        for other in entries.values_mut() {
            if other.hub_id == entry.hub_id && other.is_waiting() {
                if let Some(position) = other.position {
                    if position >= target_position {
                        other.position = Some(position + 1);
                    }
                }
            }
        }

        let stored = entries.get_mut(&entry_id).unwrap();
        stored.status = EntryStatus::Waiting;
        stored.position = Some(target_position);
        stored.returned_at = Some(now);
        stored.checkin_latitude = checkin.latitude;
        stored.checkin_longitude = checkin.longitude;
        stored.single_ride = false;
        stored.original_position = None;
        stored.position_reason = None;
        Ok(stored.clone())
    }

    async fn move_to_back(&self, entry_id: i64) -> DispatchResult<QueueEntry> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .get(&entry_id)
            .cloned()
            .ok_or_else(|| DispatchError::database_error(format!("queue entry {entry_id} not found")))?;

        let old_position = match (entry.status, entry.position) {
            (EntryStatus::Waiting, Some(position)) => position,
            _ => return Err(DispatchError::not_in_queue(entry.professional_id)),
        };

        let max_position = Self::max_waiting_position(&entries, entry.hub_id);
        if old_position == max_position {
            return Ok(entry);
        }

        Self::shift_down_after(&mut entries, entry.hub_id, old_position);
        let stored = entries.get_mut(&entry_id).unwrap();
        stored.position = Some(max_position);
        stored.single_ride = false;
        stored.original_position = None;
        stored.position_reason = Some(POSITION_REASON_MOVED_TO_BACK.to_string());
        Ok(stored.clone())
    }

    async fn delete_entry(&self, entry_id: i64) -> DispatchResult<()> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .remove(&entry_id)
            .ok_or_else(|| DispatchError::database_error(format!("queue entry {entry_id} not found")))?;

        if let (EntryStatus::Waiting, Some(position)) = (entry.status, entry.position) {
            Self::shift_down_after(&mut entries, entry.hub_id, position);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockHistoryRepository {
    events: Arc<Mutex<Vec<HistoryEvent>>>,
    next_id: Arc<Mutex<i64>>,
    fail_appends: Arc<Mutex<bool>>,
}

impl MockHistoryRepository {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(Mutex::new(1)),
            fail_appends: Arc::new(Mutex::new(false)),
        }
    }

    /// Makes subsequent appends fail, for exercising the swallow-and-log
    /// contract of ledger writes.
    pub fn fail_appends(&self, fail: bool) {
        *self.fail_appends.lock().unwrap() = fail;
    }

    pub fn recorded(&self) -> Vec<HistoryEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn actions(&self) -> Vec<HistoryAction> {
        self.events.lock().unwrap().iter().map(|e| e.action).collect()
    }

    fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        (start, start + chrono::Duration::days(1))
    }
}

#[async_trait]
impl HistoryRepository for MockHistoryRepository {
    async fn append(&self, event: &NewHistoryEvent) -> DispatchResult<HistoryEvent> {
        if *self.fail_appends.lock().unwrap() {
            return Err(DispatchError::database_error("ledger unavailable"));
        }

        let mut events = self.events.lock().unwrap();
        let mut next_id = self.next_id.lock().unwrap();
        let stored = HistoryEvent {
            id: *next_id,
            hub_id: event.hub_id,
            hub_name: event.hub_name.clone(),
            professional_id: event.professional_id.clone(),
            display_name: event.display_name.clone(),
            action: event.action,
            wait_minutes: event.wait_minutes,
            en_route_minutes: event.en_route_minutes,
            note: event.note.clone(),
            admin_id: event.admin_id.clone(),
            occurred_at: event.occurred_at,
        };
        *next_id += 1;
        events.push(stored.clone());
        Ok(stored)
    }

    async fn list(
        &self,
        hub_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> DispatchResult<Vec<HistoryEvent>> {
        let mut events: Vec<HistoryEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.hub_id == hub_id && e.occurred_at >= from && e.occurred_at < to)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(events
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(
        &self,
        hub_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DispatchResult<i64> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.hub_id == hub_id && e.occurred_at >= from && e.occurred_at < to)
            .count() as i64)
    }

    async fn daily_stats(&self, hub_id: i64, date: NaiveDate) -> DispatchResult<DailyStats> {
        let (from, to) = Self::day_bounds(date);
        let events = self.events.lock().unwrap();
        let day: Vec<&HistoryEvent> = events
            .iter()
            .filter(|e| e.hub_id == hub_id && e.occurred_at >= from && e.occurred_at < to)
            .collect();

        let count = |action: HistoryAction| day.iter().filter(|e| e.action == action).count() as i64;
        let avg = |values: Vec<i64>| {
            if values.is_empty() {
                None
            } else {
                Some(values.iter().sum::<i64>() as f64 / values.len() as f64)
            }
        };

        let waits: Vec<i64> = day
            .iter()
            .filter(|e| {
                matches!(
                    e.action,
                    HistoryAction::Dispatched | HistoryAction::DispatchedSingleRide
                )
            })
            .filter_map(|e| e.wait_minutes)
            .collect();
        let routes: Vec<i64> = day
            .iter()
            .filter(|e| {
                matches!(
                    e.action,
                    HistoryAction::Return | HistoryAction::PriorityReturn
                )
            })
            .filter_map(|e| e.en_route_minutes)
            .collect();

        Ok(DailyStats {
            hub_id,
            date,
            entrances: count(HistoryAction::Entrance),
            dispatches: count(HistoryAction::Dispatched),
            single_ride_dispatches: count(HistoryAction::DispatchedSingleRide),
            returns: count(HistoryAction::Return),
            priority_returns: count(HistoryAction::PriorityReturn),
            removals: count(HistoryAction::Removed),
            voluntary_exits: count(HistoryAction::VoluntaryExit),
            avg_wait_minutes: avg(waits),
            avg_en_route_minutes: avg(routes),
        })
    }

    async fn ranking(
        &self,
        hub_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DispatchResult<Vec<ProfessionalRanking>> {
        let events = self.events.lock().unwrap();
        let mut by_professional: HashMap<String, (String, Vec<i64>, i64)> = HashMap::new();
        for event in events.iter().filter(|e| {
            e.hub_id == hub_id
                && e.occurred_at >= from
                && e.occurred_at < to
                && matches!(
                    e.action,
                    HistoryAction::Dispatched | HistoryAction::DispatchedSingleRide
                )
        }) {
            let slot = by_professional
                .entry(event.professional_id.clone())
                .or_insert_with(|| (event.display_name.clone(), Vec::new(), 0));
            slot.2 += 1;
            if let Some(wait) = event.wait_minutes {
                slot.1.push(wait);
            }
        }

        let mut ranking: Vec<ProfessionalRanking> = by_professional
            .into_iter()
            .map(|(professional_id, (display_name, waits, dispatches))| ProfessionalRanking {
                professional_id,
                display_name,
                dispatches,
                avg_wait_minutes: if waits.is_empty() {
                    None
                } else {
                    Some(waits.iter().sum::<i64>() as f64 / waits.len() as f64)
                },
            })
            .collect();
        ranking.sort_by(|a, b| b.dispatches.cmp(&a.dispatches));
        Ok(ranking)
    }

    async fn hourly_distribution(
        &self,
        hub_id: i64,
        date: NaiveDate,
    ) -> DispatchResult<Vec<HourlyCount>> {
        use chrono::Timelike;

        let (from, to) = Self::day_bounds(date);
        let events = self.events.lock().unwrap();
        let mut buckets: HashMap<u32, i64> = HashMap::new();
        for event in events.iter().filter(|e| {
            e.hub_id == hub_id
                && e.occurred_at >= from
                && e.occurred_at < to
                && e.action == HistoryAction::Entrance
        }) {
            *buckets.entry(event.occurred_at.hour()).or_insert(0) += 1;
        }

        let mut distribution: Vec<HourlyCount> = buckets
            .into_iter()
            .map(|(hour, entrances)| HourlyCount { hour, entrances })
            .collect();
        distribution.sort_by_key(|h| h.hour);
        Ok(distribution)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockNotificationRepository {
    notifications: Arc<Mutex<HashMap<String, Notification>>>,
    next_id: Arc<Mutex<i64>>,
}

impl MockNotificationRepository {
    pub fn new() -> Self {
        Self {
            notifications: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    pub fn pending_count(&self) -> usize {
        self.notifications
            .lock()
            .unwrap()
            .values()
            .filter(|n| !n.read)
            .count()
    }
}

#[async_trait]
impl NotificationRepository for MockNotificationRepository {
    async fn upsert(&self, notification: &NewNotification) -> DispatchResult<Notification> {
        let mut notifications = self.notifications.lock().unwrap();
        let mut next_id = self.next_id.lock().unwrap();

        let stored = Notification {
            id: *next_id,
            professional_id: notification.professional_id.clone(),
            kind: notification.kind,
            message: notification.message.clone(),
            payload: notification.payload.clone(),
            read: false,
            created_at: Utc::now(),
        };
        *next_id += 1;
        notifications.insert(notification.professional_id.clone(), stored.clone());
        Ok(stored)
    }

    async fn drain(&self, professional_id: &str) -> DispatchResult<Option<Notification>> {
        let mut notifications = self.notifications.lock().unwrap();
        match notifications.get_mut(professional_id) {
            Some(notification) if !notification.read => {
                notification.read = true;
                Ok(Some(notification.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn ack(&self, professional_id: &str) -> DispatchResult<bool> {
        let mut notifications = self.notifications.lock().unwrap();
        match notifications.get_mut(professional_id) {
            Some(notification) if !notification.read => {
                notification.read = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_pending(&self, professional_id: &str) -> DispatchResult<Option<Notification>> {
        Ok(self
            .notifications
            .lock()
            .unwrap()
            .get(professional_id)
            .filter(|n| !n.read)
            .cloned())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockAuditSink {
    records: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<(String, String)> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for MockAuditSink {
    async fn record(
        &self,
        action: &str,
        _category: &str,
        _entity_type: &str,
        entity_id: &str,
        _metadata: serde_json::Value,
    ) {
        self.records
            .lock()
            .unwrap()
            .push((action.to_string(), entity_id.to_string()));
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockEventPublisher {
    events: Arc<Mutex<Vec<QueueEvent>>>,
}

impl MockEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<QueueEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl QueueEventPublisher for MockEventPublisher {
    fn publish(&self, event: QueueEvent) {
        self.events.lock().unwrap().push(event);
    }
}
