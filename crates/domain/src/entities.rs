use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{Coordinates, NotificationPayload};

/// Physical staging location professionals check in to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hub {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Hub {
    pub fn center(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
    pub fn entity_description(&self) -> String {
        format!("central '{}' (ID: {})", self.name, self.id)
    }
}

/// Fields accepted when creating a hub; id and timestamps come from the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewHub {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    pub active: bool,
}

/// Assignment of a professional to exactly one hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Binding {
    pub id: i64,
    pub hub_id: i64,
    pub professional_id: String,
    pub display_name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBinding {
    pub hub_id: i64,
    pub professional_id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EntryStatus {
    #[serde(rename = "WAITING")]
    Waiting,
    #[serde(rename = "EN_ROUTE")]
    EnRoute,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Waiting => "WAITING",
            EntryStatus::EnRoute => "EN_ROUTE",
        }
    }
}

impl sqlx::Type<sqlx::Sqlite> for EntryStatus {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for EntryStatus {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        match s {
            "WAITING" => Ok(EntryStatus::Waiting),
            "EN_ROUTE" => Ok(EntryStatus::EnRoute),
            _ => Err(format!("Invalid entry status: {s}").into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for EntryStatus {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_str(), buf)
    }
}

pub const POSITION_REASON_MOVED_TO_BACK: &str = "movido_ultimo";

/// A professional's live state within a hub's queue.
///
/// Invariants enforced by the queue engine:
/// - at most one entry per professional, regardless of status;
/// - `position` is Some iff status is WAITING;
/// - waiting positions per hub are exactly the contiguous range 1..=N;
/// - `single_ride` / `original_position` only carry meaning while EN_ROUTE.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: i64,
    pub hub_id: i64,
    pub professional_id: String,
    pub display_name: String,
    pub status: EntryStatus,
    pub position: Option<i32>,
    pub entered_at: DateTime<Utc>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub checkin_latitude: f64,
    pub checkin_longitude: f64,
    pub single_ride: bool,
    pub original_position: Option<i32>,
    pub position_reason: Option<String>,
}

impl QueueEntry {
    pub fn is_waiting(&self) -> bool {
        matches!(self.status, EntryStatus::Waiting)
    }
    pub fn is_en_route(&self) -> bool {
        matches!(self.status, EntryStatus::EnRoute)
    }
    pub fn checkin(&self) -> Coordinates {
        Coordinates {
            latitude: self.checkin_latitude,
            longitude: self.checkin_longitude,
        }
    }
    /// Minutes waited since the entry last became WAITING.
    pub fn wait_minutes(&self, now: DateTime<Utc>) -> i64 {
        let since = self.returned_at.unwrap_or(self.entered_at);
        (now - since).num_minutes()
    }
    /// Minutes on route since dispatch; None while waiting.
    pub fn en_route_minutes(&self, now: DateTime<Utc>) -> Option<i64> {
        self.dispatched_at
            .filter(|_| self.is_en_route())
            .map(|dispatched| (now - dispatched).num_minutes())
    }
    pub fn entity_description(&self) -> String {
        match self.position {
            Some(position) => format!(
                "posição {} de {} na central {}",
                position, self.professional_id, self.hub_id
            ),
            None => format!(
                "{} em rota pela central {}",
                self.professional_id, self.hub_id
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewQueueEntry {
    pub hub_id: i64,
    pub professional_id: String,
    pub display_name: String,
    pub checkin: Coordinates,
    pub entered_at: DateTime<Utc>,
}

/// Queue transition labels, persisted with the wire values used by the
/// dispatch product since its first release.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HistoryAction {
    #[serde(rename = "entrada")]
    Entrance,
    #[serde(rename = "retorno")]
    Return,
    #[serde(rename = "retorno_prioridade")]
    PriorityReturn,
    #[serde(rename = "enviado_rota")]
    Dispatched,
    #[serde(rename = "enviado_rota_unica")]
    DispatchedSingleRide,
    #[serde(rename = "movido_ultimo")]
    MovedToBack,
    #[serde(rename = "removido")]
    Removed,
    #[serde(rename = "saida_voluntaria")]
    VoluntaryExit,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryAction::Entrance => "entrada",
            HistoryAction::Return => "retorno",
            HistoryAction::PriorityReturn => "retorno_prioridade",
            HistoryAction::Dispatched => "enviado_rota",
            HistoryAction::DispatchedSingleRide => "enviado_rota_unica",
            HistoryAction::MovedToBack => "movido_ultimo",
            HistoryAction::Removed => "removido",
            HistoryAction::VoluntaryExit => "saida_voluntaria",
        }
    }
}

impl sqlx::Type<sqlx::Sqlite> for HistoryAction {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for HistoryAction {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        match s {
            "entrada" => Ok(HistoryAction::Entrance),
            "retorno" => Ok(HistoryAction::Return),
            "retorno_prioridade" => Ok(HistoryAction::PriorityReturn),
            "enviado_rota" => Ok(HistoryAction::Dispatched),
            "enviado_rota_unica" => Ok(HistoryAction::DispatchedSingleRide),
            "movido_ultimo" => Ok(HistoryAction::MovedToBack),
            "removido" => Ok(HistoryAction::Removed),
            "saida_voluntaria" => Ok(HistoryAction::VoluntaryExit),
            _ => Err(format!("Invalid history action: {s}").into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for HistoryAction {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_str(), buf)
    }
}

/// Append-only ledger row recording one queue transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub id: i64,
    pub hub_id: i64,
    pub hub_name: String,
    pub professional_id: String,
    pub display_name: String,
    pub action: HistoryAction,
    pub wait_minutes: Option<i64>,
    pub en_route_minutes: Option<i64>,
    pub note: Option<String>,
    pub admin_id: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewHistoryEvent {
    pub hub_id: i64,
    pub hub_name: String,
    pub professional_id: String,
    pub display_name: String,
    pub action: HistoryAction,
    pub wait_minutes: Option<i64>,
    pub en_route_minutes: Option<i64>,
    pub note: Option<String>,
    pub admin_id: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotificationKind {
    #[serde(rename = "roteiro_despachado")]
    RouteDispatched,
    #[serde(rename = "corrida_unica")]
    SingleRide,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::RouteDispatched => "roteiro_despachado",
            NotificationKind::SingleRide => "corrida_unica",
        }
    }
}

impl sqlx::Type<sqlx::Sqlite> for NotificationKind {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for NotificationKind {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        match s {
            "roteiro_despachado" => Ok(NotificationKind::RouteDispatched),
            "corrida_unica" => Ok(NotificationKind::SingleRide),
            _ => Err(format!("Invalid notification kind: {s}").into()),
        }
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for NotificationKind {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_str(), buf)
    }
}

/// Mailbox row: at most one per professional, latest write wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub professional_id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub payload: NotificationPayload,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub professional_id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub payload: NotificationPayload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(status: EntryStatus, position: Option<i32>) -> QueueEntry {
        QueueEntry {
            id: 1,
            hub_id: 10,
            professional_id: "prof-1".to_string(),
            display_name: "Ana".to_string(),
            status,
            position,
            entered_at: Utc::now() - Duration::minutes(30),
            dispatched_at: None,
            returned_at: None,
            checkin_latitude: -23.55,
            checkin_longitude: -46.63,
            single_ride: false,
            original_position: None,
            position_reason: None,
        }
    }

    #[test]
    fn test_wait_minutes_counts_from_last_waiting_transition() {
        let mut e = entry(EntryStatus::Waiting, Some(1));
        let now = Utc::now();
        assert_eq!(e.wait_minutes(now), 30);

        // After a return, waiting time restarts at returned_at.
        e.returned_at = Some(now - Duration::minutes(5));
        assert_eq!(e.wait_minutes(now), 5);
    }

    #[test]
    fn test_en_route_minutes_requires_dispatch() {
        let now = Utc::now();
        let mut e = entry(EntryStatus::EnRoute, None);
        assert_eq!(e.en_route_minutes(now), None);

        e.dispatched_at = Some(now - Duration::minutes(95));
        assert_eq!(e.en_route_minutes(now), Some(95));

        e.status = EntryStatus::Waiting;
        assert_eq!(e.en_route_minutes(now), None);
    }

    #[test]
    fn test_history_action_wire_values() {
        assert_eq!(HistoryAction::Entrance.as_str(), "entrada");
        assert_eq!(HistoryAction::PriorityReturn.as_str(), "retorno_prioridade");
        assert_eq!(
            HistoryAction::DispatchedSingleRide.as_str(),
            "enviado_rota_unica"
        );
        assert_eq!(HistoryAction::VoluntaryExit.as_str(), "saida_voluntaria");

        let json = serde_json::to_string(&HistoryAction::MovedToBack).unwrap();
        assert_eq!(json, "\"movido_ultimo\"");
    }

    #[test]
    fn test_notification_kind_wire_values() {
        assert_eq!(NotificationKind::RouteDispatched.as_str(), "roteiro_despachado");
        assert_eq!(NotificationKind::SingleRide.as_str(), "corrida_unica");
    }
}
