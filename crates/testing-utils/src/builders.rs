//! Fluent builders for test fixtures.

use chrono::{DateTime, Utc};
use despacho_domain::entities::{Binding, EntryStatus, Hub, QueueEntry};

pub struct HubBuilder {
    hub: Hub,
}

impl HubBuilder {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            hub: Hub {
                id: 1,
                name: "Central Teste".to_string(),
                address: "Rua de Teste, 1".to_string(),
                latitude: -23.5505,
                longitude: -46.6333,
                radius_meters: 900.0,
                active: true,
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.hub.id = id;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.hub.name = name.to_string();
        self
    }

    pub fn with_center(mut self, latitude: f64, longitude: f64) -> Self {
        self.hub.latitude = latitude;
        self.hub.longitude = longitude;
        self
    }

    pub fn with_radius(mut self, radius_meters: f64) -> Self {
        self.hub.radius_meters = radius_meters;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.hub.active = false;
        self
    }

    pub fn build(self) -> Hub {
        self.hub
    }
}

impl Default for HubBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct BindingBuilder {
    binding: Binding,
}

impl BindingBuilder {
    pub fn new() -> Self {
        Self {
            binding: Binding {
                id: 1,
                hub_id: 1,
                professional_id: "prof-1".to_string(),
                display_name: "Profissional 1".to_string(),
                active: true,
                created_at: Utc::now(),
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.binding.id = id;
        self
    }

    pub fn with_hub(mut self, hub_id: i64) -> Self {
        self.binding.hub_id = hub_id;
        self
    }

    pub fn with_professional(mut self, professional_id: &str) -> Self {
        self.binding.professional_id = professional_id.to_string();
        self.binding.display_name = professional_id.to_uppercase();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.binding.active = false;
        self
    }

    pub fn build(self) -> Binding {
        self.binding
    }
}

impl Default for BindingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct QueueEntryBuilder {
    entry: QueueEntry,
}

impl QueueEntryBuilder {
    pub fn new() -> Self {
        Self {
            entry: QueueEntry {
                id: 1,
                hub_id: 1,
                professional_id: "prof-1".to_string(),
                display_name: "Profissional 1".to_string(),
                status: EntryStatus::Waiting,
                position: Some(1),
                entered_at: Utc::now(),
                dispatched_at: None,
                returned_at: None,
                checkin_latitude: -23.5505,
                checkin_longitude: -46.6333,
                single_ride: false,
                original_position: None,
                position_reason: None,
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.entry.id = id;
        self
    }

    pub fn with_hub(mut self, hub_id: i64) -> Self {
        self.entry.hub_id = hub_id;
        self
    }

    pub fn with_professional(mut self, professional_id: &str) -> Self {
        self.entry.professional_id = professional_id.to_string();
        self.entry.display_name = professional_id.to_uppercase();
        self
    }

    pub fn at_position(mut self, position: i32) -> Self {
        self.entry.status = EntryStatus::Waiting;
        self.entry.position = Some(position);
        self
    }

    pub fn entered_at(mut self, entered_at: DateTime<Utc>) -> Self {
        self.entry.entered_at = entered_at;
        self
    }

    pub fn en_route(mut self, dispatched_at: DateTime<Utc>) -> Self {
        self.entry.status = EntryStatus::EnRoute;
        self.entry.position = None;
        self.entry.dispatched_at = Some(dispatched_at);
        self
    }

    pub fn single_ride(mut self, original_position: i32) -> Self {
        self.entry.single_ride = true;
        self.entry.original_position = Some(original_position);
        self
    }

    pub fn build(self) -> QueueEntry {
        self.entry
    }
}

impl Default for QueueEntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
