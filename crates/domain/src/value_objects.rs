use chrono::{DateTime, Utc};
use despacho_errors::{DispatchError, DispatchResult};
use serde::{Deserialize, Serialize};

/// WGS84-style latitude/longitude pair. Construction validates ranges so the
/// geofence math never sees malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> DispatchResult<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(DispatchError::validation_error(
                "coordinates must be finite numbers",
            ));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DispatchError::validation_error(format!(
                "latitude {latitude} out of range [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(DispatchError::validation_error(format!(
                "longitude {longitude} out of range [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "professional")]
    Professional,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Professional => "professional",
        }
    }

    pub fn parse(value: &str) -> DispatchResult<Self> {
        match value {
            "admin" => Ok(Role::Admin),
            "professional" => Ok(Role::Professional),
            other => Err(DispatchError::validation_error(format!(
                "unknown role: {other}"
            ))),
        }
    }
}

/// Pre-verified identity forwarded by the authentication gateway. The core
/// trusts these fields and only consults `role` for authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorContext {
    pub professional_id: String,
    pub display_name: String,
    pub role: Role,
}

impl ActorContext {
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Outcome of a geofence evaluation; the measured distance travels with the
/// verdict so rejections can surface it.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GeofenceCheck {
    pub within: bool,
    pub distance_meters: f64,
    pub allowed_radius_meters: f64,
}

/// Typed notification payload. Stored serialized, parsed and validated on
/// read instead of being passed through as an opaque blob.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationPayload {
    pub hub_id: i64,
    pub hub_name: String,
    pub single_ride: bool,
    pub original_position: Option<i32>,
    pub dispatched_at: DateTime<Utc>,
}
