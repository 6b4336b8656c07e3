use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use despacho_errors::DispatchError;
use serde_json::{json, Value};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("missing or malformed identity headers")]
    MissingIdentity,

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Numeric context carried next to the error so callers don't have to
    /// parse messages: measured distance, allowed radius, conflicting hub.
    fn details(&self) -> Value {
        match self {
            ApiError::Dispatch(DispatchError::DistanceExceeded {
                distance_meters,
                allowed_radius_meters,
            }) => json!({
                "distance_meters": distance_meters,
                "allowed_radius_meters": allowed_radius_meters,
            }),
            ApiError::Dispatch(DispatchError::AlreadyBound { hub_id, .. }) => {
                json!({ "bound_hub_id": hub_id })
            }
            ApiError::Dispatch(DispatchError::AlreadyInQueue { position, .. }) => {
                json!({ "position": position })
            }
            ApiError::Dispatch(DispatchError::HubHasActiveEntries { entries, .. }) => {
                json!({ "entries": entries })
            }
            _ => json!({}),
        }
    }

    fn status(&self) -> StatusCode {
        let kind = match self {
            ApiError::Dispatch(error) => error.kind(),
            ApiError::MissingIdentity => return StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => return StatusCode::BAD_REQUEST,
        };
        match kind {
            "VALIDATION" | "SERIALIZATION_ERROR" => StatusCode::BAD_REQUEST,
            "PERMISSION_DENIED" => StatusCode::FORBIDDEN,
            "HUB_NOT_FOUND" | "NOT_IN_QUEUE" => StatusCode::NOT_FOUND,
            "NOT_BOUND" | "ALREADY_BOUND" | "ALREADY_IN_QUEUE" | "HUB_HAS_ACTIVE_ENTRIES" => {
                StatusCode::CONFLICT
            }
            "DISTANCE_EXCEEDED" => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::Dispatch(error) => error.kind(),
            ApiError::MissingIdentity => "MISSING_IDENTITY",
            ApiError::BadRequest(_) => "BAD_REQUEST",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Dispatch(error) => error.user_message().to_string(),
            ApiError::MissingIdentity => {
                "Requisição sem contexto de identidade válido".to_string()
            }
            ApiError::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "error": {
                "message": self.message(),
                "type": self.error_type(),
                "code": status.as_u16(),
                "details": self.details(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_maps_to_expected_status_codes() {
        let cases = vec![
            (
                DispatchError::Validation("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                DispatchError::not_bound("p"),
                StatusCode::CONFLICT,
            ),
            (
                DispatchError::AlreadyBound {
                    professional_id: "p".to_string(),
                    hub_id: 1,
                },
                StatusCode::CONFLICT,
            ),
            (
                DispatchError::DistanceExceeded {
                    distance_meters: 1000.0,
                    allowed_radius_meters: 900.0,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                DispatchError::AlreadyInQueue {
                    professional_id: "p".to_string(),
                    position: 2,
                },
                StatusCode::CONFLICT,
            ),
            (
                DispatchError::not_in_queue("p"),
                StatusCode::NOT_FOUND,
            ),
            (
                DispatchError::HubHasActiveEntries {
                    hub_id: 1,
                    entries: 3,
                },
                StatusCode::CONFLICT,
            ),
            (
                DispatchError::permission_denied("dispatch_professional"),
                StatusCode::FORBIDDEN,
            ),
            (
                DispatchError::hub_not_found(9),
                StatusCode::NOT_FOUND,
            ),
            (
                DispatchError::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            let api_error = ApiError::from(error);
            assert_eq!(api_error.status(), expected, "{}", api_error.error_type());
        }
    }

    #[test]
    fn test_distance_exceeded_carries_numeric_context() {
        let api_error = ApiError::from(DispatchError::DistanceExceeded {
            distance_meters: 1000.4,
            allowed_radius_meters: 900.0,
        });
        let details = api_error.details();
        assert_eq!(details["distance_meters"], 1000.4);
        assert_eq!(details["allowed_radius_meters"], 900.0);
    }

    #[test]
    fn test_already_bound_reports_conflicting_hub() {
        let api_error = ApiError::from(DispatchError::AlreadyBound {
            professional_id: "p".to_string(),
            hub_id: 42,
        });
        assert_eq!(api_error.details()["bound_hub_id"], 42);
    }

    #[test]
    fn test_missing_identity_is_unauthorized() {
        let response = ApiError::MissingIdentity.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
