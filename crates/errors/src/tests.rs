#[cfg(test)]
mod error_tests {
    use crate::*;

    #[test]
    fn test_dispatch_error_display() {
        let db_op_error = DispatchError::DatabaseOperation("connection refused".to_string());
        assert_eq!(
            db_op_error.to_string(),
            "database operation failed: connection refused"
        );

        let hub_error = DispatchError::HubNotFound { id: 42 };
        assert_eq!(hub_error.to_string(), "hub not found: 42");

        let bound_error = DispatchError::AlreadyBound {
            professional_id: "prof-1".to_string(),
            hub_id: 7,
        };
        assert_eq!(
            bound_error.to_string(),
            "professional prof-1 is already bound to hub 7"
        );

        let distance_error = DispatchError::DistanceExceeded {
            distance_meters: 1000.4,
            allowed_radius_meters: 900.0,
        };
        assert_eq!(
            distance_error.to_string(),
            "check-in at 1000m exceeds the hub radius of 900m"
        );

        let queue_error = DispatchError::AlreadyInQueue {
            professional_id: "prof-1".to_string(),
            position: 3,
        };
        assert_eq!(
            queue_error.to_string(),
            "professional prof-1 is already waiting at position 3"
        );
    }

    #[test]
    fn test_error_kinds_are_stable() {
        let cases = vec![
            (
                DispatchError::Validation("bad coords".to_string()),
                "VALIDATION",
            ),
            (
                DispatchError::NotBound {
                    professional_id: "p".to_string(),
                },
                "NOT_BOUND",
            ),
            (
                DispatchError::AlreadyBound {
                    professional_id: "p".to_string(),
                    hub_id: 1,
                },
                "ALREADY_BOUND",
            ),
            (
                DispatchError::DistanceExceeded {
                    distance_meters: 1200.0,
                    allowed_radius_meters: 800.0,
                },
                "DISTANCE_EXCEEDED",
            ),
            (
                DispatchError::AlreadyInQueue {
                    professional_id: "p".to_string(),
                    position: 1,
                },
                "ALREADY_IN_QUEUE",
            ),
            (
                DispatchError::NotInQueue {
                    professional_id: "p".to_string(),
                },
                "NOT_IN_QUEUE",
            ),
            (
                DispatchError::HubHasActiveEntries {
                    hub_id: 1,
                    entries: 4,
                },
                "HUB_HAS_ACTIVE_ENTRIES",
            ),
            (
                DispatchError::PermissionDenied {
                    action: "dispatch".to_string(),
                },
                "PERMISSION_DENIED",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.kind(), expected);
        }
    }

    #[test]
    fn test_constructor_helpers() {
        match DispatchError::not_bound("prof-9") {
            DispatchError::NotBound { professional_id } => {
                assert_eq!(professional_id, "prof-9");
            }
            other => panic!("unexpected variant: {other:?}"),
        }

        match DispatchError::permission_denied("remove_from_queue") {
            DispatchError::PermissionDenied { action } => {
                assert_eq!(action, "remove_from_queue");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_retryable_classification() {
        assert!(DispatchError::DatabaseOperation("timeout".to_string()).is_retryable());
        assert!(!DispatchError::not_in_queue("p").is_retryable());
        assert!(!DispatchError::Validation("x".to_string()).is_retryable());
    }

    #[test]
    fn test_user_messages_are_specific() {
        let error = DispatchError::DistanceExceeded {
            distance_meters: 1000.0,
            allowed_radius_meters: 900.0,
        };
        assert_eq!(
            error.user_message(),
            "Você está fora do raio de entrada da central"
        );

        let error = DispatchError::not_bound("p");
        assert_eq!(
            error.user_message(),
            "Profissional não está vinculado a nenhuma central"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
        let error: DispatchError = json_error.into();
        assert!(matches!(error, DispatchError::Serialization(_)));
    }

    #[test]
    fn test_from_anyhow_error() {
        let error: DispatchError = anyhow::anyhow!("wiring failed").into();
        match error {
            DispatchError::Internal(msg) => assert_eq!(msg, "wiring failed"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
