//! Power station API Library
//!
//! This library provides the HTTP surface through which telemetry is pushed
//! into a power station model and its derived state is read back.

mod output;
mod station;

use axum::{
    Router,
    routing::{get, post},
};
use pps_core::StationState;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower_http::trace::TraceLayer;

pub type SharedState = Arc<Mutex<StationState>>;

/// Every model operation leaves the station consistent, so a poisoned lock
/// still guards valid state.
pub(crate) fn lock_state(app_state: &SharedState) -> MutexGuard<'_, StationState> {
    app_state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Create the application router with all endpoints
pub fn create_app(app_state: StationState) -> Router {
    let shared_state = Arc::new(Mutex::new(app_state));
    Router::new()
        .route("/health", get(health_check))
        .route("/station/config", get(station::get_station_config))
        .route("/station/status", get(station::get_station_status))
        .route("/station/input", post(station::apply_input))
        .route("/station/battery", post(station::set_battery_charge))
        .route("/station/commands", post(station::apply_commands))
        .route("/outputs/{output_id}/connect", post(output::connect_output))
        .route("/outputs/{output_id}/update", post(output::update_output))
        .route(
            "/outputs/{output_id}/disconnect",
            post(output::disconnect_output),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use pps_core::{StationConfig, StationSnapshot, StationStatus};
    use tower::util::ServiceExt;

    fn test_station_config() -> StationConfig {
        StationConfig {
            station_id: "TEST_STATION".into(),
            battery_capacity_wh: 1000.0,
            maximum_input_w: 500.0,
            maximum_output_w: 500.0,
        }
    }

    async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> StationSnapshot {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let state = StationState::new(test_station_config()).unwrap();
        let app = create_app(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_integration_charging_scenario() {
        let state = StationState::new(test_station_config()).unwrap();
        let app = create_app(state);

        post_json(
            &app,
            "/station/input",
            serde_json::json!({"voltageV": 100, "currentA": 2}),
        )
        .await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/outputs/A/connect")
                    .method("POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let snapshot = post_json(
            &app,
            "/outputs/A/update",
            serde_json::json!({"voltageV": 50, "currentA": 1}),
        )
        .await;
        assert_eq!(snapshot.status, StationStatus::Charging);
        assert_eq!(snapshot.time_remaining.to_string(), "00:00");

        let snapshot = post_json(
            &app,
            "/station/battery",
            serde_json::json!({"chargeWh": 500}),
        )
        .await;
        assert_eq!(snapshot.battery_percentage, 50.0);
        assert_eq!(snapshot.time_remaining.to_string(), "03:20");
    }

    #[tokio::test]
    async fn test_integration_command_batch() {
        let state = StationState::new(test_station_config()).unwrap();
        let app = create_app(state);

        let snapshot = post_json(
            &app,
            "/station/commands",
            serde_json::json!([
                {"type": "connect_output", "outputId": "ac-1"},
                {"type": "update_output", "outputId": "ac-1", "voltageV": 230, "currentA": 1},
                {"type": "set_battery_charge", "chargeWh": 460}
            ]),
        )
        .await;

        assert_eq!(snapshot.total_output_power_w, 230.0);
        assert_eq!(snapshot.status, StationStatus::Discharging);
        assert_eq!(snapshot.time_remaining.to_string(), "02:00");
    }
}
