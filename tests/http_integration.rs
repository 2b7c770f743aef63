// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP transport using wiremock.

use std::sync::Arc;
use std::time::Duration;

use atag_lib::settings::ConnectionSettings;
use atag_lib::types::{AuthorizationStatus, PollInterval};
use atag_lib::{ChangeEvent, Device, Endpoint, ErrorKind, HttpConfig, HttpTransport, Poller, Transport};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings() -> ConnectionSettings {
    ConnectionSettings::new("127.0.0.1", "aa:bb:cc:dd:ee:ff")
        .with_display_name("Integration")
        .with_account_email("owner@example.com")
}

fn device_for(server: &MockServer) -> Device<HttpTransport> {
    Device::http(settings())
        .with_port(server.address().port())
        .with_timeout(Duration::from_millis(500))
        .build()
        .unwrap()
}

fn retrieve_body(room: f64, target: f64, pressure: f64, boiler: u64) -> serde_json::Value {
    json!({
        "retrieve_reply": {
            "seqnr": 0,
            "acc_status": 2,
            "status": {"device_id": "6808-1401-3109_15-30-001-544"},
            "report": {
                "room_temp": room,
                "outside_temp": 7.5,
                "ch_water_pres": pressure,
                "boiler_status": boiler
            },
            "control": {"ch_mode_temp": target}
        }
    })
}

// ============================================================================
// HttpTransport Tests
// ============================================================================

mod transport {
    use super::*;

    #[tokio::test]
    async fn posts_json_to_endpoint_path() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/retrieve"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(json!({"retrieve_message": {"info": 16}})))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"retrieve_reply":{}}"#))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpConfig::new()
            .with_port(server.address().port())
            .into_transport()
            .unwrap();
        let body = json!({"retrieve_message": {"seqnr": 0, "info": 16}}).to_string();

        let reply = transport
            .post("127.0.0.1", Endpoint::Retrieve, body)
            .await
            .unwrap();
        assert_eq!(reply.body(), r#"{"retrieve_reply":{}}"#);
    }

    #[tokio::test]
    async fn server_error_is_connection_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = device_for(&server).get_data().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConnectionFailed);
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn slow_device_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/retrieve"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(retrieve_body(20.0, 21.0, 1.5, 0))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = device_for(&server).get_data().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn unreachable_device_fails_to_connect() {
        let device = Device::http(settings())
            .with_port(1)
            .with_timeout(Duration::from_millis(500))
            .build()
            .unwrap();

        let err = device.get_data().await.unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ConnectionFailed | ErrorKind::Timeout));
        assert!(!device.test_connection().await);
    }
}

// ============================================================================
// Device Tests
// ============================================================================

mod device {
    use super::*;

    #[tokio::test]
    async fn get_data_builds_snapshot() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/retrieve"))
            .and(body_partial_json(json!({
                "retrieve_message": {
                    "info": 25,
                    "account_auth": {
                        "user_account": "owner@example.com",
                        "mac_address": "AABBCCDDEEFF"
                    }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(retrieve_body(20.7, 21.0, 1.6, 12)))
            .expect(1)
            .mount(&server)
            .await;

        let snapshot = device_for(&server).get_data().await.unwrap();

        assert_eq!(snapshot.identifier(), "6808-1401-3109_15-30-001-544");
        assert_eq!(snapshot.room_temperature(), 20.7);
        assert_eq!(snapshot.target_temperature(), 21.0);
        assert_eq!(snapshot.outside_temperature(), Some(7.5));
        assert_eq!(snapshot.pressure(), 1.6);
        assert!(snapshot.is_heating());
        assert!(snapshot.is_hot_water_active());
        assert!(snapshot.is_flame_on());
    }

    #[tokio::test]
    async fn set_target_temperature_sends_clamped_value() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/update"))
            .and(body_partial_json(json!({"update_message": {"control": {"ch_mode_temp": 4.0}}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "update_reply": {"seqnr": 0, "acc_status": 2}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let applied = device_for(&server).set_target_temperature(-3.0).await.unwrap();
        assert_eq!(applied.celsius(), 4.0);
    }

    #[tokio::test]
    async fn denied_retrieve_is_distinguishable_from_network_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/retrieve"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "retrieve_reply": {"seqnr": 0, "acc_status": 3}
            })))
            .mount(&server)
            .await;

        let err = device_for(&server).get_data().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthorizationDenied);
        assert!(err.is_authorization());
        assert!(!err.is_transport());
        assert!(err.hint().contains("Pair it again"));
    }

    #[tokio::test]
    async fn non_json_reply_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>Busy</html>"))
            .mount(&server)
            .await;

        let err = device_for(&server).get_data().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedReply);
    }

    #[tokio::test]
    async fn wrong_envelope_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/update"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"pair_reply": {}})))
            .mount(&server)
            .await;

        let err = device_for(&server)
            .set_target_temperature(20.0)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedReply);
    }

    #[tokio::test]
    async fn pairing_flow() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/pair_message"))
            .and(body_partial_json(json!({
                "pair_message": {
                    "accounts": {
                        "entries": [{
                            "user_account": "owner@example.com",
                            "mac_address": "AABBCCDDEEFF",
                            "device_name": "Integration",
                            "account_type": 0
                        }]
                    }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pair_reply": {"seqnr": 0, "acc_status": 1}
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/pair_message"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pair_reply": {"seqnr": 1, "acc_status": 2}
            })))
            .mount(&server)
            .await;

        let device = device_for(&server);
        let policy = atag_lib::PairingPolicy::new(5, Duration::from_millis(10));

        let mut seen = Vec::new();
        let status = device
            .await_pairing_with(&policy, |s| seen.push(s))
            .await
            .unwrap();

        assert_eq!(status, AuthorizationStatus::Granted);
        assert_eq!(seen, vec![AuthorizationStatus::Pending, AuthorizationStatus::Granted]);
    }

    #[tokio::test]
    async fn test_connection_uses_status_only_retrieve() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/retrieve"))
            .and(body_partial_json(json!({"retrieve_message": {"info": 16}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "retrieve_reply": {"seqnr": 0, "acc_status": 2, "status": {"device_id": "X"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        assert!(device_for(&server).test_connection().await);
    }
}

// ============================================================================
// Poller Tests
// ============================================================================

mod poller {
    use super::*;
    use atag_lib::Subscribable;
    use parking_lot::Mutex;

    #[tokio::test]
    async fn consecutive_polls_emit_changes() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/retrieve"))
            .respond_with(ResponseTemplate::new(200).set_body_json(retrieve_body(20.0, 21.0, 1.5, 0)))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/retrieve"))
            .respond_with(ResponseTemplate::new(200).set_body_json(retrieve_body(20.5, 21.0, 0.8, 8)))
            .mount(&server)
            .await;

        let poller = Poller::new(Arc::new(device_for(&server)), PollInterval::DEFAULT);
        let low = Arc::new(Mutex::new(Vec::new()));
        let sink = low.clone();
        poller.on_pressure_below(1.0, move |bar| sink.lock().push(bar));

        let first = poller.poll_once().await.unwrap();
        assert!(first.changes.is_empty());

        let second = poller.poll_once().await.unwrap();
        assert_eq!(
            second.changes,
            vec![
                ChangeEvent::RoomTemperatureChanged(20.5),
                ChangeEvent::PressureChanged(0.8),
                ChangeEvent::PressureBelowThreshold(0.8),
                ChangeEvent::BoilerStarted,
            ]
        );
        assert_eq!(*low.lock(), vec![0.8]);
    }
}
