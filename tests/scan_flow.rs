use secrecy::Secret;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gatepass::{
    submit_scan, ApiClient, Config, Direction, FailureReason, RejectReason, ScanResult,
    ScanSession, ScanState,
};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&Config {
        api_base_url: format!("{}/api", server.uri()),
        api_token: Some(Secret::new("test-token".to_string())),
        ..Config::default()
    })
    .unwrap()
}

fn scan_success(direction: &str) -> serde_json::Value {
    json!({
        "status": "success",
        "message": "Attendance recorded",
        "data": {
            "id": 101,
            "type": direction,
            "recorded_at": "2025-03-01T07:45:00Z",
            "vehicle_registration": {
                "id": 9,
                "code": "ABC123",
                "valid_until": "2025-06-30",
                "vehicle": {
                    "id": 12,
                    "plate_number": "NBC 1234",
                    "make": "Toyota",
                    "model": "Vios"
                }
            }
        }
    })
}

#[tokio::test]
async fn test_success_appends_exactly_one_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({"code": "ABC123", "direction": "exit"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(scan_success("exit")))
        .expect(1)
        .mount(&server)
        .await;

    let session = ScanSession::new(client_for(&server), Direction::Exit);
    let result = session.on_decoded("ABC123").await.unwrap();

    match &result {
        ScanResult::Success {
            record,
            resolved_vehicle,
            message,
        } => {
            assert_eq!(record.id, 101);
            assert_eq!(record.direction, Direction::Exit);
            assert_eq!(resolved_vehicle.plate_number.as_deref(), Some("NBC 1234"));
            assert_eq!(message, "Attendance recorded");
        }
        other => panic!("expected success, got {:?}", other),
    }

    assert_eq!(session.records().len(), 1);
    assert_eq!(session.state(), ScanState::Idle);
}

#[tokio::test]
async fn test_expired_registration_is_rejected_without_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "error", "message": "expired"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = ScanSession::new(client_for(&server), Direction::Entry);
    let result = session.on_decoded("ABC123").await.unwrap();

    assert!(matches!(
        result,
        ScanResult::Rejected {
            reason: RejectReason::ExpiredRegistration,
            ..
        }
    ));
    assert_eq!(result.display_message(), "expired");
    assert!(session.records().is_empty());
    assert_eq!(session.state(), ScanState::Idle);
}

#[tokio::test]
async fn test_error_envelope_with_client_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "status": "error",
            "message": "Invalid QR code",
            "data": []
        })))
        .mount(&server)
        .await;

    let result = submit_scan(&client_for(&server), "ZZZ999", Direction::Entry).await;
    assert!(matches!(
        result,
        ScanResult::Rejected {
            reason: RejectReason::InvalidCode,
            ..
        }
    ));
}

#[tokio::test]
async fn test_unclassified_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "error", "message": "Vehicle already inside"})),
        )
        .mount(&server)
        .await;

    let result = submit_scan(&client_for(&server), "ABC123", Direction::Entry).await;
    assert!(matches!(
        result,
        ScanResult::Rejected {
            reason: RejectReason::Unknown,
            ..
        }
    ));
    assert_eq!(result.display_message(), "Vehicle already inside");
}

#[tokio::test]
async fn test_empty_code_never_calls_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scan_success("entry")))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    for code in ["", "   ", "\t\n"] {
        let result = submit_scan(&client, code, Direction::Entry).await;
        assert!(matches!(
            result,
            ScanResult::Rejected {
                reason: RejectReason::InvalidCode,
                ..
            }
        ));
        assert!(!result.display_message().is_empty());
    }
}

#[tokio::test]
async fn test_duplicate_read_while_in_flight_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(scan_success("entry"))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = ScanSession::new(client_for(&server), Direction::Entry);

    let (first, second) = tokio::join!(session.on_decoded("ABC123"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let state = session.state();
        (state, session.on_decoded("ABC123").await)
    });

    assert!(first.unwrap().is_success());
    assert_eq!(second.0, ScanState::Submitting);
    assert!(second.1.is_none());
    assert_eq!(session.records().len(), 1);
    assert_eq!(session.state(), ScanState::Idle);
}

#[tokio::test]
async fn test_scans_resume_after_resolution() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scan_success("entry")))
        .expect(2)
        .mount(&server)
        .await;

    let session = ScanSession::new(client_for(&server), Direction::Entry);
    assert!(session.on_decoded("ABC123").await.is_some());
    assert!(session.on_decoded("ABC123").await.is_some());
    assert_eq!(session.records().len(), 2);
}

#[tokio::test]
async fn test_sticky_direction_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .and(body_json(json!({"code": "ABC123", "direction": "entry"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(scan_success("entry")))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .and(body_json(json!({"code": "ABC123", "direction": "exit"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(scan_success("exit")))
        .expect(1)
        .mount(&server)
        .await;

    let session = ScanSession::new(client_for(&server), Direction::Entry);
    session.on_decoded("ABC123").await;
    session.on_decoded(" ABC123 ").await;
    session.set_direction(Direction::Exit);
    session.on_decoded("ABC123").await;

    let directions: Vec<_> = session.records().iter().map(|r| r.direction).collect();
    assert_eq!(
        directions,
        vec![Direction::Entry, Direction::Entry, Direction::Exit]
    );
}

#[tokio::test]
async fn test_operator_ack_pauses_after_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scan_success("entry")))
        .expect(1)
        .mount(&server)
        .await;

    let session =
        ScanSession::new(client_for(&server), Direction::Entry).with_operator_ack(true);

    assert!(session.on_decoded("ABC123").await.unwrap().is_success());
    assert_eq!(session.state(), ScanState::AwaitingOperatorAck);
    assert!(session.on_decoded("ABC123").await.is_none());

    assert!(session.acknowledge());
    assert_eq!(session.state(), ScanState::Idle);
    assert_eq!(session.records().len(), 1);
}

#[tokio::test]
async fn test_unauthorized_is_server_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthenticated."})))
        .mount(&server)
        .await;

    let session = ScanSession::new(client_for(&server), Direction::Entry);
    let result = session.on_decoded("ABC123").await.unwrap();

    assert!(matches!(
        result,
        ScanResult::Failure {
            reason: FailureReason::ServerError,
            ..
        }
    ));
    assert_eq!(session.state(), ScanState::Idle);
}

#[tokio::test]
async fn test_server_error_is_server_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>Server Error</html>"))
        .mount(&server)
        .await;

    let result = submit_scan(&client_for(&server), "ABC123", Direction::Exit).await;
    assert!(matches!(
        result,
        ScanResult::Failure {
            reason: FailureReason::ServerError,
            ..
        }
    ));
}

#[tokio::test]
async fn test_success_without_record_is_server_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "success", "message": "ok"})),
        )
        .mount(&server)
        .await;

    let session = ScanSession::new(client_for(&server), Direction::Entry);
    let result = session.on_decoded("ABC123").await.unwrap();

    assert!(matches!(
        result,
        ScanResult::Failure {
            reason: FailureReason::ServerError,
            ..
        }
    ));
    assert!(session.records().is_empty());
}

#[tokio::test]
async fn test_unreachable_backend_is_network_failure() {
    let client = ApiClient::new(&Config {
        api_base_url: "http://127.0.0.1:9/api".to_string(),
        request_timeout_secs: 2,
        ..Config::default()
    })
    .unwrap();

    let session = ScanSession::new(client, Direction::Entry);
    let result = session.on_decoded("ABC123").await.unwrap();

    assert!(matches!(
        result,
        ScanResult::Failure {
            reason: FailureReason::NetworkError,
            ..
        }
    ));
    assert_eq!(session.state(), ScanState::Idle);
}

#[tokio::test]
async fn test_timeout_is_network_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(scan_success("entry"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(&Config {
        api_base_url: format!("{}/api", server.uri()),
        request_timeout_secs: 1,
        ..Config::default()
    })
    .unwrap();

    let result = submit_scan(&client, "ABC123", Direction::Entry).await;
    assert!(matches!(
        result,
        ScanResult::Failure {
            reason: FailureReason::NetworkError,
            ..
        }
    ));
}

#[tokio::test]
async fn test_abandoned_submission_releases_gate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(scan_success("entry"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let session = ScanSession::new(client_for(&server), Direction::Entry);
    let outcome =
        tokio::time::timeout(Duration::from_millis(100), session.on_decoded("ABC123")).await;

    assert!(outcome.is_err());
    assert_eq!(session.state(), ScanState::Idle);
    assert!(session.records().is_empty());
}

#[tokio::test]
async fn test_untagged_not_found_is_invalid_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Registration not found"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = ScanSession::new(client_for(&server), Direction::Entry);
    let result = session.on_decoded("ABC123").await.unwrap();

    assert!(matches!(
        result,
        ScanResult::Rejected {
            reason: RejectReason::InvalidCode,
            ..
        }
    ));
    assert_eq!(result.display_message(), "Registration not found");
    assert!(session.records().is_empty());
}

#[tokio::test]
async fn test_untagged_client_error_with_data_records_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "The code is expired.",
            "data": {
                "id": 1,
                "type": "entry",
                "recorded_at": "2025-03-01T07:45:00Z"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = ScanSession::new(client_for(&server), Direction::Entry);
    let result = session.on_decoded("ABC123").await.unwrap();

    assert!(!result.is_success());
    assert!(matches!(
        result,
        ScanResult::Rejected {
            reason: RejectReason::ExpiredRegistration,
            ..
        }
    ));
    assert!(session.records().is_empty());
}
