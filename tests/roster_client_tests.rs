//! Roster endpoint client tests against a wiremock server.

use assignflow::roster::{GradeLevel, HttpRosterClient, RosterApi, RosterError};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HttpRosterClient {
    HttpRosterClient::new(reqwest::Client::new(), server.uri())
}

#[tokio::test]
async fn fetches_and_decodes_roster() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/materials-roster"))
        .and(query_param("class", "6th std"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "s1", "name": "Asha", "class": "6th std"},
            {"id": "s2", "name": "Binu", "class": "6th std"},
            {"id": "s3", "name": "Charu", "class": "6th std"},
        ])))
        .mount(&server)
        .await;

    let roster = client(&server)
        .fetch_roster(GradeLevel::Std6)
        .await
        .unwrap();
    assert_eq!(roster.len(), 3);
    assert_eq!(roster[0].id, "s1");
    assert_eq!(roster[2].name, "Charu");
}

#[tokio::test]
async fn empty_roster_is_a_valid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/materials-roster"))
        .and(query_param("class", "4th std"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let roster = client(&server)
        .fetch_roster(GradeLevel::Std4)
        .await
        .unwrap();
    assert!(roster.is_empty());
}

#[tokio::test]
async fn server_failure_maps_to_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/materials-roster"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_roster(GradeLevel::Std6)
        .await
        .unwrap_err();
    assert!(matches!(err, RosterError::Status { status: 500 }));
}

#[tokio::test]
async fn malformed_body_maps_to_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/materials-roster"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_roster(GradeLevel::Std6)
        .await
        .unwrap_err();
    assert!(matches!(err, RosterError::Decode { .. }));
}

#[tokio::test]
async fn records_without_ids_are_rejected_at_the_boundary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/materials-roster"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "s1", "name": "Asha", "class": "6th std"},
            {"id": "", "name": "Nameless", "class": "6th std"},
        ])))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_roster(GradeLevel::Std6)
        .await
        .unwrap_err();
    assert!(matches!(err, RosterError::InvalidRecord { index: 1 }));
}
