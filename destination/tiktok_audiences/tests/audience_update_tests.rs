use destinations_destination_common::config::HttpClientConfig;
use destinations_destination_common::{
    BatchDestinationAction, DestinationAction, DestinationError, HttpRequestClient, RetriableError,
};
use destinations_destination_tiktok_audiences::processor::BATCH_UPDATE_FAILED_ERROR_MESSAGE;
use destinations_destination_tiktok_audiences::{
    AudienceMembership, AudiencePayload, AudienceUpdate, TikTokAudiencesSettings,
};
use httpmock::Method::POST;
use httpmock::MockServer;
use serde_json::json;

const EMAIL_SHA256: &str = "0602ff595fbbf2d5b050a07a13b2ef944ed7c4a416657be7d744c562a597e366";
const ADVERTISING_ID: &str = "6f3b0d3e-1c2a-4c55-9b0e-6d2a3f1b9c11";
const ADVERTISING_ID_SHA256: &str =
    "cfa008c6ab816d91af948e0450cc820269f030e2fd907a537c6946616513f80d";

fn settings(server: &MockServer) -> TikTokAudiencesSettings {
    TikTokAudiencesSettings {
        advertiser_ids: vec!["7000".to_owned()],
        access_token: "my-access-token".to_owned(),
        api_base_url: server.url("/open_api/"),
        api_version: "v1.3".to_owned(),
    }
}

fn client(settings: &TikTokAudiencesSettings) -> HttpRequestClient {
    HttpRequestClient::new(&HttpClientConfig::default(), &settings.request_headers()).unwrap()
}

fn membership(email: Option<&str>, advertising_id: Option<&str>) -> AudienceMembership {
    AudienceMembership {
        selected_advertiser_id: Some("7000".to_owned()),
        audience_id: "audience-1".to_owned(),
        email: email.map(str::to_owned),
        advertising_id: advertising_id.map(str::to_owned),
        send_email: true,
        send_advertising_id: true,
    }
}

#[tokio::test]
async fn add_user_should_send_the_batch_to_tiktok() {
    // Arrange
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/open_api/v1.3/segment/mapping/")
            .header("access-token", "my-access-token")
            .json_body(json!({
                "advertiser_ids": ["7000"],
                "action": "add",
                "id_schema": ["EMAIL_SHA256", "IDFA_SHA256"],
                "batch_data": [
                    [
                        { "id": EMAIL_SHA256, "audience_ids": ["audience-1"] },
                        { "id": ADVERTISING_ID_SHA256, "audience_ids": ["audience-1"] }
                    ],
                    [
                        { "id": EMAIL_SHA256, "audience_ids": ["audience-1"] },
                        {}
                    ]
                ]
            }));
        then.status(200).body("{\"code\":0,\"message\":\"OK\"}");
    });

    let settings = settings(&server);
    let action = AudienceUpdate::add_user(client(&settings), settings);
    let payloads = vec![
        AudiencePayload::Add(membership(Some("John@Example.com"), Some(ADVERTISING_ID))),
        AudiencePayload::Add(membership(Some("john+ads@example.com"), None)),
        AudiencePayload::Add(membership(None, None)),
    ];

    // Act
    let response = action.perform_batch(&payloads).await.unwrap();

    // Assert
    mock.assert();
    assert_eq!(Some(200), response.map(|response| response.status));
}

#[tokio::test]
async fn remove_user_should_send_the_delete_verb() {
    // Arrange
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(POST).path("/open_api/v1.3/segment/mapping/").json_body(json!({
            "advertiser_ids": ["7000"],
            "action": "delete",
            "id_schema": ["IDFA_SHA256"],
            "batch_data": [[{ "id": ADVERTISING_ID_SHA256, "audience_ids": ["audience-1"] }]]
        }));
        then.status(200);
    });

    let settings = settings(&server);
    let action = AudienceUpdate::remove_user(client(&settings), settings);
    let mut membership = membership(Some("john@example.com"), Some(ADVERTISING_ID));
    membership.send_email = false;

    // Act
    let response = action.perform(&AudiencePayload::Remove(membership)).await.unwrap();

    // Assert
    mock.assert();
    assert!(response.is_some());
}

#[tokio::test]
async fn should_return_a_retryable_error_if_the_audience_is_not_ready() {
    // Arrange
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(POST).path("/open_api/v1.3/segment/mapping/");
        then.status(400).body("{\"code\":40002,\"message\":\"Audience not found\"}");
    });

    let settings = settings(&server);
    let action = AudienceUpdate::add_user(client(&settings), settings);

    // Act
    let payload = AudiencePayload::Add(membership(Some("john@example.com"), None));
    let result = action.perform(&payload).await;

    // Assert
    assert_eq!(1, mock.hits());
    match result {
        Err(err) => {
            assert!(err.can_retry());
            match err {
                DestinationError::ActionExecutionError { message, .. } => {
                    assert_eq!(BATCH_UPDATE_FAILED_ERROR_MESSAGE, message)
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }
        Ok(response) => panic!("unexpected response: {:?}", response),
    }
}

#[tokio::test]
async fn should_not_call_tiktok_if_no_identifier_is_sent() {
    // Arrange
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(POST);
        then.status(200);
    });

    let settings = settings(&server);
    let action = AudienceUpdate::add_user(client(&settings), settings);
    let mut membership = membership(Some("john@example.com"), None);
    membership.send_email = false;
    membership.send_advertising_id = false;

    // Act
    let result = action.perform(&AudiencePayload::Add(membership)).await;

    // Assert
    assert!(matches!(result, Err(DestinationError::ConfigurationError { .. })));
    assert_eq!(0, mock.hits());
}
