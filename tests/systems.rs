use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use m365_agent::errors::AgentError;
use m365_agent::graph::auth::GraphAuth;
use m365_agent::graph::client::GraphClient;
use m365_agent::models::tool::ToolCall;
use m365_agent::systems::calendar::CalendarSystem;
use m365_agent::systems::drive::DriveSystem;
use m365_agent::systems::mail::MailSystem;
use m365_agent::systems::System;

/// One server plays both the identity endpoint and the Graph API
async fn mock_graph() -> (MockServer, Arc<GraphClient>) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/contoso/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": "test-token"
        })))
        .mount(&server)
        .await;

    let auth = GraphAuth::new("contoso", "client-id", "client-secret")
        .unwrap()
        .with_authority(server.uri())
        .with_graph_url(format!("{}/v1.0", server.uri()));
    let client = Arc::new(GraphClient::new(auth).unwrap());
    (server, client)
}

#[tokio::test]
async fn send_email_success_envelope() {
    let (server, client) = mock_graph().await;
    Mock::given(method("POST"))
        .and(path("/v1.0/users/agent@contoso.com/sendMail"))
        .and(body_partial_json(json!({
            "message": {
                "toRecipients": [{"emailAddress": {"address": "dana@contoso.com"}}]
            }
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let system = MailSystem::new(client, "agent@contoso.com".to_string());
    let envelope = system
        .call(ToolCall::new(
            "send_outlook_email",
            json!({
                "recipient_email": "dana@contoso.com",
                "subject": "Quarterly report",
                "body_content": "Attached below."
            }),
        ))
        .await
        .unwrap();

    assert_eq!(envelope["status"], "success");
    assert_eq!(
        envelope["message"],
        "Email sent to dana@contoso.com from agent@contoso.com with subject 'Quarterly report'."
    );
}

#[tokio::test]
async fn graph_failure_folds_into_error_envelope() {
    let (server, client) = mock_graph().await;
    Mock::given(method("POST"))
        .and(path("/v1.0/users/agent@contoso.com/sendMail"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Access denied"))
        .mount(&server)
        .await;

    let system = MailSystem::new(client, "agent@contoso.com".to_string());
    let envelope = system
        .call(ToolCall::new(
            "send_outlook_email",
            json!({
                "recipient_email": "dana@contoso.com",
                "subject": "s",
                "body_content": "b"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(envelope["status"], "error");
    let message = envelope["message"].as_str().unwrap();
    assert!(message.contains("Failed to send email: HTTP Error 403"));
    assert!(message.contains("Access denied"));
}

#[tokio::test]
async fn list_emails_returns_bare_array() {
    let (server, client) = mock_graph().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/users/a@b.com/mailFolders/Inbox/messages"))
        .and(query_param("$top", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{
                "id": "msg-1",
                "subject": "Standup notes",
                "from": {"emailAddress": {"address": "lee@contoso.com"}},
                "isRead": false,
                "bodyPreview": "Here are the notes"
            }]
        })))
        .mount(&server)
        .await;

    let system = MailSystem::new(client, "agent@contoso.com".to_string());
    let envelope = system
        .call(ToolCall::new(
            "list_outlook_emails",
            json!({"user_id": "a@b.com"}),
        ))
        .await
        .unwrap();

    let entries = envelope.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], "msg-1");
    assert_eq!(entries[0]["from"], "lee@contoso.com");
}

#[tokio::test]
async fn malformed_arguments_are_rejected_before_any_request() {
    let (_server, client) = mock_graph().await;

    let system = MailSystem::new(client, "agent@contoso.com".to_string());
    let err = system
        .call(ToolCall::new(
            "send_outlook_email",
            json!({"recipient_email": "dana@contoso.com"}),
        ))
        .await
        .unwrap_err();

    match err {
        AgentError::InvalidParameters(detail) => {
            assert!(detail.starts_with("send_outlook_email:"))
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn unknown_field_in_arguments_is_rejected() {
    let (_server, client) = mock_graph().await;

    let system = CalendarSystem::new(client);
    let err = system
        .call(ToolCall::new(
            "delete_calendar_event",
            json!({"user_id": "a@b.com", "event_id": "evt-9", "force": true}),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::InvalidParameters(_)));
}

#[tokio::test]
async fn create_event_envelope_carries_id_and_subject() {
    let (server, client) = mock_graph().await;
    Mock::given(method("POST"))
        .and(path("/v1.0/users/a@b.com/calendar/events"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "evt-9",
            "subject": "Team sync"
        })))
        .mount(&server)
        .await;

    let system = CalendarSystem::new(client);
    let envelope = system
        .call(ToolCall::new(
            "create_calendar_event",
            json!({
                "user_id": "a@b.com",
                "subject": "Team sync",
                "start_time_str": "2025-07-25T09:00:00",
                "end_time_str": "2025-07-25T10:00:00"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(envelope["status"], "success");
    assert_eq!(envelope["message"], "Calendar event created successfully.");
    assert_eq!(envelope["event_id"], "evt-9");
    assert_eq!(envelope["event_subject"], "Team sync");
}

#[tokio::test]
async fn delete_event_envelope_names_the_event() {
    let (server, client) = mock_graph().await;
    Mock::given(method("DELETE"))
        .and(path("/v1.0/users/a@b.com/calendar/events/evt123"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let system = CalendarSystem::new(client);
    let envelope = system
        .call(ToolCall::new(
            "delete_calendar_event",
            json!({"user_id": "a@b.com", "event_id": "evt123"}),
        ))
        .await
        .unwrap();

    assert_eq!(envelope["status"], "success");
    assert_eq!(
        envelope["message"],
        "Calendar event evt123 deleted successfully."
    );
}

#[tokio::test]
async fn update_event_envelope_names_the_event() {
    let (server, client) = mock_graph().await;
    Mock::given(method("PATCH"))
        .and(path("/v1.0/users/a@b.com/calendar/events/evt123"))
        .and(body_partial_json(json!({"subject": "Moved"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let system = CalendarSystem::new(client);
    let envelope = system
        .call(ToolCall::new(
            "update_calendar_event",
            json!({
                "user_id": "a@b.com",
                "event_id": "evt123",
                "updates": {"subject": "Moved"}
            }),
        ))
        .await
        .unwrap();

    assert_eq!(envelope["status"], "success");
    assert_eq!(
        envelope["message"],
        "Calendar event evt123 updated successfully."
    );
}

#[tokio::test]
async fn delete_file_without_identifier_is_an_error_envelope() {
    let (_server, client) = mock_graph().await;

    let system = DriveSystem::new(client);
    let envelope = system
        .call(ToolCall::new(
            "delete_file_from_onedrive",
            json!({"user_id": "a@b.com"}),
        ))
        .await
        .unwrap();

    assert_eq!(envelope["status"], "error");
    assert_eq!(
        envelope["message"],
        "Either file_id or file_path must be provided for deletion."
    );
}

#[tokio::test]
async fn upload_file_envelope_reports_path_and_id() {
    let (server, client) = mock_graph().await;
    Mock::given(method("PUT"))
        .and(path(
            "/v1.0/users/a@b.com/drive/root:/Reports/notes.txt:/content",
        ))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "file-1",
            "name": "notes.txt"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let system = DriveSystem::new(client);
    let envelope = system
        .call(ToolCall::new(
            "upload_file_to_onedrive",
            json!({
                "user_id": "a@b.com",
                "folder_path": "Reports",
                "file_name": "notes.txt",
                "file_content": "minutes"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(envelope["status"], "success");
    assert_eq!(
        envelope["message"],
        "File 'notes.txt' uploaded to 'Reports' successfully."
    );
    assert_eq!(envelope["file_id"], "file-1");
}

#[tokio::test]
async fn tool_names_are_unique_across_systems() {
    let (_server, client) = mock_graph().await;
    let systems: Vec<Box<dyn System>> = vec![
        Box::new(MailSystem::new(client.clone(), "agent@contoso.com".to_string())),
        Box::new(CalendarSystem::new(client.clone())),
        Box::new(DriveSystem::new(client)),
    ];

    let mut names = Vec::new();
    for system in &systems {
        for tool in system.tools() {
            assert!(!names.contains(&tool.name), "duplicate tool {}", tool.name);
            names.push(tool.name.clone());
        }
    }
    assert_eq!(names.len(), 10);
}
