use serde::Deserialize;
use serde_json::{json, Value};

use super::client::GraphClient;
use super::error::GraphError;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CreateEventArgs {
    pub user_id: String,
    pub subject: String,
    /// ISO 8601 local date-time, e.g. "2025-07-25T09:00:00"
    pub start_time_str: String,
    pub end_time_str: String,
    #[serde(default = "default_timezone")]
    pub timezone_str: String,
    #[serde(default)]
    pub attendees_emails: Option<Vec<String>>,
    #[serde(default)]
    pub body_content: Option<String>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct UpdateEventArgs {
    pub user_id: String,
    pub event_id: String,
    /// Partial event body passed through to the PATCH request
    pub updates: Value,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DeleteEventArgs {
    pub user_id: String,
    pub event_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedEvent {
    pub id: Option<String>,
    pub subject: Option<String>,
}

/// Create a calendar event, optionally with attendees and a text body
pub async fn create_event(
    client: &GraphClient,
    args: &CreateEventArgs,
) -> Result<CreatedEvent, GraphError> {
    let operation = "Failed to create event";
    let token = client.token(operation).await?;

    let mut event_body = json!({
        "subject": args.subject,
        "start": {
            "dateTime": args.start_time_str,
            "timeZone": args.timezone_str
        },
        "end": {
            "dateTime": args.end_time_str,
            "timeZone": args.timezone_str
        },
        "isOnlineMeeting": false
    });

    if let Some(content) = &args.body_content {
        event_body["body"] = json!({"contentType": "Text", "content": content});
    }

    if let Some(emails) = &args.attendees_emails {
        let attendees: Vec<Value> = emails
            .iter()
            .map(|email| {
                json!({
                    "emailAddress": {"address": email},
                    "type": "required"
                })
            })
            .collect();
        event_body["attendees"] = json!(attendees);
    }

    let url = format!("{}/users/{}/calendar/events", client.base_url(), args.user_id);
    let response = client
        .execute(
            operation,
            client.http().post(&url).bearer_auth(token).json(&event_body),
        )
        .await?;

    let event_data: Value = response
        .json()
        .await
        .map_err(|e| GraphError::transport(operation, &e))?;

    Ok(CreatedEvent {
        id: event_data.get("id").and_then(|v| v.as_str()).map(String::from),
        subject: event_data
            .get("subject")
            .and_then(|v| v.as_str())
            .map(String::from),
    })
}

/// Apply a partial update to an existing event
pub async fn update_event(client: &GraphClient, args: &UpdateEventArgs) -> Result<(), GraphError> {
    let operation = format!("Failed to update event {}", args.event_id);
    let token = client.token(&operation).await?;

    let url = format!(
        "{}/users/{}/calendar/events/{}",
        client.base_url(),
        args.user_id,
        args.event_id
    );
    client
        .execute(
            &operation,
            client
                .http()
                .patch(&url)
                .bearer_auth(token)
                .json(&args.updates),
        )
        .await?;

    Ok(())
}

/// Delete an event; a 204 with no body is a success
pub async fn delete_event(client: &GraphClient, args: &DeleteEventArgs) -> Result<(), GraphError> {
    let operation = format!("Failed to delete event {}", args.event_id);
    let token = client.token(&operation).await?;

    let url = format!(
        "{}/users/{}/calendar/events/{}",
        client.base_url(),
        args.user_id,
        args.event_id
    );
    client
        .execute(&operation, client.http().delete(&url).bearer_auth(token))
        .await?;

    Ok(())
}
