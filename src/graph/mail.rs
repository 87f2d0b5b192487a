use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::client::GraphClient;
use super::error::GraphError;

/// Summary projection used by the listing operation. Absent fields default
/// instead of failing; the Graph response is not trusted to be complete.
const SUMMARY_FIELDS: &str = "id,subject,from,receivedDateTime,isRead,importance,hasAttachments,bodyPreview";
const DETAIL_FIELDS: &str = "id,subject,from,receivedDateTime,isRead,importance,body,hasAttachments";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SendMailArgs {
    pub recipient_email: String,
    pub subject: String,
    pub body_content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Normal,
    Low,
}

impl Importance {
    fn as_str(&self) -> &'static str {
        match self {
            Importance::High => "high",
            Importance::Normal => "normal",
            Importance::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ListMailArgs {
    pub user_id: String,
    #[serde(default = "default_folder")]
    pub folder_name: String,
    #[serde(default)]
    pub filter_unread: bool,
    #[serde(default)]
    pub filter_importance: Option<Importance>,
}

fn default_folder() -> String {
    "Inbox".to_string()
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GetMailArgs {
    pub user_id: String,
    pub email_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmailSummary {
    pub id: Option<String>,
    pub subject: Option<String>,
    pub from: String,
    pub received_date_time: Option<String>,
    pub is_read: Option<bool>,
    pub importance: Option<String>,
    pub has_attachments: Option<bool>,
    pub body_preview: String,
}

impl EmailSummary {
    fn from_graph(message: &Value) -> Self {
        Self {
            id: string_field(message, "id"),
            subject: string_field(message, "subject"),
            from: message
                .pointer("/from/emailAddress/address")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown")
                .to_string(),
            received_date_time: string_field(message, "receivedDateTime"),
            is_read: message.get("isRead").and_then(|v| v.as_bool()),
            importance: string_field(message, "importance"),
            has_attachments: message.get("hasAttachments").and_then(|v| v.as_bool()),
            body_preview: string_field(message, "bodyPreview").unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmailDetail {
    pub id: Option<String>,
    pub subject: Option<String>,
    pub from: String,
    pub received_date_time: Option<String>,
    pub is_read: Option<bool>,
    pub importance: Option<String>,
    pub has_attachments: Option<bool>,
    pub body_content_type: Option<String>,
    pub body: String,
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(String::from)
}

/// Send a plain-text email from the given mailbox
pub async fn send_mail(
    client: &GraphClient,
    mailbox: &str,
    args: &SendMailArgs,
) -> Result<(), GraphError> {
    let operation = "Failed to send email";
    let token = client.token(operation).await?;

    let request_body = json!({
        "message": {
            "subject": args.subject,
            "body": {
                "contentType": "Text",
                "content": args.body_content
            },
            "toRecipients": [
                { "emailAddress": { "address": args.recipient_email } }
            ]
        },
        "saveToSentItems": true
    });

    let url = format!("{}/users/{}/sendMail", client.base_url(), mailbox);
    client
        .execute(
            operation,
            client.http().post(&url).bearer_auth(token).json(&request_body),
        )
        .await?;

    Ok(())
}

/// List up to ten emails from a mailbox folder with optional filters
pub async fn list_messages(
    client: &GraphClient,
    args: &ListMailArgs,
) -> Result<Vec<EmailSummary>, GraphError> {
    let operation = format!("Failed to list emails from {}", args.folder_name);
    let token = client.token(&operation).await?;

    let mut filters = Vec::new();
    if args.filter_unread {
        filters.push("isRead eq false".to_string());
    }
    if let Some(importance) = args.filter_importance {
        filters.push(format!("importance eq '{}'", importance.as_str()));
    }

    let mut query = vec![format!("$select={}", SUMMARY_FIELDS), "$top=10".to_string()];
    if !filters.is_empty() {
        query.push(format!("$filter={}", filters.join(" and ")));
    }

    let url = format!(
        "{}/users/{}/mailFolders/{}/messages?{}",
        client.base_url(),
        args.user_id,
        args.folder_name,
        query.join("&")
    );

    let response = client
        .execute(&operation, client.http().get(&url).bearer_auth(token))
        .await?;
    let data: Value = response
        .json()
        .await
        .map_err(|e| GraphError::transport(&operation, &e))?;

    let mut emails = Vec::new();
    if let Some(messages) = data.get("value").and_then(|v| v.as_array()) {
        for message in messages {
            emails.push(EmailSummary::from_graph(message));
        }
    }
    Ok(emails)
}

/// Fetch the full content of one email by its id
pub async fn get_message(
    client: &GraphClient,
    args: &GetMailArgs,
) -> Result<EmailDetail, GraphError> {
    let operation = format!("Failed to get email content for {}", args.email_id);
    let token = client.token(&operation).await?;

    let url = format!(
        "{}/users/{}/messages/{}?$select={}",
        client.base_url(),
        args.user_id,
        args.email_id,
        DETAIL_FIELDS
    );

    let response = client
        .execute(&operation, client.http().get(&url).bearer_auth(token))
        .await?;
    let message: Value = response
        .json()
        .await
        .map_err(|e| GraphError::transport(&operation, &e))?;

    Ok(EmailDetail {
        id: string_field(&message, "id"),
        subject: string_field(&message, "subject"),
        from: message
            .pointer("/from/emailAddress/address")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string(),
        received_date_time: string_field(&message, "receivedDateTime"),
        is_read: message.get("isRead").and_then(|v| v.as_bool()),
        importance: string_field(&message, "importance"),
        has_attachments: message.get("hasAttachments").and_then(|v| v.as_bool()),
        body_content_type: message
            .pointer("/body/contentType")
            .and_then(|v| v.as_str())
            .map(String::from),
        body: message
            .pointer("/body/content")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
    })
}
