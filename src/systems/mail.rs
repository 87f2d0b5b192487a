use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{error_envelope, parse_args, success_envelope, System};
use crate::errors::{AgentError, AgentResult};
use crate::graph::client::GraphClient;
use crate::graph::mail::{self, GetMailArgs, ListMailArgs, SendMailArgs};
use crate::models::tool::{Tool, ToolCall};

/// Outlook mail operations: send, list, and read messages.
/// The sending mailbox is fixed at construction rather than model-supplied.
pub struct MailSystem {
    client: Arc<GraphClient>,
    mailbox: String,
    tools: Vec<Tool>,
}

/// The known argument shapes for this system, one per tool
#[derive(Debug)]
enum MailRequest {
    Send(SendMailArgs),
    List(ListMailArgs),
    Get(GetMailArgs),
}

impl MailRequest {
    fn parse(tool_call: &ToolCall) -> AgentResult<Self> {
        let arguments = tool_call.arguments.clone();
        match tool_call.name.as_str() {
            "send_outlook_email" => Ok(Self::Send(parse_args(&tool_call.name, arguments)?)),
            "list_outlook_emails" => Ok(Self::List(parse_args(&tool_call.name, arguments)?)),
            "get_outlook_email_content" => Ok(Self::Get(parse_args(&tool_call.name, arguments)?)),
            _ => Err(AgentError::ToolNotFound(tool_call.name.clone())),
        }
    }
}

impl MailSystem {
    pub fn new(client: Arc<GraphClient>, mailbox: String) -> Self {
        let send_tool = Tool::new(
            "send_outlook_email",
            "Sends an email to a specified recipient with a given subject and body content. \
             The email is sent from the agent's configured mailbox.",
            json!({
                "type": "object",
                "properties": {
                    "recipient_email": {
                        "type": "string",
                        "description": "The email address of the primary recipient."
                    },
                    "subject": {
                        "type": "string",
                        "description": "The subject line of the email."
                    },
                    "body_content": {
                        "type": "string",
                        "description": "The main content of the email body (plain text)."
                    }
                },
                "required": ["recipient_email", "subject", "body_content"]
            }),
        );

        let list_tool = Tool::new(
            "list_outlook_emails",
            "Lists emails from a specified Outlook mailbox folder (e.g., 'Inbox', 'JunkEmail', \
             'SentItems', 'Drafts'). Can filter by unread status or importance. Returns a list \
             of email summaries (id, subject, from, read status, importance).",
            json!({
                "type": "object",
                "properties": {
                    "user_id": {
                        "type": "string",
                        "description": "The User Principal Name (UPN) or Object ID of the mailbox owner."
                    },
                    "folder_name": {
                        "type": "string",
                        "description": "The name of the mailbox folder to list emails from. Defaults to 'Inbox'."
                    },
                    "filter_unread": {
                        "type": "boolean",
                        "description": "Set to true to only retrieve unread emails. Defaults to false."
                    },
                    "filter_importance": {
                        "type": "string",
                        "enum": ["high", "normal", "low"],
                        "description": "Filter emails by importance level. Defaults to no importance filter."
                    }
                },
                "required": ["user_id"]
            }),
        );

        let get_tool = Tool::new(
            "get_outlook_email_content",
            "Retrieves the full body content and details of a specific email using its unique ID \
             from a user's mailbox. Useful after listing emails.",
            json!({
                "type": "object",
                "properties": {
                    "user_id": {
                        "type": "string",
                        "description": "The User Principal Name (UPN) or Object ID of the mailbox owner."
                    },
                    "email_id": {
                        "type": "string",
                        "description": "The unique ID of the email to retrieve its content."
                    }
                },
                "required": ["user_id", "email_id"]
            }),
        );

        Self {
            client,
            mailbox,
            tools: vec![send_tool, list_tool, get_tool],
        }
    }
}

#[async_trait]
impl System for MailSystem {
    fn name(&self) -> &str {
        "outlook_mail"
    }

    fn description(&self) -> &str {
        "Sends, lists and reads Outlook email through the Microsoft Graph API"
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> AgentResult<Value> {
        match MailRequest::parse(&tool_call)? {
            MailRequest::Send(args) => {
                Ok(match mail::send_mail(&self.client, &self.mailbox, &args).await {
                    Ok(()) => success_envelope(format!(
                        "Email sent to {} from {} with subject '{}'.",
                        args.recipient_email, self.mailbox, args.subject
                    )),
                    Err(e) => error_envelope(&e),
                })
            }
            MailRequest::List(args) => Ok(match mail::list_messages(&self.client, &args).await {
                Ok(emails) => serde_json::to_value(emails)
                    .map_err(|e| AgentError::ExecutionError(e.to_string()))?,
                Err(e) => error_envelope(&e),
            }),
            MailRequest::Get(args) => Ok(match mail::get_message(&self.client, &args).await {
                Ok(detail) => serde_json::to_value(detail)
                    .map_err(|e| AgentError::ExecutionError(e.to_string()))?,
                Err(e) => error_envelope(&e),
            }),
        }
    }
}
