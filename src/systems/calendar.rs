use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{error_envelope, parse_args, System};
use crate::errors::{AgentError, AgentResult};
use crate::graph::calendar::{self, CreateEventArgs, DeleteEventArgs, UpdateEventArgs};
use crate::graph::client::GraphClient;
use crate::models::tool::{Tool, ToolCall};

/// Outlook calendar CRUD operations
pub struct CalendarSystem {
    client: Arc<GraphClient>,
    tools: Vec<Tool>,
}

#[derive(Debug)]
enum CalendarRequest {
    Create(CreateEventArgs),
    Update(UpdateEventArgs),
    Delete(DeleteEventArgs),
}

impl CalendarRequest {
    fn parse(tool_call: &ToolCall) -> AgentResult<Self> {
        let arguments = tool_call.arguments.clone();
        match tool_call.name.as_str() {
            "create_calendar_event" => Ok(Self::Create(parse_args(&tool_call.name, arguments)?)),
            "update_calendar_event" => Ok(Self::Update(parse_args(&tool_call.name, arguments)?)),
            "delete_calendar_event" => Ok(Self::Delete(parse_args(&tool_call.name, arguments)?)),
            _ => Err(AgentError::ToolNotFound(tool_call.name.clone())),
        }
    }
}

impl CalendarSystem {
    pub fn new(client: Arc<GraphClient>) -> Self {
        let create_tool = Tool::new(
            "create_calendar_event",
            "Creates a new event in an Outlook calendar for a specified user. Requires start and \
             end times, subject, and optional attendees and body content.",
            json!({
                "type": "object",
                "properties": {
                    "user_id": {
                        "type": "string",
                        "description": "The User Principal Name (UPN) or Object ID of the calendar owner."
                    },
                    "subject": {
                        "type": "string",
                        "description": "The subject or title of the calendar event."
                    },
                    "start_time_str": {
                        "type": "string",
                        "description": "The start date and time of the event in ISO 8601 format (e.g., '2025-07-25T09:00:00')."
                    },
                    "end_time_str": {
                        "type": "string",
                        "description": "The end date and time of the event in ISO 8601 format."
                    },
                    "timezone_str": {
                        "type": "string",
                        "description": "The IANA timezone ID for the start and end times, e.g., 'UTC', 'America/New_York'. Defaults to 'UTC'."
                    },
                    "attendees_emails": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "An optional list of email addresses of attendees to invite to the event."
                    },
                    "body_content": {
                        "type": "string",
                        "description": "Optional body content for the event (e.g., meeting agenda, notes)."
                    }
                },
                "required": ["user_id", "subject", "start_time_str", "end_time_str"]
            }),
        );

        let update_tool = Tool::new(
            "update_calendar_event",
            "Updates an existing calendar event identified by its ID for a specified user. \
             Provide the event ID and an object of fields to update.",
            json!({
                "type": "object",
                "properties": {
                    "user_id": {
                        "type": "string",
                        "description": "The User Principal Name (UPN) or Object ID of the calendar owner."
                    },
                    "event_id": {
                        "type": "string",
                        "description": "The unique ID of the event to update."
                    },
                    "updates": {
                        "type": "object",
                        "description": "Fields to update, e.g. {\"subject\": \"New Subject\", \"start\": {\"dateTime\": \"...\", \"timeZone\": \"...\"}}."
                    }
                },
                "required": ["user_id", "event_id", "updates"]
            }),
        );

        let delete_tool = Tool::new(
            "delete_calendar_event",
            "Deletes a calendar event identified by its ID for a specified user.",
            json!({
                "type": "object",
                "properties": {
                    "user_id": {
                        "type": "string",
                        "description": "The User Principal Name (UPN) or Object ID of the calendar owner."
                    },
                    "event_id": {
                        "type": "string",
                        "description": "The unique ID of the event to delete."
                    }
                },
                "required": ["user_id", "event_id"]
            }),
        );

        Self {
            client,
            tools: vec![create_tool, update_tool, delete_tool],
        }
    }
}

#[async_trait]
impl System for CalendarSystem {
    fn name(&self) -> &str {
        "outlook_calendar"
    }

    fn description(&self) -> &str {
        "Creates, updates and deletes Outlook calendar events through the Microsoft Graph API"
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> AgentResult<Value> {
        match CalendarRequest::parse(&tool_call)? {
            CalendarRequest::Create(args) => {
                Ok(match calendar::create_event(&self.client, &args).await {
                    Ok(created) => json!({
                        "status": "success",
                        "message": "Calendar event created successfully.",
                        "event_id": created.id,
                        "event_subject": created.subject
                    }),
                    Err(e) => error_envelope(&e),
                })
            }
            CalendarRequest::Update(args) => {
                Ok(match calendar::update_event(&self.client, &args).await {
                    Ok(()) => json!({
                        "status": "success",
                        "message": format!("Calendar event {} updated successfully.", args.event_id)
                    }),
                    Err(e) => error_envelope(&e),
                })
            }
            CalendarRequest::Delete(args) => {
                Ok(match calendar::delete_event(&self.client, &args).await {
                    Ok(()) => json!({
                        "status": "success",
                        "message": format!("Calendar event {} deleted successfully.", args.event_id)
                    }),
                    Err(e) => error_envelope(&e),
                })
            }
        }
    }
}
