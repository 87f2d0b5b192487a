use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{error_envelope, parse_args, System};
use crate::errors::{AgentError, AgentResult};
use crate::graph::client::GraphClient;
use crate::graph::drive::{
    self, DeleteFileArgs, DownloadFileArgs, ListFolderArgs, UploadFileArgs,
};
use crate::models::tool::{Tool, ToolCall};

/// OneDrive file operations: upload, list, download and delete
pub struct DriveSystem {
    client: Arc<GraphClient>,
    tools: Vec<Tool>,
}

#[derive(Debug)]
enum DriveRequest {
    Upload(UploadFileArgs),
    List(ListFolderArgs),
    Download(DownloadFileArgs),
    Delete(DeleteFileArgs),
}

impl DriveRequest {
    fn parse(tool_call: &ToolCall) -> AgentResult<Self> {
        let arguments = tool_call.arguments.clone();
        match tool_call.name.as_str() {
            "upload_file_to_onedrive" => Ok(Self::Upload(parse_args(&tool_call.name, arguments)?)),
            "list_files_in_folder" => Ok(Self::List(parse_args(&tool_call.name, arguments)?)),
            "download_file_from_onedrive" => {
                Ok(Self::Download(parse_args(&tool_call.name, arguments)?))
            }
            "delete_file_from_onedrive" => {
                Ok(Self::Delete(parse_args(&tool_call.name, arguments)?))
            }
            _ => Err(AgentError::ToolNotFound(tool_call.name.clone())),
        }
    }
}

impl DriveSystem {
    pub fn new(client: Arc<GraphClient>) -> Self {
        let upload_tool = Tool::new(
            "upload_file_to_onedrive",
            "Uploads a file with specified content to a designated folder in a user's OneDrive. \
             If the folder does not exist, it will be created.",
            json!({
                "type": "object",
                "properties": {
                    "user_id": {
                        "type": "string",
                        "description": "The User Principal Name (UPN) of the OneDrive owner."
                    },
                    "folder_path": {
                        "type": "string",
                        "description": "The path to the target folder in OneDrive (e.g., 'Documents', 'Reports/Q3'). Use 'root' or an empty string for the top-level drive."
                    },
                    "file_name": {
                        "type": "string",
                        "description": "The name of the file to upload, including its extension (e.g., 'meeting_notes.txt')."
                    },
                    "file_content": {
                        "type": "string",
                        "description": "The text content of the file to be uploaded."
                    }
                },
                "required": ["user_id", "folder_path", "file_name", "file_content"]
            }),
        );

        let list_tool = Tool::new(
            "list_files_in_folder",
            "Lists files and subfolders within a specified folder in a user's OneDrive. Returns \
             summary details like name, type (file/folder), and ID.",
            json!({
                "type": "object",
                "properties": {
                    "user_id": {
                        "type": "string",
                        "description": "The User Principal Name (UPN) of the OneDrive owner."
                    },
                    "folder_path": {
                        "type": "string",
                        "description": "The path to the folder in OneDrive to list contents from. Use 'root' for the top-level drive. Defaults to 'root'."
                    }
                },
                "required": ["user_id"]
            }),
        );

        let download_tool = Tool::new(
            "download_file_from_onedrive",
            "Downloads the content of a specific file from a user's OneDrive. The file can be \
             identified by its ID or its full path; one of the two must be provided.",
            json!({
                "type": "object",
                "properties": {
                    "user_id": {
                        "type": "string",
                        "description": "The User Principal Name (UPN) of the OneDrive owner."
                    },
                    "file_id": {
                        "type": "string",
                        "description": "The unique ID of the file to download. Provide this if available."
                    },
                    "file_path": {
                        "type": "string",
                        "description": "The full path to the file in OneDrive (e.g., 'Documents/report.pdf'). Use this if file_id is not available."
                    }
                },
                "required": ["user_id"]
            }),
        );

        let delete_tool = Tool::new(
            "delete_file_from_onedrive",
            "Deletes a file or folder from a user's OneDrive, identified by its ID or its full \
             path; one of the two must be provided.",
            json!({
                "type": "object",
                "properties": {
                    "user_id": {
                        "type": "string",
                        "description": "The User Principal Name (UPN) of the OneDrive owner."
                    },
                    "file_id": {
                        "type": "string",
                        "description": "The unique ID of the file to delete. Provide this if available."
                    },
                    "file_path": {
                        "type": "string",
                        "description": "The full path to the file in OneDrive (e.g., 'Documents/old_notes.txt'). Use this if file_id is not available."
                    }
                },
                "required": ["user_id"]
            }),
        );

        Self {
            client,
            tools: vec![upload_tool, list_tool, download_tool, delete_tool],
        }
    }
}

#[async_trait]
impl System for DriveSystem {
    fn name(&self) -> &str {
        "onedrive_files"
    }

    fn description(&self) -> &str {
        "Uploads, lists, downloads and deletes OneDrive files through the Microsoft Graph API"
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> AgentResult<Value> {
        match DriveRequest::parse(&tool_call)? {
            DriveRequest::Upload(args) => Ok(match drive::upload_file(&self.client, &args).await {
                Ok(uploaded) => json!({
                    "status": "success",
                    "message": format!(
                        "File '{}' uploaded to '{}' successfully.",
                        args.file_name, args.folder_path
                    ),
                    "file_id": uploaded.id,
                    "file_name": uploaded.name
                }),
                Err(e) => error_envelope(&e),
            }),
            DriveRequest::List(args) => Ok(match drive::list_folder(&self.client, &args).await {
                Ok(entries) => serde_json::to_value(entries)
                    .map_err(|e| AgentError::ExecutionError(e.to_string()))?,
                Err(e) => error_envelope(&e),
            }),
            DriveRequest::Download(args) => {
                Ok(match drive::download_file(&self.client, &args).await {
                    Ok(content) => json!({
                        "status": "success",
                        "message": "File downloaded successfully.",
                        "file_content": String::from_utf8_lossy(&content)
                    }),
                    Err(e) => error_envelope(&e),
                })
            }
            DriveRequest::Delete(args) => Ok(match drive::delete_file(&self.client, &args).await {
                Ok(()) => json!({
                    "status": "success",
                    "message": "File deleted successfully."
                }),
                Err(e) => error_envelope(&e),
            }),
        }
    }
}
